//! Core traits for the DNS exporter
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`DnsProvider`]: List and retrieve zones from a provider
//! - [`RecordSetSource`]: Paginated structured record listings
//! - [`HttpClient`]: Raw HTTP transport for provider APIs
//! - [`Filesystem`]: Storage for the export tree
//! - [`SnapshotRepository`]: Versioned repository around the export tree

pub mod dns_provider;
pub mod filesystem;
pub mod http_client;
pub mod record_source;
pub mod snapshot;

pub use dns_provider::{DnsProvider, DnsProviderFactory, ZoneContent};
pub use filesystem::Filesystem;
pub use http_client::{HttpClient, HttpRequest, HttpResponse};
pub use record_source::RecordSetSource;
pub use snapshot::{CommitOutcome, PullOutcome, SnapshotRepository};
