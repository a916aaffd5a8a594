// # dns-exporter-core
//
// Core library for exporting DNS zones into a versioned snapshot.
//
// ## Architecture Overview
//
// - **DnsProvider**: Trait for listing and retrieving zones from a provider
// - **ZoneRecords / zonefile**: Provider-agnostic aggregation and deterministic serialization
// - **Exporter**: Concurrent per-provider fetch and export orchestration
// - **SnapshotManager**: Init/clone/pull before, commit/push after an export
// - **ProviderRegistry**: Plugin-based registry for DNS providers
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from provider and git implementations
// 2. **Deterministic Output**: Unchanged zones serialize byte-identically run over run
// 3. **Plugin-Based**: Providers are registered dynamically, no hard-coded if-else
// 4. **Library-First**: All core functionality can be used as a library

pub mod config;
pub mod error;
pub mod exporter;
pub mod fs;
pub mod http;
pub mod records;
pub mod registry;
pub mod snapshot;
pub mod traits;
pub mod zone;
pub mod zonefile;

// Re-export core types for convenience
pub use config::{ExportConfig, ExporterConfig, ProviderConfig, RemoteConfig, SnapshotConfig};
pub use error::{Error, Result};
pub use exporter::{Exporter, ProviderEntry};
pub use fs::{MemoryFilesystem, OsFilesystem};
pub use http::ReqwestHttpClient;
pub use records::{RawRecordSet, RecordCursor, RecordSet, RecordSetPage, RecordType, ZoneRecords};
pub use registry::ProviderRegistry;
pub use snapshot::{PrepareAction, RecordOutcome, RemoteTarget, SnapshotIdentity, SnapshotManager};
pub use traits::{DnsProvider, Filesystem, HttpClient, RecordSetSource, SnapshotRepository};
pub use zone::{ProviderZones, Visibility, Zone, ZonePage};
