//! Export pipeline
//!
//! The Exporter is responsible for:
//! - Listing every zone of every enabled provider ([`Exporter::fetch_all`])
//! - Writing one zonefile per zone into the export tree ([`Exporter::export_all`])
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────────┐
//!                 │   Exporter   │
//!                 └──────────────┘
//!                        │ one task per provider
//!         ┌──────────────┴──────────────┐
//!         ▼                             ▼
//! ┌───────────────┐             ┌───────────────┐
//! │  CloudFlare   │             │    Route53    │
//! │  zone, zone.. │             │  zone, zone.. │ (sequential, paced)
//! └───────────────┘             └───────────────┘
//!         │                             │
//!         └──────────────┬──────────────┘
//!                        ▼
//!                ┌──────────────┐
//!                │  Filesystem  │ <root>/<Provider>[/Public|/Private]/<zone>.txt
//!                └──────────────┘
//! ```
//!
//! Both phases join every provider task before returning. A failing
//! provider never cancels its siblings; failures are reported together
//! as [`Error::Phase`](crate::Error::Phase).

mod export;
mod fetch;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ExportConfig;
use crate::traits::{DnsProvider, Filesystem};
use crate::zone::ProviderZones;

/// A provider together with the zones listed for it
#[derive(Clone)]
pub struct ProviderEntry {
    /// The provider client
    pub provider: Arc<dyn DnsProvider>,
    /// Zones found by the last fetch
    pub zones: ProviderZones,
}

impl ProviderEntry {
    /// Wrap a provider with empty zone maps
    pub fn new(provider: Arc<dyn DnsProvider>) -> Self {
        Self {
            provider,
            zones: ProviderZones::new(),
        }
    }

    /// Provider name
    pub fn name(&self) -> &'static str {
        self.provider.provider_name()
    }
}

impl std::fmt::Debug for ProviderEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderEntry")
            .field("provider", &self.name())
            .field("zones", &self.zones)
            .finish()
    }
}

/// Fetch and export orchestrator
///
/// ## Lifecycle
///
/// 1. Create with [`Exporter::new()`] and add providers
/// 2. [`Exporter::fetch_all()`] fills each provider's zone maps
/// 3. [`Exporter::export_all()`] writes the zonefiles
pub struct Exporter {
    providers: Vec<ProviderEntry>,
    fs: Arc<dyn Filesystem>,
    root: PathBuf,
    delay: Duration,
}

impl Exporter {
    /// Create an exporter writing below `root`
    ///
    /// `delay` is the pause between two zones of the same provider.
    pub fn new(fs: Arc<dyn Filesystem>, root: impl Into<PathBuf>, delay: Duration) -> Self {
        Self {
            providers: Vec::new(),
            fs,
            root: root.into(),
            delay,
        }
    }

    /// Create an exporter from the export configuration
    pub fn from_config(fs: Arc<dyn Filesystem>, config: &ExportConfig) -> Self {
        Self::new(fs, config.data_dir.clone(), Duration::from_secs(config.delay_secs))
    }

    /// Register a provider
    pub fn add_provider(&mut self, provider: Arc<dyn DnsProvider>) {
        self.providers.push(ProviderEntry::new(provider));
    }

    /// Registered providers with their zones
    pub fn providers(&self) -> &[ProviderEntry] {
        &self.providers
    }

    /// Zones of the provider called `name`
    pub fn zones(&self, name: &str) -> Option<&ProviderZones> {
        self.providers
            .iter()
            .find(|entry| entry.name() == name)
            .map(|entry| &entry.zones)
    }

    /// Root of the export tree
    pub fn root(&self) -> &Path {
        &self.root
    }
}
