// # DNS Provider Trait
//
// Defines the interface for reading zones out of a DNS provider.
//
// ## Implementations
//
// - Cloudflare: `dns-exporter-cloudflare` crate
// - Route53: `dns-exporter-route53` crate
//
// ## Usage
//
// ```rust,ignore
// use dns_exporter_core::DnsProvider;
//
// #[tokio::main]
// async fn main() -> dns_exporter_core::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let page = provider.list_zones(None).await?;
//     for zone in &page.zones {
//         let content = provider.fetch_zone(zone).await?;
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::records::ZoneRecords;
use crate::zone::{Zone, ZonePage};

/// What a provider returns for a single zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneContent {
    /// Structured records, serialized locally
    Records(ZoneRecords),
    /// A BIND-format export produced by the provider itself
    Exported(String),
}

/// Trait for DNS provider implementations
///
/// A provider lists its hosted zones and hands out the content of one zone
/// at a time. Implementations must be thread-safe: the exporter moves each
/// provider into its own task.
///
/// # Trust Level: Untrusted
///
/// Providers only talk to their own API endpoints. They do not sleep, retry
/// or write files; pacing between zones and persistence belong to the
/// [`Exporter`](crate::Exporter).
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Get the provider name
    ///
    /// Also used as the provider's directory name in the export tree
    /// (e.g., "CloudFlare", "Route53").
    fn provider_name(&self) -> &'static str;

    /// Whether the provider separates public and private zones
    ///
    /// Providers that do get `Public` and `Private` subdirectories.
    fn separates_visibility(&self) -> bool {
        false
    }

    /// List one page of hosted zones
    ///
    /// # Parameters
    ///
    /// - `cursor`: `None` for the first page, otherwise the `next_cursor`
    ///   of the previous page
    async fn list_zones(&self, cursor: Option<&str>) -> Result<ZonePage, crate::Error>;

    /// Retrieve the full content of one zone
    async fn fetch_zone(&self, zone: &Zone) -> Result<ZoneContent, crate::Error>;
}

/// Helper trait for constructing DNS providers from configuration
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this provider
    ///
    /// # Returns
    ///
    /// A boxed DnsProvider trait object
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
