// # Cloudflare Zone Source
//
// This crate reads zones out of Cloudflare for the DNS exporter.
//
// Cloudflare does not separate public and private zones; every zone is
// exported under `CloudFlare/`. Instead of structured records, the
// provider's own BIND export is downloaded and normalized by the core.
//
// ## Security Requirements
//
// - API key NEVER appears in logs
// - Provider MUST fail fast if email or key is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?page=:page&per_page=:per_page`
// - Export DNS Records: GET `/zones/:zone_id/dns_records/export`

use async_trait::async_trait;
use dns_exporter_core::config::ProviderConfig;
use dns_exporter_core::traits::{
    DnsProvider, DnsProviderFactory, HttpClient, HttpRequest, HttpResponse, ZoneContent,
};
use dns_exporter_core::zone::{Zone, ZonePage};
use dns_exporter_core::{Error, ReqwestHttpClient, Result};
use serde::Deserialize;
use std::sync::Arc;

/// Cloudflare API base URL
const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Provider name, also the export directory name
pub const PROVIDER_NAME: &str = "CloudFlare";

/// Zones requested per listing page
const ZONES_PER_PAGE: u32 = 50;

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ZoneResult {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    page: u32,
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct ListZonesResponse {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    #[serde(default)]
    result: Vec<ZoneResult>,
    result_info: Option<ResultInfo>,
}

/// Cloudflare zone source
///
/// Authenticates with the account email and global API key
/// (`X-Auth-Email` / `X-Auth-Key`), which the DNS export endpoint accepts.
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API key.
pub struct CloudflareProvider {
    /// Account email
    email: String,

    /// Global API key
    /// ⚠️ NEVER log this value
    api_key: String,

    /// Transport for API requests
    client: Arc<dyn HttpClient>,

    /// API base URL, overridable for tests
    api_base: String,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("email", &self.email)
            .field("api_key", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Errors
    ///
    /// `Error::Config` if the email or API key is empty.
    pub fn new(
        email: impl Into<String>,
        api_key: impl Into<String>,
        client: Arc<dyn HttpClient>,
    ) -> Result<Self> {
        let email = email.into();
        let api_key = api_key.into();

        if email.is_empty() {
            return Err(Error::config("Cloudflare email cannot be empty"));
        }
        if api_key.is_empty() {
            return Err(Error::config("Cloudflare API key cannot be empty"));
        }

        Ok(Self {
            email,
            api_key,
            client,
            api_base: CLOUDFLARE_API_BASE.to_string(),
        })
    }

    /// Point the provider at a different API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Authenticated GET returning the body of a 2xx response
    async fn get(&self, url: String, context: &str) -> Result<String> {
        let request = HttpRequest::get(url)
            .header("Content-Type", "application/json")
            .header("X-Auth-Email", self.email.as_str())
            .header("X-Auth-Key", self.api_key.as_str());

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("{}: {}", context, e)))?;

        check_status(&response, context)?;
        Ok(response.body)
    }
}

/// Map non-2xx statuses to provider errors
fn check_status(response: &HttpResponse, context: &str) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }

    let status = response.status;
    let message = match status {
        401 | 403 => format!(
            "Authentication failed: invalid email/API key or insufficient permissions. Status: {}",
            status
        ),
        404 => format!("{}: not found. Status: {}", context, status),
        429 => format!("Rate limit exceeded. Please retry later. Status: {}", status),
        500..=599 => format!(
            "Cloudflare server error (transient): {} - {}",
            status, response.body
        ),
        _ => format!("{} failed: {} - {}", context, status, response.body),
    };
    Err(Error::provider(PROVIDER_NAME, message))
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    /// List one page of zones
    ///
    /// The cursor is the 1-based page number.
    async fn list_zones(&self, cursor: Option<&str>) -> Result<ZonePage> {
        let page: u32 = match cursor {
            None => 1,
            Some(c) => c
                .parse()
                .map_err(|_| Error::provider(PROVIDER_NAME, format!("invalid page cursor: {}", c)))?,
        };

        tracing::debug!("Listing Cloudflare zones, page {}", page);
        let url = format!(
            "{}/zones?page={}&per_page={}",
            self.api_base, page, ZONES_PER_PAGE
        );
        let body = self.get(url, "List zones").await?;

        let parsed: ListZonesResponse = serde_json::from_str(&body).map_err(|e| {
            Error::provider(PROVIDER_NAME, format!("Failed to parse zone list: {}", e))
        })?;

        if !parsed.success {
            let errors: Vec<String> = parsed
                .errors
                .iter()
                .map(|e| format!("{} ({})", e.message, e.code))
                .collect();
            return Err(Error::provider(
                PROVIDER_NAME,
                format!("List zones failed: {}", errors.join("; ")),
            ));
        }

        let (current, total) = parsed
            .result_info
            .map(|info| (info.page, info.total_pages))
            .unwrap_or((page, page));
        let is_truncated = current < total;

        Ok(ZonePage {
            zones: parsed
                .result
                .into_iter()
                .map(|z| Zone::public(z.name, z.id))
                .collect(),
            is_truncated,
            next_cursor: is_truncated.then(|| (current + 1).to_string()),
        })
    }

    async fn fetch_zone(&self, zone: &Zone) -> Result<ZoneContent> {
        tracing::debug!("Exporting Cloudflare zone {}", zone.name);
        let url = format!("{}/zones/{}/dns_records/export", self.api_base, zone.id);
        let body = self.get(url, &format!("Export zone {}", zone.name)).await?;
        Ok(ZoneContent::Exported(body))
    }
}

/// Factory for creating Cloudflare providers
pub struct CloudflareFactory;

impl DnsProviderFactory for CloudflareFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        match config {
            ProviderConfig::Cloudflare { email, api_key } => {
                let client = Arc::new(ReqwestHttpClient::new()?);
                Ok(Box::new(CloudflareProvider::new(
                    email.clone(),
                    api_key.clone(),
                    client,
                )?))
            }
            _ => Err(Error::config("Invalid config for Cloudflare provider")),
        }
    }
}

/// Register the Cloudflare provider with a registry
///
/// # Example
///
/// ```rust
/// use dns_exporter_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// dns_exporter_cloudflare::register(&registry);
/// assert!(registry.has_provider("cloudflare"));
/// ```
pub fn register(registry: &dns_exporter_core::ProviderRegistry) {
    registry.register_provider("cloudflare", Box::new(CloudflareFactory));
}
