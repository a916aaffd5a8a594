// # Route53 Zone Source
//
// This crate reads hosted zones and their record sets out of AWS Route53
// for the DNS exporter.
//
// ## Behavior
//
// - Zones are split into `Public/` and `Private/` by the hosted zone's
//   `PrivateZone` flag
// - Record sets are listed page by page and aggregated by the core, which
//   renders the zonefile
// - Alias record sets are exported with their target as value and TTL 0
//
// ## Security Requirements
//
// - Secret access key and session token NEVER appear in logs
// - Requests are signed with SigV4 against the global endpoint (us-east-1)
//
// ## API Reference
//
// - ListHostedZones: GET `/2013-04-01/hostedzone?marker=:marker`
// - ListResourceRecordSets: GET `/2013-04-01/hostedzone/:id/rrset?name=&type=&identifier=`

mod sign;
mod xml;

pub use sign::Credentials;

use async_trait::async_trait;
use chrono::Utc;
use dns_exporter_core::config::ProviderConfig;
use dns_exporter_core::records::{RecordCursor, RecordSetPage, collect_records};
use dns_exporter_core::traits::{
    DnsProvider, DnsProviderFactory, HttpClient, HttpRequest, HttpResponse, RecordSetSource,
    ZoneContent,
};
use dns_exporter_core::zone::{Zone, ZonePage};
use dns_exporter_core::{Error, ReqwestHttpClient, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use sign::Scope;
use xml::{ErrorResponse, ListHostedZonesResponse, ListResourceRecordSetsResponse, bare_zone_id};

/// Route53 API host
const ROUTE53_HOST: &str = "route53.amazonaws.com";

/// API version path prefix
const API_VERSION: &str = "/2013-04-01";

/// Route53 is a global service signed in us-east-1
const SIGNING_SCOPE: Scope<'static> = Scope {
    region: "us-east-1",
    service: "route53",
};

/// Provider name, also the export directory name
pub const PROVIDER_NAME: &str = "Route53";

/// Route53 zone source
pub struct Route53Provider {
    credentials: Credentials,
    client: Arc<dyn HttpClient>,
    /// Scheme and host requests are sent to, overridable for tests
    endpoint: String,
}

impl std::fmt::Debug for Route53Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route53Provider")
            .field("credentials", &self.credentials)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl Route53Provider {
    /// Create a new Route53 provider
    ///
    /// # Errors
    ///
    /// `Error::Config` if the access key id or secret is empty.
    pub fn new(credentials: Credentials, client: Arc<dyn HttpClient>) -> Result<Self> {
        if credentials.access_key_id.is_empty() || credentials.secret_access_key.is_empty() {
            return Err(Error::config(
                "Route53 requires an access key id and a secret access key",
            ));
        }

        Ok(Self {
            credentials,
            client,
            endpoint: format!("https://{}", ROUTE53_HOST),
        })
    }

    /// Send requests to a different endpoint; signing still uses the Route53 host
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Signed GET, parsed as XML on success
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
        context: &str,
    ) -> Result<T> {
        let query = sign::canonical_query(params);
        let headers = sign::sign_get(
            &self.credentials,
            SIGNING_SCOPE,
            ROUTE53_HOST,
            path,
            &query,
            Utc::now(),
        )?;

        let url = if query.is_empty() {
            format!("{}{}", self.endpoint, path)
        } else {
            format!("{}{}?{}", self.endpoint, path, query)
        };
        let request = headers
            .into_iter()
            .fold(HttpRequest::get(url), |req, (name, value)| {
                req.header(name, value)
            });

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("{}: {}", context, e)))?;
        check_status(&response, context)?;

        quick_xml::de::from_str(&response.body).map_err(|e| {
            Error::provider(
                PROVIDER_NAME,
                format!("{}: failed to parse response: {}", context, e),
            )
        })
    }
}

/// Map non-2xx statuses to provider errors, using the AWS error document when present
fn check_status(response: &HttpResponse, context: &str) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }

    let status = response.status;
    let detail = quick_xml::de::from_str::<ErrorResponse>(&response.body)
        .map(|e| format!("{}: {}", e.error.code, e.error.message))
        .unwrap_or_else(|_| response.body.clone());

    let message = match status {
        401 | 403 => format!(
            "Authentication failed: invalid credentials or insufficient permissions. Status: {} ({})",
            status, detail
        ),
        400 if detail.starts_with("Throttling") => {
            format!("Rate limit exceeded. Please retry later. ({})", detail)
        }
        404 => format!("{}: not found ({})", context, detail),
        500..=599 => format!("Route53 server error (transient): {} - {}", status, detail),
        _ => format!("{} failed: {} - {}", context, status, detail),
    };
    Err(Error::provider(PROVIDER_NAME, message))
}

#[async_trait]
impl DnsProvider for Route53Provider {
    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn separates_visibility(&self) -> bool {
        true
    }

    /// List one page of hosted zones
    ///
    /// The cursor is Route53's `NextMarker`.
    async fn list_zones(&self, cursor: Option<&str>) -> Result<ZonePage> {
        let params: Vec<(String, String)> = cursor
            .map(|marker| vec![("marker".to_string(), marker.to_string())])
            .unwrap_or_default();

        tracing::debug!("Listing Route53 hosted zones (marker: {:?})", cursor);
        let response: ListHostedZonesResponse = self
            .get(&format!("{}/hostedzone", API_VERSION), &params, "List hosted zones")
            .await?;
        Ok(response.into())
    }

    async fn fetch_zone(&self, zone: &Zone) -> Result<ZoneContent> {
        tracing::debug!("Collecting Route53 record sets for {}", zone.name);
        let records = collect_records(self, &zone.id).await?;
        Ok(ZoneContent::Records(records))
    }
}

#[async_trait]
impl RecordSetSource for Route53Provider {
    fn source_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn list_record_sets(
        &self,
        zone_id: &str,
        cursor: Option<&RecordCursor>,
    ) -> Result<RecordSetPage> {
        let mut params = Vec::new();
        if let Some(cursor) = cursor {
            params.push(("name".to_string(), cursor.record_name.clone()));
            params.push(("type".to_string(), cursor.record_type.clone()));
            if let Some(identifier) = &cursor.identifier {
                params.push(("identifier".to_string(), identifier.clone()));
            }
        }

        let path = format!("{}/hostedzone/{}/rrset", API_VERSION, bare_zone_id(zone_id));
        let response: ListResourceRecordSetsResponse = self
            .get(&path, &params, &format!("List record sets of {}", zone_id))
            .await?;
        Ok(response.into())
    }
}

/// Factory for creating Route53 providers
pub struct Route53Factory;

impl DnsProviderFactory for Route53Factory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        match config {
            ProviderConfig::Route53 {
                access_key_id,
                secret_access_key,
                session_token,
            } => {
                let client = Arc::new(ReqwestHttpClient::new()?);
                let credentials = Credentials {
                    access_key_id: access_key_id.clone(),
                    secret_access_key: secret_access_key.clone(),
                    session_token: session_token.clone(),
                };
                Ok(Box::new(Route53Provider::new(credentials, client)?))
            }
            _ => Err(Error::config("Invalid config for Route53 provider")),
        }
    }
}

/// Register the Route53 provider with a registry
pub fn register(registry: &dns_exporter_core::ProviderRegistry) {
    registry.register_provider("route53", Box::new(Route53Factory));
}

#[cfg(test)]
mod tests {
    use super::*;
    use dns_exporter_core::records::RecordType;
    use dns_exporter_core::zone::Visibility;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Serves responses in order and records every request
    #[derive(Default)]
    struct QueuedHttp {
        responses: Mutex<VecDeque<HttpResponse>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl QueuedHttp {
        fn new(responses: Vec<(u16, &str)>) -> Self {
            Self {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .map(|(status, body)| HttpResponse {
                            status,
                            body: body.to_string(),
                        })
                        .collect(),
                ),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn urls(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.url.clone())
                .collect()
        }
    }

    #[async_trait]
    impl HttpClient for QueuedHttp {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| Error::http("no response queued"))
        }
    }

    fn credentials() -> Credentials {
        Credentials {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string(),
            session_token: None,
        }
    }

    fn provider(http: Arc<QueuedHttp>) -> Route53Provider {
        Route53Provider::new(credentials(), http).unwrap()
    }

    const ZONES_PAGE: &str = r#"<ListHostedZonesResponse>
  <HostedZones>
    <HostedZone>
      <Id>/hostedzone/ZPRIV</Id>
      <Name>internal.example.com.</Name>
      <Config><PrivateZone>true</PrivateZone></Config>
    </HostedZone>
  </HostedZones>
  <IsTruncated>true</IsTruncated>
  <NextMarker>ZNEXT</NextMarker>
</ListHostedZonesResponse>"#;

    const RECORDS_PAGE_1: &str = r#"<ListResourceRecordSetsResponse>
  <ResourceRecordSets>
    <ResourceRecordSet>
      <Name>example.com.</Name><Type>SOA</Type><TTL>900</TTL>
      <ResourceRecords><ResourceRecord><Value>ns-1.awsdns-00.com. awsdns-hostmaster.amazon.com. 7 7200 900 1209600 86400</Value></ResourceRecord></ResourceRecords>
    </ResourceRecordSet>
    <ResourceRecordSet>
      <Name>example.com.</Name><Type>A</Type><TTL>300</TTL>
      <ResourceRecords><ResourceRecord><Value>192.0.2.10</Value></ResourceRecord></ResourceRecords>
    </ResourceRecordSet>
  </ResourceRecordSets>
  <IsTruncated>true</IsTruncated>
  <NextRecordName>www.example.com.</NextRecordName>
  <NextRecordType>A</NextRecordType>
</ListResourceRecordSetsResponse>"#;

    const RECORDS_PAGE_2: &str = r#"<ListResourceRecordSetsResponse>
  <ResourceRecordSets>
    <ResourceRecordSet>
      <Name>www.example.com.</Name><Type>A</Type>
      <AliasTarget><DNSName>d111111abcdef8.cloudfront.net.</DNSName></AliasTarget>
    </ResourceRecordSet>
  </ResourceRecordSets>
  <IsTruncated>false</IsTruncated>
</ListResourceRecordSetsResponse>"#;

    #[tokio::test]
    async fn test_list_zones_signs_and_passes_marker() {
        let http = Arc::new(QueuedHttp::new(vec![(200, ZONES_PAGE), (200, ZONES_PAGE)]));
        let provider = provider(http.clone());

        let page = provider.list_zones(None).await.unwrap();
        assert_eq!(page.zones[0].visibility, Visibility::Private);
        assert_eq!(page.next_cursor.as_deref(), Some("ZNEXT"));

        provider.list_zones(Some("ZNEXT")).await.unwrap();

        assert_eq!(
            http.urls(),
            vec![
                "https://route53.amazonaws.com/2013-04-01/hostedzone".to_string(),
                "https://route53.amazonaws.com/2013-04-01/hostedzone?marker=ZNEXT".to_string(),
            ]
        );

        let requests = http.requests.lock().unwrap();
        let auth = requests[0].header_value("authorization").unwrap();
        assert!(auth.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/"));
        assert!(auth.contains("/us-east-1/route53/aws4_request"));
        assert!(requests[0].header_value("x-amz-date").is_some());
    }

    #[tokio::test]
    async fn test_fetch_zone_walks_record_pages() {
        let http = Arc::new(QueuedHttp::new(vec![(200, RECORDS_PAGE_1), (200, RECORDS_PAGE_2)]));
        let provider = provider(http.clone());

        let content = provider
            .fetch_zone(&Zone::public("example.com.", "/hostedzone/ZPUB"))
            .await
            .unwrap();

        assert_eq!(
            http.urls(),
            vec![
                "https://route53.amazonaws.com/2013-04-01/hostedzone/ZPUB/rrset".to_string(),
                "https://route53.amazonaws.com/2013-04-01/hostedzone/ZPUB/rrset?name=www.example.com.&type=A"
                    .to_string(),
            ]
        );

        let ZoneContent::Records(records) = content else {
            panic!("expected structured records");
        };
        assert!(records.soa().is_some());

        let a = records.section(RecordType::A);
        assert_eq!(a.len(), 2);
        assert!(a[1].is_alias);
        assert_eq!(a[1].ttl, 0);
        assert_eq!(a[1].values, vec!["d111111abcdef8.cloudfront.net."]);
    }

    #[tokio::test]
    async fn test_unsupported_record_type_fails_zone() {
        let page = r#"<ListResourceRecordSetsResponse>
  <ResourceRecordSets>
    <ResourceRecordSet>
      <Name>example.com.</Name><Type>DS</Type><TTL>300</TTL>
      <ResourceRecords><ResourceRecord><Value>1 13 2 ab</Value></ResourceRecord></ResourceRecords>
    </ResourceRecordSet>
  </ResourceRecordSets>
  <IsTruncated>false</IsTruncated>
</ListResourceRecordSetsResponse>"#;
        let http = Arc::new(QueuedHttp::new(vec![(200, page)]));

        let err = provider(http)
            .fetch_zone(&Zone::public("example.com.", "/hostedzone/ZPUB"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "not supported record type: DS");
    }

    #[tokio::test]
    async fn test_error_document_is_reported() {
        let body = r#"<ErrorResponse><Error><Type>Sender</Type><Code>AccessDenied</Code><Message>User is not authorized</Message></Error></ErrorResponse>"#;
        let http = Arc::new(QueuedHttp::new(vec![(403, body)]));

        let err = provider(http).list_zones(None).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Authentication failed"));
        assert!(message.contains("AccessDenied: User is not authorized"));
    }

    #[tokio::test]
    async fn test_throttling() {
        let body = r#"<ErrorResponse><Error><Code>Throttling</Code><Message>Rate exceeded</Message></Error></ErrorResponse>"#;
        let http = Arc::new(QueuedHttp::new(vec![(400, body)]));

        let err = provider(http).list_zones(None).await.unwrap_err();
        assert!(err.to_string().contains("Rate limit exceeded"));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let body = r#"<ListHostedZonesResponse>
  <HostedZones><HostedZone><Name>example.com.</Name></HostedZone></HostedZones>
</ListHostedZonesResponse>"#;
        let http = Arc::new(QueuedHttp::new(vec![(200, body)]));

        let err = provider(http).list_zones(None).await.unwrap_err();
        assert!(matches!(err, Error::Provider { .. }));
    }

    #[test]
    fn test_empty_credentials_rejected() {
        let http: Arc<dyn HttpClient> = Arc::new(QueuedHttp::default());
        let mut creds = credentials();
        creds.secret_access_key.clear();
        assert!(Route53Provider::new(creds, http).is_err());
    }

    #[test]
    fn test_secret_not_exposed_in_debug() {
        let provider = provider(Arc::new(QueuedHttp::default()));
        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("wJalrXUtnFEMI"));
        assert!(debug_str.contains("Route53Provider"));
    }

    #[test]
    fn test_registration() {
        let registry = dns_exporter_core::ProviderRegistry::new();
        register(&registry);
        assert!(registry.has_provider("route53"));
        assert!(provider(Arc::new(QueuedHttp::default())).separates_visibility());
    }
}
