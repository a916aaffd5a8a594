// # HTTP Client Trait
//
// Raw request/response transport used by the provider crates. The reqwest
// implementation lives in `crate::http`; tests substitute canned responses.

use async_trait::async_trait;

/// An outgoing GET request
///
/// Both provider APIs are read through GETs only, so there is no method or
/// request body to carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Create a GET request without headers
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a header value by case-insensitive name
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A received response with its body fully read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for raw HTTP transports
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Send a request and read the whole response body
    ///
    /// Non-2xx statuses are returned as responses, not errors. Only
    /// transport failures produce `Error::Http`.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, crate::Error>;
}
