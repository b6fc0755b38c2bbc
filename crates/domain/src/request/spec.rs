//! Request specification type

use serde::{Deserialize, Serialize};
use url::Url;

use super::{Header, Headers, HttpMethod};
use crate::error::{DomainError, DomainResult};

/// Everything needed to send, and later replay, one outbound call.
///
/// The spec never carries the access token: the dispatcher attaches the
/// current token at send time, so a replay picks up a renewed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSpec {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute target URL
    pub url: String,
    /// HTTP headers
    #[serde(default)]
    pub headers: Headers,
    /// Optional request body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Per-request timeout override in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl RequestSpec {
    /// Creates a request with the given method and URL.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            body: None,
            timeout_ms: None,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(Header::new(name, value));
        self
    }

    /// Sets a JSON body and the matching content type.
    #[must_use]
    pub fn with_json_body(mut self, body: impl Into<String>) -> Self {
        self.headers
            .set(Header::new("Content-Type", "application/json"));
        self.body = Some(body.into());
        self
    }

    /// Sets the timeout override.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Checks the URL and returns its parsed form.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUrl` if the URL is empty, malformed,
    /// or not http/https.
    pub fn validate(&self) -> DomainResult<Url> {
        if self.url.trim().is_empty() {
            return Err(DomainError::InvalidUrl("URL is required".to_string()));
        }
        let url = Url::parse(&self.url)
            .map_err(|e| DomainError::InvalidUrl(format!("{e}: {}", self.url)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(DomainError::InvalidUrl(format!(
                "unsupported scheme `{other}`"
            ))),
        }
    }
}
