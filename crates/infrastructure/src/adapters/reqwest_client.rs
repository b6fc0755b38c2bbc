//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! The underlying `reqwest::Client` keeps a cookie store, which is where the
//! ambient refresh credential lives; the same client is shared with the
//! renewal adapter so both see the same cookies.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use tether_application::{HttpClient, HttpClientError};
use tether_domain::{ClientSettings, Header, Headers, HttpMethod, RequestSpec, ResponseSpec};
use tracing::trace;

const MAX_REDIRECTS: usize = 10;

/// Builds the shared reqwest client for a session.
///
/// Configuration:
/// - Cookie store: enabled (carries the refresh credential)
/// - Follow redirects: up to 10
/// - User-Agent: from settings
///
/// # Errors
///
/// Returns an error if the client cannot be created.
pub fn build_client(settings: &ClientSettings) -> Result<Client, HttpClientError> {
    Client::builder()
        .user_agent(settings.user_agent.as_str())
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()
        .map_err(|e| HttpClientError::Other(e.to_string()))
}

/// HTTP client implementation using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
    default_timeout_ms: u64,
}

impl ReqwestHttpClient {
    /// Creates a client configured from `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(settings: &ClientSettings) -> Result<Self, HttpClientError> {
        Ok(Self::with_client(build_client(settings)?, settings.timeout_ms))
    }

    /// Wraps an existing reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, default_timeout_ms: u64) -> Self {
        Self {
            client,
            default_timeout_ms,
        }
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Maps reqwest errors to `HttpClientError`.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout { timeout_ms };
        }

        if error.is_connect() {
            let message = error.to_string();
            let lower = message.to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") {
                return HttpClientError::DnsError {
                    host: error
                        .url()
                        .and_then(Url::host_str)
                        .unwrap_or("unknown")
                        .to_string(),
                    message,
                };
            }
            return HttpClientError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return HttpClientError::Other(format!("more than {MAX_REDIRECTS} redirects"));
        }

        HttpClientError::Other(error.to_string())
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, HttpClientError> {
        let url = Url::parse(&request.url)
            .map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {}", request.url)))?;
        let timeout_ms = request.timeout_ms.unwrap_or(self.default_timeout_ms);

        let start = Instant::now();

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url)
            .timeout(Duration::from_millis(timeout_ms));
        for header in request.headers.iter() {
            builder = builder.header(&header.name, &header.value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, timeout_ms))?;

        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .map(|(k, v)| Header::new(k.as_str(), v.to_str().unwrap_or("<binary>")))
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| HttpClientError::Body(e.to_string()))?;
        let duration = start.elapsed();

        trace!(status, elapsed = ?duration, "response received");

        Ok(ResponseSpec {
            status,
            headers,
            body,
            duration,
        })
    }
}
