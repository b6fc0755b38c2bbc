//! Token renewal over HTTP.
//!
//! Posts an empty body to the renewal endpoint. The refresh credential is an
//! HTTP-only cookie already held by the shared client's cookie store; no
//! `Authorization` header is sent.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tether_application::{RenewalError, TokenRenewer};
use tether_domain::{AccessToken, ClientSettings, DomainError};
use tracing::{debug, warn};

/// Successful renewal response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(alias = "accessToken")]
    access_token: String,
}

/// Error body returned by the renewal endpoint. Providers disagree on field
/// names, so every common one is accepted.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TokenErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
    code: Option<String>,
    message: Option<String>,
}

impl TokenErrorResponse {
    fn describe(self) -> Option<String> {
        self.error_description
            .or(self.message)
            .or(self.error)
            .or(self.code)
    }
}

/// `TokenRenewer` backed by the API's renewal endpoint.
#[derive(Debug, Clone)]
pub struct HttpTokenRenewer {
    client: Client,
    refresh_url: Url,
    timeout: Duration,
}

impl HttpTokenRenewer {
    /// Creates a renewer posting to `refresh_url` through `client`.
    #[must_use]
    pub const fn new(client: Client, refresh_url: Url, timeout: Duration) -> Self {
        Self {
            client,
            refresh_url,
            timeout,
        }
    }

    /// Creates a renewer for the endpoint configured in `settings`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUrl` if the renewal URL cannot be resolved.
    pub fn from_settings(client: Client, settings: &ClientSettings) -> Result<Self, DomainError> {
        let url = settings.refresh_url()?;
        let refresh_url =
            Url::parse(&url).map_err(|e| DomainError::InvalidUrl(format!("{e}: {url}")))?;
        Ok(Self::new(
            client,
            refresh_url,
            Duration::from_millis(settings.timeout_ms),
        ))
    }

    /// The endpoint this renewer posts to.
    #[must_use]
    pub const fn refresh_url(&self) -> &Url {
        &self.refresh_url
    }
}

#[async_trait]
impl TokenRenewer for HttpTokenRenewer {
    async fn renew(&self) -> Result<AccessToken, RenewalError> {
        debug!(url = %self.refresh_url, "requesting token renewal");

        let response = self
            .client
            .post(self.refresh_url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| RenewalError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RenewalError::Network(format!("failed to read renewal response: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<TokenErrorResponse>(&text)
                .ok()
                .and_then(TokenErrorResponse::describe)
                .unwrap_or(text);
            warn!(status = status.as_u16(), %message, "renewal rejected");
            return Err(RenewalError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let token_response: TokenResponse = serde_json::from_str(&text)
            .map_err(|e| RenewalError::MalformedResponse(e.to_string()))?;
        AccessToken::new(token_response.access_token)
            .map_err(|e| RenewalError::MalformedResponse(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::adapters::build_client;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn renewer(server: &MockServer) -> HttpTokenRenewer {
        let settings = ClientSettings {
            base_url: server.uri(),
            ..ClientSettings::default()
        };
        HttpTokenRenewer::from_settings(build_client(&settings).unwrap(), &settings).unwrap()
    }

    #[tokio::test]
    async fn test_renewal_returns_new_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .and(body_string(""))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"access_token":"t2","expires_in":900}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let token = renewer(&server).renew().await.unwrap();
        assert_eq!(token.expose(), "t2");
    }

    #[tokio::test]
    async fn test_camel_case_token_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"accessToken":"t3"}"#))
            .mount(&server)
            .await;

        assert_eq!(renewer(&server).renew().await.unwrap().expose(), "t3");
    }

    #[tokio::test]
    async fn test_refresh_cookie_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(204)
                    .insert_header("set-cookie", "refresh=r1; Path=/; HttpOnly"),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .and(header("cookie", "refresh=r1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"access_token":"t2"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let renewer = renewer(&server);
        renewer
            .client
            .post(format!("{}/login", server.uri()))
            .send()
            .await
            .unwrap();

        assert_eq!(renewer.renew().await.unwrap().expose(), "t2");
    }

    #[tokio::test]
    async fn test_rejection_carries_provider_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string(
                r#"{"code":"REFRESH_TOKEN_EXPIRED","message":"refresh token expired"}"#,
            ))
            .mount(&server)
            .await;

        let error = renewer(&server).renew().await.unwrap_err();
        assert_eq!(
            error,
            RenewalError::Rejected {
                status: 401,
                message: "refresh token expired".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_rejection_with_plain_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let error = renewer(&server).renew().await.unwrap_err();
        assert_eq!(
            error,
            RenewalError::Rejected {
                status: 503,
                message: "maintenance".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"token":"t2"}"#))
            .mount(&server)
            .await;

        let error = renewer(&server).renew().await.unwrap_err();
        assert!(matches!(error, RenewalError::MalformedResponse(_)));

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"access_token":"  "}"#))
            .mount(&server)
            .await;

        let error = renewer(&server).renew().await.unwrap_err();
        assert!(matches!(error, RenewalError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_a_network_error() {
        let settings = ClientSettings {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_ms: 1_000,
            ..ClientSettings::default()
        };
        let renewer =
            HttpTokenRenewer::from_settings(build_client(&settings).unwrap(), &settings).unwrap();

        let error = renewer.renew().await.unwrap_err();
        assert!(matches!(error, RenewalError::Network(_)));
    }
}
