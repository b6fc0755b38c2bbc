//! Token renewal port
//!
//! The renewal exchange is invoked with no caller-supplied token: the refresh
//! credential is ambient in the transport (a cookie jar) and never passes
//! through this layer.

use async_trait::async_trait;
use thiserror::Error;
use tether_domain::AccessToken;

/// Failure of the renewal exchange. Every variant ends the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenewalError {
    /// The identity provider rejected the refresh credential.
    #[error("refresh rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status of the renewal response.
        status: u16,
        /// Error description from the provider.
        message: String,
    },

    /// The renewal call did not reach the provider.
    #[error("renewal network error: {0}")]
    Network(String),

    /// The provider answered 2xx without a usable token.
    #[error("malformed renewal response: {0}")]
    MalformedResponse(String),
}

/// Port for the single renewal endpoint.
#[async_trait]
pub trait TokenRenewer: Send + Sync {
    /// Exchanges the ambient refresh credential for a new access token.
    ///
    /// # Errors
    ///
    /// Returns a `RenewalError` if the exchange fails for any reason.
    async fn renew(&self) -> Result<AccessToken, RenewalError>;
}
