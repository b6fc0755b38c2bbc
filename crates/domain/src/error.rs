//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A header name is invalid.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// An access token is empty.
    #[error("access token must not be empty")]
    EmptyToken,

    /// A settings value failed validation.
    #[error("invalid setting `{field}`: {reason}")]
    InvalidSetting {
        /// Dotted path of the offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl DomainError {
    /// Creates an `InvalidSetting` error.
    #[must_use]
    pub fn invalid_setting(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
