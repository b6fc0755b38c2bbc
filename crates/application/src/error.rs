//! Application error types

use thiserror::Error;
use tether_domain::{DomainError, SessionEndReason};

use crate::ports::HttpClientError;

/// Error surfaced to the caller of an outbound call.
///
/// Only two families ever reach a caller: ordinary errors (transport, status,
/// invalid request), which this layer never retries, and `SessionEnded`, after
/// which the shell has already been sent to the re-authentication entry point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] DomainError),

    /// The transport failed before a response was received.
    #[error("{0}")]
    Transport(#[from] HttpClientError),

    /// The server answered with a non-success status unrelated to auth.
    #[error("request failed with status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The session is over; the user must re-authenticate.
    #[error("session ended: {reason}")]
    SessionEnded {
        /// Why the session ended.
        reason: SessionEndReason,
    },
}

impl CallError {
    /// Creates a `SessionEnded` error.
    #[must_use]
    pub const fn session_ended(reason: SessionEndReason) -> Self {
        Self::SessionEnded { reason }
    }

    /// Returns true if the caller should send the user to re-authenticate
    /// rather than retry later.
    #[must_use]
    pub const fn is_session_ended(&self) -> bool {
        matches!(self, Self::SessionEnded { .. })
    }

    /// Returns the end reason for `SessionEnded` errors.
    #[must_use]
    pub const fn end_reason(&self) -> Option<SessionEndReason> {
        match self {
            Self::SessionEnded { reason } => Some(*reason),
            _ => None,
        }
    }
}

/// Result type alias for outbound calls.
pub type CallResult<T> = Result<T, CallError>;
