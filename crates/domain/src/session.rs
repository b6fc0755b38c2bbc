//! Session lifecycle types.
//!
//! This module defines the renewal state machine flag and the vocabulary used
//! when a session ends, so the shell can tell "re-authenticate" apart from
//! "retry later".

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Renewal state of the refresh coordinator.
///
/// `Refreshing` means exactly one renewal call is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorState {
    /// No renewal in progress.
    #[default]
    Idle,
    /// One renewal call outstanding.
    Refreshing,
}

impl CoordinatorState {
    /// Returns true while a renewal is in flight.
    #[must_use]
    pub const fn is_refreshing(self) -> bool {
        matches!(self, Self::Refreshing)
    }

    /// Get a user-friendly message.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Idle => "Session token is current",
            Self::Refreshing => "Renewing session token...",
        }
    }
}

/// Why a session (or a single call) ended in the terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEndReason {
    /// The server reported the refresh credential as expired or invalid.
    RefreshTokenExpired,
    /// The renewal exchange itself failed.
    RenewalFailed,
    /// A replayed call was rejected again despite carrying a fresh token.
    ReplayRejected,
    /// The session was terminated while this call's renewal was pending.
    SessionTerminated,
    /// The user signed out.
    SignedOut,
}

impl SessionEndReason {
    /// Returns a stable identifier for logs and serialized events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RefreshTokenExpired => "refresh_token_expired",
            Self::RenewalFailed => "renewal_failed",
            Self::ReplayRejected => "replay_rejected",
            Self::SessionTerminated => "session_terminated",
            Self::SignedOut => "signed_out",
        }
    }
}

impl fmt::Display for SessionEndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::RefreshTokenExpired => "refresh credential expired",
            Self::RenewalFailed => "token renewal failed",
            Self::ReplayRejected => "renewed token was rejected",
            Self::SessionTerminated => "session was terminated",
            Self::SignedOut => "signed out",
        };
        f.write_str(text)
    }
}

/// Instruction for the application shell to leave every authenticated view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationRequest {
    /// The re-authentication entry point (e.g. `/login`).
    pub target: String,
    /// Why the session ended.
    pub reason: SessionEndReason,
    /// When the session ended.
    pub at: DateTime<Utc>,
}

impl NavigationRequest {
    /// Creates a navigation request.
    #[must_use]
    pub fn new(target: impl Into<String>, reason: SessionEndReason, at: DateTime<Utc>) -> Self {
        Self {
            target: target.into(),
            reason,
            at,
        }
    }
}
