//! Response classification.

use tether_domain::{AuthSignalSettings, ResponseSpec, SessionEndReason};

use crate::error::CallError;

/// What the dispatcher does with a finished attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 2xx: hand the response to the caller.
    Success(ResponseSpec),
    /// Access token expired on a first attempt: hand the call to the coordinator.
    RecoverableAuthFailure,
    /// No recovery path: terminate the session and reject the call.
    TerminalAuthFailure(SessionEndReason),
    /// Anything else: return to the caller unchanged.
    OrdinaryError(CallError),
}

/// Maps responses to outcomes using the configured auth signals.
#[derive(Debug, Clone, Default)]
pub struct SignalClassifier {
    signals: AuthSignalSettings,
}

impl SignalClassifier {
    /// Creates a classifier for the given signals.
    #[must_use]
    pub const fn new(signals: AuthSignalSettings) -> Self {
        Self { signals }
    }

    /// Classifies a response. `retried` is the call's retry marker.
    #[must_use]
    pub fn classify(&self, response: ResponseSpec, retried: bool) -> Outcome {
        if response.is_success() {
            return Outcome::Success(response);
        }

        if response.status == self.signals.status
            && let Some(code) = response.json_str_field(&self.signals.code_field)
        {
            if code == self.signals.access_token_expired {
                return if retried {
                    Outcome::TerminalAuthFailure(SessionEndReason::ReplayRejected)
                } else {
                    Outcome::RecoverableAuthFailure
                };
            }
            if self.signals.refresh_token_expired.contains(&code) {
                return Outcome::TerminalAuthFailure(SessionEndReason::RefreshTokenExpired);
            }
        }

        Outcome::OrdinaryError(CallError::Status {
            status: response.status,
            body: response.body,
        })
    }
}
