//! Pending call value.

use std::sync::Arc;

use tether_domain::{AccessToken, RequestSpec};
use uuid::Uuid;

/// One outbound call as tracked by the session layer.
///
/// The value is immutable: marking it as retried or recording the token it
/// was sent with yields a new value, so the same `RequestSpec` can be reused
/// by other callers without sharing a retry flag.
#[derive(Debug, Clone)]
pub struct PendingCall {
    id: Uuid,
    request: Arc<RequestSpec>,
    retried: bool,
    sent_with: Option<AccessToken>,
}

impl PendingCall {
    /// Wraps a request that has not been sent yet.
    #[must_use]
    pub fn new(request: RequestSpec) -> Self {
        Self {
            id: Uuid::now_v7(),
            request: Arc::new(request),
            retried: false,
            sent_with: None,
        }
    }

    /// Identifier used in log fields.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// The original request description.
    #[must_use]
    pub fn request(&self) -> &RequestSpec {
        &self.request
    }

    /// Returns true once the call has been replayed.
    #[must_use]
    pub const fn is_retried(&self) -> bool {
        self.retried
    }

    /// The access token attached on the last send, if any.
    #[must_use]
    pub const fn sent_with(&self) -> Option<&AccessToken> {
        self.sent_with.as_ref()
    }

    /// Returns the replay copy of this call. The marker never goes back to unset.
    #[must_use]
    pub fn mark_retried(self) -> Self {
        Self {
            retried: true,
            ..self
        }
    }

    /// Records the token the call is about to be sent with.
    #[must_use]
    pub fn with_sent_token(self, token: Option<AccessToken>) -> Self {
        Self {
            sent_with: token,
            ..self
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mark_retried_keeps_identity() {
        let call = PendingCall::new(RequestSpec::get("https://api.example.com/repos"));
        let id = call.id();
        assert!(!call.is_retried());

        let replay = call.clone().mark_retried();
        assert!(replay.is_retried());
        assert_eq!(replay.id(), id);
        assert_eq!(replay.request(), call.request());
        assert!(!call.is_retried());

        assert!(replay.mark_retried().is_retried());
    }

    #[test]
    fn test_sent_token_is_recorded() {
        let token = AccessToken::new("t1").unwrap();
        let call = PendingCall::new(RequestSpec::get("https://api.example.com/"))
            .with_sent_token(Some(token.clone()));
        assert_eq!(call.sent_with(), Some(&token));
        assert_eq!(call.with_sent_token(None).sent_with(), None);
    }
}
