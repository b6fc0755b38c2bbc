//! Request dispatcher.
//!
//! Every outbound call goes through [`RequestDispatcher::send`]: the current
//! access token is attached, the call is sent through the `HttpClient` port,
//! and the response is classified. Expired access tokens are handed to the
//! refresh coordinator; refresh-credential failures go straight to the
//! session terminator, whatever the coordinator is doing.

mod classify;

use std::sync::Arc;

use async_trait::async_trait;
use tether_domain::{AccessToken, Header, RequestSpec, ResponseSpec, SessionEndReason};
use tracing::{debug, warn};

pub use classify::{Outcome, SignalClassifier};

use crate::auth::{PendingCall, RefreshCoordinator, Replayer, SessionTerminator, TokenStore};
use crate::error::{CallError, CallResult};
use crate::ports::HttpClient;

/// Entry point for authenticated outbound calls.
///
/// Cloning is cheap; clones share the token store and coordinator.
#[derive(Clone)]
pub struct RequestDispatcher {
    client: Arc<dyn HttpClient>,
    coordinator: Arc<RefreshCoordinator>,
    classifier: SignalClassifier,
}

impl RequestDispatcher {
    /// Creates a dispatcher sending through `client`.
    pub fn new(
        client: Arc<dyn HttpClient>,
        coordinator: Arc<RefreshCoordinator>,
        classifier: SignalClassifier,
    ) -> Self {
        Self {
            client,
            coordinator,
            classifier,
        }
    }

    /// The session's token store.
    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        self.coordinator.tokens()
    }

    /// The refresh coordinator.
    #[must_use]
    pub const fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    /// The session terminator.
    #[must_use]
    pub fn terminator(&self) -> &Arc<SessionTerminator> {
        self.coordinator.terminator()
    }

    /// Starts a session with a token issued by the identity provider.
    pub fn sign_in(&self, token: AccessToken) {
        self.terminator().begin(token);
    }

    /// Ends the session on the user's request.
    pub fn sign_out(&self) {
        self.terminator().terminate(SessionEndReason::SignedOut);
    }

    /// Sends a request with the current access token attached.
    ///
    /// An expired access token is renewed transparently; the caller only sees
    /// the outcome of the replayed call.
    ///
    /// # Errors
    ///
    /// Returns `CallError::SessionEnded` when the session cannot continue, and
    /// ordinary errors (`InvalidRequest`, `Transport`, `Status`) unchanged.
    pub async fn send(&self, request: RequestSpec) -> CallResult<ResponseSpec> {
        request.validate()?;
        self.dispatch(PendingCall::new(request)).await
    }

    async fn dispatch(&self, call: PendingCall) -> CallResult<ResponseSpec> {
        let (call, outcome) = self.attempt(call).await;
        match outcome {
            Outcome::Success(response) => Ok(response),
            Outcome::OrdinaryError(error) => {
                debug!(call_id = %call.id(), %error, "call failed");
                Err(error)
            }
            Outcome::TerminalAuthFailure(reason) => {
                warn!(call_id = %call.id(), reason = reason.as_str(), "terminal auth failure");
                self.terminator().terminate(reason);
                Err(CallError::session_ended(reason))
            }
            Outcome::RecoverableAuthFailure => self.coordinator.recover(call, self).await,
        }
    }

    /// Sends the call once and classifies the result.
    async fn attempt(&self, call: PendingCall) -> (PendingCall, Outcome) {
        let token = self.tokens().get();
        let mut request = call.request().clone();
        if let Some(token) = &token {
            request
                .headers
                .set(Header::new("Authorization", token.bearer_header()));
        }
        let call = call.with_sent_token(token);

        debug!(
            call_id = %call.id(),
            method = %request.method,
            url = %request.url,
            retried = call.is_retried(),
            "dispatching"
        );

        let outcome = match self.client.execute(&request).await {
            Ok(response) => self.classifier.classify(response, call.is_retried()),
            Err(error) => Outcome::OrdinaryError(error.into()),
        };
        (call, outcome)
    }
}

#[async_trait]
impl Replayer for RequestDispatcher {
    async fn replay(&self, call: PendingCall) -> CallResult<ResponseSpec> {
        self.dispatch(call).await
    }
}

impl std::fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("coordinator", &self.coordinator)
            .field("classifier", &self.classifier)
            .finish_non_exhaustive()
    }
}
