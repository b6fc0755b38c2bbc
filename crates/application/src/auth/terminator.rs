//! Session terminator.
//!
//! Ends the session destructively and unconditionally: clears the token store
//! and every registered artifact store, then asks the shell to navigate to the
//! re-authentication entry point. The terminator also owns the session epoch,
//! a counter bumped on every sign-in and every termination, which lets a
//! renewal that settles late detect that its session is gone.

use std::sync::Arc;

use parking_lot::Mutex;
use tether_domain::{AccessToken, NavigationRequest, SessionEndReason};
use tracing::{debug, info, warn};

use super::TokenStore;
use crate::ports::{Clock, Navigator, SessionArtifacts};

#[derive(Debug, Default)]
struct SessionLife {
    ended: bool,
    epoch: u64,
    last: Option<NavigationRequest>,
}

/// Ends sessions and tracks the session epoch.
pub struct SessionTerminator {
    tokens: TokenStore,
    artifacts: Vec<Arc<dyn SessionArtifacts>>,
    navigator: Arc<dyn Navigator>,
    clock: Arc<dyn Clock>,
    entry_point: String,
    life: Mutex<SessionLife>,
}

impl SessionTerminator {
    /// Creates a terminator for the session whose token lives in `tokens`.
    pub fn new(
        tokens: TokenStore,
        navigator: Arc<dyn Navigator>,
        clock: Arc<dyn Clock>,
        entry_point: impl Into<String>,
    ) -> Self {
        Self {
            tokens,
            artifacts: Vec::new(),
            navigator,
            clock,
            entry_point: entry_point.into(),
            life: Mutex::new(SessionLife::default()),
        }
    }

    /// Registers another store to clear on termination.
    #[must_use]
    pub fn with_artifacts(mut self, artifacts: Arc<dyn SessionArtifacts>) -> Self {
        self.artifacts.push(artifacts);
        self
    }

    /// The token store this terminator clears.
    #[must_use]
    pub const fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Starts a new session with a freshly issued token and re-arms termination.
    pub fn begin(&self, token: AccessToken) {
        let mut life = self.life.lock();
        life.ended = false;
        life.epoch += 1;
        self.tokens.set(token);
        info!(epoch = life.epoch, "session started");
    }

    /// Ends the session.
    ///
    /// Returns `true` if this call ended the session, `false` if it had already
    /// ended; in that case the stores are cleared again but the shell is not
    /// asked to navigate a second time.
    pub fn terminate(&self, reason: SessionEndReason) -> bool {
        let request = {
            let mut life = self.life.lock();
            self.tokens.clear();
            for artifacts in &self.artifacts {
                artifacts.clear();
            }

            if life.ended {
                debug!(reason = reason.as_str(), "session already ended");
                return false;
            }

            life.ended = true;
            life.epoch += 1;
            let request =
                NavigationRequest::new(self.entry_point.clone(), reason, self.clock.now());
            life.last = Some(request.clone());
            request
        };

        warn!(
            reason = reason.as_str(),
            target = %request.target,
            "session terminated"
        );
        self.navigator.navigate(request);
        true
    }

    /// Stores a renewed token unless the session changed since `epoch`.
    ///
    /// Returns `false` (and leaves the store untouched) when the session was
    /// terminated or restarted while the renewal was in flight.
    pub fn commit_renewal(&self, epoch: u64, token: AccessToken) -> bool {
        let life = self.life.lock();
        if life.epoch != epoch || life.ended {
            return false;
        }
        self.tokens.set(token);
        true
    }

    /// Current session epoch.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.life.lock().epoch
    }

    /// Returns true once the session has been terminated and not restarted.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.life.lock().ended
    }

    /// The navigation issued by the last termination.
    #[must_use]
    pub fn last_termination(&self) -> Option<NavigationRequest> {
        self.life.lock().last.clone()
    }
}

impl std::fmt::Debug for SessionTerminator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTerminator")
            .field("entry_point", &self.entry_point)
            .field("artifacts", &self.artifacts.len())
            .field("life", &*self.life.lock())
            .finish_non_exhaustive()
    }
}
