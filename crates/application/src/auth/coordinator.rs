//! Single-flight refresh coordinator.
//!
//! When a call fails because its access token expired, the coordinator either
//! starts the one renewal exchange (the failing call becomes the *driver*) or
//! parks the call behind the renewal already in flight. When the renewal
//! settles, the queue is drained and the state returns to `Idle` in one locked
//! step, and every parked call is told how it ended. On success each call,
//! parked or driver, replays itself on its own task with the new token; on
//! failure the session is terminated once and every call is rejected.
//!
//! The queue lock is never held across an `.await`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tether_domain::{CoordinatorState, ResponseSpec, SessionEndReason};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{PendingCall, SessionTerminator, TokenStore};
use crate::error::{CallError, CallResult};
use crate::ports::TokenRenewer;

/// Re-sends a call through the dispatcher with whatever token is current.
#[async_trait]
pub trait Replayer: Send + Sync {
    /// Sends `call` again.
    async fn replay(&self, call: PendingCall) -> CallResult<ResponseSpec>;
}

/// How a renewal ended, as seen by a parked call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settlement {
    /// A new token is in the store; replay.
    Renewed,
    /// The session cannot continue.
    Ended(SessionEndReason),
}

/// A parked call's wake-up handle.
struct Waiter {
    call_id: Uuid,
    done: oneshot::Sender<Settlement>,
}

#[derive(Default)]
struct Queue {
    state: CoordinatorState,
    waiters: Vec<Waiter>,
}

enum Role {
    /// This call issues the renewal.
    Driver { epoch: u64 },
    /// A renewal is in flight; wait for its settlement.
    Waiter(oneshot::Receiver<Settlement>),
    /// The token was rotated after this call was sent; resend right away.
    Resend,
}

/// Owns the renewal state machine for one session.
pub struct RefreshCoordinator {
    renewer: Arc<dyn TokenRenewer>,
    terminator: Arc<SessionTerminator>,
    queue: Mutex<Queue>,
    renewals: AtomicU64,
}

impl RefreshCoordinator {
    /// Creates a coordinator renewing through `renewer`.
    pub fn new(renewer: Arc<dyn TokenRenewer>, terminator: Arc<SessionTerminator>) -> Self {
        Self {
            renewer,
            terminator,
            queue: Mutex::new(Queue::default()),
            renewals: AtomicU64::new(0),
        }
    }

    /// The token store renewals write to.
    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        self.terminator.tokens()
    }

    /// The terminator invoked when renewal fails.
    #[must_use]
    pub const fn terminator(&self) -> &Arc<SessionTerminator> {
        &self.terminator
    }

    /// Current renewal state.
    #[must_use]
    pub fn state(&self) -> CoordinatorState {
        self.queue.lock().state
    }

    /// Number of calls parked behind the in-flight renewal.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.lock().waiters.len()
    }

    /// Number of renewal exchanges issued so far.
    #[must_use]
    pub fn renewals_started(&self) -> u64 {
        self.renewals.load(Ordering::SeqCst)
    }

    /// Recovers a call that failed with an expired access token.
    ///
    /// Resolves with the outcome of the call's replay, or with
    /// `CallError::SessionEnded` if the session cannot be renewed. The replay
    /// always runs on the caller's own task.
    ///
    /// # Errors
    ///
    /// Returns the replay's error, or `SessionEnded` when renewal fails, when
    /// the session ended during renewal, or when `call` was already replayed.
    pub async fn recover<R>(&self, call: PendingCall, replayer: &R) -> CallResult<ResponseSpec>
    where
        R: Replayer + ?Sized,
    {
        if call.is_retried() {
            warn!(call_id = %call.id(), "replayed call rejected again; not re-queueing");
            self.terminator.terminate(SessionEndReason::ReplayRejected);
            return Err(CallError::session_ended(SessionEndReason::ReplayRejected));
        }

        loop {
            match self.enter(&call) {
                Role::Resend => {
                    // Not a replay after renewal: if the current token has
                    // expired as well, this call may still drive one renewal.
                    debug!(call_id = %call.id(), "token already rotated; resending");
                    return replayer.replay(call).await;
                }
                Role::Driver { epoch } => return self.drive(call, epoch, replayer).await,
                Role::Waiter(done) => match done.await {
                    Ok(Settlement::Renewed) => {
                        return replayer.replay(call.mark_retried()).await;
                    }
                    Ok(Settlement::Ended(reason)) => {
                        return Err(CallError::session_ended(reason));
                    }
                    // The driver was dropped before the renewal settled.
                    Err(_) => debug!(call_id = %call.id(), "renewal abandoned; re-entering"),
                },
            }
        }
    }

    /// The enqueue-vs-trigger decision, taken under the queue lock.
    fn enter(&self, call: &PendingCall) -> Role {
        let mut queue = self.queue.lock();
        match queue.state {
            CoordinatorState::Refreshing => {
                let (done, wait) = oneshot::channel();
                queue.waiters.push(Waiter {
                    call_id: call.id(),
                    done,
                });
                debug!(
                    call_id = %call.id(),
                    waiters = queue.waiters.len(),
                    "renewal in flight; call queued"
                );
                Role::Waiter(wait)
            }
            CoordinatorState::Idle => {
                let tokens = self.tokens();
                if tokens.is_present() && !tokens.holds(call.sent_with()) {
                    return Role::Resend;
                }
                queue.state = CoordinatorState::Refreshing;
                Role::Driver {
                    epoch: self.terminator.epoch(),
                }
            }
        }
    }

    async fn drive<R>(
        &self,
        call: PendingCall,
        epoch: u64,
        replayer: &R,
    ) -> CallResult<ResponseSpec>
    where
        R: Replayer + ?Sized,
    {
        let mut guard = RenewalGuard {
            queue: &self.queue,
            settled: false,
        };
        self.renewals.fetch_add(1, Ordering::SeqCst);
        info!(call_id = %call.id(), "access token expired; renewing");

        match self.renewer.renew().await {
            Ok(token) => {
                let preview = token.preview();
                if !self.terminator.commit_renewal(epoch, token) {
                    let waiters = guard.settle();
                    warn!(
                        waiters = waiters.len(),
                        "session ended during renewal; discarding renewed token"
                    );
                    return reject(waiters, SessionEndReason::SessionTerminated);
                }
                let waiters = guard.settle();
                info!(token = %preview, waiters = waiters.len(), "access token renewed");
                notify(waiters, Settlement::Renewed);
                replayer.replay(call.mark_retried()).await
            }
            Err(error) => {
                let waiters = guard.settle();
                warn!(%error, waiters = waiters.len(), "token renewal failed; ending session");
                self.terminator.terminate(SessionEndReason::RenewalFailed);
                reject(waiters, SessionEndReason::RenewalFailed)
            }
        }
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("state", &self.state())
            .field("queued", &self.queued())
            .field("renewals", &self.renewals_started())
            .finish_non_exhaustive()
    }
}

/// Wakes parked calls in queue order.
fn notify(waiters: Vec<Waiter>, settlement: Settlement) {
    for waiter in waiters {
        if waiter.done.send(settlement).is_err() {
            debug!(call_id = %waiter.call_id, "waiter went away before settlement");
        }
    }
}

fn reject(waiters: Vec<Waiter>, reason: SessionEndReason) -> CallResult<ResponseSpec> {
    notify(waiters, Settlement::Ended(reason));
    Err(CallError::session_ended(reason))
}

/// Returns the coordinator to `Idle` if the driver is dropped mid-renewal.
///
/// Dropping the drained waiters closes their channels, so each one re-enters
/// recovery instead of waiting forever. Once the renewal has settled the
/// guard does nothing: parked calls were already woken and replay on their
/// own tasks.
struct RenewalGuard<'a> {
    queue: &'a Mutex<Queue>,
    settled: bool,
}

impl RenewalGuard<'_> {
    fn settle(&mut self) -> Vec<Waiter> {
        self.settled = true;
        let mut queue = self.queue.lock();
        queue.state = CoordinatorState::Idle;
        std::mem::take(&mut queue.waiters)
    }
}

impl Drop for RenewalGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let abandoned = self.settle();
            warn!(waiters = abandoned.len(), "renewal driver dropped before settling");
        }
    }
}
