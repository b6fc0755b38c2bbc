//! Navigator adapter backed by a watch channel.
//!
//! The application shell subscribes and reacts to the latest navigation
//! request; intermediate values may be skipped, which is fine because each
//! request means the same thing (leave the session).

use tether_application::Navigator;
use tether_domain::NavigationRequest;
use tokio::sync::watch;
use tracing::info;

/// Publishes navigation requests to subscribers.
#[derive(Debug)]
pub struct WatchNavigator {
    sender: watch::Sender<Option<NavigationRequest>>,
}

impl WatchNavigator {
    /// Creates a navigator with no pending request.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    /// Subscribes to navigation requests.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<NavigationRequest>> {
        self.sender.subscribe()
    }

    /// The most recent navigation request, if any.
    #[must_use]
    pub fn latest(&self) -> Option<NavigationRequest> {
        self.sender.borrow().clone()
    }
}

impl Default for WatchNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for WatchNavigator {
    fn navigate(&self, request: NavigationRequest) {
        info!(target_path = %request.target, reason = request.reason.as_str(), "navigating");
        self.sender.send_replace(Some(request));
    }
}
