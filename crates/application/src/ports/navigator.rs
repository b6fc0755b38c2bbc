//! Navigation port

use tether_domain::NavigationRequest;

/// The application shell's navigation primitive.
///
/// Receiving a request means: leave every authenticated view and show the
/// re-authentication entry point. No confirmation, no retry.
pub trait Navigator: Send + Sync {
    /// Moves the execution context to `request.target`.
    fn navigate(&self, request: NavigationRequest);
}
