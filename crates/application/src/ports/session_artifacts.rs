//! Session artifacts port

/// A locally cached piece of session state (user profile, preferences
/// fetched after sign-in, ...) that must not outlive the session.
pub trait SessionArtifacts: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Drops everything this store holds. Must be idempotent.
    fn clear(&self);
}
