//! In-memory access token storage.
//!
//! The store holds only the current access token, never a history, and never
//! touches disk or network. Every operation is synchronous and may be called
//! at any time, including while a renewal is in flight.

use std::sync::Arc;

use parking_lot::RwLock;
use tether_domain::AccessToken;

/// Thread-safe holder of the current access token.
///
/// Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    current: Arc<RwLock<Option<AccessToken>>>,
}

impl TokenStore {
    /// Create an empty token store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `token`.
    #[must_use]
    pub fn with_token(token: AccessToken) -> Self {
        Self {
            current: Arc::new(RwLock::new(Some(token))),
        }
    }

    /// Returns the current token, if any.
    #[must_use]
    pub fn get(&self) -> Option<AccessToken> {
        self.current.read().clone()
    }

    /// Replaces the current token.
    pub fn set(&self, token: AccessToken) {
        *self.current.write() = Some(token);
    }

    /// Forgets the current token.
    pub fn clear(&self) {
        *self.current.write() = None;
    }

    /// Returns true if a token is held.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.current.read().is_some()
    }

    /// Returns true if the store currently holds exactly `token`.
    ///
    /// `None` matches an empty store.
    #[must_use]
    pub fn holds(&self, token: Option<&AccessToken>) -> bool {
        self.current.read().as_ref() == token
    }
}
