//! In-memory session artifact store.

use std::collections::HashMap;

use parking_lot::RwLock;
use tether_application::SessionArtifacts;
use tracing::debug;

/// Session-scoped key/value cache (user profile, feature flags, ...).
///
/// Everything in it is dropped when the session ends.
#[derive(Debug)]
pub struct MemoryArtifacts {
    name: String,
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryArtifacts {
    /// Creates an empty store.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Stores a value, replacing any previous one.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.write().insert(key.into(), value.into());
    }

    /// Returns a copy of the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl SessionArtifacts for MemoryArtifacts {
    fn name(&self) -> &str {
        &self.name
    }

    fn clear(&self) {
        let mut entries = self.entries.write();
        debug!(store = %self.name, entries = entries.len(), "clearing session artifacts");
        entries.clear();
    }
}
