//! Clock port

use chrono::{DateTime, Utc};

/// Source of wall-clock time for termination records.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;
}
