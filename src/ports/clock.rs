//! Clock port.

use chrono::{DateTime, Utc};

/// Source of wall-clock time for rollout records.
///
/// Replayed sessions substitute the recorded instant so that persisted
/// records are byte-for-byte reproducible.
pub trait Clock: Send + Sync {
    /// Current UTC time.
    fn now(&self) -> DateTime<Utc>;
}
