//! Clock abstraction for timestamp injection.

use chrono::{DateTime, Utc};

/// Provides the current time.
///
/// Injected into [`ChatsManager`](crate::chat::ChatsManager) so tests can
/// supply deterministic timestamps instead of depending on wall-clock time.
pub trait Clock: Send + Sync {
    /// Returns the current moment in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
