//! Clock abstraction for deterministic cache expiry.

use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// Injected wherever expiry decisions are made so tests can drive time
/// explicitly instead of sleeping.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
