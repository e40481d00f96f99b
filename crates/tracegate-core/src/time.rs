//! Clock capability for replay result timestamps.
//!
//! The only place "now" matters in the core is the `generated_at_ms` stamp
//! on replay results. Time-dependent operations take an injected clock
//! rather than reading system time directly, so tests run against a fixed
//! instant and replay runs are reproducible.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Trait for clock implementations.
pub trait Clock: Send + Sync {
    /// Returns the current Unix timestamp in milliseconds.
    fn now_ms(&self) -> u64;
}

/// System clock that uses the real system time.
///
/// This is the default clock for production use.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Fixed clock for testing that returns a constant timestamp.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    /// The fixed timestamp to return, in milliseconds.
    pub timestamp_ms: u64,
}

impl FixedClock {
    /// Creates a new fixed clock with the given millisecond timestamp.
    #[must_use]
    pub const fn new(timestamp_ms: u64) -> Self {
        Self { timestamp_ms }
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> u64 {
        self.timestamp_ms
    }
}
