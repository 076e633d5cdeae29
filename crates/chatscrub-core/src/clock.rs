//! Time abstraction for testability.
//!
//! Search sessions measure elapsed time through the [`Clock`] trait so that
//! progress output can be tested without sleeping.
//!
//! # Example
//!
//! ```
//! use chatscrub_core::clock::{Clock, MockClock};
//! use std::time::Duration;
//!
//! let clock = MockClock::new();
//! let start = clock.now();
//! clock.advance(Duration::from_secs(75));
//! assert_eq!(clock.elapsed(start), Duration::from_secs(75));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Source of instants for elapsed-time reporting.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;

    /// Returns the elapsed time since the given instant.
    fn elapsed(&self, since: Instant) -> Duration {
        self.now().saturating_duration_since(since)
    }
}

/// System clock that uses real time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A mock clock that only moves when told to.
#[derive(Debug)]
pub struct MockClock {
    base: Instant,
    offset_nanos: AtomicU64,
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClock {
    /// Creates a new mock clock starting at the current time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset_nanos: AtomicU64::new(0),
        }
    }

    /// Creates a mock clock that can be shared between a session and a test.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Moves the clock forward.
    pub fn advance(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.offset_nanos.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Instant {
        self.as_ref().now()
    }
}

/// Formats a duration the way progress output shows it, e.g. `2m 5s`.
#[must_use]
pub fn format_minutes_seconds(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}m {}s", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_clock_only_moves_when_advanced() {
        let clock = MockClock::new();
        let start = clock.now();
        assert_eq!(clock.elapsed(start), Duration::ZERO);

        clock.advance(Duration::from_secs(10));
        clock.advance(Duration::from_secs(5));
        assert_eq!(clock.elapsed(start), Duration::from_secs(15));
        assert_eq!(clock.elapsed(clock.now()), Duration::ZERO);
    }

    #[test]
    fn test_shared_mock_clock() {
        let clock = MockClock::shared();
        let clock2 = Arc::clone(&clock);

        let start = clock.now();
        clock2.advance(Duration::from_secs(10));

        assert_eq!(clock.elapsed(start), Duration::from_secs(10));
    }

    #[test]
    fn test_format_minutes_seconds() {
        assert_eq!(format_minutes_seconds(Duration::from_secs(0)), "0m 0s");
        assert_eq!(format_minutes_seconds(Duration::from_secs(59)), "0m 59s");
        assert_eq!(format_minutes_seconds(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_minutes_seconds(Duration::from_millis(61_900)), "1m 1s");
    }
}
