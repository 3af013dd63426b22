// Time sources for the ledger
//
// The ledger never reads the wall clock directly: every time-dependent
// decision (lock release, lazy expiry) goes through a `Clock` so that the
// embedding host decides what "now" means. `SystemClock` is meant for
// tooling, `ManualClock` for deterministic replays and tests.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

// Seconds timestamps used to determine it using its type
pub type TimestampSeconds = u64;

/// Oracle for the current time in seconds
pub trait Clock {
    fn now(&self) -> TimestampSeconds;
}

#[inline]
pub fn get_current_time() -> Duration {
    // A clock set before 1970 is reported as the epoch itself
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

// Return timestamp in seconds
pub fn get_current_time_in_seconds() -> TimestampSeconds {
    get_current_time().as_secs()
}

/// Wall clock backed oracle
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> TimestampSeconds {
        get_current_time_in_seconds()
    }
}

/// Manually driven clock
///
/// Cloned handles share the same instant, so a test can keep one handle
/// and move time forward while the ledger owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: TimestampSeconds) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start)),
        }
    }

    pub fn set(&self, timestamp: TimestampSeconds) {
        self.now.store(timestamp, Ordering::SeqCst);
    }

    /// Move forward by `seconds`, saturating at `u64::MAX`
    pub fn advance(&self, seconds: u64) -> TimestampSeconds {
        let update = |now: TimestampSeconds| Some(now.saturating_add(seconds));
        match self.now.fetch_update(Ordering::SeqCst, Ordering::SeqCst, update) {
            Ok(previous) | Err(previous) => previous.saturating_add(seconds),
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> TimestampSeconds {
        self.now.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> TimestampSeconds {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(1_000);
        let handle = clock.clone();
        assert_eq!(handle.advance(500), 1_500);
        assert_eq!(clock.now(), 1_500);
        clock.set(10);
        assert_eq!(handle.now(), 10);
    }

    #[test]
    fn test_manual_clock_advance_saturates() {
        let clock = ManualClock::new(1_700_000_000);
        let reported = clock.advance(u64::MAX);
        assert_eq!(reported, u64::MAX);
        assert_eq!(clock.now(), reported);

        // Stays pinned, never wraps back
        assert_eq!(clock.advance(10), u64::MAX);
        assert_eq!(clock.now(), u64::MAX);
    }

    #[test]
    fn test_system_clock_is_after_2020() {
        assert!(SystemClock.now() > 1_577_836_800);
    }
}
