use std::sync::atomic::{AtomicI64, Ordering};
use time::OffsetDateTime;

/// Source of upload timestamps, in epoch milliseconds.
///
/// Implementations must never go backwards within a process.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Wall clock, clamped so it never reports less than it already has (NTP
/// adjustments can step the system clock backwards).
#[derive(Debug, Default)]
pub struct SystemClock {
    last: AtomicI64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        let now = i64::try_from(OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX);
        let previous = self.last.fetch_max(now, Ordering::SeqCst);
        previous.max(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_goes_backwards() {
        let clock = SystemClock::new();
        clock.last.store(i64::MAX - 1, Ordering::SeqCst);
        assert_eq!(clock.now_millis(), i64::MAX - 1);
    }

    #[test]
    fn test_non_decreasing() {
        let clock = SystemClock::new();
        let mut previous = clock.now_millis();
        assert!(previous > 1_600_000_000_000);
        for _ in 0..1000 {
            let now = clock.now_millis();
            assert!(now >= previous);
            previous = now;
        }
    }
}
