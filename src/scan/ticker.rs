//! Fixed-period tick scheduling.
//!
//! Deadlines advance in whole periods from the start time. Firings that
//! elapse while a tick is still running are dropped, never queued, so a
//! slow decode delays the loop without causing a burst afterwards.

use std::time::{Duration, Instant};

/// Deadline tracker for a fixed tick period.
#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,
    next: Instant,
}

impl Ticker {
    /// First firing is one period from now.
    pub fn new(period: Duration) -> Self {
        Self::starting_at(Instant::now(), period)
    }

    /// First firing is one period after `start`. Periods under 1ms are raised to 1ms.
    pub fn starting_at(start: Instant, period: Duration) -> Self {
        let period = period.max(Duration::from_millis(1));
        Self {
            period,
            next: start + period,
        }
    }

    /// Effective period after clamping.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Instant of the next firing.
    pub fn deadline(&self) -> Instant {
        self.next
    }

    /// Time left until the next firing; zero when it is due.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }

    /// Consumes the current firing and schedules the next one after `now`.
    ///
    /// Returns how many firings were skipped because `now` is already past
    /// them.
    pub fn advance(&mut self, now: Instant) -> u64 {
        self.next += self.period;
        if now < self.next {
            return 0;
        }

        let behind = now.duration_since(self.next).as_nanos();
        let missed = (behind / self.period.as_nanos()) as u64 + 1;
        self.next += self
            .period
            .saturating_mul(u32::try_from(missed).unwrap_or(u32::MAX));
        missed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_millis(100);

    #[test]
    fn test_on_time_ticks_skip_nothing() {
        let t0 = Instant::now();
        let mut ticker = Ticker::starting_at(t0, PERIOD);

        assert_eq!(ticker.remaining(t0), PERIOD);
        assert_eq!(ticker.advance(t0 + Duration::from_millis(110)), 0);
        assert_eq!(ticker.deadline(), t0 + Duration::from_millis(200));
    }

    #[test]
    fn test_slow_tick_skips_missed_firings() {
        let t0 = Instant::now();
        let mut ticker = Ticker::starting_at(t0, PERIOD);

        // Tick fired at 100ms and ran until 350ms: firings at 200 and 300 dropped
        let missed = ticker.advance(t0 + Duration::from_millis(350));
        assert_eq!(missed, 2);
        assert_eq!(ticker.deadline(), t0 + Duration::from_millis(400));
        assert_eq!(
            ticker.remaining(t0 + Duration::from_millis(350)),
            Duration::from_millis(50)
        );
    }

    #[test]
    fn test_overdue_remaining_is_zero() {
        let t0 = Instant::now();
        let ticker = Ticker::starting_at(t0, PERIOD);
        assert_eq!(ticker.remaining(t0 + Duration::from_secs(1)), Duration::ZERO);
    }

    #[test]
    fn test_zero_period_clamped() {
        let ticker = Ticker::new(Duration::ZERO);
        assert_eq!(ticker.period(), Duration::from_millis(1));
    }
}
