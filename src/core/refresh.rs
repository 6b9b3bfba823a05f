//! Refresh loop scheduling
//!
//! Decides when to start a process fetch. Ticks fire on a fixed period; a
//! tick that arrives while the previous fetch is still running is dropped.

use std::time::{Duration, Instant};

/// Default refresh period
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// What the event loop should do on this iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Start a fetch now
    Fetch,
    /// A tick was due but a fetch is outstanding; the tick is discarded
    Skip,
    /// Nothing due yet
    Idle,
}

#[derive(Debug, Clone)]
pub struct RefreshLoop {
    period: Duration,
    next_due: Option<Instant>,
    skipped: u64,
}

impl RefreshLoop {
    /// Create a loop whose first poll fires immediately
    pub fn new(period: Duration) -> Self {
        RefreshLoop {
            period: period.max(Duration::from_millis(1)),
            next_due: None,
            skipped: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Number of ticks dropped because a fetch was outstanding
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Poll the schedule at `now`. `busy` tells whether a fetch is in flight.
    pub fn poll(&mut self, now: Instant, busy: bool) -> Tick {
        let due = match self.next_due {
            None => now,
            Some(due) => due,
        };
        if now < due {
            return Tick::Idle;
        }

        // Advance by whole periods so a long stall does not cause a burst
        let mut next = due + self.period;
        while next <= now {
            next += self.period;
        }
        self.next_due = Some(next);

        if busy {
            self.skipped += 1;
            Tick::Skip
        } else {
            Tick::Fetch
        }
    }

    /// Time left until the next tick, used as the input timeout
    pub fn time_until_due(&self, now: Instant) -> Duration {
        match self.next_due {
            None => Duration::ZERO,
            Some(due) => due.saturating_duration_since(now),
        }
    }
}

impl Default for RefreshLoop {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_poll_fires_immediately() {
        let mut refresh = RefreshLoop::default();
        let t0 = Instant::now();
        assert_eq!(refresh.poll(t0, false), Tick::Fetch);
        assert_eq!(refresh.poll(t0, false), Tick::Idle);
        assert_eq!(refresh.time_until_due(t0), DEFAULT_REFRESH_INTERVAL);
    }

    #[test]
    fn test_fires_each_period() {
        let mut refresh = RefreshLoop::new(Duration::from_secs(5));
        let t0 = Instant::now();
        refresh.poll(t0, false);
        assert_eq!(refresh.poll(t0 + Duration::from_secs(4), false), Tick::Idle);
        assert_eq!(refresh.poll(t0 + Duration::from_secs(5), false), Tick::Fetch);
        assert_eq!(refresh.poll(t0 + Duration::from_secs(6), false), Tick::Idle);
        assert_eq!(refresh.poll(t0 + Duration::from_secs(10), false), Tick::Fetch);
    }

    #[test]
    fn test_skips_while_fetch_outstanding() {
        let mut refresh = RefreshLoop::new(Duration::from_secs(5));
        let t0 = Instant::now();
        refresh.poll(t0, false);

        assert_eq!(refresh.poll(t0 + Duration::from_secs(5), true), Tick::Skip);
        assert_eq!(refresh.skipped(), 1);
        // The dropped tick is not queued
        assert_eq!(refresh.poll(t0 + Duration::from_secs(6), false), Tick::Idle);
        assert_eq!(refresh.poll(t0 + Duration::from_secs(10), false), Tick::Fetch);
    }

    #[test]
    fn test_stall_does_not_burst() {
        let mut refresh = RefreshLoop::new(Duration::from_secs(5));
        let t0 = Instant::now();
        refresh.poll(t0, false);
        assert_eq!(refresh.poll(t0 + Duration::from_secs(23), false), Tick::Fetch);
        assert_eq!(refresh.poll(t0 + Duration::from_secs(24), false), Tick::Idle);
        assert_eq!(
            refresh.time_until_due(t0 + Duration::from_secs(24)),
            Duration::from_secs(1)
        );
    }
}
