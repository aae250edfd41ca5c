//! Cancellable delays and timeouts
//!
//! A long wait is a sequence of short ticks against a deadline. Before
//! every tick the caller's poll hook runs; it feeds the watchdog and
//! reports whether the operator sent the cancellation byte.

use crate::traits::Clock;

/// Tick length for sub-second waits
pub const SHORT_QUANTUM_US: u32 = 50;

/// Tick length for waits measured in seconds
pub const LONG_QUANTUM_MS: u32 = 100;

/// How a wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitOutcome {
    /// The full duration passed
    Elapsed,
    /// The poll hook reported cancellation
    Cancelled,
}

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Pending,
    Elapsed,
}

/// Deadline-based wait that advances one quantum per tick
#[derive(Debug, Clone, Copy)]
pub struct CancellableDelay {
    deadline_us: u64,
    quantum_us: u32,
}

impl CancellableDelay {
    /// Sub-second wait sliced into [`SHORT_QUANTUM_US`] ticks
    pub fn micros<C: Clock + ?Sized>(clock: &C, us: u32) -> Self {
        Self {
            deadline_us: clock.now_us() + u64::from(us),
            quantum_us: SHORT_QUANTUM_US,
        }
    }

    /// Long wait sliced into [`LONG_QUANTUM_MS`] ticks
    pub fn millis<C: Clock + ?Sized>(clock: &C, ms: u32) -> Self {
        Self {
            deadline_us: clock.now_us() + u64::from(ms) * 1000,
            quantum_us: LONG_QUANTUM_MS * 1000,
        }
    }

    /// Time left before the deadline
    pub fn remaining_us(&self, now_us: u64) -> u64 {
        self.deadline_us.saturating_sub(now_us)
    }

    /// Wait at most one quantum
    pub fn tick<C: Clock + ?Sized>(&self, clock: &mut C) -> Tick {
        let remaining = self.remaining_us(clock.now_us());
        if remaining == 0 {
            return Tick::Elapsed;
        }
        let slice = remaining.min(u64::from(self.quantum_us)) as u32;
        clock.delay_us(slice);
        Tick::Pending
    }

    /// Tick until the deadline, calling `poll` before each quantum
    ///
    /// `poll` returning true ends the wait early.
    pub fn run<C, F>(self, clock: &mut C, mut poll: F) -> WaitOutcome
    where
        C: Clock + ?Sized,
        F: FnMut() -> bool,
    {
        loop {
            if poll() {
                return WaitOutcome::Cancelled;
            }
            if self.tick(clock) == Tick::Elapsed {
                return WaitOutcome::Elapsed;
            }
        }
    }
}

/// Inactivity timer restarted on every sign of activity
#[derive(Debug, Clone, Copy)]
pub struct IdleTimeout {
    last_activity_ms: u64,
    limit_ms: u64,
}

impl IdleTimeout {
    pub fn new(now_ms: u64, limit_ms: u32) -> Self {
        Self {
            last_activity_ms: now_ms,
            limit_ms: u64::from(limit_ms),
        }
    }

    /// Restart the timer
    pub fn touch(&mut self, now_ms: u64) {
        self.last_activity_ms = now_ms;
    }

    pub fn expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_activity_ms) >= self.limit_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeClock {
        now: u64,
        delays: u32,
    }

    impl Clock for FakeClock {
        fn now_us(&self) -> u64 {
            self.now
        }

        fn delay_us(&mut self, us: u32) {
            self.now += u64::from(us);
            self.delays += 1;
        }
    }

    #[test]
    fn test_short_wait_slices_into_quanta() {
        let mut clock = FakeClock { now: 0, delays: 0 };
        let delay = CancellableDelay::micros(&clock, 500);
        let mut polls = 0;
        let outcome = delay.run(&mut clock, || {
            polls += 1;
            false
        });
        assert_eq!(outcome, WaitOutcome::Elapsed);
        assert_eq!(clock.now, 500);
        assert_eq!(clock.delays, 10);
        assert!(polls >= 10);
    }

    #[test]
    fn test_remainder_is_waited() {
        let mut clock = FakeClock { now: 0, delays: 0 };
        CancellableDelay::micros(&clock, 120).run(&mut clock, || false);
        assert_eq!(clock.now, 120);
    }

    #[test]
    fn test_long_wait_cancelled() {
        let mut clock = FakeClock { now: 0, delays: 0 };
        let delay = CancellableDelay::millis(&clock, 10_000);
        let mut polls = 0;
        let outcome = delay.run(&mut clock, || {
            polls += 1;
            polls > 5
        });
        assert_eq!(outcome, WaitOutcome::Cancelled);
        assert_eq!(clock.now, 5 * u64::from(LONG_QUANTUM_MS) * 1000);
    }

    #[test]
    fn test_zero_wait_elapses_immediately() {
        let mut clock = FakeClock { now: 7, delays: 0 };
        let outcome = CancellableDelay::micros(&clock, 0).run(&mut clock, || false);
        assert_eq!(outcome, WaitOutcome::Elapsed);
        assert_eq!(clock.delays, 0);
    }

    #[test]
    fn test_idle_timeout() {
        let mut timeout = IdleTimeout::new(1000, 500);
        assert!(!timeout.expired(1400));
        timeout.touch(1400);
        assert!(!timeout.expired(1800));
        assert!(timeout.expired(1900));
    }
}
