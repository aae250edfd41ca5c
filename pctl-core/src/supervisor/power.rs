//! Payload power guard
//!
//! Power transitions are debounced: after switching the payload on or off,
//! the opposite transition is refused until the guard interval passes.

use crate::traits::AlarmMatch;

/// Settle time after enabling payload power
pub const POWER_SETTLE_MS: u32 = 1000;

/// Payload power state and the time of its last transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerGuard {
    on: bool,
    last_on_s: u64,
    last_off_s: u64,
}

impl PowerGuard {
    /// Payload off, with both transitions stamped at boot
    pub fn new(boot_s: u64) -> Self {
        Self {
            on: false,
            last_on_s: boot_s,
            last_off_s: boot_s,
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn may_turn_on(&self, now_s: u64, guard_s: u32) -> bool {
        !self.on && now_s.saturating_sub(self.last_off_s) >= u64::from(guard_s)
    }

    pub fn may_turn_off(&self, now_s: u64, guard_s: u32) -> bool {
        self.on && now_s.saturating_sub(self.last_on_s) >= u64::from(guard_s)
    }

    pub fn record_on(&mut self, now_s: u64) {
        self.on = true;
        self.last_on_s = now_s;
    }

    pub fn record_off(&mut self, now_s: u64) {
        self.on = false;
        self.last_off_s = now_s;
    }
}

/// RTC alarm used to wake from standby
///
/// The alarm is set to 00:00:00 so matching minutes and seconds wakes
/// once an hour and matching seconds wakes once a minute.
pub fn standby_alarm(check_hourly: bool) -> AlarmMatch {
    if check_hourly {
        AlarmMatch::MinutesSeconds
    } else {
        AlarmMatch::Seconds
    }
}
