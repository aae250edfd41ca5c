//! Monotonic clock backed by the embassy time driver

use embassy_time::{block_for, Duration, Instant};
use pctl_core::traits::Clock;

/// Microsecond clock and busy-wait delays on the RP2040 timer
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_us(&self) -> u64 {
        Instant::now().as_micros()
    }

    fn delay_us(&mut self, us: u32) {
        block_for(Duration::from_micros(u64::from(us)));
    }
}
