//! RP2040 hardware watchdog

use embassy_rp::watchdog::Watchdog as RpWatchdog;
use embassy_time::Duration;
use pctl_core::traits::Watchdog;

/// Watchdog that ignores feeds until it is started
pub struct BoardWatchdog {
    inner: RpWatchdog,
    armed: bool,
}

impl BoardWatchdog {
    pub fn new(inner: RpWatchdog) -> Self {
        Self {
            inner,
            armed: false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

impl Watchdog for BoardWatchdog {
    fn start(&mut self, timeout_ms: u32) {
        #[cfg(feature = "defmt")]
        defmt::info!("watchdog armed ({} ms)", timeout_ms);
        self.inner
            .start(Duration::from_millis(u64::from(timeout_ms)));
        self.armed = true;
    }

    fn feed(&mut self) {
        if self.armed {
            self.inner.feed();
        }
    }

    fn stop(&mut self) {
        if self.armed {
            self.inner.stop();
            self.armed = false;
        }
    }
}
