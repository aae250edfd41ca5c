//! Monotonic time source

/// Monotonic microsecond clock with busy-wait delays
pub trait Clock {
    /// Microseconds since boot
    fn now_us(&self) -> u64;

    /// Busy-wait for `us` microseconds
    fn delay_us(&mut self, us: u32);

    /// Milliseconds since boot
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }

    /// Whole seconds since boot
    fn now_s(&self) -> u64 {
        self.now_us() / 1_000_000
    }
}
