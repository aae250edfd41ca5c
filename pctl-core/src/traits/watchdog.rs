//! Hardware watchdog

/// Watchdog timeout when enabled
pub const WATCHDOG_TIMEOUT_MS: u32 = 8000;

/// Hardware watchdog
///
/// `feed` before `start` must be a no-op.
pub trait Watchdog {
    fn start(&mut self, timeout_ms: u32);
    fn feed(&mut self);

    /// Disarm before standby; `start` re-arms
    fn stop(&mut self);
}
