//! Electrically tunable lens (ETL) actuator
//!
//! Positions are focal power in millidiopters.

/// Lowest focal power the lens accepts (-2.000 dpt)
pub const LENS_MIN_MDPT: i32 = -2000;

/// Highest focal power the lens accepts (3.000 dpt)
pub const LENS_MAX_MDPT: i32 = 3000;

/// Ramp increment used when none is given (0.050 dpt)
pub const DEFAULT_RAMP_MDPT: i32 = 50;

/// Errors from the lens controller link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LensError {
    /// Controller did not answer in time
    Timeout,
    /// Requested focal power outside the lens range
    OutOfRange,
    /// Ramp increment must be positive
    InvalidIncrement,
}

/// Focus actuator driven by absolute position commands
pub trait LensActuator {
    /// Open the controller link and park the lens at 0 dpt
    fn connect(&mut self) -> Result<(), LensError>;

    /// Ramp to `position_mdpt` in steps of `increment_mdpt`, blocking until settled
    fn ramp_to(&mut self, position_mdpt: i32, increment_mdpt: i32) -> Result<(), LensError>;

    /// Move by a relative amount in one step
    fn step(&mut self, delta_mdpt: i32) -> Result<(), LensError>;

    /// Sweep the full focal range from the top down
    fn sweep(&mut self) -> Result<(), LensError>;

    /// Forward a raw controller command and wait for its reply
    fn send_raw(&mut self, command: &str) -> Result<(), LensError>;

    /// Quiet the link, then reconnect
    fn reset(&mut self) -> Result<(), LensError>;

    /// Last commanded position
    fn position(&self) -> i32;

    /// Move to an absolute position with the default ramp
    fn move_to(&mut self, position_mdpt: i32) -> Result<(), LensError> {
        self.ramp_to(position_mdpt, DEFAULT_RAMP_MDPT)
    }
}
