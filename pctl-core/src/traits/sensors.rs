//! Environment and power sensing

/// Errors from the sensor bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// I2C transaction failed
    Bus,
    /// Measurement failed its checksum
    Checksum,
}

/// One reading of every supervised quantity, in milli-units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EnvironmentSample {
    /// Board temperature in m°C
    pub temperature_mc: i32,
    /// Relative humidity in thousandths of a percent
    pub humidity_mpct: i32,
    /// Supply voltage in mV
    pub voltage_mv: i32,
    /// Supply power in mW
    pub power_mw: i32,
}

/// Source of environment samples
pub trait EnvironmentSensors {
    fn sample(&mut self) -> Result<EnvironmentSample, SensorError>;
}
