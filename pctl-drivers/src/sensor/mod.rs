//! Environment and supply sensors
//!
//! Both sensors share one I2C bus. [`EnvironmentBoard`] owns the bus and
//! combines their readings into one [`EnvironmentSample`].

pub mod ina260;
pub mod sht3x;

pub use ina260::Ina260;
pub use sht3x::Sht3x;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use pctl_core::traits::{EnvironmentSample, EnvironmentSensors, SensorError};

/// Power monitor and climate sensor on a shared bus
pub struct EnvironmentBoard<I, D> {
    i2c: I,
    delay: D,
    power: Ina260,
    climate: Sht3x,
}

impl<I: I2c, D: DelayNs> EnvironmentBoard<I, D> {
    /// Sensors at their default addresses
    pub fn new(i2c: I, delay: D) -> Self {
        Self::with_sensors(i2c, delay, Ina260::default(), Sht3x::default())
    }

    pub fn with_sensors(i2c: I, delay: D, power: Ina260, climate: Sht3x) -> Self {
        Self {
            i2c,
            delay,
            power,
            climate,
        }
    }

    /// Configure the power monitor; the climate sensor needs no setup
    pub fn init(&mut self) -> Result<(), SensorError> {
        self.power.configure(&mut self.i2c)
    }
}

impl<I: I2c, D: DelayNs> EnvironmentSensors for EnvironmentBoard<I, D> {
    fn sample(&mut self) -> Result<EnvironmentSample, SensorError> {
        let (temperature_mc, humidity_mpct) = self.climate.measure(&mut self.i2c, &mut self.delay)?;
        Ok(EnvironmentSample {
            temperature_mc,
            humidity_mpct,
            voltage_mv: self.power.voltage_mv(&mut self.i2c)?,
            power_mw: self.power.power_mw(&mut self.i2c)?,
        })
    }
}
