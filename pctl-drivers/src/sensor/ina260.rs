//! INA260 supply power monitor
//!
//! Integrated-shunt current/voltage/power monitor on I2C. Readings are
//! taken from the continuously converting bus voltage and power registers.

use embedded_hal::i2c::I2c;
use pctl_core::traits::SensorError;

/// Default address with A0/A1 grounded
pub const DEFAULT_ADDRESS: u8 = 0x40;

/// Register addresses
pub mod reg {
    pub const CONFIG: u8 = 0x00;
    pub const CURRENT: u8 = 0x01;
    pub const BUS_VOLTAGE: u8 = 0x02;
    pub const POWER: u8 = 0x03;
}

/// 256-sample averaging, 588 µs conversions, continuous shunt and bus
pub const CONFIG_VALUE: u16 = 0x6000 | (0b101 << 9) | (0b011 << 6) | (0b011 << 3) | 0b111;

/// Bus voltage LSB in µV
const BUS_VOLTAGE_LSB_UV: i32 = 1250;

/// Current LSB in µA
const CURRENT_LSB_UA: i32 = 1250;

/// Power LSB in mW
const POWER_LSB_MW: i32 = 10;

/// INA260 on a shared bus
#[derive(Debug, Clone, Copy)]
pub struct Ina260 {
    address: u8,
}

impl Default for Ina260 {
    fn default() -> Self {
        Self::new(DEFAULT_ADDRESS)
    }
}

impl Ina260 {
    pub const fn new(address: u8) -> Self {
        Self { address }
    }

    /// Program averaging and conversion times
    pub fn configure<I: I2c>(&self, i2c: &mut I) -> Result<(), SensorError> {
        let [hi, lo] = CONFIG_VALUE.to_be_bytes();
        i2c.write(self.address, &[reg::CONFIG, hi, lo])
            .map_err(|_| SensorError::Bus)
    }

    fn read_register<I: I2c>(&self, i2c: &mut I, register: u8) -> Result<u16, SensorError> {
        let mut buf = [0u8; 2];
        i2c.write_read(self.address, &[register], &mut buf)
            .map_err(|_| SensorError::Bus)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Bus voltage in mV
    pub fn voltage_mv<I: I2c>(&self, i2c: &mut I) -> Result<i32, SensorError> {
        let raw = self.read_register(i2c, reg::BUS_VOLTAGE)?;
        Ok(i32::from(raw) * BUS_VOLTAGE_LSB_UV / 1000)
    }

    /// Signed current in mA
    pub fn current_ma<I: I2c>(&self, i2c: &mut I) -> Result<i32, SensorError> {
        let raw = self.read_register(i2c, reg::CURRENT)? as i16;
        Ok(i32::from(raw) * CURRENT_LSB_UA / 1000)
    }

    /// Power in mW
    pub fn power_mw<I: I2c>(&self, i2c: &mut I) -> Result<i32, SensorError> {
        let raw = self.read_register(i2c, reg::POWER)?;
        Ok(i32::from(raw) * POWER_LSB_MW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::mock::MockBus;

    #[test]
    fn test_config_value() {
        assert_eq!(CONFIG_VALUE, 0x6ADF);
    }

    #[test]
    fn test_configure_writes_config_register() {
        let mut bus = MockBus::default();
        Ina260::default().configure(&mut bus).unwrap();
        assert_eq!(bus.written.as_slice(), &[DEFAULT_ADDRESS, reg::CONFIG, 0x6A, 0xDF]);
    }

    #[test]
    fn test_scaling() {
        let mut bus = MockBus::default();
        // 9600 * 1.25 mV = 12 V
        bus.set_register(reg::BUS_VOLTAGE, 9600);
        bus.set_register(reg::POWER, 300);
        bus.set_register(reg::CURRENT, (-800i16) as u16);

        let ina = Ina260::default();
        assert_eq!(ina.voltage_mv(&mut bus), Ok(12_000));
        assert_eq!(ina.power_mw(&mut bus), Ok(3_000));
        assert_eq!(ina.current_ma(&mut bus), Ok(-1_000));
    }

    #[test]
    fn test_bus_error() {
        let mut bus = MockBus::default();
        bus.fail = true;
        assert_eq!(Ina260::default().voltage_mv(&mut bus), Err(SensorError::Bus));
    }
}
