//! SHT3x temperature and humidity sensor
//!
//! Single-shot, high repeatability measurements without clock stretching.
//! Each 16-bit word from the sensor is followed by a CRC-8 (poly 0x31,
//! init 0xFF).

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use pctl_core::traits::SensorError;

/// Default address with ADDR low
pub const DEFAULT_ADDRESS: u8 = 0x44;

/// Single shot, high repeatability, no clock stretching
pub const MEASURE_HIGH: [u8; 2] = [0x24, 0x00];

/// Worst-case high repeatability measurement time
pub const MEASURE_TIME_MS: u32 = 16;

/// CRC-8 as used by Sensirion sensors
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0xFFu8;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            if crc & 0x80 != 0 {
                crc = (crc << 1) ^ 0x31;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// Check one `[msb, lsb, crc]` group and return its word
fn word(group: &[u8]) -> Result<u16, SensorError> {
    match group {
        [msb, lsb, crc] if crc8(&[*msb, *lsb]) == *crc => Ok(u16::from_be_bytes([*msb, *lsb])),
        _ => Err(SensorError::Checksum),
    }
}

/// Raw temperature to m°C: -45 + 175 * raw / 65535
pub fn temperature_mc(raw: u16) -> i32 {
    -45_000 + (175_000 * i64::from(raw) / 65_535) as i32
}

/// Raw humidity to thousandths of a percent: 100 * raw / 65535
pub fn humidity_mpct(raw: u16) -> i32 {
    (100_000 * i64::from(raw) / 65_535) as i32
}

/// SHT3x on a shared bus
#[derive(Debug, Clone, Copy)]
pub struct Sht3x {
    address: u8,
}

impl Default for Sht3x {
    fn default() -> Self {
        Self::new(DEFAULT_ADDRESS)
    }
}

impl Sht3x {
    pub const fn new(address: u8) -> Self {
        Self { address }
    }

    /// Trigger a measurement and read back (m°C, m%RH)
    pub fn measure<I: I2c, D: DelayNs>(
        &self,
        i2c: &mut I,
        delay: &mut D,
    ) -> Result<(i32, i32), SensorError> {
        i2c.write(self.address, &MEASURE_HIGH)
            .map_err(|_| SensorError::Bus)?;
        delay.delay_ms(MEASURE_TIME_MS);

        let mut buf = [0u8; 6];
        i2c.read(self.address, &mut buf)
            .map_err(|_| SensorError::Bus)?;
        let temperature = word(&buf[..3])?;
        let humidity = word(&buf[3..])?;
        Ok((temperature_mc(temperature), humidity_mpct(humidity)))
    }
}
