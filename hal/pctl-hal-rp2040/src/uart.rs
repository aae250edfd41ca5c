//! Buffered UART serial ports
//!
//! Wraps any `embedded-io` port with a ready check (the embassy-rp
//! `BufferedUart` in practice) in the non-blocking [`SerialPort`]
//! interface. Reads never block; writes block until the bytes fit in the
//! transmit ring.

use embedded_io::{Read, ReadReady, Write};
use pctl_core::traits::SerialPort;

pub struct UartPort<U> {
    uart: U,
}

impl<U> UartPort<U> {
    pub fn new(uart: U) -> Self {
        Self { uart }
    }

    pub fn inner(&mut self) -> &mut U {
        &mut self.uart
    }
}

impl<U: Read + ReadReady + Write> SerialPort for UartPort<U> {
    fn read_byte(&mut self) -> Option<u8> {
        if !self.uart.read_ready().unwrap_or(false) {
            return None;
        }
        let mut byte = [0u8; 1];
        match self.uart.read(&mut byte) {
            Ok(1) => Some(byte[0]),
            _ => None,
        }
    }

    fn write_bytes(&mut self, data: &[u8]) {
        if let Err(_e) = self.uart.write_all(data) {
            #[cfg(feature = "defmt")]
            defmt::warn!("uart write failed: {}", defmt::Debug2Format(&_e));
        }
    }

    fn flush(&mut self) {
        let _ = self.uart.flush();
    }
}
