//! Serial port abstraction

use core::fmt;

/// Cancellation byte (ESC) that aborts waits and running sequences
pub const ESCAPE: u8 = 0x1B;

/// Byte-oriented, non-blocking serial port
pub trait SerialPort {
    /// Read one byte if one is waiting
    fn read_byte(&mut self) -> Option<u8>;

    /// Queue bytes for transmission
    fn write_bytes(&mut self, data: &[u8]);

    /// Block until queued bytes have left the port
    fn flush(&mut self) {}

    /// Discard any pending input
    fn clear_input(&mut self) {
        while self.read_byte().is_some() {}
    }
}

/// `fmt::Write` adapter so `write!` can target a port
pub struct PortWriter<'a, P: ?Sized>(pub &'a mut P);

impl<P: SerialPort + ?Sized> fmt::Write for PortWriter<'_, P> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_bytes(s.as_bytes());
        Ok(())
    }
}
