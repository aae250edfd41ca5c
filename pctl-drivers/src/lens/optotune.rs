//! Optotune lens driver controller
//!
//! The controller speaks a line-oriented ASCII protocol at the port's
//! baud rate. Every command is terminated with CRLF and answered with a
//! single reply line. Focal power is sent in diopters with three decimals,
//! e.g. `setfp=-1.250`.

use core::fmt::Write;

use embedded_hal::delay::DelayNs;
use heapless::String;
use pctl_core::text::Milli;
use pctl_core::traits::lens::{LENS_MAX_MDPT, LENS_MIN_MDPT};
use pctl_core::traits::{LensActuator, LensError, SerialPort};

/// Longest wait for a reply line
pub const REPLY_TIMEOUT_MS: u32 = 100;

/// Settle time after each ramp step
pub const RAMP_STEP_MS: u32 = 20;

/// Settle time after each sweep step
pub const SWEEP_STEP_MS: u32 = 50;

/// Sweep increment (0.050 dpt)
pub const SWEEP_STEP_MDPT: i32 = 50;

/// Pause around the `start` handshake
pub const CONNECT_SETTLE_MS: u32 = 250;

/// Link silence before a reset reconnects
pub const RESET_QUIET_MS: u32 = 1000;

/// Longest command the driver formats
const COMMAND_CAPACITY: usize = 48;

/// Lens controller on a dedicated serial port
pub struct OptotuneLens<P, D> {
    port: P,
    delay: D,
    position_mdpt: i32,
}

impl<P: SerialPort, D: DelayNs> OptotuneLens<P, D> {
    /// Wrap the port; call [`LensActuator::connect`] once the lens is powered
    pub fn new(port: P, delay: D) -> Self {
        Self {
            port,
            delay,
            position_mdpt: 0,
        }
    }

    /// Release the port and delay
    pub fn free(self) -> (P, D) {
        (self.port, self.delay)
    }

    fn send(&mut self, command: &str) -> Result<(), LensError> {
        self.port.clear_input();
        self.port.write_bytes(command.as_bytes());
        self.port.write_bytes(b"\r\n");
        self.port.flush();
        self.await_reply()
    }

    /// Wait for the first reply byte, then drain the rest of the line
    fn await_reply(&mut self) -> Result<(), LensError> {
        let mut waited_ms = 0;
        loop {
            if self.port.read_byte().is_some() {
                break;
            }
            if waited_ms >= REPLY_TIMEOUT_MS {
                #[cfg(feature = "defmt")]
                defmt::warn!("lens controller reply timeout");
                return Err(LensError::Timeout);
            }
            self.delay.delay_ms(1);
            waited_ms += 1;
        }
        while let Some(byte) = self.port.read_byte() {
            if byte == b'\n' {
                break;
            }
        }
        Ok(())
    }

    fn set_focal_power(&mut self, position_mdpt: i32) -> Result<(), LensError> {
        let mut command: String<COMMAND_CAPACITY> = String::new();
        write!(command, "setfp={}", Milli(position_mdpt)).map_err(|_| LensError::OutOfRange)?;
        self.send(&command)?;
        self.position_mdpt = position_mdpt;
        Ok(())
    }
}

fn in_range(position_mdpt: i32) -> bool {
    (LENS_MIN_MDPT..=LENS_MAX_MDPT).contains(&position_mdpt)
}

impl<P: SerialPort, D: DelayNs> LensActuator for OptotuneLens<P, D> {
    fn connect(&mut self) -> Result<(), LensError> {
        self.delay.delay_ms(CONNECT_SETTLE_MS);
        // Older controllers answer `start` with a banner, newer ones stay silent
        let _ = self.send("start");
        self.delay.delay_ms(CONNECT_SETTLE_MS);
        self.set_focal_power(0)
    }

    fn ramp_to(&mut self, position_mdpt: i32, increment_mdpt: i32) -> Result<(), LensError> {
        if !in_range(position_mdpt) {
            return Err(LensError::OutOfRange);
        }
        if increment_mdpt <= 0 {
            return Err(LensError::InvalidIncrement);
        }

        while self.position_mdpt != position_mdpt {
            let remaining = position_mdpt - self.position_mdpt;
            let step = remaining.clamp(-increment_mdpt, increment_mdpt);
            self.set_focal_power(self.position_mdpt + step)?;
            self.delay.delay_ms(RAMP_STEP_MS);
        }
        Ok(())
    }

    fn step(&mut self, delta_mdpt: i32) -> Result<(), LensError> {
        let target = self.position_mdpt.saturating_add(delta_mdpt);
        if !in_range(target) {
            return Err(LensError::OutOfRange);
        }
        self.set_focal_power(target)?;
        self.delay.delay_ms(RAMP_STEP_MS);
        Ok(())
    }

    fn sweep(&mut self) -> Result<(), LensError> {
        let mut position = LENS_MAX_MDPT;
        self.set_focal_power(position)?;
        while position > LENS_MIN_MDPT {
            position = (position - SWEEP_STEP_MDPT).max(LENS_MIN_MDPT);
            self.set_focal_power(position)?;
            self.delay.delay_ms(SWEEP_STEP_MS);
        }
        Ok(())
    }

    fn send_raw(&mut self, command: &str) -> Result<(), LensError> {
        self.send(command.trim())
    }

    fn reset(&mut self) -> Result<(), LensError> {
        #[cfg(feature = "defmt")]
        defmt::info!("resetting lens controller link");
        self.delay.delay_ms(RESET_QUIET_MS);
        self.port.clear_input();
        self.connect()
    }

    fn position(&self) -> i32 {
        self.position_mdpt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::{Deque, Vec};

    /// Controller that answers every CRLF-terminated command with `OK\r\n`
    #[derive(Default)]
    struct MockController {
        silent: bool,
        pending: Deque<u8, 64>,
        line: Vec<u8, COMMAND_CAPACITY>,
        commands: Vec<String<COMMAND_CAPACITY>, 128>,
    }

    impl SerialPort for MockController {
        fn read_byte(&mut self) -> Option<u8> {
            self.pending.pop_front()
        }

        fn write_bytes(&mut self, data: &[u8]) {
            for &byte in data {
                match byte {
                    b'\r' => {}
                    b'\n' => {
                        let text = core::str::from_utf8(&self.line).unwrap_or("");
                        let _ = self.commands.push(String::try_from(text).unwrap_or_default());
                        self.line.clear();
                        if !self.silent {
                            for b in b"OK\r\n" {
                                let _ = self.pending.push_back(*b);
                            }
                        }
                    }
                    _ => {
                        let _ = self.line.push(byte);
                    }
                }
            }
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn lens() -> OptotuneLens<MockController, NoDelay> {
        OptotuneLens::new(MockController::default(), NoDelay)
    }

    fn sent(lens: &OptotuneLens<MockController, NoDelay>) -> Vec<&str, 128> {
        lens.port.commands.iter().map(|c| c.as_str()).collect()
    }

    #[test]
    fn test_connect_parks_at_zero() {
        let mut lens = lens();
        lens.connect().unwrap();
        assert_eq!(sent(&lens).as_slice(), &["start", "setfp=0.000"]);
        assert_eq!(lens.position(), 0);
    }

    #[test]
    fn test_ramp_steps_to_exact_target() {
        let mut lens = lens();
        lens.ramp_to(120, 50).unwrap();
        assert_eq!(
            sent(&lens).as_slice(),
            &["setfp=0.050", "setfp=0.100", "setfp=0.120"]
        );
        assert_eq!(lens.position(), 120);

        lens.port.commands.clear();
        lens.ramp_to(-50, 100).unwrap();
        assert_eq!(sent(&lens).as_slice(), &["setfp=0.020", "setfp=-0.050"]);
    }

    #[test]
    fn test_ramp_rejects_out_of_range() {
        let mut lens = lens();
        assert_eq!(lens.ramp_to(3500, 50), Err(LensError::OutOfRange));
        assert_eq!(lens.ramp_to(100, 0), Err(LensError::InvalidIncrement));
        assert!(lens.port.commands.is_empty());
    }

    #[test]
    fn test_step_is_relative() {
        let mut lens = lens();
        lens.step(250).unwrap();
        lens.step(-1000).unwrap();
        assert_eq!(lens.position(), -750);
        assert_eq!(lens.step(-1500), Err(LensError::OutOfRange));
        assert_eq!(lens.position(), -750);
    }

    #[test]
    fn test_sweep_covers_range_top_down() {
        let mut lens = lens();
        lens.sweep().unwrap();
        let commands = sent(&lens);
        assert_eq!(commands.first(), Some(&"setfp=3.000"));
        assert_eq!(commands.last(), Some(&"setfp=-2.000"));
        assert_eq!(commands.len(), 101);
        assert_eq!(lens.position(), LENS_MIN_MDPT);
    }

    #[test]
    fn test_silent_controller_times_out() {
        let mut lens = lens();
        lens.port.silent = true;
        assert_eq!(lens.ramp_to(50, 50), Err(LensError::Timeout));
        assert_eq!(lens.position(), 0, "position only advances on a reply");
    }

    #[test]
    fn test_raw_command_passes_through() {
        let mut lens = lens();
        lens.send_raw(" getfp ").unwrap();
        assert_eq!(sent(&lens).as_slice(), &["getfp"]);
    }
}
