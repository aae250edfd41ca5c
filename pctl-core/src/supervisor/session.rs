//! Operator sessions on a serial port
//!
//! A port idles until it receives a mode-entry byte. Command mode prints
//! a prompt and handles lines until the port goes quiet for CMDTIMEOUT or
//! the entry byte arrives again. Configuration mode handles one line
//! without prompt or echo.

use super::console::{Edit, LineEditor, Mode, PORT_BREAK_CHAR, PROMPT};
use super::hardware::Hardware;
use super::Supervisor;
use crate::config::{ConfigRegistry, Param};
use crate::text::Line;
use crate::timing::IdleTimeout;
use crate::traits::{Board, Clock, SerialPort, Watchdog};

/// Sleep between polls of an idle port
pub const INPUT_POLL_US: u32 = 1000;

/// How a line read ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineEvent {
    Line,
    Exit,
    Overflow,
    TimedOut,
}

/// Read one line from `port`, feeding the watchdog while waiting
pub(crate) fn read_line<B: Board>(
    hw: &mut Hardware<B>,
    port: usize,
    line: &mut Line,
    editor: &LineEditor,
    echo: bool,
    timeout_ms: u32,
) -> LineEvent {
    line.clear();
    let mut idle = IdleTimeout::new(hw.clock.now_ms(), timeout_ms);
    loop {
        hw.watchdog.feed();
        let Some(byte) = hw.ports.get_mut(port).and_then(|p| p.read_byte()) else {
            if idle.expired(hw.clock.now_ms()) {
                return LineEvent::TimedOut;
            }
            hw.clock.delay_us(INPUT_POLL_US);
            continue;
        };
        idle.touch(hw.clock.now_ms());

        let (edit, reply) = editor.feed(line, byte);
        if echo {
            if let Some(p) = hw.ports.get_mut(port) {
                p.write_bytes(reply.bytes());
            }
        }
        match edit {
            Edit::Pending => {}
            Edit::Line => return LineEvent::Line,
            Edit::Exit => return LineEvent::Exit,
            Edit::Overflow => return LineEvent::Overflow,
        }
    }
}

/// Wait up to `timeout_ms` for a single byte
pub(crate) fn read_byte<B: Board>(hw: &mut Hardware<B>, port: usize, timeout_ms: u32) -> Option<u8> {
    let idle = IdleTimeout::new(hw.clock.now_ms(), timeout_ms);
    loop {
        hw.watchdog.feed();
        if let Some(byte) = hw.ports.get_mut(port).and_then(|p| p.read_byte()) {
            return Some(byte);
        }
        if idle.expired(hw.clock.now_ms()) {
            return None;
        }
        hw.clock.delay_us(INPUT_POLL_US);
    }
}

impl<B: Board> Supervisor<B> {
    /// Check every port for a mode-entry byte and serve any session it opens
    pub fn poll_ports(&mut self) {
        for port in 0..self.hw.ports.len() {
            let byte = self.hw.ports.get_mut(port).and_then(|p| p.read_byte());
            if let Some(mode) = byte.and_then(Mode::from_byte) {
                self.session(port, mode);
            }
        }
    }

    /// Serve one operator session on `port`
    pub fn session(&mut self, port: usize, mode: Mode) {
        #[cfg(feature = "defmt")]
        defmt::debug!("session opened on port {} in {} mode", port, mode);

        let editor = LineEditor::new(Some(mode.entry_byte()));
        let echo = mode == Mode::Command && self.params.get(Param::LocalEcho) == 1;
        if mode == Mode::Command {
            self.scratch.reset();
        }

        let mut line = Line::new();
        loop {
            if mode == Mode::Command {
                self.hw.ports.write_to(port, format_args!("{}", PROMPT));
            }
            let timeout = self.command_timeout_ms();
            match read_line(&mut self.hw, port, &mut line, &editor, echo, timeout) {
                LineEvent::Line => self.dispatch(port, mode, line.as_str()),
                LineEvent::Overflow => {
                    self.hw.ports.write_to(port, format_args!("Line too long\r\n"))
                }
                LineEvent::Exit | LineEvent::TimedOut => break,
            }
            if mode == Mode::Config {
                break;
            }
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("session on port {} closed", port);
    }

    /// Ask a yes/no question on `port`
    ///
    /// Only `y` or `Y` within CMDTIMEOUT confirms.
    pub(crate) fn confirm(&mut self, port: usize, prompt: &str) -> bool {
        self.hw.ports.write_to(port, format_args!("\r\n{}", prompt));
        let timeout = self.command_timeout_ms();
        let answer = read_byte(&mut self.hw, port, timeout);
        if let Some(byte) = answer {
            self.hw.ports.write_to(port, format_args!("{}\r\n", char::from(byte)));
        }
        matches!(answer, Some(b'y' | b'Y'))
    }

    /// Relay bytes between two ports until the break byte arrives from the operator
    pub(crate) fn pass_through(&mut self, operator: usize, target: usize) {
        loop {
            self.hw.watchdog.feed();
            let Some((from, to)) = self.hw.ports.pair_mut(operator, target) else {
                return;
            };

            let mut busy = false;
            if let Some(byte) = from.read_byte() {
                if byte == PORT_BREAK_CHAR {
                    return;
                }
                to.write_bytes(&[byte]);
                busy = true;
            }
            if let Some(byte) = to.read_byte() {
                from.write_bytes(&[byte]);
                busy = true;
            }

            if !busy {
                self.hw.clock.delay_us(INPUT_POLL_US);
            }
        }
    }

    pub(crate) fn command_timeout_ms(&self) -> u32 {
        self.params.get(Param::CommandTimeout).max(0) as u32
    }
}
