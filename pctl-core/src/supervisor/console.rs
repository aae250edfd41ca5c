//! Operator console line discipline

use crate::text::Line;

/// Enters command mode, with a prompt and echo
pub const COMMAND_CHAR: u8 = b'!';

/// Enters configuration mode: one silent line, then back to idle
pub const CONFIG_CHAR: u8 = b'#';

/// Ends a port pass-through session
pub const PORT_BREAK_CHAR: u8 = 5;

pub const PROMPT: &str = "\r\nPCTL > ";

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7F;

/// Console mode selected by the entry byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Command,
    Config,
}

impl Mode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            COMMAND_CHAR => Some(Mode::Command),
            CONFIG_CHAR => Some(Mode::Config),
            _ => None,
        }
    }

    pub fn entry_byte(self) -> u8 {
        match self {
            Mode::Command => COMMAND_CHAR,
            Mode::Config => CONFIG_CHAR,
        }
    }
}

/// Line state after one byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Pending,
    /// Carriage return closed the line
    Line,
    /// The exit byte was received
    Exit,
    /// The line outgrew its buffer and was discarded
    Overflow,
}

/// What to echo back for one byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Echo {
    None,
    Byte(u8),
    Erase,
    NewLine,
}

impl Echo {
    pub fn bytes(&self) -> &[u8] {
        match self {
            Echo::None => &[],
            Echo::Byte(b) => core::slice::from_ref(b),
            Echo::Erase => b"\x08 \x08",
            Echo::NewLine => b"\r\n",
        }
    }
}

/// Accumulates bytes into a [`Line`]
pub struct LineEditor {
    exit: Option<u8>,
}

impl LineEditor {
    /// Editor that ends the session when `exit` arrives
    pub fn new(exit: Option<u8>) -> Self {
        Self { exit }
    }

    pub fn feed(&self, line: &mut Line, byte: u8) -> (Edit, Echo) {
        match byte {
            b if Some(b) == self.exit => (Edit::Exit, Echo::None),
            b'\r' => (Edit::Line, Echo::NewLine),
            b'\n' => (Edit::Pending, Echo::None),
            BACKSPACE | DELETE => match line.pop() {
                Some(_) => (Edit::Pending, Echo::Erase),
                None => (Edit::Pending, Echo::None),
            },
            b if b.is_ascii_graphic() || b == b' ' => match line.push(char::from(b)) {
                Ok(()) => (Edit::Pending, Echo::Byte(b)),
                Err(()) => {
                    line.clear();
                    (Edit::Overflow, Echo::NewLine)
                }
            },
            _ => (Edit::Pending, Echo::None),
        }
    }
}
