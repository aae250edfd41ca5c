//! Sequence commands and their keywords

use core::fmt;

/// One instruction of an imaging sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    /// Open a block
    Start,
    /// Terminate the program
    End,
    /// Close a block and run it `iterations` times in total
    Repeat { iterations: u32 },
    /// Cancellable sub-second wait
    Delay { micros: u32 },
    /// Cancellable wait in seconds
    LongDelay { seconds: u32 },
    /// Move the lens to an absolute focal power (mdpt)
    Move { position: i32 },
    /// Close a block and run it once per lens position from `start` to `stop`
    FocalStack { start: i32, stop: i32, increment: i32 },
    /// Fluorescence capture under the UV flash
    Fluor { duration_us: u32 },
    /// Capture without a flash
    Ambient { duration_us: u32 },
    /// Capture under the white flash
    White { duration_us: u32 },
}

impl Command {
    /// Whether this command closes the most recent open block
    pub fn closes_block(&self) -> bool {
        matches!(self, Command::Repeat { .. } | Command::FocalStack { .. })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Command::Start => f.write_str("START"),
            Command::End => f.write_str("END"),
            Command::Repeat { iterations } => write!(f, "REPEAT,{}", iterations),
            Command::Delay { micros } => write!(f, "DELAY,{}", micros),
            Command::LongDelay { seconds } => write!(f, "LONGDELAY,{}", seconds),
            Command::Move { position } => write!(f, "MOVE,{}", position),
            Command::FocalStack {
                start,
                stop,
                increment,
            } => write!(f, "FOCALSTACK,{},{},{}", start, stop, increment),
            Command::Fluor { duration_us } => write!(f, "MEAS,{}", duration_us),
            Command::Ambient { duration_us } => write!(f, "AMBIENT,{}", duration_us),
            Command::White { duration_us } => write!(f, "WHITE,{}", duration_us),
        }
    }
}

/// Sequence vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Verb {
    Start,
    End,
    Repeat,
    Delay,
    LongDelay,
    Move,
    White,
    Meas,
    Ambient,
    FocalStack,
}

/// Keyword table; `FLUOR` is accepted as a synonym of `MEAS`
const KEYWORDS: [(&str, Verb); 11] = [
    ("START", Verb::Start),
    ("END", Verb::End),
    ("REPEAT", Verb::Repeat),
    ("DELAY", Verb::Delay),
    ("LONGDELAY", Verb::LongDelay),
    ("MOVE", Verb::Move),
    ("WHITE", Verb::White),
    ("MEAS", Verb::Meas),
    ("FLUOR", Verb::Meas),
    ("AMBIENT", Verb::Ambient),
    ("FOCALSTACK", Verb::FocalStack),
];

impl Verb {
    /// Match a token against the vocabulary, ignoring case
    pub fn lookup(token: &str) -> Option<Verb> {
        let token = token.trim();
        KEYWORDS
            .iter()
            .find(|(keyword, _)| keyword.eq_ignore_ascii_case(token))
            .map(|&(_, verb)| verb)
    }
}
