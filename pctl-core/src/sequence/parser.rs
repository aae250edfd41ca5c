//! Sequence line parser
//!
//! Each line is a verb and comma-separated integer arguments. Arguments are
//! checked against bounds read live from the configuration, so operators
//! can widen or narrow what a sequence may request.

use core::fmt;

use super::command::{Command, Verb};
use super::host::ImagingHost;
use super::program::{MacroSlot, SequenceError};
use crate::config::Param;
use crate::text::{arguments, parse_int, split_verb};
use crate::traits::{Exposure, FlashKind};

/// Reasons a sequence line is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Blank line
    Empty,
    /// First token is not in the vocabulary
    UnknownVerb,
    /// Fewer arguments than the verb needs
    MissingArgument,
    /// Argument is not an integer
    InvalidNumber,
    /// Argument outside its configured bounds
    OutOfRange { value: i32, min: i32, max: i32 },
    /// The program cannot take the command
    Program(SequenceError),
}

impl From<SequenceError> for ParseError {
    fn from(e: SequenceError) -> Self {
        ParseError::Program(e)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => f.write_str("empty line"),
            ParseError::UnknownVerb => f.write_str("unknown command"),
            ParseError::MissingArgument => f.write_str("missing argument"),
            ParseError::InvalidNumber => f.write_str("argument is not a number"),
            ParseError::OutOfRange { value, min, max } => {
                write!(f, "{} outside [{}, {}]", value, min, max)
            }
            ParseError::Program(e) => write!(f, "{}", e),
        }
    }
}

/// Parse one line into a command without storing it
pub fn parse<H: ImagingHost + ?Sized>(line: &str, host: &H) -> Result<Command, ParseError> {
    let (verb, rest) = split_verb(line);
    if verb.is_empty() {
        return Err(ParseError::Empty);
    }
    let verb = Verb::lookup(verb).ok_or(ParseError::UnknownVerb)?;
    let mut args = arguments(rest);

    let command = match verb {
        Verb::Start => Command::Start,
        Verb::End => Command::End,
        Verb::Repeat => Command::Repeat {
            iterations: unsigned(bounded(args.next(), (1, host.param(Param::MaxRepeat)))?),
        },
        Verb::Delay => Command::Delay {
            micros: unsigned(bounded(args.next(), (0, host.param(Param::MaxDelay)))?),
        },
        Verb::LongDelay => Command::LongDelay {
            seconds: unsigned(bounded(args.next(), (0, host.param(Param::MaxLongDelay)))?),
        },
        Verb::Move => Command::Move {
            position: bounded(args.next(), host.bounds(Param::FocusPosition))?,
        },
        Verb::White => Command::White {
            duration_us: unsigned(bounded(args.next(), host.bounds(Param::WhiteFlash))?),
        },
        Verb::Meas => Command::Fluor {
            duration_us: unsigned(bounded(args.next(), host.bounds(Param::UvFlash))?),
        },
        Verb::Ambient => Command::Ambient {
            duration_us: unsigned(bounded(args.next(), host.bounds(Param::Ambient))?),
        },
        Verb::FocalStack => {
            let positions = host.bounds(Param::FocusPosition);
            Command::FocalStack {
                start: bounded(args.next(), positions)?,
                stop: bounded(args.next(), positions)?,
                increment: bounded(args.next(), host.bounds(Param::FocusIncrement))?,
            }
        }
    };
    Ok(command)
}

/// Parse a line and append it to `slot`
///
/// A rejected line leaves the program untouched and is reported to every
/// operator port. With `execute_immediately` an accepted command also runs
/// at once against the live hardware.
pub fn parse_command<H: ImagingHost>(
    slot: &mut MacroSlot,
    line: &str,
    host: &mut H,
    execute_immediately: bool,
) -> Result<Command, ParseError> {
    let stored = parse(line, &*host).and_then(|command| {
        slot.program.push(command)?;
        Ok(command)
    });

    match stored {
        Ok(command) => {
            if execute_immediately {
                execute_now(command, host);
            }
            Ok(command)
        }
        Err(e) => {
            host.report(format_args!("Invalid Command. {}\r\n", e));
            Err(e)
        }
    }
}

fn bounded(token: Option<&str>, (min, max): (i32, i32)) -> Result<i32, ParseError> {
    let token = token
        .filter(|t| !t.is_empty())
        .ok_or(ParseError::MissingArgument)?;
    let value = parse_int(token).ok_or(ParseError::InvalidNumber)?;
    if value < min || value > max {
        return Err(ParseError::OutOfRange { value, min, max });
    }
    Ok(value)
}

fn unsigned(value: i32) -> u32 {
    value.max(0) as u32
}

/// Interactive execution of a single command
fn execute_now<H: ImagingHost>(command: Command, host: &mut H) {
    match command {
        Command::Delay { micros } => {
            host.wait_us(micros);
        }
        Command::LongDelay { seconds } => {
            host.wait_ms(seconds.saturating_mul(1000));
        }
        Command::Move { position } => {
            if let Err(e) = host.move_lens(position) {
                host.report(format_args!("Lens move failed: {:?}\r\n", e));
            }
        }
        Command::White { duration_us } => {
            host.expose(Exposure::Flash(FlashKind::White), duration_us)
        }
        Command::Fluor { duration_us } => host.expose(Exposure::Flash(FlashKind::Uv), duration_us),
        Command::Ambient { duration_us } => host.expose(Exposure::Ambient, duration_us),
        Command::FocalStack {
            start,
            stop,
            increment,
        } => preview_focal_stack(host, start, stop, increment),
        Command::Start | Command::End | Command::Repeat { .. } => {}
    }
}

/// Step the lens through a focal stack, exposing one frame per position
fn preview_focal_stack<H: ImagingHost>(host: &mut H, start: i32, stop: i32, increment: i32) {
    let mut position = start;
    if let Err(e) = host.move_lens(position) {
        host.report(format_args!("Lens move failed: {:?}\r\n", e));
        return;
    }

    while position <= stop {
        if host.cancel_requested() {
            break;
        }
        let (exposure, duration) = host.frame_exposure();
        host.capture(exposure, duration);

        position = position.saturating_add(increment.max(1));
        if position <= stop {
            if let Err(e) = host.move_lens(position) {
                host.report(format_args!("Lens move failed: {:?}\r\n", e));
                break;
            }
        }
        host.pace_frame();
    }
    host.release_outputs();
}
