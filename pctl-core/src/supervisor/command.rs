//! Operator command vocabulary

use core::fmt;

use super::console::Mode;
use crate::text::{arguments, parse_int, parse_milli, split_verb};

/// Operator verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatorVerb {
    Cfg,
    PortPass,
    LoadSeq,
    RunSeq,
    SetTime,
    WriteConfig,
    ReadConfig,
    CameraOn,
    CameraOff,
    TestFlash,
    GoToSleep,
    Optotune,
    FocalSweep,
    MoveLens,
    StepLens,
    ResetOpto,
}

const KEYWORDS: &[(&str, OperatorVerb)] = &[
    ("CFG", OperatorVerb::Cfg),
    ("PORTPASS", OperatorVerb::PortPass),
    ("LOADSEQ", OperatorVerb::LoadSeq),
    ("RUNSEQ", OperatorVerb::RunSeq),
    ("SETTIME", OperatorVerb::SetTime),
    ("WRITECONFIG", OperatorVerb::WriteConfig),
    ("READCONFIG", OperatorVerb::ReadConfig),
    ("CAMERAON", OperatorVerb::CameraOn),
    ("CAMERAOFF", OperatorVerb::CameraOff),
    ("TESTFLASH", OperatorVerb::TestFlash),
    ("GOTOSLEEP", OperatorVerb::GoToSleep),
    ("OPTOTUNE", OperatorVerb::Optotune),
    ("FOCALSWEEP", OperatorVerb::FocalSweep),
    ("MOVELENS", OperatorVerb::MoveLens),
    ("STEPLENS", OperatorVerb::StepLens),
    ("RESETOPTO", OperatorVerb::ResetOpto),
];

impl OperatorVerb {
    pub fn lookup(token: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(token))
            .map(|&(_, verb)| verb)
    }

    /// Configuration mode only takes parameter and lens commands
    pub fn allowed_in(self, mode: Mode) -> bool {
        match mode {
            Mode::Command => true,
            Mode::Config => matches!(
                self,
                OperatorVerb::Cfg | OperatorVerb::MoveLens | OperatorVerb::StepLens
            ),
        }
    }
}

/// A parsed operator command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand<'a> {
    /// List everything, show one parameter, or set one
    Cfg {
        name: Option<&'a str>,
        value: Option<&'a str>,
    },
    PortPass { port: usize },
    LoadSeq { slot: usize },
    RunSeq { slot: usize },
    SetTime { text: &'a str },
    WriteConfig,
    ReadConfig,
    CameraOn,
    CameraOff,
    TestFlash,
    GoToSleep,
    /// Raw command for the lens controller
    Optotune { raw: &'a str },
    FocalSweep,
    /// Absolute lens move in millidiopters
    MoveLens {
        position: i32,
        increment: Option<i32>,
    },
    StepLens { delta: i32 },
    ResetOpto,
}

/// Reasons an operator line is refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Not an operator verb
    Unknown,
    /// Verb is not accepted in the current mode
    NotAllowed,
    MissingArgument,
    InvalidArgument,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Unknown => f.write_str("unknown command"),
            CommandError::NotAllowed => f.write_str("command not available in this mode"),
            CommandError::MissingArgument => f.write_str("missing argument"),
            CommandError::InvalidArgument => f.write_str("invalid argument"),
        }
    }
}

impl<'a> OperatorCommand<'a> {
    pub fn parse(line: &'a str, mode: Mode) -> Result<Self, CommandError> {
        let (verb, rest) = split_verb(line);
        let verb = OperatorVerb::lookup(verb).ok_or(CommandError::Unknown)?;
        if !verb.allowed_in(mode) {
            return Err(CommandError::NotAllowed);
        }
        let mut args = arguments(rest);

        let command = match verb {
            OperatorVerb::Cfg => OperatorCommand::Cfg {
                name: args.next().filter(|s| !s.is_empty()),
                value: args.next().filter(|s| !s.is_empty()),
            },
            OperatorVerb::PortPass => OperatorCommand::PortPass {
                port: index(args.next())?,
            },
            OperatorVerb::LoadSeq => OperatorCommand::LoadSeq {
                slot: index(args.next())?,
            },
            OperatorVerb::RunSeq => OperatorCommand::RunSeq {
                slot: index(args.next())?,
            },
            OperatorVerb::SetTime => OperatorCommand::SetTime {
                text: required(Some(rest))?,
            },
            OperatorVerb::WriteConfig => OperatorCommand::WriteConfig,
            OperatorVerb::ReadConfig => OperatorCommand::ReadConfig,
            OperatorVerb::CameraOn => OperatorCommand::CameraOn,
            OperatorVerb::CameraOff => OperatorCommand::CameraOff,
            OperatorVerb::TestFlash => OperatorCommand::TestFlash,
            OperatorVerb::GoToSleep => OperatorCommand::GoToSleep,
            OperatorVerb::Optotune => OperatorCommand::Optotune {
                raw: required(Some(rest))?,
            },
            OperatorVerb::FocalSweep => OperatorCommand::FocalSweep,
            OperatorVerb::MoveLens => OperatorCommand::MoveLens {
                position: diopters(args.next())?,
                increment: args.next().map(|t| diopters(Some(t))).transpose()?,
            },
            OperatorVerb::StepLens => OperatorCommand::StepLens {
                delta: diopters(args.next())?,
            },
            OperatorVerb::ResetOpto => OperatorCommand::ResetOpto,
        };
        Ok(command)
    }
}

fn required(token: Option<&str>) -> Result<&str, CommandError> {
    token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(CommandError::MissingArgument)
}

fn index(token: Option<&str>) -> Result<usize, CommandError> {
    let value = parse_int(required(token)?).ok_or(CommandError::InvalidArgument)?;
    usize::try_from(value).map_err(|_| CommandError::InvalidArgument)
}

/// Parse diopters with decimals into millidiopters
fn diopters(token: Option<&str>) -> Result<i32, CommandError> {
    parse_milli(required(token)?).ok_or(CommandError::InvalidArgument)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_case_insensitive() {
        assert_eq!(OperatorVerb::lookup("runseq"), Some(OperatorVerb::RunSeq));
        assert_eq!(OperatorVerb::lookup("ResetOpto"), Some(OperatorVerb::ResetOpto));
        assert_eq!(OperatorVerb::lookup("RUN"), None);
    }

    #[test]
    fn test_parse_cfg_forms() {
        assert_eq!(
            OperatorCommand::parse("CFG", Mode::Command),
            Ok(OperatorCommand::Cfg {
                name: None,
                value: None
            })
        );
        assert_eq!(
            OperatorCommand::parse("cfg,FRAMERATE", Mode::Command),
            Ok(OperatorCommand::Cfg {
                name: Some("FRAMERATE"),
                value: None
            })
        );
        assert_eq!(
            OperatorCommand::parse("CFG,FRAMERATE,5", Mode::Config),
            Ok(OperatorCommand::Cfg {
                name: Some("FRAMERATE"),
                value: Some("5")
            })
        );
    }

    #[test]
    fn test_parse_slots() {
        assert_eq!(
            OperatorCommand::parse("LOADSEQ,2", Mode::Command),
            Ok(OperatorCommand::LoadSeq { slot: 2 })
        );
        assert_eq!(
            OperatorCommand::parse("RUNSEQ,-1", Mode::Command),
            Err(CommandError::InvalidArgument)
        );
        assert_eq!(
            OperatorCommand::parse("RUNSEQ", Mode::Command),
            Err(CommandError::MissingArgument)
        );
    }

    #[test]
    fn test_parse_lens_commands() {
        assert_eq!(
            OperatorCommand::parse("MOVELENS,1.5", Mode::Command),
            Ok(OperatorCommand::MoveLens {
                position: 1500,
                increment: None
            })
        );
        assert_eq!(
            OperatorCommand::parse("MOVELENS,-0.25,0.1", Mode::Config),
            Ok(OperatorCommand::MoveLens {
                position: -250,
                increment: Some(100)
            })
        );
        assert_eq!(
            OperatorCommand::parse("STEPLENS,abc", Mode::Command),
            Err(CommandError::InvalidArgument)
        );
    }

    #[test]
    fn test_settime_keeps_whole_remainder() {
        assert_eq!(
            OperatorCommand::parse("SETTIME,2024-03-01 12:30:00", Mode::Command),
            Ok(OperatorCommand::SetTime {
                text: "2024-03-01 12:30:00"
            })
        );
    }

    #[test]
    fn test_config_mode_restrictions() {
        assert_eq!(
            OperatorCommand::parse("CAMERAON", Mode::Config),
            Err(CommandError::NotAllowed)
        );
        assert_eq!(
            OperatorCommand::parse("DELAY,5", Mode::Command),
            Err(CommandError::Unknown)
        );
    }
}
