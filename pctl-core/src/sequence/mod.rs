//! Imaging sequence engine
//!
//! A small macro language for image capture: timed waits, lens moves,
//! flash and ambient exposures, and `START` blocks closed by `REPEAT` or
//! `FOCALSTACK`. Programs are parsed line by line into a bounded
//! [`SequenceProgram`] and interpreted by a recursive [`Executor`].

pub mod command;
pub mod executor;
pub mod host;
pub mod loader;
pub mod parser;
pub mod program;

pub use command::{Command, Verb};
pub use executor::{Executor, Flow};
pub use host::{ImagingHost, LineRead};
pub use loader::{load_program, LoadSummary, LOAD_PROMPT};
pub use parser::{parse, parse_command, ParseError};
pub use program::{
    Entry, ExecutionState, MacroSlot, SequenceError, SequenceProgram, MAX_BLOCK_DEPTH,
    MAX_COMMANDS, MAX_MACROS, MAX_RECURSION,
};
