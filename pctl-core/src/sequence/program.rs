//! Sequence storage and execution state

use core::fmt;

use heapless::Vec;

use super::command::Command;
use crate::traits::LensError;

/// Commands a single program can hold
pub const MAX_COMMANDS: usize = 512;

/// Nesting depth of `START` blocks
pub const MAX_BLOCK_DEPTH: usize = 16;

/// Executor call depth: the top-level run plus one frame per nested block
pub const MAX_RECURSION: usize = MAX_BLOCK_DEPTH + 1;

/// Number of macro slots
pub const MAX_MACROS: usize = 6;

/// Errors from building or running a program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequenceError {
    /// Program already holds [`MAX_COMMANDS`] commands
    ProgramFull,
    /// More than [`MAX_BLOCK_DEPTH`] open `START` blocks
    BlockStackOverflow,
    /// Executor exceeded [`MAX_RECURSION`] nested runs
    RecursionLimit,
    /// Lens move failed
    Lens(LensError),
}

impl From<LensError> for SequenceError {
    fn from(e: LensError) -> Self {
        SequenceError::Lens(e)
    }
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceError::ProgramFull => write!(f, "program full ({} commands)", MAX_COMMANDS),
            SequenceError::BlockStackOverflow => {
                write!(f, "too many nested START blocks (max {})", MAX_BLOCK_DEPTH)
            }
            SequenceError::RecursionLimit => f.write_str("recursion limit reached"),
            SequenceError::Lens(e) => write!(f, "lens error: {:?}", e),
        }
    }
}

/// A stored command plus the index of its block partner
///
/// A `START` records the index of the `REPEAT`/`FOCALSTACK` that closes it
/// and the closer records its `START`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub command: Command,
    pub partner: Option<u16>,
}

/// Bounded, append-only command list
#[derive(Debug, Clone, Default)]
pub struct SequenceProgram {
    entries: Vec<Entry, MAX_COMMANDS>,
    open_blocks: Vec<u16, MAX_BLOCK_DEPTH>,
}

impl SequenceProgram {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            open_blocks: Vec::new(),
        }
    }

    /// Remove every command
    pub fn clear(&mut self) {
        self.entries.clear();
        self.open_blocks.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.entries.iter().map(|e| &e.command)
    }

    /// Append a command
    ///
    /// Fails without modifying the program when it is full or when a
    /// `START` would exceed the block depth.
    pub fn push(&mut self, command: Command) -> Result<(), SequenceError> {
        if self.entries.is_full() {
            return Err(SequenceError::ProgramFull);
        }
        let index = self.entries.len() as u16;

        let mut partner = None;
        match command {
            Command::Start => {
                self.open_blocks
                    .push(index)
                    .map_err(|_| SequenceError::BlockStackOverflow)?;
            }
            c if c.closes_block() => {
                if let Some(start) = self.open_blocks.pop() {
                    self.entries[usize::from(start)].partner = Some(index);
                    partner = Some(start);
                }
            }
            _ => {}
        }

        self.entries
            .push(Entry { command, partner })
            .map_err(|_| SequenceError::ProgramFull)
    }
}

/// Mutable state of one program's execution
///
/// The command list is only read while running; this is the single
/// context shared by every recursive frame.
#[derive(Debug, Clone, Default)]
pub struct ExecutionState {
    end: bool,
    blocks: Vec<u16, MAX_BLOCK_DEPTH>,
    depth: usize,
}

impl ExecutionState {
    pub const fn new() -> Self {
        Self {
            end: false,
            blocks: Vec::new(),
            depth: 0,
        }
    }

    /// Fresh state for a newly loaded program
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Clear the block stack before a top-level run; the end latch is kept
    pub fn prepare_run(&mut self) {
        self.blocks.clear();
        self.depth = 0;
    }

    /// Whether the program reached `END` or was cancelled
    pub fn is_ended(&self) -> bool {
        self.end
    }

    pub fn terminate(&mut self) {
        self.end = true;
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn open_blocks(&self) -> usize {
        self.blocks.len()
    }

    pub(crate) fn push_block(&mut self, index: usize) -> Result<(), SequenceError> {
        self.blocks
            .push(index as u16)
            .map_err(|_| SequenceError::BlockStackOverflow)
    }

    pub(crate) fn pop_block(&mut self) -> Option<usize> {
        self.blocks.pop().map(usize::from)
    }

    pub(crate) fn enter(&mut self) -> Result<(), SequenceError> {
        if self.depth >= MAX_RECURSION {
            return Err(SequenceError::RecursionLimit);
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// A program and its execution state
#[derive(Debug, Clone, Default)]
pub struct MacroSlot {
    pub program: SequenceProgram,
    pub state: ExecutionState,
}

impl MacroSlot {
    pub const fn new() -> Self {
        Self {
            program: SequenceProgram::new(),
            state: ExecutionState::new(),
        }
    }

    /// Empty the program and clear its end latch
    pub fn reset(&mut self) {
        self.program.clear();
        self.state.reset();
    }
}
