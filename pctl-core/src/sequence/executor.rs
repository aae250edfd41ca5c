//! Recursive sequence executor
//!
//! A `START` opens a block; `REPEAT` and `FOCALSTACK` close the most
//! recent block and replay it by recursing over the enclosed range. All
//! frames share one [`ExecutionState`]; the program itself is only read.

use super::command::Command;
use super::host::ImagingHost;
use super::program::{ExecutionState, SequenceError, SequenceProgram};
use crate::timing::WaitOutcome;
use crate::traits::{Exposure, FlashKind};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Flow {
    /// Reached the end of the range
    Completed,
    /// Hit `END` or was cancelled; every enclosing frame must stop
    Terminated,
}

pub struct Executor<'a, H> {
    program: &'a SequenceProgram,
    state: &'a mut ExecutionState,
    host: &'a mut H,
}

impl<'a, H: ImagingHost> Executor<'a, H> {
    pub fn new(program: &'a SequenceProgram, state: &'a mut ExecutionState, host: &'a mut H) -> Self {
        Self {
            program,
            state,
            host,
        }
    }

    /// Run the whole program from a clean block stack
    ///
    /// Outputs are released however the run ends.
    pub fn run_program(&mut self) -> Result<Flow, SequenceError> {
        self.state.prepare_run();
        let result = self.run(0, self.program.len());
        self.host.release_outputs();
        if result != Ok(Flow::Completed) {
            self.state.terminate();
        }
        result
    }

    /// Execute commands `start..end`
    ///
    /// Returns immediately if the program has already terminated.
    pub fn run(&mut self, start: usize, end: usize) -> Result<Flow, SequenceError> {
        if self.state.is_ended() {
            return Ok(Flow::Terminated);
        }
        self.state.enter()?;
        let result = self.run_range(start, end.min(self.program.len()));
        self.state.leave();

        if result == Ok(Flow::Terminated) {
            self.state.terminate();
        }
        result
    }

    fn run_range(&mut self, start: usize, end: usize) -> Result<Flow, SequenceError> {
        let mut index = start;
        while index < end {
            let Some(entry) = self.program.get(index).copied() else {
                break;
            };
            self.host
                .report(format_args!("{} : {}\r\n", index, entry.command));

            let flow = match entry.command {
                Command::Start => {
                    self.state.push_block(index)?;
                    // A focal-stack body runs only inside the stack loop
                    if let Some(closer) = entry.partner.map(usize::from) {
                        let is_stack = matches!(
                            self.program.get(closer).map(|e| e.command),
                            Some(Command::FocalStack { .. })
                        );
                        if is_stack && closer < end {
                            index = closer;
                            continue;
                        }
                    }
                    Flow::Completed
                }
                Command::End => Flow::Terminated,
                Command::Repeat { iterations } => self.repeat(index, iterations)?,
                Command::Delay { micros } => wait_flow(self.host.wait_us(micros)),
                Command::LongDelay { seconds } => {
                    wait_flow(self.host.wait_ms(seconds.saturating_mul(1000)))
                }
                Command::Move { position } => {
                    self.host.move_lens(position)?;
                    Flow::Completed
                }
                Command::FocalStack {
                    start,
                    stop,
                    increment,
                } => self.focal_stack(index, start, stop, increment)?,
                Command::White { duration_us } => {
                    self.host
                        .expose(Exposure::Flash(FlashKind::White), duration_us);
                    Flow::Completed
                }
                Command::Fluor { duration_us } => {
                    self.host.expose(Exposure::Flash(FlashKind::Uv), duration_us);
                    Flow::Completed
                }
                Command::Ambient { duration_us } => {
                    self.host.expose(Exposure::Ambient, duration_us);
                    Flow::Completed
                }
            };

            if flow == Flow::Terminated {
                return Ok(Flow::Terminated);
            }

            self.host.pace_frame();
            index += 1;
        }
        Ok(Flow::Completed)
    }

    /// Replay the block closed at `index`; the forward pass counts as the first run
    fn repeat(&mut self, index: usize, iterations: u32) -> Result<Flow, SequenceError> {
        let body = self.state.pop_block().map_or(0, |start| start + 1);
        for _ in 1..iterations {
            if self.run(body, index)? == Flow::Terminated {
                return Ok(Flow::Terminated);
            }
        }
        Ok(Flow::Completed)
    }

    fn focal_stack(
        &mut self,
        index: usize,
        start: i32,
        stop: i32,
        increment: i32,
    ) -> Result<Flow, SequenceError> {
        let body = self.state.pop_block().map_or(0, |start| start + 1);
        let increment = increment.max(1);

        let mut position = start;
        self.host.move_lens(position)?;
        while position <= stop {
            if self.host.cancel_requested() {
                return Ok(Flow::Terminated);
            }
            if self.run(body, index)? == Flow::Terminated {
                return Ok(Flow::Terminated);
            }
            position = position.saturating_add(increment);
            if position <= stop {
                self.host.move_lens(position)?;
            }
            self.host.pace_frame();
        }
        Ok(Flow::Completed)
    }
}

fn wait_flow(outcome: WaitOutcome) -> Flow {
    match outcome {
        WaitOutcome::Elapsed => Flow::Completed,
        WaitOutcome::Cancelled => Flow::Terminated,
    }
}
