//! The live board as seen by the sequence engine

use core::fmt;

use super::console::LineEditor;
use super::hardware::Hardware;
use super::session::{read_line, LineEvent};
use crate::config::{ConfigError, ConfigRegistry, Param, ParamEffect, ParamTable};
use crate::sequence::{ImagingHost, LineRead};
use crate::text::Line;
use crate::timing::{CancellableDelay, WaitOutcome};
use crate::traits::{
    Board, Capture, Exposure, LensActuator, LensError, TriggerControl, Watchdog,
};
use crate::trigger::TriggerSettings;

/// Push trigger settings derived from the current parameters
pub(crate) fn apply_effect<B: Board>(hw: &mut Hardware<B>, params: &ParamTable, effect: ParamEffect) {
    match effect {
        ParamEffect::Triggers | ParamEffect::Flashes => {
            hw.trigger.configure(TriggerSettings::from_registry(params))
        }
    }
}

/// Hardware and parameters borrowed for one sequence operation
///
/// `port` is the operator port that started it; prompts and line input
/// use that port while reports go to every port.
pub struct SequenceContext<'a, B: Board> {
    hw: &'a mut Hardware<B>,
    params: &'a mut ParamTable,
    port: usize,
}

impl<'a, B: Board> SequenceContext<'a, B> {
    pub fn new(hw: &'a mut Hardware<B>, params: &'a mut ParamTable, port: usize) -> Self {
        Self { hw, params, port }
    }
}

impl<B: Board> ImagingHost for SequenceContext<'_, B> {
    fn param(&self, param: Param) -> i32 {
        self.params.get(param)
    }

    fn bounds(&self, param: Param) -> (i32, i32) {
        (self.params.min(param), self.params.max(param))
    }

    fn set_param(&mut self, param: Param, value: i32) -> Result<(), ConfigError> {
        if let Some(effect) = self.params.set(param, value)? {
            apply_effect(self.hw, self.params, effect);
        }
        Ok(())
    }

    fn capture(&mut self, exposure: Exposure, duration_us: u32) {
        self.hw.strobe.capture(exposure, duration_us);
    }

    fn move_lens(&mut self, position: i32) -> Result<(), LensError> {
        self.hw.watchdog.feed();
        let result = self.hw.lens.move_to(position);
        self.hw.watchdog.feed();
        result
    }

    fn wait_us(&mut self, us: u32) -> WaitOutcome {
        let delay = CancellableDelay::micros(&self.hw.clock, us);
        self.hw.wait(delay)
    }

    fn wait_ms(&mut self, ms: u32) -> WaitOutcome {
        let delay = CancellableDelay::millis(&self.hw.clock, ms);
        self.hw.wait(delay)
    }

    fn pause_us(&mut self, us: u32) {
        self.hw.settle_us(us);
    }

    fn cancel_requested(&mut self) -> bool {
        self.hw.watchdog.feed();
        self.hw.ports.escape_received()
    }

    fn report(&mut self, message: fmt::Arguments<'_>) {
        self.hw.ports.broadcast(message);
    }

    fn read_line(&mut self, prompt: &str, line: &mut Line) -> LineRead {
        self.hw.ports.write_to(self.port, format_args!("{}", prompt));
        let echo = self.params.get(Param::LocalEcho) == 1;
        let timeout = self.params.get(Param::CommandTimeout).max(0) as u32;
        match read_line(self.hw, self.port, line, &LineEditor::new(None), echo, timeout) {
            LineEvent::Line | LineEvent::Exit => LineRead::Line,
            LineEvent::Overflow => {
                self.hw
                    .ports
                    .write_to(self.port, format_args!("Line too long\r\n"));
                line.clear();
                LineRead::Line
            }
            LineEvent::TimedOut => LineRead::TimedOut,
        }
    }

    fn release_outputs(&mut self) {
        self.hw.strobe.release();
    }
}
