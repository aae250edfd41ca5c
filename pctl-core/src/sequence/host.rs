//! Callbacks from the sequence engine into its controller
//!
//! The parser and executor never touch hardware directly. Configuration
//! bounds, captures, lens moves, waits and operator I/O all go through an
//! [`ImagingHost`], which the supervisor implements over the live board.

use core::fmt;

use crate::config::{ConfigError, Param};
use crate::text::Line;
use crate::timing::WaitOutcome;
use crate::traits::{Exposure, FlashKind, LensError};

/// Result of reading one operator line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRead {
    Line,
    TimedOut,
}

pub trait ImagingHost {
    /// Current value of a parameter
    fn param(&self, param: Param) -> i32;

    /// Inclusive bounds of a parameter
    fn bounds(&self, param: Param) -> (i32, i32);

    /// Store a parameter and apply its side effect
    fn set_param(&mut self, param: Param, value: i32) -> Result<(), ConfigError>;

    /// Expose one frame
    fn capture(&mut self, exposure: Exposure, duration_us: u32);

    /// Move the lens, blocking until settled
    fn move_lens(&mut self, position: i32) -> Result<(), LensError>;

    /// Cancellable wait in microseconds
    fn wait_us(&mut self, us: u32) -> WaitOutcome;

    /// Cancellable wait in milliseconds
    fn wait_ms(&mut self, ms: u32) -> WaitOutcome;

    /// Uncancellable wait
    fn pause_us(&mut self, us: u32);

    /// Poll operator ports for the cancellation byte
    fn cancel_requested(&mut self) -> bool;

    /// Write a message to every operator port
    fn report(&mut self, message: fmt::Arguments<'_>);

    /// Print `prompt` and read one line from the active operator port
    fn read_line(&mut self, prompt: &str, line: &mut Line) -> LineRead;

    /// Deassert every camera and strobe output
    fn release_outputs(&mut self);

    /// Wait one frame interval at the configured frame rate
    fn pace_frame(&mut self) {
        let rate = self.param(Param::FrameRate);
        if rate > 0 {
            self.pause_us(1_000_000 / rate as u32);
        }
    }

    /// Record the exposure as the current FLASHTYPE and duration, then capture
    ///
    /// A setting that cannot be stored is reported; the frame is still taken.
    fn expose(&mut self, exposure: Exposure, duration_us: u32) {
        let duration_param = match exposure {
            Exposure::Flash(FlashKind::White) => Param::WhiteFlash,
            Exposure::Flash(FlashKind::Uv) => Param::UvFlash,
            Exposure::Ambient => Param::Ambient,
        };
        let duration = i32::try_from(duration_us).unwrap_or(i32::MAX);
        for (param, value) in [
            (duration_param, duration),
            (Param::FlashType, exposure.flash_type()),
        ] {
            if let Err(e) = self.set_param(param, value) {
                self.report(format_args!("{} not updated: {}\r\n", param.name(), e));
            }
        }
        self.capture(exposure, duration_us);
    }

    /// Exposure and duration selected by FLASHTYPE
    fn frame_exposure(&self) -> (Exposure, u32) {
        let exposure = Exposure::from_flash_type(self.param(Param::FlashType));
        let duration = match exposure {
            Exposure::Flash(FlashKind::White) => self.param(Param::WhiteFlash),
            Exposure::Flash(FlashKind::Uv) => self.param(Param::UvFlash),
            Exposure::Ambient => self.param(Param::Ambient),
        };
        (exposure, duration.max(0) as u32)
    }
}
