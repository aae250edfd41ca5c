//! Interactive program loading

use super::host::{ImagingHost, LineRead};
use super::parser::parse_command;
use super::program::MacroSlot;
use crate::text::Line;

/// Prompt shown for every line of a program being loaded
pub const LOAD_PROMPT: &str = "\rLOAD > ";

/// Outcome of a load session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoadSummary {
    /// Lines stored in the program
    pub accepted: u16,
    /// Lines rejected with a diagnostic
    pub rejected: u16,
    /// Session ended on the idle timeout rather than `END`
    pub timed_out: bool,
}

/// Replace the program in `slot` with lines read from the operator
///
/// Reading stops at a line containing only `END` or when no line arrives
/// within the command timeout. The terminating `END` is not stored.
pub fn load_program<H: ImagingHost>(slot: &mut MacroSlot, host: &mut H) -> LoadSummary {
    slot.reset();
    let mut summary = LoadSummary::default();
    let mut line = Line::new();

    loop {
        line.clear();
        if host.read_line(LOAD_PROMPT, &mut line) == LineRead::TimedOut {
            summary.timed_out = true;
            break;
        }

        let text = line.trim();
        if text.eq_ignore_ascii_case("end") {
            break;
        }
        if text.is_empty() {
            continue;
        }

        match parse_command(slot, text, host, false) {
            Ok(_) => summary.accepted += 1,
            Err(_) => summary.rejected += 1,
        }
    }

    summary
}
