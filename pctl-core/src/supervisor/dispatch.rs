//! Operator command handlers

use super::command::{CommandError, OperatorCommand};
use super::console::Mode;
use super::host::SequenceContext;
use super::Supervisor;
use crate::config::{Param, ParamEntry};
use crate::sequence::{load_program, parse_command, Flow, Verb, MAX_MACROS};
use crate::text::{parse_int, split_verb};
use crate::traits::lens::DEFAULT_RAMP_MDPT;
use crate::traits::{
    Board, Capture, DateTime, FlashKind, LensActuator, LensError, RealTimeClock, SerialPort,
    Watchdog,
};

/// Flash self-test pulse geometry
const TEST_FLASH_WIDTH_US: u32 = 5000;
const TEST_FLASH_US: u32 = 20;
const TEST_FLASH_PERIOD_MS: u32 = 50;
/// Every nth test pulse uses the UV flash
const TEST_FLASH_UV_EVERY: u32 = 20;

impl<B: Board> Supervisor<B> {
    /// Handle one operator line received on `port`
    pub(crate) fn dispatch(&mut self, port: usize, mode: Mode, line: &str) {
        if line.trim().is_empty() {
            return;
        }

        match OperatorCommand::parse(line, mode) {
            Ok(command) => self.execute(port, command),
            Err(CommandError::Unknown)
                if mode == Mode::Command && Verb::lookup(split_verb(line).0).is_some() =>
            {
                let mut host = SequenceContext::new(&mut self.hw, &mut self.params, port);
                let _ = parse_command(&mut self.scratch, line, &mut host, true);
            }
            Err(e) => self
                .hw
                .ports
                .write_to(port, format_args!("Invalid Command. {}\r\n", e)),
        }
    }

    fn execute(&mut self, port: usize, command: OperatorCommand<'_>) {
        match command {
            OperatorCommand::Cfg { name: None, .. } => self.list_config(port),
            OperatorCommand::Cfg {
                name: Some(name),
                value,
            } => self.configure(port, name, value),
            OperatorCommand::PortPass { port: target } => {
                if target == port || target >= self.hw.ports.len() {
                    self.hw
                        .ports
                        .write_to(port, format_args!("Invalid port {}\r\n", target));
                    return;
                }
                self.hw.ports.write_to(
                    port,
                    format_args!("Passing through to hardware port {}\r\n\r\n", target),
                );
                self.pass_through(port, target);
            }
            OperatorCommand::LoadSeq { slot } => self.load(port, slot),
            OperatorCommand::RunSeq { slot } => self.run_slot(port, slot),
            OperatorCommand::SetTime { text } => match DateTime::parse(text) {
                Ok(time) => {
                    self.hw
                        .ports
                        .write_to(port, format_args!("\r\nUpdating clock...\r\n"));
                    self.hw.rtc.set(time);
                }
                Err(e) => self
                    .hw
                    .ports
                    .write_to(port, format_args!("Invalid time: {}\r\n", e)),
            },
            OperatorCommand::WriteConfig => match self.persist() {
                Ok(()) => self
                    .hw
                    .ports
                    .write_to(port, format_args!("Configuration saved\r\n")),
                Err(e) => self
                    .hw
                    .ports
                    .write_to(port, format_args!("Configuration not saved: {}\r\n", e)),
            },
            OperatorCommand::ReadConfig => match self.reload() {
                Ok(()) => self
                    .hw
                    .ports
                    .write_to(port, format_args!("Configuration loaded\r\n")),
                Err(e) => self
                    .hw
                    .ports
                    .write_to(port, format_args!("Configuration not loaded: {}\r\n", e)),
            },
            OperatorCommand::CameraOn => {
                if self.confirm(port, "Are you sure you want to power ON camera ? [y/N]: ")
                    && !self.turn_on()
                {
                    self.hw
                        .ports
                        .write_to(port, format_args!("Camera power unchanged\r\n"));
                }
            }
            OperatorCommand::CameraOff => {
                if self.confirm(port, "Are you sure you want to power OFF camera ? [y/N]: ")
                    && !self.turn_off()
                {
                    self.hw
                        .ports
                        .write_to(port, format_args!("Camera power unchanged\r\n"));
                }
            }
            OperatorCommand::TestFlash => self.test_flash(),
            OperatorCommand::GoToSleep => self.go_to_sleep(),
            OperatorCommand::Optotune { raw } => {
                let result = self.hw.lens.send_raw(raw);
                self.report_lens(port, result);
            }
            OperatorCommand::FocalSweep => {
                let result = self.hw.lens.sweep();
                self.report_lens(port, result);
            }
            OperatorCommand::MoveLens {
                position,
                increment,
            } => {
                let result = self
                    .hw
                    .lens
                    .ramp_to(position, increment.unwrap_or(DEFAULT_RAMP_MDPT));
                self.report_lens(port, result);
            }
            OperatorCommand::StepLens { delta } => {
                let result = self.hw.lens.step(delta);
                self.report_lens(port, result);
            }
            OperatorCommand::ResetOpto => {
                self.hw.watchdog.feed();
                let result = self.hw.lens.reset();
                self.report_lens(port, result);
            }
        }
    }

    fn list_config(&mut self, port: usize) {
        let time = self.hw.rtc.now();
        self.hw.ports.write_to(port, format_args!("\r\n{}\r\n", time));
        for param in Param::ALL {
            let entry = ParamEntry {
                registry: &self.params,
                param,
            };
            self.hw.ports.write_to(port, format_args!("{}\r\n", entry));
        }
    }

    fn configure(&mut self, port: usize, name: &str, value: Option<&str>) {
        let Some(param) = Param::from_name(name) else {
            self.hw
                .ports
                .write_to(port, format_args!("Unknown parameter {}\r\n", name));
            return;
        };

        if let Some(text) = value {
            let Some(value) = parse_int(text) else {
                self.hw
                    .ports
                    .write_to(port, format_args!("Invalid value {}\r\n", text));
                return;
            };
            if let Err(e) = self.set_param(param, value) {
                self.hw
                    .ports
                    .write_to(port, format_args!("{} not updated: {}\r\n", param.name(), e));
                return;
            }
        }

        let entry = ParamEntry {
            registry: &self.params,
            param,
        };
        self.hw.ports.write_to(port, format_args!("{}\r\n", entry));
    }

    fn load(&mut self, port: usize, slot: usize) {
        let Some(target) = self.macros.get_mut(slot) else {
            self.hw.ports.write_to(
                port,
                format_args!("Invalid slot {} (0..{})\r\n", slot, MAX_MACROS - 1),
            );
            return;
        };
        self.hw.ports.write_to(port, format_args!("\r\n"));
        let mut host = SequenceContext::new(&mut self.hw, &mut self.params, port);
        let summary = load_program(target, &mut host);
        self.hw.ports.write_to(
            port,
            format_args!(
                "\r\nSlot {}: {} commands loaded, {} rejected\r\n",
                slot, summary.accepted, summary.rejected
            ),
        );
    }

    fn run_slot(&mut self, port: usize, slot: usize) {
        if slot >= MAX_MACROS {
            self.hw.ports.write_to(
                port,
                format_args!("Invalid slot {} (0..{})\r\n", slot, MAX_MACROS - 1),
            );
            return;
        }
        match self.run_macro(slot, port) {
            Ok(Flow::Completed) => {}
            Ok(Flow::Terminated) => self
                .hw
                .ports
                .broadcast(format_args!("Sequence {} terminated\r\n", slot)),
            Err(e) => self
                .hw
                .ports
                .broadcast(format_args!("Sequence {} failed: {}\r\n", slot, e)),
        }
    }

    /// Pulse the flashes until a byte arrives on the debug port
    fn test_flash(&mut self) {
        let debug = self.hw.ports.debug_index();
        if let Some(p) = self.hw.ports.get_mut(debug) {
            p.flush();
            p.clear_input();
        }

        let mut count: u32 = 0;
        loop {
            let stop = self
                .hw
                .ports
                .get_mut(debug)
                .map_or(true, |p| p.read_byte().is_some());
            if stop {
                break;
            }

            let flash = if count % TEST_FLASH_UV_EVERY == 0 {
                FlashKind::Uv
            } else {
                FlashKind::White
            };
            self.hw
                .strobe
                .pulse(flash, TEST_FLASH_WIDTH_US, TEST_FLASH_US);
            self.hw.watchdog.feed();
            count = count.wrapping_add(1);
            self.hw.settle_ms(TEST_FLASH_PERIOD_MS);
        }
        self.hw.strobe.release();
    }

    fn report_lens(&mut self, port: usize, result: Result<(), LensError>) {
        if let Err(e) = result {
            self.hw
                .ports
                .write_to(port, format_args!("Lens command failed: {:?}\r\n", e));
        }
    }
}
