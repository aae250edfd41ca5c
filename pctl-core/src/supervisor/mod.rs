//! Supervisory controller
//!
//! [`Supervisor`] owns the board, the parameter table and the macro slots.
//! Each [`tick`](Supervisor::tick) samples the sensors, emits the status
//! line, serves any operator session that was opened, and runs the
//! environment and voltage checks. Nothing here runs concurrently; the
//! frame trigger only receives settings through [`TriggerControl`].

pub mod command;
pub mod console;
mod dispatch;
pub mod hardware;
pub mod host;
pub mod power;
pub mod safety;
pub mod session;
pub mod status;

pub use command::{CommandError, OperatorCommand, OperatorVerb};
pub use console::{Mode, COMMAND_CHAR, CONFIG_CHAR, PORT_BREAK_CHAR, PROMPT};
pub use hardware::{Hardware, PortBank, MAX_PORTS};
pub use host::SequenceContext;
pub use power::{standby_alarm, PowerGuard, POWER_SETTLE_MS};
pub use safety::{Finding, SafetyAction, SafetyLimits, SafetyMonitor, USB_POWER_FLOOR_MV};
pub use status::StatusLine;

use crate::config::{ConfigError, ConfigRegistry, Param, ParamEffect, ParamTable};
use crate::sequence::{Executor, Flow, MacroSlot, SequenceError, MAX_MACROS};
use crate::traits::{
    Board, Clock, EnvironmentSample, EnvironmentSensors, LensActuator, PayloadPower,
    RealTimeClock, TriggerControl, Watchdog, WATCHDOG_TIMEOUT_MS,
};

use host::apply_effect;

pub struct Supervisor<B: Board> {
    hw: Hardware<B>,
    params: ParamTable,
    macros: [MacroSlot; MAX_MACROS],
    /// Commands entered interactively in the current command session
    scratch: MacroSlot,
    power: PowerGuard,
    safety: SafetyMonitor,
    sample: EnvironmentSample,
}

impl<B: Board> Supervisor<B> {
    /// Take ownership of the board with default parameters
    pub fn new(hw: Hardware<B>) -> Self {
        let boot_s = hw.clock.now_s();
        Self {
            hw,
            params: ParamTable::new(),
            macros: Default::default(),
            scratch: MacroSlot::new(),
            power: PowerGuard::new(boot_s),
            safety: SafetyMonitor::new(boot_s),
            sample: EnvironmentSample::default(),
        }
    }

    /// Load stored parameters, push derived settings and arm the watchdog
    ///
    /// A missing or unreadable parameter image leaves the defaults in place.
    pub fn start(&mut self) {
        match self.params.reload(&mut self.hw.store) {
            Ok(()) => {
                #[cfg(feature = "defmt")]
                defmt::info!("parameters loaded from flash");
            }
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("using default parameters: {}", e);
                self.hw
                    .ports
                    .write_debug(format_args!("Using default configuration ({})\r\n", e));
            }
        }
        self.apply_all_effects();

        if self.params.get(Param::Watchdog) == 1 {
            self.hw.watchdog.start(WATCHDOG_TIMEOUT_MS);
        }
    }

    /// One pass of the control loop
    pub fn tick(&mut self) {
        self.hw.watchdog.feed();

        match self.hw.sensors.sample() {
            Ok(sample) => {
                self.sample = sample;
                self.check_safety();
            }
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("sensor read failed: {}", _e);
            }
        }

        self.write_status();
        self.poll_ports();
    }

    /// Tick forever, one pass every LOGINT milliseconds
    pub fn run(&mut self) -> ! {
        loop {
            self.tick();
            let period = self.params.get(Param::LogInterval).max(0) as u32;
            self.hw.settle_ms(period);
        }
    }

    pub fn params(&self) -> &ParamTable {
        &self.params
    }

    pub fn hardware(&self) -> &Hardware<B> {
        &self.hw
    }

    pub fn hardware_mut(&mut self) -> &mut Hardware<B> {
        &mut self.hw
    }

    pub fn macro_slot(&self, slot: usize) -> Option<&MacroSlot> {
        self.macros.get(slot)
    }

    /// Commands recorded in the current interactive session
    pub fn scratch(&self) -> &MacroSlot {
        &self.scratch
    }

    pub fn camera_on(&self) -> bool {
        self.power.is_on()
    }

    pub fn environment_fault(&self) -> bool {
        self.safety.environment_fault()
    }

    pub fn last_sample(&self) -> &EnvironmentSample {
        &self.sample
    }

    /// Store a parameter and apply its side effect
    pub fn set_param(&mut self, param: Param, value: i32) -> Result<(), ConfigError> {
        if let Some(effect) = self.params.set(param, value)? {
            apply_effect(&mut self.hw, &self.params, effect);
        }
        Ok(())
    }

    /// Write the parameter image to flash
    pub fn persist(&mut self) -> Result<(), ConfigError> {
        self.params.persist(&mut self.hw.store)
    }

    /// Reload the parameter image and reapply every effect
    pub fn reload(&mut self) -> Result<(), ConfigError> {
        self.params.reload(&mut self.hw.store)?;
        self.apply_all_effects();
        Ok(())
    }

    fn apply_all_effects(&mut self) {
        apply_effect(&mut self.hw, &self.params, ParamEffect::Triggers);
    }

    /// Run the program in `slot` from the beginning
    ///
    /// A program that already reached `END` or was cancelled returns
    /// [`Flow::Terminated`] without running anything until it is reloaded.
    pub fn run_macro(&mut self, slot: usize, port: usize) -> Result<Flow, SequenceError> {
        let Some(slot) = self.macros.get_mut(slot) else {
            return Ok(Flow::Completed);
        };
        let mut host = SequenceContext::new(&mut self.hw, &mut self.params, port);
        let result = Executor::new(&slot.program, &mut slot.state, &mut host).run_program();

        #[cfg(feature = "defmt")]
        if let Ok(Flow::Terminated) = result {
            defmt::info!("sequence terminated");
        }
        result
    }

    /// Switch payload power on, subject to the guard interval
    ///
    /// Returns false without touching any output if the payload is already
    /// on or was switched off less than CAMGUARD seconds ago.
    pub fn turn_on(&mut self) -> bool {
        let guard = self.guard_s();
        if !self.power.may_turn_on(self.hw.clock.now_s(), guard) {
            return false;
        }

        #[cfg(feature = "defmt")]
        defmt::info!("camera power on");
        self.hw
            .ports
            .write_debug(format_args!("Turning ON camera power...\r\n"));
        self.hw.power.set_enabled(true);
        self.hw.settle_ms(POWER_SETTLE_MS);

        if let Err(e) = self.hw.lens.connect() {
            self.hw
                .ports
                .broadcast(format_args!("Lens controller not responding: {:?}\r\n", e));
        }
        self.power.record_on(self.hw.clock.now_s());
        true
    }

    /// Switch payload power off, subject to the guard interval
    pub fn turn_off(&mut self) -> bool {
        let now = self.hw.clock.now_s();
        if !self.power.may_turn_off(now, self.guard_s()) {
            return false;
        }

        #[cfg(feature = "defmt")]
        defmt::info!("camera power off");
        self.hw
            .ports
            .write_debug(format_args!("Turning OFF camera power...\r\n"));
        self.hw.power.set_enabled(false);
        self.power.record_off(now);
        true
    }

    /// Ask the host computer to shut down; there is no acknowledgement
    pub fn send_shutdown(&mut self) {
        if self.power.is_on() {
            #[cfg(feature = "defmt")]
            defmt::warn!("requesting host shutdown");
            self.hw
                .ports
                .write_debug(format_args!("Sending to host: sudo shutdown -h now\r\n"));
            self.hw
                .ports
                .write_host(format_args!("sudo shutdown -h now\r\n"));
        } else {
            self.hw.ports.write_debug(format_args!(
                "Camera not powered on, not sending shutdown command\r\n"
            ));
        }
    }

    /// Arm the RTC alarm and, if STANDBY is set, halt until it fires
    pub fn go_to_sleep(&mut self) {
        self.hw
            .ports
            .broadcast(format_args!("Going to sleep...\r\n"));
        let hourly = self.params.get(Param::CheckHourly) == 1;
        self.hw.ports.broadcast(format_args!(
            "Alarm Set for 1 {}\r\n",
            if hourly { "Hour" } else { "Minute" }
        ));
        self.hw.rtc.set_alarm(standby_alarm(hourly));

        if self.params.get(Param::Standby) == 1 {
            #[cfg(feature = "defmt")]
            defmt::info!("entering standby");
            self.hw.watchdog.stop();
            self.hw.rtc.standby();
            if self.params.get(Param::Watchdog) == 1 {
                self.hw.watchdog.start(WATCHDOG_TIMEOUT_MS);
            }
        }
    }

    fn check_safety(&mut self) {
        let limits = SafetyLimits::from_registry(&self.params);
        let now = self.hw.clock.now_s();
        let findings = self.safety.observe(now, &self.sample, &limits);
        let standby = self.params.get(Param::Standby) == 1;

        for finding in findings.iter() {
            #[cfg(feature = "defmt")]
            defmt::warn!("safety: {}", finding);
            self.hw.ports.broadcast(format_args!("{}\r\n", finding));

            match finding.action(self.power.is_on(), standby) {
                SafetyAction::RequestShutdown => {
                    if finding.is_environment() {
                        self.hw
                            .ports
                            .broadcast(format_args!("Shutting down camera...\r\n"));
                    }
                    self.send_shutdown();
                }
                SafetyAction::Standby => self.go_to_sleep(),
                SafetyAction::None => {}
            }
        }
    }

    fn write_status(&mut self) {
        let time = self.hw.rtc.now();
        let line = StatusLine {
            time,
            millis: (self.hw.clock.now_ms() % 1000) as u16,
            sample: &self.sample,
            camera_on: self.power.is_on(),
            images: self.hw.trigger.image_count(),
        };
        self.hw.ports.broadcast(format_args!("{}\r\n", line));
    }

    fn guard_s(&self) -> u32 {
        self.params.get(Param::CameraGuard).max(0) as u32
    }
}
