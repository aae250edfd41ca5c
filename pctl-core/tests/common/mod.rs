#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use pctl_core::config::{ConfigError, ConfigRegistry, Param, ParamTable};
use pctl_core::sequence::{ImagingHost, LineRead};
use pctl_core::supervisor::{Hardware, PortBank, Supervisor};
use pctl_core::text::Line;
use pctl_core::timing::WaitOutcome;
use pctl_core::traits::{
    AlarmMatch, Board, Capture, Clock, DateTime, EnvironmentSample, EnvironmentSensors, Exposure,
    FlashKind, LensActuator, LensError, ParamStore, PayloadPower, RealTimeClock, SensorError,
    SerialPort, StoreError, TriggerControl, Watchdog,
};
use pctl_core::trigger::TriggerSettings;

/// Something the strobe or lens did, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Capture {
        exposure: Exposure,
        duration_us: u32,
        lens_mdpt: i32,
    },
    Pulse {
        flash: FlashKind,
        flash_us: u32,
    },
    Release,
    LensMove(i32),
}

pub type EventLog = Rc<RefCell<Vec<Event>>>;

fn log_contains(events: &EventLog, predicate: impl Fn(&Event) -> bool) -> usize {
    events.borrow().iter().filter(|e| predicate(e)).count()
}

pub fn captures(events: &EventLog) -> Vec<(Exposure, u32, i32)> {
    events
        .borrow()
        .iter()
        .filter_map(|e| match *e {
            Event::Capture {
                exposure,
                duration_us,
                lens_mdpt,
            } => Some((exposure, duration_us, lens_mdpt)),
            _ => None,
        })
        .collect()
}

pub fn pulses(events: &EventLog) -> Vec<FlashKind> {
    events
        .borrow()
        .iter()
        .filter_map(|e| match *e {
            Event::Pulse { flash, .. } => Some(flash),
            _ => None,
        })
        .collect()
}

pub fn releases(events: &EventLog) -> usize {
    log_contains(events, |e| *e == Event::Release)
}

// ---------------------------------------------------------------- clock

#[derive(Clone, Default)]
pub struct MockClock {
    pub now: Rc<Cell<u64>>,
}

impl MockClock {
    pub fn advance_s(&self, seconds: u64) {
        self.now.set(self.now.get() + seconds * 1_000_000);
    }
}

impl Clock for MockClock {
    fn now_us(&self) -> u64 {
        self.now.get()
    }

    fn delay_us(&mut self, us: u32) {
        self.now.set(self.now.get() + u64::from(us));
    }
}

// ---------------------------------------------------------------- serial

#[derive(Default)]
pub struct PortState {
    /// Bytes with the clock time at which they become readable
    pub rx: VecDeque<(u64, u8)>,
    pub tx: Vec<u8>,
}

/// Serial port whose input arrives on the shared clock
#[derive(Clone)]
pub struct MockPort {
    pub state: Rc<RefCell<PortState>>,
    clock: Rc<Cell<u64>>,
}

impl MockPort {
    pub fn new(clock: &MockClock) -> Self {
        Self {
            state: Rc::default(),
            clock: clock.now.clone(),
        }
    }

    /// Queue input readable immediately
    pub fn type_in(&self, text: &str) {
        let now = self.clock.get();
        self.type_at(now, text);
    }

    /// Queue input readable once the clock reaches `at_us`
    pub fn type_at(&self, at_us: u64, text: &str) {
        let mut state = self.state.borrow_mut();
        state.rx.extend(text.bytes().map(|b| (at_us, b)));
    }

    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.state.borrow().tx).into_owned()
    }

    pub fn clear_output(&self) {
        self.state.borrow_mut().tx.clear();
    }
}

impl SerialPort for MockPort {
    fn read_byte(&mut self) -> Option<u8> {
        let now = self.clock.get();
        let mut state = self.state.borrow_mut();
        match state.rx.front() {
            Some(&(at, byte)) if at <= now => {
                state.rx.pop_front();
                Some(byte)
            }
            _ => None,
        }
    }

    fn write_bytes(&mut self, data: &[u8]) {
        self.state.borrow_mut().tx.extend_from_slice(data);
    }
}

// ---------------------------------------------------------------- strobe & lens

pub struct MockStrobe {
    events: EventLog,
    lens: Rc<Cell<i32>>,
}

impl Capture for MockStrobe {
    fn capture_ambient(&mut self, exposure_us: u32) {
        self.events.borrow_mut().push(Event::Capture {
            exposure: Exposure::Ambient,
            duration_us: exposure_us,
            lens_mdpt: self.lens.get(),
        });
    }

    fn capture_with_flash(&mut self, flash: FlashKind, duration_us: u32) {
        self.events.borrow_mut().push(Event::Capture {
            exposure: Exposure::Flash(flash),
            duration_us,
            lens_mdpt: self.lens.get(),
        });
    }

    fn pulse(&mut self, flash: FlashKind, _trigger_width_us: u32, flash_us: u32) {
        self.events
            .borrow_mut()
            .push(Event::Pulse { flash, flash_us });
    }

    fn release(&mut self) {
        self.events.borrow_mut().push(Event::Release);
    }
}

pub struct MockLens {
    events: EventLog,
    position: Rc<Cell<i32>>,
    pub connects: Rc<Cell<u32>>,
}

impl LensActuator for MockLens {
    fn connect(&mut self) -> Result<(), LensError> {
        self.connects.set(self.connects.get() + 1);
        self.position.set(0);
        Ok(())
    }

    fn ramp_to(&mut self, position_mdpt: i32, _increment_mdpt: i32) -> Result<(), LensError> {
        if !(-2000..=3000).contains(&position_mdpt) {
            return Err(LensError::OutOfRange);
        }
        self.position.set(position_mdpt);
        self.events
            .borrow_mut()
            .push(Event::LensMove(position_mdpt));
        Ok(())
    }

    fn step(&mut self, delta_mdpt: i32) -> Result<(), LensError> {
        self.ramp_to(self.position.get() + delta_mdpt, 50)
    }

    fn sweep(&mut self) -> Result<(), LensError> {
        self.ramp_to(-2000, 50)
    }

    fn send_raw(&mut self, _command: &str) -> Result<(), LensError> {
        Ok(())
    }

    fn reset(&mut self) -> Result<(), LensError> {
        self.connect()
    }

    fn position(&self) -> i32 {
        self.position.get()
    }
}

// ---------------------------------------------------------------- power, rtc, sensors

#[derive(Clone, Default)]
pub struct MockPower {
    pub switches: Rc<RefCell<Vec<bool>>>,
}

impl PayloadPower for MockPower {
    fn set_enabled(&mut self, on: bool) {
        self.switches.borrow_mut().push(on);
    }
}

#[derive(Default)]
pub struct RtcState {
    pub time: DateTime,
    pub alarm: Option<AlarmMatch>,
    pub standbys: u32,
}

#[derive(Clone, Default)]
pub struct MockRtc {
    pub state: Rc<RefCell<RtcState>>,
}

impl RealTimeClock for MockRtc {
    fn now(&mut self) -> DateTime {
        self.state.borrow().time
    }

    fn set(&mut self, time: DateTime) {
        self.state.borrow_mut().time = time;
    }

    fn set_alarm(&mut self, matching: AlarmMatch) {
        self.state.borrow_mut().alarm = Some(matching);
    }

    fn standby(&mut self) {
        self.state.borrow_mut().standbys += 1;
    }
}

#[derive(Clone)]
pub struct MockSensors {
    pub sample: Rc<Cell<EnvironmentSample>>,
}

impl EnvironmentSensors for MockSensors {
    fn sample(&mut self) -> Result<EnvironmentSample, SensorError> {
        Ok(self.sample.get())
    }
}

pub fn sample(voltage_mv: i32) -> EnvironmentSample {
    EnvironmentSample {
        temperature_mc: 25_000,
        humidity_mpct: 40_000,
        voltage_mv,
        power_mw: 3_000,
    }
}

// ---------------------------------------------------------------- watchdog, trigger, store

#[derive(Default)]
pub struct WatchdogState {
    pub started: bool,
    pub timeout_ms: u32,
    pub feeds: u64,
    pub stops: u32,
}

#[derive(Clone, Default)]
pub struct MockWatchdog {
    pub state: Rc<RefCell<WatchdogState>>,
}

impl Watchdog for MockWatchdog {
    fn start(&mut self, timeout_ms: u32) {
        let mut state = self.state.borrow_mut();
        state.started = true;
        state.timeout_ms = timeout_ms;
    }

    fn feed(&mut self) {
        self.state.borrow_mut().feeds += 1;
    }

    fn stop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.started = false;
        state.stops += 1;
    }
}

#[derive(Clone, Default)]
pub struct MockTrigger {
    pub settings: Rc<Cell<Option<TriggerSettings>>>,
}

impl TriggerControl for MockTrigger {
    fn configure(&mut self, settings: TriggerSettings) {
        self.settings.set(Some(settings));
    }

    fn image_count(&self) -> u32 {
        0
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    pub image: Rc<RefCell<Option<Vec<u8>>>>,
}

impl ParamStore for MemoryStore {
    fn load(&mut self, buffer: &mut [u8]) -> Result<usize, StoreError> {
        let image = self.image.borrow();
        let data = image.as_ref().ok_or(StoreError::NotFound)?;
        let target = buffer
            .get_mut(..data.len())
            .ok_or(StoreError::BufferTooSmall)?;
        target.copy_from_slice(data);
        Ok(data.len())
    }

    fn save(&mut self, data: &[u8]) -> Result<(), StoreError> {
        *self.image.borrow_mut() = Some(data.to_vec());
        Ok(())
    }
}

// ---------------------------------------------------------------- board

pub struct MockBoard;

impl Board for MockBoard {
    type Port = MockPort;
    type Clock = MockClock;
    type Strobe = MockStrobe;
    type Lens = MockLens;
    type Power = MockPower;
    type Rtc = MockRtc;
    type Sensors = MockSensors;
    type Watchdog = MockWatchdog;
    type Trigger = MockTrigger;
    type Store = MemoryStore;
}

/// Handles on everything the supervisor owns
pub struct Rig {
    pub clock: MockClock,
    pub operator: MockPort,
    pub host: MockPort,
    pub events: EventLog,
    pub lens_connects: Rc<Cell<u32>>,
    pub power: MockPower,
    pub rtc: MockRtc,
    pub sample: Rc<Cell<EnvironmentSample>>,
    pub watchdog: MockWatchdog,
    pub trigger: MockTrigger,
    pub store: MemoryStore,
}

impl Rig {
    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }
}

/// A supervisor with an operator/debug port 0 and a host port 1
pub fn rig() -> (Supervisor<MockBoard>, Rig) {
    let clock = MockClock::default();
    let operator = MockPort::new(&clock);
    let host = MockPort::new(&clock);
    let events = EventLog::default();
    let lens_position = Rc::new(Cell::new(0));
    let lens_connects = Rc::new(Cell::new(0));
    let sample_cell = Rc::new(Cell::new(sample(12_000)));

    let mut ports = PortBank::new().with_host(1);
    assert!(ports.add(operator.clone()).is_ok());
    assert!(ports.add(host.clone()).is_ok());

    let rig = Rig {
        clock: clock.clone(),
        operator,
        host,
        events: events.clone(),
        lens_connects: lens_connects.clone(),
        power: MockPower::default(),
        rtc: MockRtc::default(),
        sample: sample_cell.clone(),
        watchdog: MockWatchdog::default(),
        trigger: MockTrigger::default(),
        store: MemoryStore::default(),
    };

    let hw = Hardware::<MockBoard> {
        ports,
        clock,
        strobe: MockStrobe {
            events: events.clone(),
            lens: lens_position.clone(),
        },
        lens: MockLens {
            events,
            position: lens_position,
            connects: lens_connects,
        },
        power: rig.power.clone(),
        rtc: rig.rtc.clone(),
        sensors: MockSensors {
            sample: sample_cell,
        },
        watchdog: rig.watchdog.clone(),
        trigger: rig.trigger.clone(),
        store: rig.store.clone(),
    };

    (Supervisor::new(hw), rig)
}

// ---------------------------------------------------------------- scripted host

/// Sequence host without a board: captures are logged, waits advance a
/// virtual clock and cancellation fires on a chosen wait
pub struct ScriptHost {
    pub params: ParamTable,
    pub captures: Vec<(Exposure, u32, i32)>,
    pub moves: Vec<i32>,
    pub position: i32,
    pub reports: Vec<String>,
    pub lines: VecDeque<String>,
    pub elapsed_us: u64,
    pub waits: u32,
    /// Cancel on the nth wait (1-based)
    pub cancel_on_wait: Option<u32>,
    pub polls: u32,
    /// Report cancellation on the nth poll (1-based)
    pub cancel_on_poll: Option<u32>,
    pub releases: u32,
}

impl ScriptHost {
    pub fn new() -> Self {
        Self {
            params: ParamTable::new(),
            captures: Vec::new(),
            moves: Vec::new(),
            position: 0,
            reports: Vec::new(),
            lines: VecDeque::new(),
            elapsed_us: 0,
            waits: 0,
            cancel_on_wait: None,
            polls: 0,
            cancel_on_poll: None,
            releases: 0,
        }
    }

    pub fn with_lines(lines: &[&str]) -> Self {
        let mut host = Self::new();
        host.lines = lines.iter().map(|l| l.to_string()).collect();
        host
    }

    fn wait(&mut self, us: u64) -> WaitOutcome {
        self.waits += 1;
        if self.cancel_on_wait == Some(self.waits) {
            return WaitOutcome::Cancelled;
        }
        self.elapsed_us += us;
        WaitOutcome::Elapsed
    }
}

impl ImagingHost for ScriptHost {
    fn param(&self, param: Param) -> i32 {
        self.params.get(param)
    }

    fn bounds(&self, param: Param) -> (i32, i32) {
        (self.params.min(param), self.params.max(param))
    }

    fn set_param(&mut self, param: Param, value: i32) -> Result<(), ConfigError> {
        self.params.set(param, value).map(|_| ())
    }

    fn capture(&mut self, exposure: Exposure, duration_us: u32) {
        self.captures.push((exposure, duration_us, self.position));
    }

    fn move_lens(&mut self, position: i32) -> Result<(), LensError> {
        self.position = position;
        self.moves.push(position);
        Ok(())
    }

    fn wait_us(&mut self, us: u32) -> WaitOutcome {
        self.wait(u64::from(us))
    }

    fn wait_ms(&mut self, ms: u32) -> WaitOutcome {
        self.wait(u64::from(ms) * 1000)
    }

    fn pause_us(&mut self, us: u32) {
        self.elapsed_us += u64::from(us);
    }

    fn cancel_requested(&mut self) -> bool {
        self.polls += 1;
        self.cancel_on_poll == Some(self.polls)
    }

    fn report(&mut self, message: fmt::Arguments<'_>) {
        self.reports.push(message.to_string());
    }

    fn read_line(&mut self, _prompt: &str, line: &mut Line) -> LineRead {
        line.clear();
        match self.lines.pop_front() {
            Some(text) => {
                let _ = line.push_str(&text);
                LineRead::Line
            }
            None => LineRead::TimedOut,
        }
    }

    fn release_outputs(&mut self) {
        self.releases += 1;
    }
}
