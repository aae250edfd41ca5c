//! Hardware abstraction traits
//!
//! These traits define the interface between the supervisory logic and
//! board-specific implementations. A [`Board`] names one concrete type per
//! collaborator so the controller can own them all without trait objects.

pub mod capture;
pub mod clock;
pub mod lens;
pub mod power;
pub mod rtc;
pub mod sensors;
pub mod serial;
pub mod storage;
pub mod watchdog;

pub use capture::{Capture, Exposure, FlashKind};
pub use clock::Clock;
pub use lens::{LensActuator, LensError};
pub use power::PayloadPower;
pub use rtc::{AlarmMatch, DateTime, RealTimeClock, TimeParseError};
pub use sensors::{EnvironmentSample, EnvironmentSensors, SensorError};
pub use serial::{PortWriter, SerialPort, ESCAPE};
pub use storage::{ParamStore, StoreError};
pub use watchdog::{Watchdog, WATCHDOG_TIMEOUT_MS};

use crate::trigger::TriggerSettings;

/// Hand-off of trigger settings to the frame-trigger context
pub trait TriggerControl {
    /// Publish new settings; the trigger context picks them up before its next frame
    fn configure(&mut self, settings: TriggerSettings);

    /// Frames fired since boot
    fn image_count(&self) -> u32;
}

/// The set of collaborators a board provides to the supervisor
pub trait Board {
    type Port: SerialPort;
    type Clock: Clock;
    type Strobe: Capture;
    type Lens: LensActuator;
    type Power: PayloadPower;
    type Rtc: RealTimeClock;
    type Sensors: EnvironmentSensors;
    type Watchdog: Watchdog;
    type Trigger: TriggerControl;
    type Store: ParamStore;
}
