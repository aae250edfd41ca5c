//! Concrete board types for the RP2040 controller

use embassy_rp::gpio::Output;
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_rp::uart::BufferedUart;
use embassy_time::Delay;

use pctl_core::traits::{Board, TriggerControl};
use pctl_core::trigger::TriggerSettings;
use pctl_drivers::{EnvironmentBoard, GpioStrobe, OptotuneLens};
use pctl_hal_rp2040::{
    BoardRtc, BoardWatchdog, EmbassyClock, FlashParamStore, PowerSwitch, UartPort,
};

use crate::channels::{IMAGE_COUNTER, TRIGGER_SETTINGS};

/// Operator and lens serial ports
pub type SerialLink = UartPort<BufferedUart>;

/// Camera trigger plus white and UV strobes
pub type Strobe = GpioStrobe<Output<'static>, Output<'static>, Output<'static>, Delay>;

/// Hands trigger settings to the interrupt executor
pub struct SignalTrigger;

impl TriggerControl for SignalTrigger {
    fn configure(&mut self, settings: TriggerSettings) {
        TRIGGER_SETTINGS.signal(settings);
    }

    fn image_count(&self) -> u32 {
        IMAGE_COUNTER.get()
    }
}

pub struct Rp2040Board;

impl Board for Rp2040Board {
    type Port = SerialLink;
    type Clock = EmbassyClock;
    type Strobe = Strobe;
    type Lens = OptotuneLens<SerialLink, Delay>;
    type Power = PowerSwitch<'static>;
    type Rtc = BoardRtc<'static>;
    type Sensors = EnvironmentBoard<I2c<'static, I2C0, Blocking>, Delay>;
    type Watchdog = BoardWatchdog;
    type Trigger = SignalTrigger;
    type Store = FlashParamStore<'static>;
}
