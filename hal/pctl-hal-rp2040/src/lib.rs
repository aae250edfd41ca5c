//! RP2040-specific HAL for the imaging controller firmware
//!
//! Adapters from embassy-rp peripherals to the `pctl-core` traits:
//!
//! - Monotonic clock and busy-wait delays (embassy-time)
//! - Buffered UART serial ports
//! - Flash parameter store (sequential-storage)
//! - Calendar RTC with alarm standby
//! - Hardware watchdog
//! - Payload power enable outputs

#![no_std]

pub mod clock;
pub mod flash;
pub mod power;
pub mod rtc;
pub mod uart;
pub mod watchdog;

pub use clock::EmbassyClock;
pub use flash::{FlashParamStore, StorageKey};
pub use power::PowerSwitch;
pub use rtc::BoardRtc;
pub use uart::UartPort;
pub use watchdog::BoardWatchdog;
