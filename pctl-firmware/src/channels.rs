//! State shared between the supervisor and the frame-trigger executor
//!
//! The supervisor publishes complete trigger settings; the trigger task
//! is the only writer of the image counter.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use pctl_core::trigger::{ImageCounter, TriggerSettings};

/// Latest trigger settings (updated by the supervisor)
pub static TRIGGER_SETTINGS: Signal<CriticalSectionRawMutex, TriggerSettings> = Signal::new();

/// Frames fired since boot (updated by the trigger task)
pub static IMAGE_COUNTER: ImageCounter = ImageCounter::new();
