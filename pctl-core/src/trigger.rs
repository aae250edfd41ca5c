//! Periodic frame trigger
//!
//! The trigger runs in its own interrupt-priority context. It receives a
//! complete [`TriggerSettings`] value from the supervisor and publishes a
//! single atomic image counter back; no other state is shared.

use portable_atomic::{AtomicU32, Ordering};

use crate::config::{ConfigRegistry, Param};
use crate::traits::{Capture, FlashKind};

/// Flash selection for triggered frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ImagingMode {
    #[default]
    White,
    Uv,
    /// White on even frames, UV on odd frames
    Alternate,
}

impl ImagingMode {
    /// Decode the IMAGINGMODE parameter
    pub fn from_param(value: i32) -> Self {
        match value {
            1 => ImagingMode::Uv,
            2 => ImagingMode::Alternate,
            _ => ImagingMode::White,
        }
    }
}

/// Everything the trigger context needs for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriggerSettings {
    pub enabled: bool,
    pub frame_rate_hz: u32,
    pub white_us: u32,
    pub uv_us: u32,
    pub mode: ImagingMode,
}

impl TriggerSettings {
    /// Snapshot the trigger parameters
    pub fn from_registry<R: ConfigRegistry + ?Sized>(registry: &R) -> Self {
        let us = |param| registry.get(param).max(0) as u32;
        Self {
            enabled: registry.get(Param::TriggerEnabled) == 1,
            frame_rate_hz: us(Param::FrameRate),
            white_us: us(Param::WhiteFlash),
            uv_us: us(Param::UvFlash),
            mode: ImagingMode::from_param(registry.get(Param::ImagingMode)),
        }
    }

    /// Time between frames, or `None` when the trigger is idle
    pub fn period_us(&self) -> Option<u32> {
        if !self.enabled || self.frame_rate_hz == 0 {
            return None;
        }
        Some(1_000_000 / self.frame_rate_hz)
    }

    /// Flash and duration for frame number `count`
    pub fn flash_for(&self, count: u32) -> (FlashKind, u32) {
        let kind = match self.mode {
            ImagingMode::White => FlashKind::White,
            ImagingMode::Uv => FlashKind::Uv,
            ImagingMode::Alternate if count % 2 == 0 => FlashKind::White,
            ImagingMode::Alternate => FlashKind::Uv,
        };
        let duration = match kind {
            FlashKind::White => self.white_us,
            FlashKind::Uv => self.uv_us,
        };
        (kind, duration)
    }
}

/// Frames fired since boot
///
/// Written only by the trigger context, read by the supervisor.
#[derive(Debug, Default)]
pub struct ImageCounter(AtomicU32);

impl ImageCounter {
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }

    /// Single-writer increment; plain load/store works on cores without CAS
    fn advance(&self) {
        let next = self.0.load(Ordering::Relaxed).wrapping_add(1);
        self.0.store(next, Ordering::Release);
    }
}

/// Fires one camera frame per call on its own set of outputs
pub struct FrameTrigger<C> {
    capture: C,
}

impl<C: Capture> FrameTrigger<C> {
    pub fn new(capture: C) -> Self {
        Self { capture }
    }

    /// Expose one frame if the trigger is enabled
    ///
    /// The camera is raised ahead of the strobe by the capture lead time and
    /// stays high for the whole flash. Returns true when a frame was fired.
    pub fn fire(&mut self, settings: &TriggerSettings, counter: &ImageCounter) -> bool {
        if !settings.enabled {
            return false;
        }
        let (flash, duration) = settings.flash_for(counter.get());
        self.capture.capture_with_flash(flash, duration);
        counter.advance();
        true
    }

    /// Force the outputs low
    pub fn idle(&mut self) {
        self.capture.release();
    }
}
