//! Camera trigger and strobe primitives

/// Lead time between raising the camera trigger and firing a strobe
pub const CAMERA_LEAD_US: u32 = 300;

/// Strobe channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlashKind {
    White,
    /// Excitation flash for fluorescence imaging
    Uv,
}

/// How a frame is exposed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Exposure {
    /// Camera only, lit by ambient light
    Ambient,
    /// Camera with a strobe flash
    Flash(FlashKind),
}

impl Exposure {
    /// Decode the FLASHTYPE parameter (0 white, 1 uv, anything else ambient)
    pub fn from_flash_type(value: i32) -> Self {
        match value {
            0 => Exposure::Flash(FlashKind::White),
            1 => Exposure::Flash(FlashKind::Uv),
            _ => Exposure::Ambient,
        }
    }

    /// Encode as a FLASHTYPE parameter value
    pub fn flash_type(self) -> i32 {
        match self {
            Exposure::Flash(FlashKind::White) => 0,
            Exposure::Flash(FlashKind::Uv) => 1,
            Exposure::Ambient => 2,
        }
    }
}

/// Camera and strobe outputs
///
/// Every method returns with all outputs deasserted.
pub trait Capture {
    /// Hold the camera trigger for the lead time plus `exposure_us`
    fn capture_ambient(&mut self, exposure_us: u32);

    /// Raise the camera trigger, then flash for `duration_us`
    fn capture_with_flash(&mut self, flash: FlashKind, duration_us: u32);

    /// Centered strobe pulse inside a camera trigger of `trigger_width_us`
    fn pulse(&mut self, flash: FlashKind, trigger_width_us: u32, flash_us: u32);

    /// Force every output low
    fn release(&mut self);

    /// Expose one frame
    fn capture(&mut self, exposure: Exposure, duration_us: u32) {
        match exposure {
            Exposure::Ambient => self.capture_ambient(duration_us),
            Exposure::Flash(kind) => self.capture_with_flash(kind, duration_us),
        }
    }
}
