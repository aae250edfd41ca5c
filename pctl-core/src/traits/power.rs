//! Payload power switching

/// Power-enable outputs for the camera payload and strobes
pub trait PayloadPower {
    fn set_enabled(&mut self, on: bool);
}
