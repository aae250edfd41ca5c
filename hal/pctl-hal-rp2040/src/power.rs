//! Payload power enable outputs

use embassy_rp::gpio::{Level, Output};
use pctl_core::traits::PayloadPower;

/// Camera and strobe supply switches, active high
pub struct PowerSwitch<'d> {
    camera: Output<'d>,
    strobes: Output<'d>,
}

impl<'d> PowerSwitch<'d> {
    /// Take both enable outputs and switch the payload off
    pub fn new(mut camera: Output<'d>, mut strobes: Output<'d>) -> Self {
        camera.set_level(Level::Low);
        strobes.set_level(Level::Low);
        Self { camera, strobes }
    }
}

impl PayloadPower for PowerSwitch<'_> {
    fn set_enabled(&mut self, on: bool) {
        let level = Level::from(on);
        self.camera.set_level(level);
        self.strobes.set_level(level);
    }
}
