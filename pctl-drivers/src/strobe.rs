//! Camera trigger and strobe outputs
//!
//! Three push-pull outputs: the camera trigger and one trigger line per
//! flash head. Every exposure is a blocking busy-wait; the caller decides
//! which execution context owns the pins.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};
use pctl_core::traits::capture::CAMERA_LEAD_US;
use pctl_core::traits::{Capture, FlashKind};

/// Strobe latency compensated in [`Capture::pulse`]
pub const FLASH_DELAY_OFFSET_US: u32 = 3;

/// Shortest flash the pulse primitive times explicitly
pub const MIN_FLASH_US: u32 = 1;

/// Camera and strobe trigger lines
pub struct GpioStrobe<CAM, WHITE, UV, D> {
    camera: CAM,
    white: WHITE,
    uv: UV,
    delay: D,
}

fn drive<P: OutputPin>(pin: &mut P, high: bool) {
    // Pin errors are not recoverable mid-exposure
    let _ = pin.set_state(PinState::from(high));
}

impl<CAM, WHITE, UV, D> GpioStrobe<CAM, WHITE, UV, D>
where
    CAM: OutputPin,
    WHITE: OutputPin,
    UV: OutputPin,
    D: DelayNs,
{
    /// Take the pins and drive them all low
    pub fn new(camera: CAM, white: WHITE, uv: UV, delay: D) -> Self {
        let mut strobe = Self {
            camera,
            white,
            uv,
            delay,
        };
        strobe.release();
        strobe
    }

    fn flash(&mut self, flash: FlashKind, on: bool) {
        match flash {
            FlashKind::White => drive(&mut self.white, on),
            FlashKind::Uv => drive(&mut self.uv, on),
        }
    }
}

impl<CAM, WHITE, UV, D> Capture for GpioStrobe<CAM, WHITE, UV, D>
where
    CAM: OutputPin,
    WHITE: OutputPin,
    UV: OutputPin,
    D: DelayNs,
{
    fn capture_ambient(&mut self, exposure_us: u32) {
        drive(&mut self.camera, true);
        self.delay.delay_us(CAMERA_LEAD_US.saturating_add(exposure_us));
        drive(&mut self.camera, false);
    }

    fn capture_with_flash(&mut self, flash: FlashKind, duration_us: u32) {
        drive(&mut self.camera, true);
        self.delay.delay_us(CAMERA_LEAD_US);
        self.flash(flash, true);
        self.delay.delay_us(duration_us);
        self.flash(flash, false);
        drive(&mut self.camera, false);
    }

    fn pulse(&mut self, flash: FlashKind, trigger_width_us: u32, flash_us: u32) {
        let half = trigger_width_us / 2;
        drive(&mut self.camera, true);
        self.delay.delay_us(half);

        self.flash(flash, true);
        let on_time = flash_us.saturating_sub(FLASH_DELAY_OFFSET_US);
        if on_time >= MIN_FLASH_US {
            self.delay.delay_us(on_time);
        }
        self.flash(flash, false);

        self.delay.delay_us(half);
        drive(&mut self.camera, false);
    }

    fn release(&mut self) {
        drive(&mut self.white, false);
        drive(&mut self.uv, false);
        drive(&mut self.camera, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::{Cell, RefCell};
    use core::convert::Infallible;
    use heapless::Vec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Line {
        Camera,
        White,
        Uv,
    }

    /// (line, level, time in µs)
    type Log = RefCell<Vec<(Line, bool, u32), 32>>;

    struct MockPin<'a> {
        line: Line,
        log: &'a Log,
        now: &'a Cell<u32>,
    }

    impl embedded_hal::digital::ErrorType for MockPin<'_> {
        type Error = Infallible;
    }

    impl OutputPin for MockPin<'_> {
        fn set_low(&mut self) -> Result<(), Infallible> {
            let _ = self.log.borrow_mut().push((self.line, false, self.now.get()));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            let _ = self.log.borrow_mut().push((self.line, true, self.now.get()));
            Ok(())
        }
    }

    struct MockDelay<'a> {
        now: &'a Cell<u32>,
    }

    impl DelayNs for MockDelay<'_> {
        fn delay_ns(&mut self, ns: u32) {
            self.now.set(self.now.get() + ns / 1000);
        }

        fn delay_us(&mut self, us: u32) {
            self.now.set(self.now.get() + us);
        }
    }

    fn strobe<'a>(
        log: &'a Log,
        now: &'a Cell<u32>,
    ) -> GpioStrobe<MockPin<'a>, MockPin<'a>, MockPin<'a>, MockDelay<'a>> {
        let pin = |line| MockPin { line, log, now };
        let mut strobe = GpioStrobe::new(
            pin(Line::Camera),
            pin(Line::White),
            pin(Line::Uv),
            MockDelay { now },
        );
        log.borrow_mut().clear();
        now.set(0);
        strobe
    }

    #[test]
    fn test_new_drives_all_low() {
        let log = Log::default();
        let now = Cell::new(0);
        let pin = |line| MockPin {
            line,
            log: &log,
            now: &now,
        };
        let _strobe = GpioStrobe::new(
            pin(Line::Camera),
            pin(Line::White),
            pin(Line::Uv),
            MockDelay { now: &now },
        );
        assert!(log.borrow().iter().all(|(_, high, _)| !high));
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn test_ambient_holds_camera_for_lead_plus_exposure() {
        let log = Log::default();
        let now = Cell::new(0);
        strobe(&log, &now).capture_ambient(100);
        assert_eq!(
            log.borrow().as_slice(),
            &[(Line::Camera, true, 0), (Line::Camera, false, 400)]
        );
    }

    #[test]
    fn test_flash_capture_fires_after_lead() {
        let log = Log::default();
        let now = Cell::new(0);
        strobe(&log, &now).capture_with_flash(FlashKind::Uv, 50);
        assert_eq!(
            log.borrow().as_slice(),
            &[
                (Line::Camera, true, 0),
                (Line::Uv, true, 300),
                (Line::Uv, false, 350),
                (Line::Camera, false, 350),
            ]
        );
    }

    #[test]
    fn test_pulse_is_centered_in_trigger() {
        let log = Log::default();
        let now = Cell::new(0);
        strobe(&log, &now).pulse(FlashKind::White, 5000, 20);
        assert_eq!(
            log.borrow().as_slice(),
            &[
                (Line::Camera, true, 0),
                (Line::White, true, 2500),
                (Line::White, false, 2517),
                (Line::Camera, false, 5017),
            ]
        );
    }

    #[test]
    fn test_short_pulse_skips_flash_wait() {
        let log = Log::default();
        let now = Cell::new(0);
        strobe(&log, &now).pulse(FlashKind::White, 100, 3);
        let log = log.borrow();
        assert_eq!(log[1], (Line::White, true, 50));
        assert_eq!(log[2], (Line::White, false, 50));
    }
}
