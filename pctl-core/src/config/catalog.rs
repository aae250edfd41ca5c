//! Parameter catalog
//!
//! Every operator-tunable setting, with its bounds, default and the side
//! effect a change must trigger. The table order matches [`Param`] and is
//! the order of the persisted value image, so new parameters go at the end.

/// Side effect the controller applies after a parameter changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParamEffect {
    /// Frame rate or trigger enable changed
    Triggers,
    /// Trigger width or a flash duration changed
    Flashes,
}

/// Static description of one parameter
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub unit: &'static str,
    pub min: i32,
    pub max: i32,
    pub default: i32,
    pub effect: Option<ParamEffect>,
}

impl ParamSpec {
    const fn new(
        name: &'static str,
        description: &'static str,
        unit: &'static str,
        min: i32,
        max: i32,
        default: i32,
    ) -> Self {
        Self {
            name,
            description,
            unit,
            min,
            max,
            default,
            effect: None,
        }
    }

    const fn with_effect(mut self, effect: ParamEffect) -> Self {
        self.effect = Some(effect);
        self
    }

    /// Whether `value` lies within the inclusive bounds
    pub fn accepts(&self, value: i32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Parameter keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Param {
    LogInterval,
    LocalEcho,
    CommandTimeout,
    Port0Baud,
    Port1Baud,
    Port2Baud,
    Port3Baud,
    StrobeDelay,
    TriggerEnabled,
    FrameRate,
    TriggerWidth,
    Ambient,
    WhiteFlash,
    UvFlash,
    FlashType,
    ImagingMode,
    FocusPosition,
    FocusIncrement,
    MaxRepeat,
    MaxDelay,
    MaxLongDelay,
    LowVoltage,
    Standby,
    CheckHourly,
    CheckInterval,
    StartupTime,
    Watchdog,
    CameraGuard,
    TemperatureLimit,
    HumidityLimit,
}

/// Number of parameters in the catalog
pub const PARAM_COUNT: usize = 30;

impl Param {
    /// Every parameter, in catalog order
    pub const ALL: [Param; PARAM_COUNT] = [
        Param::LogInterval,
        Param::LocalEcho,
        Param::CommandTimeout,
        Param::Port0Baud,
        Param::Port1Baud,
        Param::Port2Baud,
        Param::Port3Baud,
        Param::StrobeDelay,
        Param::TriggerEnabled,
        Param::FrameRate,
        Param::TriggerWidth,
        Param::Ambient,
        Param::WhiteFlash,
        Param::UvFlash,
        Param::FlashType,
        Param::ImagingMode,
        Param::FocusPosition,
        Param::FocusIncrement,
        Param::MaxRepeat,
        Param::MaxDelay,
        Param::MaxLongDelay,
        Param::LowVoltage,
        Param::Standby,
        Param::CheckHourly,
        Param::CheckInterval,
        Param::StartupTime,
        Param::Watchdog,
        Param::CameraGuard,
        Param::TemperatureLimit,
        Param::HumidityLimit,
    ];

    /// Position in the catalog and in the persisted image
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn spec(self) -> &'static ParamSpec {
        &PARAMS[self.index()]
    }

    /// Operator-facing name, e.g. `FRAMERATE`
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Look up a parameter by name, ignoring case
    pub fn from_name(name: &str) -> Option<Param> {
        let name = name.trim();
        Param::ALL
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }
}

use ParamEffect::{Flashes, Triggers};

/// The catalog, indexed by [`Param::index`]
pub static PARAMS: [ParamSpec; PARAM_COUNT] = [
    ParamSpec::new("LOGINT", "Time between status lines", "ms", 0, 100_000, 250),
    ParamSpec::new("LOCALECHO", "When > 0, echo serial input", "", 0, 1, 1),
    ParamSpec::new("CMDTIMEOUT", "Time before giving up on operator input", "ms", 1000, 100_000, 10_000),
    ParamSpec::new("HWPORT0BAUD", "Serial port 0 baud rate", "baud", 9600, 115_200, 115_200),
    ParamSpec::new("HWPORT1BAUD", "Serial port 1 baud rate", "baud", 9600, 115_200, 115_200),
    ParamSpec::new("HWPORT2BAUD", "Serial port 2 baud rate", "baud", 9600, 115_200, 115_200),
    ParamSpec::new("HWPORT3BAUD", "Serial port 3 baud rate", "baud", 9600, 115_200, 115_200),
    ParamSpec::new("STROBEDELAY", "Time between camera trigger and strobe trigger", "us", 5, 1000, 50)
        .with_effect(Flashes),
    ParamSpec::new("TRIGENABLED", "When 1, fire frames at FRAMERATE", "", 0, 1, 0).with_effect(Triggers),
    ParamSpec::new("FRAMERATE", "Camera frame rate", "Hz", 1, 30, 10).with_effect(Triggers),
    ParamSpec::new("TRIGWIDTH", "Width of the camera trigger pulse", "us", 30, 10_000, 100)
        .with_effect(Flashes),
    ParamSpec::new("AMBIENT", "Width of the ambient light exposure", "us", 30, 10_000, 100)
        .with_effect(Flashes),
    ParamSpec::new("WHITEFLASH", "Width of the white flash", "us", 1, 100_000, 10).with_effect(Flashes),
    ParamSpec::new("UVFLASH", "Width of the uv flash", "us", 1, 100_000, 10).with_effect(Flashes),
    ParamSpec::new("FLASHTYPE", "0 = white, 1 = uv, 2 = ambient", "", 0, 2, 0).with_effect(Flashes),
    ParamSpec::new("IMAGINGMODE", "0 = white, 1 = uv, 2 = alternate", "", 0, 2, 0).with_effect(Triggers),
    ParamSpec::new("FOCUSPOS", "Lens focal power", "mdpt", -2000, 3000, 0),
    ParamSpec::new("FOCUSINC", "Focal stack increment", "mdpt", 1, 1000, 50),
    ParamSpec::new("MAXREPEAT", "Maximum cycles in sequence REPEAT", "cycles", 1, 100_000, 1000),
    ParamSpec::new("MAXDELAY", "Maximum sequence DELAY", "us", 0, 1_000_000, 10_000),
    ParamSpec::new("MAXLONGDELAY", "Maximum sequence LONGDELAY", "s", 0, 86_400, 3600),
    ParamSpec::new("LOWVOLTAGE", "Supply voltage that triggers shutdown", "mV", 10_000, 14_000, 11_500),
    ParamSpec::new("STANDBY", "If voltage is low go into standby", "", 0, 1, 0),
    ParamSpec::new("CHECKHOURLY", "0 = wake every minute, 1 = wake every hour", "", 0, 1, 0),
    ParamSpec::new("CHECKINTERVAL", "Time between system health checks", "s", 10, 3600, 60),
    ParamSpec::new("STARTUPTIME", "Time before performing any system checks", "s", 0, 60, 10),
    ParamSpec::new("WATCHDOG", "1 = hardware watchdog with 8 s timeout", "", 0, 1, 0),
    ParamSpec::new("CAMGUARD", "Minimum time between camera power changes", "s", 0, 3600, 10),
    ParamSpec::new("TEMPLIMIT", "Temperature that powers off the camera", "C", 0, 80, 55),
    ParamSpec::new("HUMLIMIT", "Humidity that powers off the camera", "%", 0, 100, 60),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_within_bounds() {
        for spec in PARAMS.iter() {
            assert!(spec.accepts(spec.default), "{} default out of range", spec.name);
        }
    }

    #[test]
    fn test_table_order_matches_keys() {
        for (i, param) in Param::ALL.iter().enumerate() {
            assert_eq!(param.index(), i);
        }
        assert_eq!(Param::FrameRate.name(), "FRAMERATE");
        assert_eq!(Param::HumidityLimit.name(), "HUMLIMIT");
        assert_eq!(Param::CameraGuard.name(), "CAMGUARD");
    }

    #[test]
    fn test_names_unique() {
        for (i, a) in PARAMS.iter().enumerate() {
            for b in PARAMS.iter().skip(i + 1) {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn test_lookup_ignores_case() {
        assert_eq!(Param::from_name("framerate"), Some(Param::FrameRate));
        assert_eq!(Param::from_name(" MaxDelay "), Some(Param::MaxDelay));
        assert_eq!(Param::from_name("NOPE"), None);
    }

    #[test]
    fn test_effects() {
        assert_eq!(Param::FrameRate.spec().effect, Some(ParamEffect::Triggers));
        assert_eq!(Param::WhiteFlash.spec().effect, Some(ParamEffect::Flashes));
        assert_eq!(Param::LogInterval.spec().effect, None);
    }
}
