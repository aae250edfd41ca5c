//! Periodic status line

use core::fmt;

use crate::text::Milli;
use crate::traits::{DateTime, EnvironmentSample};

/// Leading tag of every status line
pub const STATUS_TAG: &str = "$PCTL";

/// `$PCTL,<date time>.<ms>,<tempC>,<hum%>,<V>,<W>,<cameraOn>,<images>`
#[derive(Debug, Clone, Copy)]
pub struct StatusLine<'a> {
    pub time: DateTime,
    pub millis: u16,
    pub sample: &'a EnvironmentSample,
    pub camera_on: bool,
    pub images: u32,
}

impl fmt::Display for StatusLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{}.{:03},{},{},{},{},{},{}",
            STATUS_TAG,
            self.time,
            self.millis % 1000,
            Milli(self.sample.temperature_mc),
            Milli(self.sample.humidity_mpct),
            Milli(self.sample.voltage_mv),
            Milli(self.sample.power_mw),
            u8::from(self.camera_on),
            self.images
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;
    use heapless::String;

    #[test]
    fn test_status_format() {
        let sample = EnvironmentSample {
            temperature_mc: 23_456,
            humidity_mpct: 41_000,
            voltage_mv: 12_345,
            power_mw: 2_500,
        };
        let line = StatusLine {
            time: DateTime::parse("2024-05-06 07:08:09").unwrap(),
            millis: 42,
            sample: &sample,
            camera_on: true,
            images: 17,
        };
        let mut text: String<96> = String::new();
        write!(text, "{}", line).unwrap();
        assert_eq!(
            text.as_str(),
            "$PCTL,2024-05-06 07:08:09.042,23.456,41.000,12.345,2.500,1,17"
        );
    }
}
