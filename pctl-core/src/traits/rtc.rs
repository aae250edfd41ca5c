//! Real-time clock and calendar

use core::fmt;

/// Calendar date and time of day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// Reasons a time string is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeParseError {
    /// Not `YYYY-MM-DD hh:mm:ss`
    Format,
    /// A field is outside its calendar range
    Range,
}

impl DateTime {
    /// Parse `YYYY-MM-DD hh:mm:ss` (a `T` separator is also accepted)
    pub fn parse(text: &str) -> Result<Self, TimeParseError> {
        let text = text.trim();
        let (date, time) = text
            .split_once(' ')
            .or_else(|| text.split_once('T'))
            .ok_or(TimeParseError::Format)?;

        let mut date_fields = date.trim().splitn(3, '-');
        let year = field(date_fields.next())?;
        let month = field(date_fields.next())?;
        let day = field(date_fields.next())?;

        let mut time_fields = time.trim().splitn(3, ':');
        let hour = field(time_fields.next())?;
        let minute = field(time_fields.next())?;
        let second = field(time_fields.next())?;

        let parsed = DateTime {
            year: u16::try_from(year).map_err(|_| TimeParseError::Range)?,
            month: u8::try_from(month).map_err(|_| TimeParseError::Range)?,
            day: u8::try_from(day).map_err(|_| TimeParseError::Range)?,
            hour: u8::try_from(hour).map_err(|_| TimeParseError::Range)?,
            minute: u8::try_from(minute).map_err(|_| TimeParseError::Range)?,
            second: u8::try_from(second).map_err(|_| TimeParseError::Range)?,
        };
        parsed.validate()?;
        Ok(parsed)
    }

    fn validate(&self) -> Result<(), TimeParseError> {
        let in_range = (2000..=2099).contains(&self.year)
            && (1..=12).contains(&self.month)
            && self.day >= 1
            && self.day <= days_in_month(self.year, self.month)
            && self.hour < 24
            && self.minute < 60
            && self.second < 60;
        if in_range {
            Ok(())
        } else {
            Err(TimeParseError::Range)
        }
    }

    /// Day of the week, 0 = Sunday
    pub fn weekday(&self) -> u8 {
        const OFFSETS: [u16; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];
        let mut year = self.year;
        if self.month < 3 {
            year -= 1;
        }
        let index = usize::from(self.month.clamp(1, 12) - 1);
        let days = year + year / 4 - year / 100 + year / 400 + OFFSETS[index] + u16::from(self.day);
        (days % 7) as u8
    }
}

fn field(token: Option<&str>) -> Result<u32, TimeParseError> {
    let token = token.ok_or(TimeParseError::Format)?.trim();
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimeParseError::Format);
    }
    token.parse().map_err(|_| TimeParseError::Range)
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

impl fmt::Display for TimeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeParseError::Format => f.write_str("expected YYYY-MM-DD hh:mm:ss"),
            TimeParseError::Range => f.write_str("date or time field out of range"),
        }
    }
}

/// Which alarm fields must match zero for the alarm to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmMatch {
    /// Seconds only: fires once a minute
    Seconds,
    /// Minutes and seconds: fires once an hour
    MinutesSeconds,
}

/// Battery-backed calendar clock with a wake alarm
pub trait RealTimeClock {
    fn now(&mut self) -> DateTime;

    fn set(&mut self, time: DateTime);

    /// Arm the alarm at the next time the matched fields are all zero
    fn set_alarm(&mut self, matching: AlarmMatch);

    /// Halt in low-power standby until the alarm or another wake source fires
    fn standby(&mut self);
}
