//! RP2040 calendar RTC
//!
//! The RTC keeps the wall-clock time for the status line and provides
//! the wake-up alarm. Standby parks the core in WFI until the alarm time
//! is reached; any interrupt that fires earlier only re-checks the clock.

use embassy_rp::peripherals::RTC;
use embassy_rp::rtc::{DateTime as RtcDateTime, DateTimeFilter, DayOfWeek, Rtc};
use pctl_core::traits::{AlarmMatch, DateTime, RealTimeClock};

pub struct BoardRtc<'d> {
    rtc: Rtc<'d, RTC>,
    alarm: Option<AlarmMatch>,
}

impl<'d> BoardRtc<'d> {
    pub fn new(rtc: Rtc<'d, RTC>) -> Self {
        Self { rtc, alarm: None }
    }

    fn alarm_reached(&self, matching: AlarmMatch) -> bool {
        let Ok(now) = self.rtc.now() else {
            // A stopped RTC can never raise the alarm
            return true;
        };
        match matching {
            AlarmMatch::Seconds => now.second == 0,
            AlarmMatch::MinutesSeconds => now.minute == 0 && now.second == 0,
        }
    }
}

fn day_of_week(weekday: u8) -> DayOfWeek {
    match weekday {
        1 => DayOfWeek::Monday,
        2 => DayOfWeek::Tuesday,
        3 => DayOfWeek::Wednesday,
        4 => DayOfWeek::Thursday,
        5 => DayOfWeek::Friday,
        6 => DayOfWeek::Saturday,
        _ => DayOfWeek::Sunday,
    }
}

impl RealTimeClock for BoardRtc<'_> {
    fn now(&mut self) -> DateTime {
        match self.rtc.now() {
            Ok(t) => DateTime {
                year: t.year,
                month: t.month,
                day: t.day,
                hour: t.hour,
                minute: t.minute,
                second: t.second,
            },
            Err(_) => DateTime::default(),
        }
    }

    fn set(&mut self, time: DateTime) {
        let value = RtcDateTime {
            year: time.year,
            month: time.month,
            day: time.day,
            day_of_week: day_of_week(time.weekday()),
            hour: time.hour,
            minute: time.minute,
            second: time.second,
        };
        if let Err(_e) = self.rtc.set_datetime(value) {
            #[cfg(feature = "defmt")]
            defmt::warn!("rtc rejected time: {}", defmt::Debug2Format(&_e));
        }
    }

    fn set_alarm(&mut self, matching: AlarmMatch) {
        let filter = match matching {
            AlarmMatch::Seconds => DateTimeFilter::default().second(0),
            AlarmMatch::MinutesSeconds => DateTimeFilter::default().minute(0).second(0),
        };
        self.rtc.schedule_alarm(filter);
        self.alarm = Some(matching);
    }

    fn standby(&mut self) {
        let Some(matching) = self.alarm else {
            return;
        };
        #[cfg(feature = "defmt")]
        defmt::info!("standby until {}", matching);

        // Leave the current matching second before waiting for the next one
        while self.alarm_reached(matching) {
            cortex_m::asm::wfi();
        }
        while !self.alarm_reached(matching) {
            cortex_m::asm::wfi();
        }
        self.rtc.disable_alarm();
        self.rtc.clear_interrupt();
        self.alarm = None;
    }
}
