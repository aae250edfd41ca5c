//! Environment and supply-voltage safety checks
//!
//! Every sample is smoothed; comparisons against the limits run at most
//! once per check interval and never during the startup grace period.

use core::fmt;

use heapless::Vec;

use crate::config::{ConfigRegistry, Param};
use crate::filter::MovingAverage;
use crate::text::Milli;
use crate::traits::EnvironmentSample;

/// Smoothed supply below this is treated as USB power and not checked
pub const USB_POWER_FLOOR_MV: i32 = 6000;

/// Limits and timing read from the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SafetyLimits {
    pub temperature_c: i32,
    pub humidity_pct: i32,
    pub low_voltage_mv: i32,
    pub startup_s: u32,
    pub check_interval_s: u32,
}

impl SafetyLimits {
    pub fn from_registry<R: ConfigRegistry + ?Sized>(registry: &R) -> Self {
        Self {
            temperature_c: registry.get(Param::TemperatureLimit),
            humidity_pct: registry.get(Param::HumidityLimit),
            low_voltage_mv: registry.get(Param::LowVoltage),
            startup_s: registry.get(Param::StartupTime).max(0) as u32,
            check_interval_s: registry.get(Param::CheckInterval).max(0) as u32,
        }
    }
}

/// A limit violated by a smoothed reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Finding {
    OverTemperature { smoothed_mc: i32, limit_c: i32 },
    OverHumidity { smoothed_mpct: i32, limit_pct: i32 },
    LowVoltage { smoothed_mv: i32, limit_mv: i32 },
}

/// What the controller should do about a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SafetyAction {
    None,
    /// Ask the host computer to shut down
    RequestShutdown,
    /// Enter low-power standby
    Standby,
}

impl Finding {
    pub fn action(&self, camera_on: bool, standby_enabled: bool) -> SafetyAction {
        match self {
            _ if camera_on => SafetyAction::RequestShutdown,
            Finding::LowVoltage { .. } if standby_enabled => SafetyAction::Standby,
            _ => SafetyAction::None,
        }
    }

    pub fn is_environment(&self) -> bool {
        !matches!(self, Finding::LowVoltage { .. })
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Finding::OverTemperature {
                smoothed_mc,
                limit_c,
            } => write!(
                f,
                "Temperature {} C exceeds limit of {} C",
                Milli(smoothed_mc),
                limit_c
            ),
            Finding::OverHumidity {
                smoothed_mpct,
                limit_pct,
            } => write!(
                f,
                "Humidity {} % exceeds limit of {} %",
                Milli(smoothed_mpct),
                limit_pct
            ),
            Finding::LowVoltage {
                smoothed_mv,
                limit_mv,
            } => write!(
                f,
                "Voltage {} mV below threshold {} mV",
                smoothed_mv, limit_mv
            ),
        }
    }
}

/// Findings from one observation
pub type Findings = Vec<Finding, 3>;

/// Moving averages and check schedule for the safety loop
#[derive(Debug, Clone)]
pub struct SafetyMonitor {
    boot_s: u64,
    temperature: MovingAverage,
    humidity: MovingAverage,
    voltage: MovingAverage,
    environment_checked_s: u64,
    voltage_checked_s: u64,
    environment_fault: bool,
}

impl SafetyMonitor {
    pub fn new(boot_s: u64) -> Self {
        Self {
            boot_s,
            temperature: MovingAverage::new(),
            humidity: MovingAverage::new(),
            voltage: MovingAverage::new(),
            environment_checked_s: boot_s,
            voltage_checked_s: boot_s,
            environment_fault: false,
        }
    }

    /// Temperature or humidity was over its limit at the last check
    pub fn environment_fault(&self) -> bool {
        self.environment_fault
    }

    pub fn smoothed_voltage_mv(&self) -> i32 {
        self.voltage.mean()
    }

    /// Feed one sample and run any checks that are due
    pub fn observe(
        &mut self,
        now_s: u64,
        sample: &EnvironmentSample,
        limits: &SafetyLimits,
    ) -> Findings {
        let mut findings = Findings::new();
        if now_s.saturating_sub(self.boot_s) <= u64::from(limits.startup_s) {
            return findings;
        }

        let temperature = self.temperature.update(sample.temperature_mc);
        let humidity = self.humidity.update(sample.humidity_mpct);
        let voltage = self.voltage.update(sample.voltage_mv);
        let interval = u64::from(limits.check_interval_s);

        if now_s.saturating_sub(self.environment_checked_s) >= interval {
            self.environment_checked_s = now_s;
            self.environment_fault = false;

            if temperature > limits.temperature_c.saturating_mul(1000) {
                self.environment_fault = true;
                let _ = findings.push(Finding::OverTemperature {
                    smoothed_mc: temperature,
                    limit_c: limits.temperature_c,
                });
            }
            if humidity > limits.humidity_pct.saturating_mul(1000) {
                self.environment_fault = true;
                let _ = findings.push(Finding::OverHumidity {
                    smoothed_mpct: humidity,
                    limit_pct: limits.humidity_pct,
                });
            }
        }

        if now_s.saturating_sub(self.voltage_checked_s) >= interval {
            self.voltage_checked_s = now_s;
            if voltage >= USB_POWER_FLOOR_MV && voltage < limits.low_voltage_mv {
                let _ = findings.push(Finding::LowVoltage {
                    smoothed_mv: voltage,
                    limit_mv: limits.low_voltage_mv,
                });
            }
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> SafetyLimits {
        SafetyLimits {
            temperature_c: 55,
            humidity_pct: 60,
            low_voltage_mv: 11500,
            startup_s: 0,
            check_interval_s: 10,
        }
    }

    fn sample(voltage_mv: i32) -> EnvironmentSample {
        EnvironmentSample {
            temperature_mc: 25_000,
            humidity_mpct: 40_000,
            voltage_mv,
            power_mw: 0,
        }
    }

    /// One sample per second for ten seconds; the check runs on the last
    fn run_window(monitor: &mut SafetyMonitor, voltages: [i32; 10]) -> Findings {
        let mut last = Findings::new();
        for (second, mv) in voltages.iter().enumerate() {
            last = monitor.observe(second as u64 + 1, &sample(*mv), &limits());
        }
        last
    }

    #[test]
    fn test_transient_dip_is_ignored() {
        let mut monitor = SafetyMonitor::new(0);
        let mut voltages = [12_000; 10];
        voltages[4] = 11_000;
        let findings = run_window(&mut monitor, voltages);
        assert!(findings.is_empty());
        assert_eq!(monitor.smoothed_voltage_mv(), 11_900);
    }

    #[test]
    fn test_sustained_low_voltage() {
        let mut monitor = SafetyMonitor::new(0);
        let findings = run_window(&mut monitor, [11_000; 10]);
        assert_eq!(
            findings.as_slice(),
            &[Finding::LowVoltage {
                smoothed_mv: 11_000,
                limit_mv: 11_500
            }]
        );
    }

    #[test]
    fn test_usb_power_skips_voltage_check() {
        let mut monitor = SafetyMonitor::new(0);
        let findings = run_window(&mut monitor, [5_000; 10]);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_checks_wait_for_interval() {
        let mut monitor = SafetyMonitor::new(0);
        for second in 1..10 {
            assert!(monitor.observe(second, &sample(9_000), &limits()).is_empty());
        }
        assert_eq!(monitor.observe(10, &sample(9_000), &limits()).len(), 1);
        assert!(monitor.observe(11, &sample(9_000), &limits()).is_empty());
    }

    #[test]
    fn test_startup_grace_skips_everything() {
        let mut monitor = SafetyMonitor::new(0);
        let limits = SafetyLimits {
            startup_s: 30,
            ..limits()
        };
        for second in 0..=30 {
            assert!(monitor.observe(second, &sample(9_000), &limits).is_empty());
        }
        assert_eq!(monitor.smoothed_voltage_mv(), 0);
    }

    #[test]
    fn test_environment_fault_clears() {
        let mut monitor = SafetyMonitor::new(0);
        let hot = EnvironmentSample {
            temperature_mc: 70_000,
            ..sample(12_000)
        };
        for second in 1..=10 {
            monitor.observe(second, &hot, &limits());
        }
        assert!(monitor.environment_fault());

        for second in 11..=30 {
            monitor.observe(second, &sample(12_000), &limits());
        }
        assert!(!monitor.environment_fault());
    }

    #[test]
    fn test_actions() {
        let low = Finding::LowVoltage {
            smoothed_mv: 11_000,
            limit_mv: 11_500,
        };
        let hot = Finding::OverTemperature {
            smoothed_mc: 60_000,
            limit_c: 55,
        };
        assert_eq!(low.action(true, true), SafetyAction::RequestShutdown);
        assert_eq!(low.action(false, true), SafetyAction::Standby);
        assert_eq!(low.action(false, false), SafetyAction::None);
        assert_eq!(hot.action(true, true), SafetyAction::RequestShutdown);
        assert_eq!(hot.action(false, true), SafetyAction::None);
    }
}
