//! Board-agnostic core logic for the PCTL imaging controller
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (serial ports, strobe, lens, RTC, sensors)
//! - Parameter catalog and registry with flash persistence
//! - Imaging sequence parser and recursive executor
//! - Supervisory controller (power guard, safety loop, command protocol)
//! - Frame trigger logic shared with the interrupt context
//! - Moving-average filtering and cancellable delays

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod filter;
pub mod sequence;
pub mod supervisor;
pub mod text;
pub mod timing;
pub mod traits;
pub mod trigger;
