//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in pctl-core, written against `embedded-hal` 1.0:
//!
//! - Camera trigger and strobe outputs (GPIO)
//! - Electrically tunable lens controller (ASCII serial protocol)
//! - Supply power monitor (INA260)
//! - Temperature/humidity sensor (SHT3x)

#![no_std]
#![deny(unsafe_code)]

pub mod lens;
pub mod sensor;
pub mod strobe;

pub use lens::OptotuneLens;
pub use sensor::{EnvironmentBoard, Ina260, Sht3x};
pub use strobe::GpioStrobe;
