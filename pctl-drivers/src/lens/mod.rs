//! Tunable lens drivers

pub mod optotune;

pub use optotune::OptotuneLens;
