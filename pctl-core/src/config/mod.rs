//! Operator-tunable configuration
//!
//! A static catalog describes each parameter; [`ParamTable`] holds the
//! live values and persists them through a [`ParamStore`](crate::traits::ParamStore).

pub mod catalog;
pub mod registry;

use core::fmt;

pub use catalog::{Param, ParamEffect, ParamSpec, PARAMS, PARAM_COUNT};
pub use registry::{ConfigError, ConfigRegistry, ParamTable};

/// One `CFG` listing line: `NAME = value [min, max] unit : description`
pub struct ParamEntry<'a, R: ?Sized> {
    pub registry: &'a R,
    pub param: Param,
}

impl<R: ConfigRegistry + ?Sized> fmt::Display for ParamEntry<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spec = self.param.spec();
        write!(
            f,
            "{} = {} [{}, {}] {} : {}",
            spec.name,
            self.registry.get(self.param),
            self.registry.min(self.param),
            self.registry.max(self.param),
            spec.unit,
            spec.description
        )
    }
}
