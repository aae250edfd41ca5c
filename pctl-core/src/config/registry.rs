//! Parameter registry and persistence
//!
//! The registry holds the live value of every catalog entry. Values are
//! persisted as a postcard-encoded `(version, values)` image.

use core::fmt;

use super::catalog::{Param, ParamEffect, PARAM_COUNT};
use crate::traits::{ParamStore, StoreError};

/// Version tag of the persisted image
pub const IMAGE_VERSION: u8 = 1;

/// Largest encoded image (varint i32 worst case plus version)
pub const MAX_IMAGE_SIZE: usize = 1 + PARAM_COUNT * 5;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Name does not match any parameter
    UnknownParam,
    /// Value outside the parameter's bounds
    OutOfRange { value: i32, min: i32, max: i32 },
    /// Storage read or write failed
    Store(StoreError),
    /// Stored image could not be decoded
    Corrupted,
    /// Stored image was written by an incompatible firmware
    VersionMismatch,
}

impl From<StoreError> for ConfigError {
    fn from(e: StoreError) -> Self {
        ConfigError::Store(e)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownParam => f.write_str("unknown parameter"),
            ConfigError::OutOfRange { value, min, max } => {
                write!(f, "{} outside [{}, {}]", value, min, max)
            }
            ConfigError::Store(StoreError::NotFound) => f.write_str("no stored configuration"),
            ConfigError::Store(_) => f.write_str("storage failure"),
            ConfigError::Corrupted => f.write_str("stored configuration corrupted"),
            ConfigError::VersionMismatch => f.write_str("stored configuration version mismatch"),
        }
    }
}

/// Configuration registry contract consumed by the sequence engine and supervisor
pub trait ConfigRegistry {
    fn get(&self, param: Param) -> i32;

    fn min(&self, param: Param) -> i32 {
        param.spec().min
    }

    fn max(&self, param: Param) -> i32 {
        param.spec().max
    }

    /// Validate and store a value, returning the effect the caller must apply
    fn set(&mut self, param: Param, value: i32) -> Result<Option<ParamEffect>, ConfigError>;

    /// Write every value to non-volatile storage
    fn persist(&self, store: &mut dyn ParamStore) -> Result<(), ConfigError>;

    /// Replace every value from non-volatile storage
    fn reload(&mut self, store: &mut dyn ParamStore) -> Result<(), ConfigError>;
}

/// In-memory parameter values backed by the static catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamTable {
    values: [i32; PARAM_COUNT],
}

impl Default for ParamTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamTable {
    /// Table holding every catalog default
    pub fn new() -> Self {
        let mut values = [0; PARAM_COUNT];
        for param in Param::ALL {
            values[param.index()] = param.spec().default;
        }
        Self { values }
    }

    /// Encode the value image into `buffer`
    pub fn encode<'b>(&self, buffer: &'b mut [u8]) -> Result<&'b mut [u8], ConfigError> {
        postcard::to_slice(&(IMAGE_VERSION, self.values), buffer).map_err(|_| ConfigError::Corrupted)
    }

    /// Decode a value image, falling back to the default for any value
    /// that no longer fits its bounds
    pub fn decode(bytes: &[u8]) -> Result<Self, ConfigError> {
        let (version, values): (u8, [i32; PARAM_COUNT]) =
            postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
        if version != IMAGE_VERSION {
            return Err(ConfigError::VersionMismatch);
        }

        let mut table = Self::new();
        for param in Param::ALL {
            let value = values[param.index()];
            if param.spec().accepts(value) {
                table.values[param.index()] = value;
            }
        }
        Ok(table)
    }
}

impl ConfigRegistry for ParamTable {
    fn get(&self, param: Param) -> i32 {
        self.values[param.index()]
    }

    fn set(&mut self, param: Param, value: i32) -> Result<Option<ParamEffect>, ConfigError> {
        let spec = param.spec();
        if !spec.accepts(value) {
            return Err(ConfigError::OutOfRange {
                value,
                min: spec.min,
                max: spec.max,
            });
        }
        self.values[param.index()] = value;
        Ok(spec.effect)
    }

    fn persist(&self, store: &mut dyn ParamStore) -> Result<(), ConfigError> {
        let mut buffer = [0u8; MAX_IMAGE_SIZE];
        let image = self.encode(&mut buffer)?;
        store.save(image)?;
        Ok(())
    }

    fn reload(&mut self, store: &mut dyn ParamStore) -> Result<(), ConfigError> {
        let mut buffer = [0u8; MAX_IMAGE_SIZE];
        let len = store.load(&mut buffer)?;
        *self = Self::decode(&buffer[..len])?;
        Ok(())
    }
}
