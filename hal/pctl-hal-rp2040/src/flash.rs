//! Flash parameter store for RP2040
//!
//! Uses sequential-storage for wear-leveled key-value storage
//! in the last 64KB of flash. The store API is blocking; each map
//! operation is driven to completion with `block_on` while the DMA
//! transfer runs.

use embassy_futures::block_on;
use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use pctl_core::config::registry::MAX_IMAGE_SIZE;
use pctl_core::traits::{ParamStore, StoreError};
use sequential_storage::cache::NoCache;
use sequential_storage::map::{self, Key, SerializationError};

/// Flash storage layout
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB on the Pico
pub const CONFIG_PARTITION_SIZE: usize = 64 * 1024;
pub const CONFIG_PARTITION_START: usize = FLASH_SIZE - CONFIG_PARTITION_SIZE;

/// Flash range for the config partition
pub const CONFIG_RANGE: core::ops::Range<u32> =
    (CONFIG_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Scratch buffer for one map item (key, length and image)
const ITEM_BUFFER_SIZE: usize = 256;

/// Keys of the items kept in the config partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Parameter value image (postcard)
    ParamImage = 0,
}

impl StorageKey {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::ParamImage),
            _ => None,
        }
    }
}

impl Key for StorageKey {
    fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, SerializationError> {
        let Some(slot) = buffer.first_mut() else {
            return Err(SerializationError::BufferTooSmall);
        };
        *slot = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(buffer: &[u8]) -> Result<(Self, usize), SerializationError> {
        let byte = buffer.first().ok_or(SerializationError::BufferTooSmall)?;
        match StorageKey::from_u8(*byte) {
            Some(key) => Ok((key, 1)),
            None => Err(SerializationError::InvalidFormat),
        }
    }
}

/// Parameter image kept in the config partition
pub struct FlashParamStore<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> FlashParamStore<'d> {
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }
}

impl ParamStore for FlashParamStore<'_> {
    fn load(&mut self, buffer: &mut [u8]) -> Result<usize, StoreError> {
        let mut data_buffer = [0u8; ITEM_BUFFER_SIZE];

        let result = block_on(map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            CONFIG_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &StorageKey::ParamImage,
        ));

        match result {
            Ok(Some(data)) => {
                let target = buffer
                    .get_mut(..data.len())
                    .ok_or(StoreError::BufferTooSmall)?;
                target.copy_from_slice(data);
                Ok(data.len())
            }
            Ok(None) => Err(StoreError::NotFound),
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("parameter fetch failed: {}", defmt::Debug2Format(&_e));
                Err(StoreError::Storage)
            }
        }
    }

    fn save(&mut self, data: &[u8]) -> Result<(), StoreError> {
        if data.len() > MAX_IMAGE_SIZE {
            return Err(StoreError::BufferTooSmall);
        }
        let mut data_buffer = [0u8; ITEM_BUFFER_SIZE];

        block_on(map::store_item(
            &mut self.flash,
            CONFIG_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &StorageKey::ParamImage,
            &data,
        ))
        .map_err(|_e| {
            #[cfg(feature = "defmt")]
            defmt::warn!("parameter store failed: {}", defmt::Debug2Format(&_e));
            StoreError::Storage
        })?;

        #[cfg(feature = "defmt")]
        defmt::info!("parameter image saved ({} bytes)", data.len());
        Ok(())
    }
}
