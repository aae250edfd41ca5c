//! Non-volatile parameter storage

/// Errors from parameter storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Nothing has been stored yet
    NotFound,
    /// Stored image larger than the read buffer
    BufferTooSmall,
    /// Underlying flash or map operation failed
    Storage,
}

/// Persistent home of the encoded parameter image
pub trait ParamStore {
    /// Read the stored image into `buffer`, returning its length
    fn load(&mut self, buffer: &mut [u8]) -> Result<usize, StoreError>;

    /// Replace the stored image
    fn save(&mut self, data: &[u8]) -> Result<(), StoreError>;
}
