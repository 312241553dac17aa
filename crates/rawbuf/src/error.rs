use std::result;

use thiserror::Error;

pub type Result<T, E = Error> = result::Result<T, E>;

/// Error types for rawbuf operations.
#[derive(Debug, Error)]
pub enum Error {
    // Bounds errors
    #[error("Index {index} is out of range for buffer of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Element range {start}..{start}+{count} exceeds length {len}")]
    RangeOutOfBounds {
        start: usize,
        count: usize,
        len: usize,
    },

    #[error("Byte range {offset}..{offset}+{size} exceeds buffer size {byte_len}")]
    ByteRangeOutOfBounds {
        offset: usize,
        size: usize,
        byte_len: usize,
    },

    // Allocation errors
    #[error("Failed to allocate {bytes} bytes of unmanaged memory")]
    AllocationFailure { bytes: usize },

    #[error("Buffer size would overflow: {len} elements of {size_of} bytes")]
    SizeOverflow { len: usize, size_of: usize },
}

impl Error {
    /// Whether this error is one of the out-of-range variants.
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            Self::IndexOutOfRange { .. }
                | Self::RangeOutOfBounds { .. }
                | Self::ByteRangeOutOfBounds { .. }
        )
    }
}
