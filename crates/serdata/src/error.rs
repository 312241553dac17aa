use std::{io, result};

use thiserror::Error;

use crate::ArchiveMode;

pub type Result<T, E = Error> = result::Result<T, E>;

/// Error types for serdata operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] io::Error),
    #[error(transparent)]
    RawBuf(#[from] rawbuf::Error),

    #[error("Cannot {operation} on a stream in {mode:?} mode")]
    WrongMode {
        operation: &'static str,
        mode: ArchiveMode,
    },
    #[error("Stream ended early: requested {requested} bytes, {available} available")]
    FormatMismatch { requested: usize, available: usize },
    #[error("Negative length prefix: {0}")]
    NegativeLength(i32),
    #[error("Length {len} exceeds the configured limit of {max}")]
    LengthLimitExceeded { len: usize, max: usize },
    #[error("Length {0} does not fit in a 32-bit length prefix")]
    LengthOverflow(usize),
    #[error("No serializer registered for {type_name}")]
    SerializerNotFound { type_name: &'static str },
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),
}

impl Error {
    /// Whether this error reports an index or range beyond some capacity.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::RawBuf(e) if e.is_out_of_range())
    }
}
