#![doc = include_str!("../README.md")]

pub use rawbuf::{Blittable, Error as RawBufError, RawBuffer};

mod error;
mod mode;
mod options;
mod selector;
mod serializer;
mod serializers;
mod stream;

pub use error::*;
pub use mode::*;
pub use options::*;
pub use selector::*;
pub use serializer::*;
pub use serializers::*;
pub use stream::*;

/// Serializes `value` into a new byte vector.
///
/// The slot is taken mutably because serializers share one code path for both
/// directions; it is not modified when serializing.
pub fn to_bytes<T>(serializer: &dyn DataSerializer<T>, value: &mut T) -> Result<Vec<u8>> {
    let mut writer = StreamWriter::new(Vec::new());
    serializer.transfer(value, &mut writer)?;
    Ok(writer.into_inner())
}

/// Deserializes a value of type `T` from `bytes`, starting from `T::default()`.
pub fn from_bytes<T: Default>(serializer: &dyn DataSerializer<T>, bytes: &[u8]) -> Result<T> {
    let mut reader = StreamReader::with_len(bytes, bytes.len() as u64);
    let mut value = T::default();
    serializer.transfer(&mut value, &mut reader)?;
    Ok(value)
}
