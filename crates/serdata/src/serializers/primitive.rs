use std::{fmt, marker::PhantomData, sync::Arc};

use crate::{ArchiveMode, DataSerializer, Result, SerializationStream, SerializerSelector};

/// Fixed-width little-endian serializer for a numeric primitive.
pub struct PrimitiveSerializer<T>(PhantomData<fn() -> T>);

impl<T> PrimitiveSerializer<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for PrimitiveSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for PrimitiveSerializer<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PrimitiveSerializer<T> {}

impl<T> fmt::Debug for PrimitiveSerializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrimitiveSerializer<{}>", std::any::type_name::<T>())
    }
}

macro_rules! impl_primitive_serializer {
    ($($t:ty),*) => {
        $(
            impl DataSerializer<$t> for PrimitiveSerializer<$t> {
                #[inline]
                fn serialize(
                    &self,
                    value: &mut $t,
                    mode: ArchiveMode,
                    stream: &mut dyn SerializationStream,
                ) -> Result<()> {
                    match mode {
                        ArchiveMode::Serialize => stream.write_bytes(&value.to_le_bytes()),
                        ArchiveMode::Deserialize => {
                            let mut bytes = [0; size_of::<$t>()];
                            stream.read_bytes_into(&mut bytes)?;
                            *value = <$t>::from_le_bytes(bytes);
                            Ok(())
                        }
                    }
                }
            }
        )*

        /// Registers a [`PrimitiveSerializer`] for every supported numeric type.
        pub(crate) fn register_primitives(selector: &SerializerSelector) {
            $(
                selector.insert::<$t>(Arc::new(PrimitiveSerializer::<$t>::new()));
            )*
        }
    };
}

impl_primitive_serializer!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128, f32, f64);
