use std::{fmt, sync::Arc};

use rawbuf::Blittable;

use crate::{
    ArchiveMode, DataSerializer, Error, MemberSerializer, PrimitiveSerializer, Result,
    SerializationStream, SerializerSelector,
};

/// Animation time stored as a signed 32-bit tick count.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Blittable)]
#[repr(transparent)]
pub struct CompressedTimeSpan(pub i32);

impl CompressedTimeSpan {
    pub const ZERO: Self = Self(0);

    pub const fn from_ticks(ticks: i32) -> Self {
        Self(ticks)
    }

    pub const fn ticks(self) -> i32 {
        self.0
    }
}

/// One animation key: a time and the value the curve takes at that time.
///
/// Blittable whenever `T` is, which lets whole key arrays move as one block.
#[derive(Debug, Default, Clone, Copy, PartialEq, Blittable)]
#[repr(C)]
pub struct Keyframe<T> {
    pub time: CompressedTimeSpan,
    pub value: T,
}

impl<T> Keyframe<T> {
    pub const fn new(time: CompressedTimeSpan, value: T) -> Self {
        Self { time, value }
    }
}

/// Element-wise serializer for [`Keyframe`]: the tick count, then the value
/// through the serializer registered for `T`.
pub struct KeyframeSerializer<T> {
    time: PrimitiveSerializer<i32>,
    value: Option<Arc<dyn DataSerializer<T>>>,
}

impl<T: 'static> KeyframeSerializer<T> {
    pub fn new() -> Self {
        Self {
            time: PrimitiveSerializer::new(),
            value: None,
        }
    }
}

impl<T: 'static> Default for KeyframeSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for KeyframeSerializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyframeSerializer")
            .field("value", &std::any::type_name::<T>())
            .field("initialized", &self.value.is_some())
            .finish()
    }
}

impl<T: 'static> DataSerializer<Keyframe<T>> for KeyframeSerializer<T> {
    fn initialize(&mut self, selector: &SerializerSelector) -> Result<()> {
        self.value = Some(MemberSerializer::<T>::create(selector)?);
        Ok(())
    }

    fn serialize(
        &self,
        keyframe: &mut Keyframe<T>,
        mode: ArchiveMode,
        stream: &mut dyn SerializationStream,
    ) -> Result<()> {
        let value = self
            .value
            .as_ref()
            .ok_or(Error::InvalidArgument("keyframe value serializer is not initialized"))?;
        self.time.serialize(&mut keyframe.time.0, mode, stream)?;
        value.pre_serialize(&mut keyframe.value, mode, stream)?;
        value.serialize(&mut keyframe.value, mode, stream)
    }
}
