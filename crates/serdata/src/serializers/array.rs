use std::{fmt, ptr::NonNull, sync::Arc};

use log::{debug, trace};
use rawbuf::{Blittable, RawBuffer, memory};

use crate::{
    ArchiveMode, ArrayOptions, DataSerializer, Error, MemberSerializer, Result,
    SerializationStream, SerializerSelector,
};

type WriteBlock<T> = fn(&[T], &mut dyn SerializationStream) -> Result<()>;
type ReadBlock<T> = fn(&mut [T], &mut dyn SerializationStream) -> Result<()>;

/// Contiguous block transfer, only constructible for blittable element types.
struct BlockCopy<T> {
    size_of: usize,
    write: WriteBlock<T>,
    read: ReadBlock<T>,
}

impl<T: Blittable> BlockCopy<T> {
    fn new() -> Self {
        Self {
            size_of: RawBuffer::<T>::SIZE_OF_T,
            write: write_block::<T>,
            read: read_block::<T>,
        }
    }
}

/// Serializer for `Vec<T>`: an `i32` element count, then the elements in index
/// order.
///
/// Built with [`ArraySerializer::new`], elements always go one by one through
/// the element serializer. Built with [`ArraySerializer::blittable`], the
/// payload moves as a single block of `len * size_of::<T>()` bytes. The block
/// holds the values in native byte order, so it is only used on little-endian
/// targets, where it matches the element-wise encoding byte for byte.
pub struct ArraySerializer<T> {
    item: Option<Arc<dyn DataSerializer<T>>>,
    block: Option<BlockCopy<T>>,
    options: ArrayOptions,
}

impl<T> ArraySerializer<T>
where
    T: Default + Clone + Send + Sync + 'static,
{
    /// Element-wise serializer. The element serializer is resolved in
    /// [`initialize`](DataSerializer::initialize).
    pub fn new() -> Self {
        Self {
            item: None,
            block: None,
            options: ArrayOptions::default(),
        }
    }

    /// Element-wise serializer over an explicit element serializer, usable
    /// without a selector.
    pub fn with_item(item: Arc<dyn DataSerializer<T>>) -> Self {
        Self {
            item: Some(item),
            ..Self::new()
        }
    }

    pub fn with_options(mut self, options: ArrayOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> ArrayOptions {
        self.options
    }

    /// Whether [`serialize`](DataSerializer::serialize) takes the block path.
    pub fn uses_fast_path(&self) -> bool {
        self.fast_path().is_some()
    }

    #[inline]
    fn fast_path(&self) -> Option<&BlockCopy<T>> {
        self.block
            .as_ref()
            .filter(|_| self.options.fast_path && cfg!(target_endian = "little"))
    }
}

impl<T> ArraySerializer<T>
where
    T: Blittable + Default + Send + Sync + 'static,
{
    /// Serializer moving the payload as one contiguous block.
    pub fn blittable() -> Self {
        Self {
            block: Some(BlockCopy::new()),
            ..Self::new()
        }
    }
}

impl<T> Default for ArraySerializer<T>
where
    T: Default + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ArraySerializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArraySerializer")
            .field("element", &std::any::type_name::<T>())
            .field("item", &self.item.is_some())
            .field("block", &self.block.is_some())
            .field("options", &self.options)
            .finish()
    }
}

impl<T> DataSerializer<Vec<T>> for ArraySerializer<T>
where
    T: Default + Clone + Send + Sync + 'static,
{
    fn initialize(&mut self, selector: &SerializerSelector) -> Result<()> {
        if self.item.is_some() {
            return Ok(());
        }
        match MemberSerializer::<T>::create(selector) {
            Ok(item) => self.item = Some(item),
            // The block path never touches the element serializer
            Err(e) if self.uses_fast_path() => {
                debug!("{e}, array will only use the block path.");
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    fn pre_serialize(
        &self,
        value: &mut Vec<T>,
        mode: ArchiveMode,
        stream: &mut dyn SerializationStream,
    ) -> Result<()> {
        match mode {
            ArchiveMode::Serialize => {
                let len =
                    i32::try_from(value.len()).map_err(|_| Error::LengthOverflow(value.len()))?;
                stream.write_i32(len)
            }
            ArchiveMode::Deserialize => {
                let len = stream.read_i32()?;
                let len = usize::try_from(len).map_err(|_| Error::NegativeLength(len))?;
                if len > self.options.max_len {
                    return Err(Error::LengthLimitExceeded {
                        len,
                        max: self.options.max_len,
                    });
                }
                if let (Some(block), Some(remaining)) = (self.fast_path(), stream.remaining()) {
                    let needed = (len as u64).saturating_mul(block.size_of as u64);
                    if needed > remaining {
                        return Err(Error::FormatMismatch {
                            requested: usize::try_from(needed).unwrap_or(usize::MAX),
                            available: usize::try_from(remaining).unwrap_or(usize::MAX),
                        });
                    }
                }
                *value = memory::filled_vec(len, T::default())?;
                Ok(())
            }
        }
    }

    fn serialize(
        &self,
        value: &mut Vec<T>,
        mode: ArchiveMode,
        stream: &mut dyn SerializationStream,
    ) -> Result<()> {
        if let Some(block) = self.fast_path() {
            trace!("Block transfer of {} elements ({mode:?}).", value.len());
            return match mode {
                ArchiveMode::Serialize => (block.write)(value, stream),
                ArchiveMode::Deserialize => (block.read)(value, stream),
            };
        }

        let item = self
            .item
            .as_ref()
            .ok_or(Error::InvalidArgument("array element serializer is not initialized"))?;
        trace!("Element-wise transfer of {} elements ({mode:?}).", value.len());
        for element in value.iter_mut() {
            item.pre_serialize(element, mode, stream)?;
            item.serialize(element, mode, stream)?;
        }
        Ok(())
    }
}

/// Stages the values in an owned buffer and writes it in one operation.
fn write_block<T: Blittable>(values: &[T], stream: &mut dyn SerializationStream) -> Result<()> {
    let staging = RawBuffer::from_slice(values)?;
    stream.write_bytes(staging.as_bytes())
}

/// Reads the whole payload in one operation, then copies it out through a
/// borrowed view over the received bytes.
fn read_block<T: Blittable>(values: &mut [T], stream: &mut dyn SerializationStream) -> Result<()> {
    let count = values.len();
    let bytes = count
        .checked_mul(RawBuffer::<T>::SIZE_OF_T)
        .ok_or(Error::LengthOverflow(count))?;
    let mut raw = stream.read_bytes(bytes)?;
    let ptr = NonNull::from(raw.as_mut_slice()).cast::<u8>();
    // SAFETY: `raw` holds exactly `count * size_of::<T>()` bytes and outlives
    // the view, which is dropped at the end of this function.
    let staging = unsafe { RawBuffer::<T>::from_raw_parts(count, ptr) };
    staging.read_into(values, 0)?;
    Ok(())
}
