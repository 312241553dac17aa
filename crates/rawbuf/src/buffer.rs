use std::{fmt, marker::PhantomData, ptr::NonNull, slice};

use log::trace;

use crate::{Blittable, Error, Result, memory, size_of_blittable};

/// Who is responsible for the memory behind a [`RawBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backing {
    /// Allocated by the buffer, freed when the buffer is released.
    Owned,
    /// Supplied by the caller, never freed by the buffer.
    Borrowed,
}

/// Fixed-length block of unmanaged memory viewed as an array of `T`.
///
/// Every accessor validates its index or range before touching memory, so no
/// caller-facing method performs unchecked pointer arithmetic. Offsets into the
/// region are computed as `index * size_of::<T>()` and values are marshalled
/// with unaligned reads and writes, which lets a buffer wrap byte storage with
/// any alignment.
///
/// Owned memory is released exactly once, either by [`RawBuffer::release`] or
/// on drop, whichever comes first. Borrowed memory is left untouched.
#[must_use = "Buffer should be stored to keep the memory accessible"]
pub struct RawBuffer<T: Blittable> {
    ptr: NonNull<u8>,
    len: usize,
    backing: Backing,
    _marker: PhantomData<T>,
}

// SAFETY: the buffer is a plain byte region holding `Blittable` values, which
// are `Send + Sync`. Mutation goes through `&mut self`.
unsafe impl<T: Blittable> Send for RawBuffer<T> {}
unsafe impl<T: Blittable> Sync for RawBuffer<T> {}

impl<T: Blittable> RawBuffer<T> {
    /// The size of T in bytes.
    pub const SIZE_OF_T: usize = size_of_blittable::<T>();

    /// Allocates an owned, zero-initialised buffer of `len` elements.
    pub fn new(len: usize) -> Result<Self> {
        let bytes = Self::byte_len_for(len)?;
        let ptr = memory::allocate(bytes)?;
        Ok(Self {
            ptr,
            len,
            backing: Backing::Owned,
            _marker: PhantomData,
        })
    }

    /// Allocates an owned buffer holding a copy of `src`.
    pub fn from_slice(src: &[T]) -> Result<Self> {
        let mut buffer = Self::new(src.len())?;
        buffer.write_from(src, 0)?;
        Ok(buffer)
    }

    /// Creates a non-owning view of `len` elements over caller-supplied memory.
    ///
    /// # Safety
    /// - `ptr` must be valid for reads and writes of `len * size_of::<T>()` bytes
    /// - the memory must stay valid, and must not be accessed through another
    ///   path while it is being mutated here, for the whole life of the view
    /// - `len * size_of::<T>()` must not overflow `usize`
    pub unsafe fn from_raw_parts(len: usize, ptr: NonNull<u8>) -> Self {
        Self {
            ptr,
            len,
            backing: Backing::Borrowed,
            _marker: PhantomData,
        }
    }

    fn byte_len_for(len: usize) -> Result<usize> {
        len.checked_mul(Self::SIZE_OF_T).ok_or(Error::SizeOverflow {
            len,
            size_of: Self::SIZE_OF_T,
        })
    }

    /// Number of elements.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the region in bytes.
    #[inline(always)]
    pub fn byte_len(&self) -> usize {
        self.len * Self::SIZE_OF_T
    }

    /// Base address of the region.
    #[inline(always)]
    pub fn as_ptr(&self) -> NonNull<u8> {
        self.ptr
    }

    #[inline(always)]
    pub fn backing(&self) -> Backing {
        self.backing
    }

    #[inline(always)]
    pub fn is_owned(&self) -> bool {
        self.backing == Backing::Owned
    }

    /// Reads the element at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Result<T> {
        self.check_index(index)?;
        // SAFETY: index < len, so the element lies inside the region.
        Ok(unsafe { memory::read_value(self.ptr, index * Self::SIZE_OF_T) })
    }

    /// Overwrites the element at `index`.
    #[inline]
    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        self.check_index(index)?;
        // SAFETY: index < len, so the element lies inside the region.
        unsafe { memory::write_value(self.ptr, index * Self::SIZE_OF_T, value) };
        Ok(())
    }

    /// Copies `dst.len()` elements, starting at element `src_offset`, into `dst`.
    pub fn read_into(&self, dst: &mut [T], src_offset: usize) -> Result<()> {
        let count = dst.len();
        self.check_range(src_offset, count)?;
        // SAFETY: the source range was checked above and dst holds `count` elements.
        unsafe {
            memory::read_slice(self.ptr, src_offset * Self::SIZE_OF_T, dst, 0, count);
        }
        Ok(())
    }

    /// Copies `count` elements from the region, starting at a raw `byte_offset`
    /// that need not be a multiple of the element size, into
    /// `dst[dst_offset..dst_offset + count]`.
    pub fn read_into_at(
        &self,
        dst: &mut [T],
        byte_offset: usize,
        dst_offset: usize,
        count: usize,
    ) -> Result<()> {
        check_slice_range(dst_offset, count, dst.len())?;
        self.check_bytes(byte_offset, count)?;
        trace!("Reading {count} elements from byte offset {byte_offset}.");
        // SAFETY: both ranges were checked above.
        unsafe { memory::read_slice(self.ptr, byte_offset, dst, dst_offset, count) };
        Ok(())
    }

    /// Copies all of `src` into the region, starting at element `dst_offset`.
    pub fn write_from(&mut self, src: &[T], dst_offset: usize) -> Result<()> {
        let count = src.len();
        self.check_range(dst_offset, count)?;
        // SAFETY: the destination range was checked above and src holds `count` elements.
        unsafe {
            memory::write_slice(self.ptr, dst_offset * Self::SIZE_OF_T, src, 0, count);
        }
        Ok(())
    }

    /// Copies `src[src_offset..src_offset + count]` into the region at a raw
    /// `byte_offset` that need not be a multiple of the element size.
    pub fn write_from_at(
        &mut self,
        src: &[T],
        byte_offset: usize,
        src_offset: usize,
        count: usize,
    ) -> Result<()> {
        check_slice_range(src_offset, count, src.len())?;
        self.check_bytes(byte_offset, count)?;
        trace!("Writing {count} elements at byte offset {byte_offset}.");
        // SAFETY: both ranges were checked above.
        unsafe { memory::write_slice(self.ptr, byte_offset, src, src_offset, count) };
        Ok(())
    }

    /// Returns the whole region as bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: the region spans `byte_len` initialised bytes: owned memory is
        // zeroed on allocation, borrowed memory is the caller's guarantee.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.byte_len()) }
    }

    /// Returns the whole region as mutable bytes.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: see `as_bytes`; `&mut self` guarantees exclusivity.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.byte_len()) }
    }

    /// Copies every element into a new `Vec`.
    pub fn to_vec(&self) -> Vec<T> {
        let mut values = Vec::<T>::with_capacity(self.len);
        // SAFETY: the whole region is read into `len` freshly reserved slots,
        // which are initialised before the length is set.
        unsafe {
            memory::read_slice(self.ptr, 0, values.spare_capacity_mut(), 0, self.len);
            values.set_len(self.len);
        }
        values
    }

    /// Releases the buffer now. Owned memory is freed, borrowed memory is not.
    #[inline]
    pub fn release(self) {
        drop(self)
    }

    #[inline(always)]
    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.len {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        Ok(())
    }

    #[inline(always)]
    fn check_range(&self, start: usize, count: usize) -> Result<()> {
        check_slice_range(start, count, self.len)
    }

    #[inline(always)]
    fn check_bytes(&self, offset: usize, count: usize) -> Result<()> {
        let byte_len = self.byte_len();
        let size = count
            .checked_mul(Self::SIZE_OF_T)
            .ok_or(Error::ByteRangeOutOfBounds {
                offset,
                size: usize::MAX,
                byte_len,
            })?;
        match offset.checked_add(size) {
            Some(end) if end <= byte_len => Ok(()),
            _ => Err(Error::ByteRangeOutOfBounds {
                offset,
                size,
                byte_len,
            }),
        }
    }
}

#[inline(always)]
fn check_slice_range(start: usize, count: usize, len: usize) -> Result<()> {
    match start.checked_add(count) {
        Some(end) if end <= len => Ok(()),
        _ => Err(Error::RangeOutOfBounds { start, count, len }),
    }
}

impl<T: Blittable> Drop for RawBuffer<T> {
    fn drop(&mut self) {
        if self.backing == Backing::Owned {
            // SAFETY: owned memory comes from `memory::allocate` and drop runs once.
            unsafe { memory::free(self.ptr) }
        }
    }
}

impl<T: Blittable> fmt::Debug for RawBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawBuffer")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .field("size_of_t", &Self::SIZE_OF_T)
            .field("backing", &self.backing)
            .finish()
    }
}
