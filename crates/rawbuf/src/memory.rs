//! Unchecked primitives over unmanaged memory.
//!
//! Nothing in this module validates offsets or lengths. [`RawBuffer`](crate::RawBuffer)
//! performs every bounds check before calling in here, and it is the only safe
//! entry point onto these functions.

use std::{mem::size_of, ptr::NonNull};

use log::debug;

use crate::{Error, Result};

/// Allocates `bytes` bytes of zero-initialised unmanaged memory.
///
/// A zero-sized request still returns a unique, freeable pointer.
pub fn allocate(bytes: usize) -> Result<NonNull<u8>> {
    // calloc(0) may legally return null, ask for at least one byte
    let ptr = unsafe { libc::calloc(bytes.max(1), 1) } as *mut u8;
    let ptr = NonNull::new(ptr).ok_or(Error::AllocationFailure { bytes })?;
    debug!("Allocated {bytes} bytes at {ptr:p}.");
    Ok(ptr)
}

/// Releases memory obtained from [`allocate`].
///
/// # Safety
/// `ptr` must come from [`allocate`] and must not be freed twice.
pub unsafe fn free(ptr: NonNull<u8>) {
    debug!("Freeing unmanaged memory at {ptr:p}.");
    unsafe { libc::free(ptr.as_ptr().cast()) }
}

/// Builds a vector of `len` copies of `value` on the global heap, reporting a
/// failed allocation as [`Error::AllocationFailure`] instead of aborting.
pub fn filled_vec<T: Clone>(len: usize, value: T) -> Result<Vec<T>> {
    let mut values = Vec::new();
    values
        .try_reserve_exact(len)
        .map_err(|_| Error::AllocationFailure {
            bytes: len.saturating_mul(size_of::<T>()),
        })?;
    values.resize(len, value);
    Ok(values)
}

/// Reads one value at `byte_offset`, with no alignment requirement.
///
/// # Safety
/// `byte_offset + size_of::<T>()` bytes from `ptr` must be readable and hold a
/// valid `T`.
#[inline(always)]
pub unsafe fn read_value<T: Copy>(ptr: NonNull<u8>, byte_offset: usize) -> T {
    unsafe { ptr.as_ptr().add(byte_offset).cast::<T>().read_unaligned() }
}

/// Writes one value at `byte_offset`, with no alignment requirement.
///
/// # Safety
/// `byte_offset + size_of::<T>()` bytes from `ptr` must be writable.
#[inline(always)]
pub unsafe fn write_value<T: Copy>(ptr: NonNull<u8>, byte_offset: usize, value: T) {
    unsafe { ptr.as_ptr().add(byte_offset).cast::<T>().write_unaligned(value) }
}

/// Copies `count` elements from unmanaged memory at `byte_offset` into
/// `dst[dst_offset..dst_offset + count]`.
///
/// # Safety
/// - `byte_offset + count * size_of::<T>()` bytes from `ptr` must be readable
/// - `dst_offset + count <= dst.len()`
/// - the source bytes must be a valid representation of `count` values of `T`
/// - the source must not overlap `dst`
#[inline]
pub unsafe fn read_slice<T: Copy>(
    ptr: NonNull<u8>,
    byte_offset: usize,
    dst: &mut [T],
    dst_offset: usize,
    count: usize,
) {
    unsafe {
        std::ptr::copy_nonoverlapping(
            ptr.as_ptr().add(byte_offset),
            dst.as_mut_ptr().add(dst_offset).cast::<u8>(),
            count * size_of::<T>(),
        );
    }
}

/// Copies `src[src_offset..src_offset + count]` into unmanaged memory at
/// `byte_offset`.
///
/// # Safety
/// - `byte_offset + count * size_of::<T>()` bytes from `ptr` must be writable
/// - `src_offset + count <= src.len()`
/// - `T` must have no padding bytes
/// - the destination must not overlap `src`
#[inline]
pub unsafe fn write_slice<T: Copy>(
    ptr: NonNull<u8>,
    byte_offset: usize,
    src: &[T],
    src_offset: usize,
    count: usize,
) {
    unsafe {
        std::ptr::copy_nonoverlapping(
            src.as_ptr().add(src_offset).cast::<u8>(),
            ptr.as_ptr().add(byte_offset),
            count * size_of::<T>(),
        );
    }
}
