use std::ptr::NonNull;

use memmap2::MmapMut;
use rawbuf::{Backing, Error, RawBuffer, Result, memory};

type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

/// Helper to create anonymous memory standing in for memory owned elsewhere
fn setup_foreign_memory(bytes: &[u8]) -> std::io::Result<MmapMut> {
    let mut mmap = MmapMut::map_anon(bytes.len())?;
    mmap.copy_from_slice(bytes);
    Ok(mmap)
}

fn wrap<T: rawbuf::Blittable>(mmap: &mut MmapMut, len: usize) -> RawBuffer<T> {
    let ptr = NonNull::new(mmap.as_mut_ptr()).unwrap();
    unsafe { RawBuffer::from_raw_parts(len, ptr) }
}

#[test]
fn test_buffer_creation() -> Result<()> {
    let buffer = RawBuffer::<u32>::new(4)?;

    assert_eq!(buffer.len(), 4);
    assert_eq!(buffer.byte_len(), 16);
    assert_eq!(buffer.backing(), Backing::Owned);
    assert!(buffer.is_owned());

    // Fresh memory is zeroed
    assert_eq!(buffer.to_vec(), vec![0, 0, 0, 0]);
    assert!(buffer.as_bytes().iter().all(|b| *b == 0));

    Ok(())
}

#[test]
fn test_empty_buffer() -> Result<()> {
    let buffer = RawBuffer::<u64>::new(0)?;

    assert!(buffer.is_empty());
    assert_eq!(buffer.byte_len(), 0);
    assert!(buffer.to_vec().is_empty());
    assert!(buffer.get(0).unwrap_err().is_out_of_range());

    buffer.release();
    Ok(())
}

#[test]
fn test_get_set_bounds() -> Result<()> {
    const LEN: usize = 5;
    let mut buffer = RawBuffer::<i32>::new(LEN)?;

    buffer.set(0, 11)?;
    buffer.set(LEN - 1, 99)?;
    assert_eq!(buffer.get(0)?, 11);
    assert_eq!(buffer.get(LEN - 1)?, 99);

    assert!(matches!(
        buffer.get(LEN),
        Err(Error::IndexOutOfRange { index: LEN, len: LEN })
    ));
    assert!(buffer.set(LEN, 1).unwrap_err().is_out_of_range());

    // A negative index converted to usize wraps around and is rejected
    let minus_one = -1_isize as usize;
    assert!(buffer.get(minus_one).unwrap_err().is_out_of_range());
    assert!(buffer.set(minus_one, 1).unwrap_err().is_out_of_range());

    // Nothing else was touched
    assert_eq!(buffer.to_vec(), vec![11, 0, 0, 0, 99]);

    Ok(())
}

#[test]
fn test_read_into_and_write_from() -> Result<()> {
    let mut buffer = RawBuffer::<u16>::new(6)?;

    buffer.write_from(&[1, 2, 3], 2)?;
    assert_eq!(buffer.to_vec(), vec![0, 0, 1, 2, 3, 0]);

    let mut dst = [0_u16; 4];
    buffer.read_into(&mut dst, 1)?;
    assert_eq!(dst, [0, 1, 2, 3]);

    // Whole buffer, zero offset
    let mut all = [0_u16; 6];
    buffer.read_into(&mut all, 0)?;
    assert_eq!(all, [0, 0, 1, 2, 3, 0]);

    Ok(())
}

#[test]
fn test_read_into_out_of_range() -> Result<()> {
    let mut buffer = RawBuffer::<u16>::new(4)?;

    let mut dst = [7_u16; 3];
    assert!(matches!(
        buffer.read_into(&mut dst, 2),
        Err(Error::RangeOutOfBounds {
            start: 2,
            count: 3,
            len: 4
        })
    ));
    // Destination left as it was
    assert_eq!(dst, [7, 7, 7]);

    assert!(buffer.write_from(&[1; 5], 0).unwrap_err().is_out_of_range());
    assert!(
        buffer
            .write_from(&[1], usize::MAX)
            .unwrap_err()
            .is_out_of_range()
    );
    assert_eq!(buffer.to_vec(), vec![0; 4]);

    Ok(())
}

#[test]
fn test_byte_offset_read() -> Result<()> {
    let mut bytes = RawBuffer::<u8>::new(12)?;
    bytes.write_from(&[0xFF, 1, 0, 0, 0, 2, 0, 0, 0, 0xEE, 0xEE, 0xEE], 0)?;

    // Reinterpret the same bytes as u32s starting one byte in
    let view = unsafe { RawBuffer::<u32>::from_raw_parts(3, bytes.as_ptr()) };
    let mut dst = [u32::MAX; 4];
    view.read_into_at(&mut dst, 1, 1, 2)?;

    assert_eq!(dst, [u32::MAX, 1, 2, u32::MAX]);

    Ok(())
}

#[test]
fn test_byte_offset_write_leaves_surroundings() -> Result<()> {
    let mut buffer = RawBuffer::<u16>::new(5)?;
    buffer.as_bytes_mut().fill(0xAA);

    // Two elements at byte 3, straddling element boundaries
    buffer.write_from_at(&[9, 0x0102, 0x0304, 9], 3, 1, 2)?;

    let bytes = buffer.as_bytes();
    assert_eq!(&bytes[..3], &[0xAA; 3]);
    assert_eq!(&bytes[3..7], &[0x02, 0x01, 0x04, 0x03]);
    assert_eq!(&bytes[7..], &[0xAA; 3]);

    Ok(())
}

#[test]
fn test_byte_offset_bounds() -> Result<()> {
    let mut buffer = RawBuffer::<u32>::new(2)?;
    let mut dst = [0_u32; 2];

    // 1 + 2 * 4 > 8
    assert!(matches!(
        buffer.read_into_at(&mut dst, 1, 0, 2),
        Err(Error::ByteRangeOutOfBounds {
            offset: 1,
            size: 8,
            byte_len: 8
        })
    ));
    // Destination too small
    assert!(matches!(
        buffer.read_into_at(&mut dst, 0, 1, 2),
        Err(Error::RangeOutOfBounds { .. })
    ));
    // Source slice too small
    assert!(buffer.write_from_at(&[1], 0, 0, 2).unwrap_err().is_out_of_range());
    // Overflowing count
    assert!(
        buffer
            .write_from_at(&[1], 0, 0, usize::MAX)
            .unwrap_err()
            .is_out_of_range()
    );

    // Exact fit succeeds
    buffer.write_from_at(&[5, 6], 0, 0, 2)?;
    buffer.read_into_at(&mut dst, 0, 0, 2)?;
    assert_eq!(dst, [5, 6]);

    Ok(())
}

#[test]
fn test_wrapped_memory_survives_release() -> TestResult {
    let mut mmap = setup_foreign_memory(&[1, 0, 0, 0, 2, 0, 0, 0])?;

    let mut view = wrap::<u32>(&mut mmap, 2);
    assert_eq!(view.backing(), Backing::Borrowed);
    assert_eq!(view.to_vec(), vec![1, 2]);

    view.set(1, 0x0A0B0C0D)?;
    view.release();

    // Memory is still mapped and holds the write made through the view
    assert_eq!(&mmap[..], &[1, 0, 0, 0, 0x0D, 0x0C, 0x0B, 0x0A]);

    Ok(())
}

#[test]
fn test_wrapped_out_of_range_leaves_memory() -> TestResult {
    let original = [0x11_u8; 16];
    let mut mmap = setup_foreign_memory(&original)?;

    let mut view = wrap::<u32>(&mut mmap, 4);
    assert!(matches!(
        view.set(10, 0xDEADBEEF),
        Err(Error::IndexOutOfRange { index: 10, len: 4 })
    ));
    drop(view);

    assert_eq!(&mmap[..], &original);

    Ok(())
}

#[test]
fn test_owned_copy_is_independent() -> Result<()> {
    let source = [3_i64, -4, 5];
    let mut buffer = RawBuffer::from_slice(&source)?;

    buffer.set(0, 0)?;

    assert_eq!(source, [3, -4, 5]);
    assert_eq!(buffer.to_vec(), vec![0, -4, 5]);

    Ok(())
}

#[test]
fn test_release_on_error_path() -> Result<()> {
    fn fill_then_fail() -> Result<()> {
        let mut buffer = RawBuffer::<u8>::new(32)?;
        buffer.set(0, 1)?;
        buffer.set(32, 1)?;
        unreachable!()
    }

    assert!(fill_then_fail().unwrap_err().is_out_of_range());

    Ok(())
}

#[test]
fn test_allocation_errors() {
    assert!(matches!(
        RawBuffer::<u64>::new(usize::MAX),
        Err(Error::SizeOverflow { .. })
    ));
    assert!(matches!(
        RawBuffer::<u8>::new(usize::MAX),
        Err(Error::AllocationFailure { bytes: usize::MAX })
    ));
}

#[test]
fn test_filled_vec() -> Result<()> {
    assert_eq!(memory::filled_vec(3, 7_u16)?, vec![7, 7, 7]);
    assert!(memory::filled_vec(0, 1_u8)?.is_empty());

    // Capacity overflow comes back as an error
    assert!(matches!(
        memory::filled_vec(usize::MAX, 0_u8),
        Err(Error::AllocationFailure { bytes: usize::MAX })
    ));
    assert!(matches!(
        memory::filled_vec(usize::MAX / 2, 0_u64),
        Err(Error::AllocationFailure { bytes: usize::MAX })
    ));

    Ok(())
}

#[test]
fn test_memory_primitives() {
    let ptr = memory::allocate(16).unwrap();

    unsafe {
        memory::write_slice(ptr, 2, &[0x1122_u16, 0x3344, 0x5566], 1, 2);
        assert_eq!(memory::read_value::<u16>(ptr, 2), 0x3344);
        assert_eq!(memory::read_value::<u16>(ptr, 4), 0x5566);

        memory::write_value(ptr, 9, 0xABCD_u16);
        let mut dst = [0_u8; 16];
        memory::read_slice(ptr, 0, &mut dst, 0, 16);
        assert_eq!(dst[..2], [0, 0]);
        assert_eq!(dst[6..9], [0, 0, 0]);
        assert_eq!(u16::from_ne_bytes([dst[9], dst[10]]), 0xABCD);

        memory::free(ptr);
    }
}

#[test]
fn test_buffer_is_send_and_sync() -> Result<()> {
    let mut buffer = RawBuffer::<u32>::new(1024)?;
    for i in 0..buffer.len() {
        buffer.set(i, i as u32)?;
    }

    let sum = std::thread::scope(|scope| {
        let halves = [0..512, 512..1024].map(|range| {
            let buffer = &buffer;
            scope.spawn(move || range.map(|i| buffer.get(i).unwrap() as u64).sum::<u64>())
        });
        halves.into_iter().map(|h| h.join().unwrap()).sum::<u64>()
    });
    assert_eq!(sum, (0..1024_u64).sum());

    let moved = std::thread::spawn(move || buffer.get(1023).unwrap())
        .join()
        .unwrap();
    assert_eq!(moved, 1023);

    Ok(())
}
