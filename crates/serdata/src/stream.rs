use std::io::{self, Read, Write};

use crate::{ArchiveMode, Error, Result};

const READ_CHUNK: usize = 64 * 1024;

/// Ordered byte channel consumed by serializers.
///
/// A stream carries the direction it was opened in. Reads on a serializing
/// stream and writes on a deserializing one fail with [`Error::WrongMode`].
/// Integers are little-endian.
pub trait SerializationStream {
    fn mode(&self) -> ArchiveMode;

    /// Number of bytes written or consumed so far.
    fn position(&self) -> u64;

    /// Writes the whole block.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;

    /// Fills `buf` completely, or fails with [`Error::FormatMismatch`].
    fn read_bytes_into(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Bytes left to read, when the source knows its length.
    fn remaining(&self) -> Option<u64> {
        None
    }

    /// Reads exactly `len` bytes.
    ///
    /// The buffer grows one chunk at a time as data arrives, so a corrupt
    /// length cannot force a large allocation up front.
    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(len.min(READ_CHUNK));
        while buf.len() < len {
            let start = buf.len();
            buf.resize(start + (len - start).min(READ_CHUNK), 0);
            if let Err(e) = self.read_bytes_into(&mut buf[start..]) {
                return Err(match e {
                    Error::FormatMismatch { available, .. } => Error::FormatMismatch {
                        requested: len,
                        available: start + available,
                    },
                    e => e,
                });
            }
        }
        Ok(buf)
    }

    #[inline]
    fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    #[inline]
    fn read_i32(&mut self) -> Result<i32> {
        let mut bytes = [0; size_of::<i32>()];
        self.read_bytes_into(&mut bytes)?;
        Ok(i32::from_le_bytes(bytes))
    }
}

/// Serializing stream over any [`Write`] sink.
#[derive(Debug)]
pub struct StreamWriter<W> {
    inner: W,
    position: u64,
}

impl<W: Write> StreamWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, position: 0 }
    }

    pub fn flush(&mut self) -> Result<()> {
        Ok(self.inner.flush()?)
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> SerializationStream for StreamWriter<W> {
    #[inline(always)]
    fn mode(&self) -> ArchiveMode {
        ArchiveMode::Serialize
    }

    #[inline(always)]
    fn position(&self) -> u64 {
        self.position
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }

    fn read_bytes_into(&mut self, _buf: &mut [u8]) -> Result<()> {
        Err(Error::WrongMode {
            operation: "read",
            mode: ArchiveMode::Serialize,
        })
    }

    fn read_bytes(&mut self, _len: usize) -> Result<Vec<u8>> {
        Err(Error::WrongMode {
            operation: "read",
            mode: ArchiveMode::Serialize,
        })
    }
}

/// Deserializing stream over any [`Read`] source.
#[derive(Debug)]
pub struct StreamReader<R> {
    inner: R,
    position: u64,
    len: Option<u64>,
}

impl<R: Read> StreamReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            position: 0,
            len: None,
        }
    }

    /// Reader over a source known to hold `len` bytes. Serializers use the
    /// length to reject counts the remaining input cannot hold.
    pub fn with_len(inner: R, len: u64) -> Self {
        Self {
            len: Some(len),
            ..Self::new(inner)
        }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> SerializationStream for StreamReader<R> {
    #[inline(always)]
    fn mode(&self) -> ArchiveMode {
        ArchiveMode::Deserialize
    }

    #[inline(always)]
    fn position(&self) -> u64 {
        self.position
    }

    fn remaining(&self) -> Option<u64> {
        self.len.map(|len| len.saturating_sub(self.position))
    }

    fn write_bytes(&mut self, _bytes: &[u8]) -> Result<()> {
        Err(Error::WrongMode {
            operation: "write",
            mode: ArchiveMode::Deserialize,
        })
    }

    fn read_bytes_into(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        self.position += filled as u64;
        if filled < buf.len() {
            return Err(Error::FormatMismatch {
                requested: buf.len(),
                available: filled,
            });
        }
        Ok(())
    }

    /// Grows the buffer only as data arrives.
    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        (&mut self.inner).take(len as u64).read_to_end(&mut buf)?;
        self.position += buf.len() as u64;
        if buf.len() < len {
            return Err(Error::FormatMismatch {
                requested: len,
                available: buf.len(),
            });
        }
        Ok(buf)
    }
}
