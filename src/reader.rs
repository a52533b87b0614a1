use std::fmt;
use std::io::Read;

use time::OffsetDateTime;

use crate::config::{ReaderConfig, DEFAULT_SCRATCH_CAPACITY};
use crate::date::date_from_days;
use crate::{Error, Result};

/// Longest legal varint: nine full 7-bit groups plus one bit.
pub const MAX_VARINT_LEN: usize = 10;

// Upper bound on the slots reserved ahead of a string list; the count prefix
// comes off the wire and is not trusted for allocation.
const MAX_LIST_RESERVE: u64 = 1024;

/// Streaming decoder for the RowBinary layout.
///
/// Holds no schema: callers invoke `read_*` in the order the row layout
/// dictates. Fixed-size reads go through a scratch buffer owned by the
/// reader, so slices returned by [`RowReader::read_string_bytes`] are only
/// valid until the next call.
///
/// A short read from the source is treated as truncation. The reader never
/// loops to accumulate a fixed-size field across several `read` calls.
pub struct RowReader<R> {
    inner: R,
    buf: Box<[u8]>,
    peeked: Option<u8>,
}

impl<R: Read> RowReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_capacity(inner, DEFAULT_SCRATCH_CAPACITY)
    }

    /// Fails with [`Error::InvalidConfig`] when the config does not pass
    /// [`ReaderConfig::validate`].
    pub fn with_config(inner: R, config: &ReaderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_capacity(inner, config.scratch_capacity))
    }

    fn with_capacity(inner: R, capacity: usize) -> Self {
        log::debug!("row reader created with {capacity} byte scratch buffer");
        Self {
            inner,
            buf: vec![0u8; capacity].into_boxed_slice(),
            peeked: None,
        }
    }

    /// Largest length-prefixed field this reader accepts.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Returns the source. A byte consumed by [`RowReader::at_eof`] and not
    /// yet decoded is lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Reports whether the source is exhausted, without consuming data.
    ///
    /// A byte pulled from the source to answer this is held and handed to the
    /// next read, so stream order is preserved.
    pub fn at_eof(&mut self) -> Result<bool> {
        if self.peeked.is_some() {
            return Ok(false);
        }
        let mut byte = [0u8; 1];
        if self.inner.read(&mut byte)? == 0 {
            return Ok(true);
        }
        self.peeked = Some(byte[0]);
        Ok(false)
    }

    pub fn read_uvarint(&mut self) -> Result<u64> {
        let mut value = 0u64;
        let mut shift = 0u32;
        for i in 0..MAX_VARINT_LEN {
            let byte = self.read_byte()?;
            if byte < 0x80 {
                if i == MAX_VARINT_LEN - 1 && byte > 1 {
                    return Err(Error::VarintOverflow);
                }
                return Ok(value | (u64::from(byte) << shift));
            }
            value |= u64::from(byte & 0x7f) << shift;
            shift += 7;
        }
        Err(Error::VarintOverflow)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.fill(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.fill_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.fill_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.fill_array()?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Reads a varint length followed by that many raw bytes.
    ///
    /// The slice borrows the scratch buffer. A zero length returns an empty
    /// slice without touching the source again; a length above
    /// [`RowReader::capacity`] fails with [`Error::BufferTooSmall`] and
    /// leaves the body unread.
    pub fn read_string_bytes(&mut self) -> Result<&[u8]> {
        let len = self.read_uvarint()?;
        if len == 0 {
            return Ok(&[]);
        }
        let want = self.checked_len(len)?;
        self.fill(want)
    }

    /// Owned copy of [`RowReader::read_string_bytes`]. Invalid UTF-8 is
    /// replaced rather than rejected.
    pub fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_string_bytes()?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Reads a `u16` day count and returns that day's UTC midnight.
    pub fn read_date(&mut self) -> Result<OffsetDateTime> {
        Ok(date_from_days(self.read_u16()?))
    }

    pub fn read_string_list(&mut self) -> Result<Vec<String>> {
        let mut list = Vec::new();
        self.read_string_list_into(&mut list)?;
        Ok(list)
    }

    /// Appends a varint-counted list of strings to `out`.
    ///
    /// On error `out` keeps whatever was decoded before the failure. That
    /// content is for diagnostics only and must not be treated as a row.
    pub fn read_string_list_into(&mut self, out: &mut Vec<String>) -> Result<()> {
        let count = self.read_uvarint()?;
        out.reserve(count.min(MAX_LIST_RESERVE) as usize);
        for _ in 0..count {
            out.push(self.read_string()?);
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8> {
        if let Some(byte) = self.peeked.take() {
            return Ok(byte);
        }
        let mut byte = [0u8; 1];
        if self.inner.read(&mut byte)? == 0 {
            return Err(Error::Truncated { needed: 1, read: 0 });
        }
        Ok(byte[0])
    }

    fn checked_len(&self, len: u64) -> Result<usize> {
        match usize::try_from(len) {
            Ok(want) if want <= self.buf.len() => Ok(want),
            _ => {
                log::warn!(
                    "rejecting {len} byte field, scratch capacity is {}",
                    self.buf.len()
                );
                Err(Error::BufferTooSmall {
                    requested: len,
                    capacity: self.buf.len(),
                })
            }
        }
    }

    fn fill_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.fill(N)?);
        Ok(out)
    }

    // Fills `buf[..want]` with one read from the source, after any held byte.
    fn fill(&mut self, want: usize) -> Result<&[u8]> {
        if want > self.buf.len() {
            return Err(Error::BufferTooSmall {
                requested: want as u64,
                capacity: self.buf.len(),
            });
        }
        if want == 0 {
            return Ok(&[]);
        }
        let mut start = 0;
        if let Some(byte) = self.peeked.take() {
            self.buf[0] = byte;
            start = 1;
        }
        if start < want {
            let n = self.inner.read(&mut self.buf[start..want])?;
            if n < want - start {
                return Err(Error::Truncated {
                    needed: want,
                    read: start + n,
                });
            }
        }
        Ok(&self.buf[..want])
    }
}

impl<R> fmt::Debug for RowReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowReader")
            .field("capacity", &self.buf.len())
            .field("peeked", &self.peeked)
            .finish_non_exhaustive()
    }
}
