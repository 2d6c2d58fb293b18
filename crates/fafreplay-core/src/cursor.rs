//! Bounds-checked read head over a byte buffer.
//!
//! All integers are little-endian. Every read either returns exactly the
//! bytes it asked for and advances, or fails with
//! [`ParseError::OutOfData`] and leaves the offset untouched.

use crate::error::ParseError;

/// A forward-only reader over a borrowed byte slice.
///
/// Reads borrow from the underlying buffer, so a slice returned by
/// [`read`](Cursor::read) stays valid after the cursor moves on.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    data: &'a [u8],
    offset: usize,
    base: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            base: 0,
        }
    }

    /// Create a cursor over `data` whose reported offsets start at `base`.
    ///
    /// Used for payload cursors so errors point into the whole body.
    pub fn with_base(data: &'a [u8], base: usize) -> Self {
        Self {
            data,
            offset: 0,
            base,
        }
    }

    /// Absolute offset of the next read.
    pub fn offset(&self) -> usize {
        self.base + self.offset
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Whether every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Total size of the underlying buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    fn out_of_data(&self, needed: usize) -> ParseError {
        ParseError::OutOfData {
            offset: self.offset(),
            needed,
            available: self.remaining(),
        }
    }

    /// Read exactly `n` bytes.
    pub fn read(&mut self, n: usize) -> Result<&'a [u8], ParseError> {
        if n > self.remaining() {
            return Err(self.out_of_data(n));
        }
        let bytes = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(bytes)
    }

    /// Read a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ParseError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read(N)?);
        Ok(out)
    }

    /// Advance past `n` bytes without looking at them.
    pub fn skip(&mut self, n: usize) -> Result<(), ParseError> {
        self.read(n).map(|_| ())
    }

    /// Look at the next byte without consuming it.
    pub fn peek_u8(&self) -> Result<u8, ParseError> {
        self.data
            .get(self.offset)
            .copied()
            .ok_or_else(|| self.out_of_data(1))
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8, ParseError> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }

    /// Read a little-endian u16.
    pub fn read_u16_le(&mut self) -> Result<u16, ParseError> {
        self.read_array().map(u16::from_le_bytes)
    }

    /// Read a little-endian u32.
    pub fn read_u32_le(&mut self) -> Result<u32, ParseError> {
        self.read_array().map(u32::from_le_bytes)
    }

    /// Read a little-endian i32.
    pub fn read_i32_le(&mut self) -> Result<i32, ParseError> {
        self.read_array().map(i32::from_le_bytes)
    }

    /// Read a little-endian f32.
    pub fn read_f32_le(&mut self) -> Result<f32, ParseError> {
        self.read_array().map(f32::from_le_bytes)
    }

    /// Read a NUL-terminated string, consuming the terminator.
    ///
    /// Invalid UTF-8 is replaced rather than rejected: strings in a replay
    /// include player-typed chat. A missing terminator is
    /// [`ParseError::OutOfData`].
    pub fn read_cstr(&mut self) -> Result<String, ParseError> {
        let rest = &self.data[self.offset..];
        let Some(len) = rest.iter().position(|&b| b == 0) else {
            return Err(self.out_of_data(rest.len() + 1));
        };
        let bytes = self.read(len)?;
        self.skip(1)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}
