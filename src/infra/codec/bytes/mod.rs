//! Big-endian byte cursor used by every decoder in the crate.
//! Newton payloads are byte aligned and big-endian throughout, so the reader
//! works in whole bytes and the writer grows a heap buffer.
use alloc::vec::Vec;

use crate::error::ByteReaderError;

/// Marker byte announcing a 4-byte XLong.
pub const XLONG_ESCAPE: u8 = 0xFF;

/// Reader that walks a `&[u8]` without copying it.
pub struct ByteReader<'a> {
    /// Source buffer.
    buffer: &'a [u8],
    /// Index of the next unread byte.
    cursor: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a reader positioned at the start of `buffer`.
    pub const fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, cursor: 0 }
    }

    /// Number of bytes consumed so far.
    pub const fn position(&self) -> usize {
        self.cursor
    }

    /// Number of bytes left to read.
    pub const fn remaining(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Unread tail of the buffer, without consuming it.
    pub fn rest(&self) -> &'a [u8] {
        let buffer = self.buffer;
        &buffer[self.cursor..]
    }

    /// Borrow the next `len` bytes and advance past them.
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8], ByteReaderError> {
        if len > self.remaining() {
            return Err(ByteReaderError::OutOfBounds {
                asked: len,
                available: self.remaining(),
            });
        }
        let buffer = self.buffer;
        let start = self.cursor;
        self.cursor += len;
        Ok(&buffer[start..self.cursor])
    }

    /// Read exactly `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ByteReaderError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_slice(N)?);
        Ok(out)
    }

    /// Look at the next byte without consuming it.
    pub fn peek_u8(&self) -> Result<u8, ByteReaderError> {
        self.buffer
            .get(self.cursor)
            .copied()
            .ok_or(ByteReaderError::OutOfBounds {
                asked: 1,
                available: 0,
            })
    }

    pub fn read_u8(&mut self) -> Result<u8, ByteReaderError> {
        let byte = self.peek_u8()?;
        self.cursor += 1;
        Ok(byte)
    }

    pub fn read_u16_be(&mut self) -> Result<u16, ByteReaderError> {
        self.read_array().map(u16::from_be_bytes)
    }

    pub fn read_u32_be(&mut self) -> Result<u32, ByteReaderError> {
        self.read_array().map(u32::from_be_bytes)
    }

    pub fn read_u64_be(&mut self) -> Result<u64, ByteReaderError> {
        self.read_array().map(u64::from_be_bytes)
    }

    /// Read a variable-length integer: one byte below `0xFF`, otherwise the
    /// escape byte followed by a big-endian `i32`.
    pub fn read_xlong(&mut self) -> Result<i32, ByteReaderError> {
        match self.read_u8()? {
            XLONG_ESCAPE => self.read_array().map(i32::from_be_bytes),
            short => Ok(i32::from(short)),
        }
    }

    /// Skip `len` bytes.
    pub fn advance(&mut self, len: usize) -> Result<(), ByteReaderError> {
        self.read_slice(len).map(|_| ())
    }
}

/// Growable big-endian writer.
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    buffer: Vec<u8>,
}

impl ByteWriter {
    pub const fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn write_u16_be(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u32_be(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_slice(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Append a variable-length integer; see [`ByteReader::read_xlong`].
    pub fn write_xlong(&mut self, value: i32) {
        match u8::try_from(value) {
            Ok(short) if short != XLONG_ESCAPE => self.write_u8(short),
            _ => {
                self.write_u8(XLONG_ESCAPE);
                self.buffer.extend_from_slice(&value.to_be_bytes());
            }
        }
    }
}

/// Encoded size of an XLong.
pub const fn xlong_len(value: i32) -> usize {
    if value >= 0 && value < XLONG_ESCAPE as i32 {
        1
    } else {
        5
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
