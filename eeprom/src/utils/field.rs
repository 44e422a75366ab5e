//! Fixed-width field access
//!
//! All multi-byte integers in a HAT image are little-endian. Reads are
//! bounds-checked and fail with [`EepromError::Truncated`] instead of
//! panicking.

use alloc::vec::Vec;

use crate::error::{EepromError, Result};

/// Cursor over a byte slice
#[derive(Debug, Clone)]
pub struct FieldReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    /// Start reading at the beginning of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the slice
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// True once every byte has been consumed
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Take the next `len` bytes
    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(EepromError::Truncated {
                offset: self.pos,
                needed: len,
                available: self.remaining(),
            });
        }
        let data: &'a [u8] = self.data;
        let out = &data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    /// Take the next `N` bytes as an array
    pub fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    /// Read one byte
    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.array::<1>()?[0])
    }

    /// Read a little-endian 16-bit value
    pub fn u16(&mut self) -> Result<u16> {
        self.array().map(u16::from_le_bytes)
    }

    /// Read a little-endian 32-bit value
    pub fn u32(&mut self) -> Result<u32> {
        self.array().map(u32::from_le_bytes)
    }
}

/// Appending writer
#[derive(Debug, Clone, Default)]
pub struct FieldWriter {
    buf: Vec<u8>,
}

impl FieldWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty writer with room for `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buf: Vec::with_capacity(capacity) }
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True if nothing has been written
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// View the bytes written so far
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Append one byte
    pub fn put_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Append a little-endian 16-bit value
    pub fn put_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Append a little-endian 32-bit value
    pub fn put_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Append raw bytes
    pub fn put_bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Finish and return the written bytes
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// Convert a length to a 1-byte length prefix
pub fn len_u8(field: &'static str, len: usize) -> Result<u8> {
    u8::try_from(len).map_err(|_| EepromError::EncodingOverflow {
        field,
        len,
        max: u8::MAX as usize,
    })
}

/// Convert a length or count to a 16-bit field
pub fn len_u16(field: &'static str, len: usize) -> Result<u16> {
    u16::try_from(len).map_err(|_| EepromError::EncodingOverflow {
        field,
        len,
        max: u16::MAX as usize,
    })
}

/// Convert a length to a 32-bit field
pub fn len_u32(field: &'static str, len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| EepromError::EncodingOverflow {
        field,
        len,
        max: u32::MAX as usize,
    })
}
