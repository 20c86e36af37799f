//! Bit-level reader over a fixed byte slice
//!
//! Smacker stores bits least-significant first within each byte. The reader
//! never touches memory past the end of its slice: every read checks the
//! remaining bit count first and reports [`SmackerError::BitstreamExhausted`].

use crate::{Result, SmackerError};

/// Read-only bit cursor over a chunk region
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    byte_pos: usize,
    bit_pos: u8,
}

impl<'a> BitReader<'a> {
    /// Create a reader positioned at the first bit of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte_pos: 0,
            bit_pos: 0,
        }
    }

    /// Number of unread bits
    pub fn bits_left(&self) -> usize {
        (self.data.len() - self.byte_pos) * 8 - self.bit_pos as usize
    }

    /// True when no bits remain
    pub fn is_empty(&self) -> bool {
        self.bits_left() == 0
    }

    /// Number of bytes touched so far, counting a partially read byte
    pub fn bytes_consumed(&self) -> usize {
        self.byte_pos + usize::from(self.bit_pos != 0)
    }

    /// Read one bit
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.byte_pos >= self.data.len() {
            return Err(SmackerError::BitstreamExhausted);
        }

        let bit = (self.data[self.byte_pos] >> self.bit_pos) & 1;
        self.bit_pos += 1;
        if self.bit_pos == 8 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        }

        Ok(bit != 0)
    }

    /// Read eight bits; the first bit read lands in bit 0 of the result
    pub fn read_byte(&mut self) -> Result<u8> {
        if self.bits_left() < 8 {
            return Err(SmackerError::BitstreamExhausted);
        }

        if self.bit_pos == 0 {
            let value = self.data[self.byte_pos];
            self.byte_pos += 1;
            return Ok(value);
        }

        let lo = self.data[self.byte_pos] >> self.bit_pos;
        let hi = self.data[self.byte_pos + 1] << (8 - self.bit_pos);
        self.byte_pos += 1;
        Ok(lo | hi)
    }

    /// Read a 16-bit value stored as two bytes, low byte first
    pub fn read_u16(&mut self) -> Result<u16> {
        if self.bits_left() < 16 {
            return Err(SmackerError::BitstreamExhausted);
        }
        let lo = self.read_byte()? as u16;
        let hi = self.read_byte()? as u16;
        Ok(lo | (hi << 8))
    }
}
