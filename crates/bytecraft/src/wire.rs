//! Low-level byte cursor and fixed-width integer helpers.

use crate::{errors::ReadError, types::ByteOrder};

/// Forward-only cursor over an input slice.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Starts reading at `offset`. Fails if `offset` is beyond the input.
    pub fn at(data: &'a [u8], offset: usize) -> Result<Self, ReadError> {
        if offset > data.len() {
            return Err(ReadError::OffsetOutOfBounds {
                offset,
                len: data.len(),
            });
        }

        Ok(Self { data, pos: offset })
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Takes the next `n` bytes on behalf of `field`.
    pub fn take(&mut self, field: &str, n: usize) -> Result<&'a [u8], ReadError> {
        if n > self.remaining() {
            return Err(ReadError::TruncatedInput {
                field: field.to_string(),
                needed: n,
                remaining: self.remaining(),
            });
        }

        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;

        Ok(bytes)
    }
}

/// Appends the low `width` bytes of `bits` in `order`.
pub fn put_uint(out: &mut Vec<u8>, bits: u64, width: usize, order: ByteOrder) {
    match order.concrete() {
        ByteOrder::Big => out.extend_from_slice(&bits.to_be_bytes()[8 - width..]),
        _ => out.extend_from_slice(&bits.to_le_bytes()[..width]),
    }
}

/// Reads up to 8 bytes in `order` as an unsigned value.
pub fn get_uint(bytes: &[u8], order: ByteOrder) -> u64 {
    let fold = |acc: u64, &b: &u8| (acc << 8) | u64::from(b);
    match order.concrete() {
        ByteOrder::Big => bytes.iter().fold(0, fold),
        _ => bytes.iter().rev().fold(0, fold),
    }
}

/// Sign-extends the low `bits` of `value` to a full `i64`.
pub fn sign_extend(value: u64, bits: usize) -> i64 {
    let shift = 64 - bits;
    ((value << shift) as i64) >> shift
}
