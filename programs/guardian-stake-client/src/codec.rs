//! Fixed-offset little-endian reads and writes.
//!
//! Wide integers are two 64-bit words: low word at the field offset, high
//! word at offset + 8. Writes go byte by byte, least significant first.

use anchor_lang::prelude::Pubkey;

use crate::constants::{Discriminator, DISCRIMINATOR_LEN};
use crate::error::{Result, StakeClientError};
use crate::wide::WideU128;

const SIGN_BIT: u64 = 1 << 63;

/// Reads fields at absolute offsets of a buffer whose length was already
/// checked against the layout.
pub struct Reader<'a> {
    schema: &'static str,
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    /// Checks the leading discriminator and minimum length before any field
    /// is read.
    pub fn new(
        schema: &'static str,
        data: &'a [u8],
        discriminator: &Discriminator,
        min_len: usize,
    ) -> Result<Self> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(StakeClientError::schema(
                schema,
                format!("{} bytes is shorter than a discriminator", data.len()),
            ));
        }
        if &data[..DISCRIMINATOR_LEN] != discriminator.as_slice() {
            return Err(StakeClientError::schema(
                schema,
                format!(
                    "discriminator {} != expected {}",
                    hex::encode(&data[..DISCRIMINATOR_LEN]),
                    hex::encode(discriminator)
                ),
            ));
        }
        if data.len() < min_len {
            return Err(StakeClientError::schema(
                schema,
                format!("{} bytes, layout needs {}", data.len(), min_len),
            ));
        }
        Ok(Reader { schema, data })
    }

    fn bytes<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        let end = offset
            .checked_add(N)
            .ok_or(StakeClientError::overflow("codec offset"))?;
        let slice = self.data.get(offset..end).ok_or_else(|| {
            StakeClientError::schema(
                self.schema,
                format!("field at {offset}..{end} past end of {} bytes", self.data.len()),
            )
        })?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    pub fn u8(&self, offset: usize) -> Result<u8> {
        Ok(self.bytes::<1>(offset)?[0])
    }

    pub fn u64(&self, offset: usize) -> Result<u64> {
        Ok(u64_from_le(&self.bytes::<8>(offset)?))
    }

    pub fn i64(&self, offset: usize) -> Result<i64> {
        Ok(i64_from_bits(self.u64(offset)?))
    }

    pub fn wide(&self, offset: usize) -> Result<WideU128> {
        let lo = self.u64(offset)?;
        let hi = self.u64(offset + 8)?;
        Ok(WideU128::from_parts(lo, hi))
    }

    pub fn pubkey(&self, offset: usize) -> Result<Pubkey> {
        Ok(Pubkey::new_from_array(self.bytes::<32>(offset)?))
    }
}

/// Appends fields in declaration order.
#[derive(Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn with_discriminator(discriminator: &Discriminator, capacity: usize) -> Self {
        let mut buf = Vec::with_capacity(capacity);
        buf.extend_from_slice(discriminator);
        Writer { buf }
    }

    pub fn u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub fn u64(&mut self, value: u64) -> &mut Self {
        let mut rest = value;
        for _ in 0..8 {
            self.buf.push((rest & 0xff) as u8);
            rest >>= 8;
        }
        self
    }

    pub fn i64(&mut self, value: i64) -> &mut Self {
        self.u64(i64_to_bits(value))
    }

    pub fn wide(&mut self, value: WideU128) -> &mut Self {
        self.u64(value.lo).u64(value.hi)
    }

    pub fn pubkey(&mut self, value: &Pubkey) -> &mut Self {
        self.buf.extend_from_slice(value.as_ref());
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

pub fn u64_from_le(bytes: &[u8; 8]) -> u64 {
    bytes
        .iter()
        .rev()
        .fold(0u64, |acc, byte| (acc << 8) | *byte as u64)
}

/// Two's-complement reinterpretation of an unsigned word.
pub fn i64_from_bits(raw: u64) -> i64 {
    if raw < SIGN_BIT {
        raw as i64
    } else {
        // !raw < 2^63 so it fits; -(!raw) - 1 reaches i64::MIN without overflow.
        -((!raw) as i64) - 1
    }
}

pub fn i64_to_bits(value: i64) -> u64 {
    if value >= 0 {
        value as u64
    } else {
        !((-(value + 1)) as u64)
    }
}
