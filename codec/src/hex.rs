//! Conversion between hexadecimal text and bit buffers.
//!
//! Every hex digit contributes exactly 4 bits (most significant bit first), so a
//! line with an odd number of digits yields a buffer whose final byte is only
//! half used. The number of meaningful bits is always returned alongside the
//! bytes.

use crate::Error;
use bytes::{BufMut, Bytes, BytesMut};

const BITS_PER_DIGIT: usize = 4;
const DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Converts hexadecimal text into bytes and the number of bits they carry.
///
/// Digits are case-insensitive. Surrounding whitespace and a `0x` or `0X` prefix are
/// stripped, which allows a line read from a file to be passed unmodified.
pub fn from_hex(hex: &str) -> Result<(Bytes, usize), Error> {
    let hex = hex.trim();
    let prefix = hex.strip_prefix("0x").or_else(|| hex.strip_prefix("0X"));
    let (hex, offset) = match prefix {
        Some(rest) => (rest, 2),
        None => (hex, 0),
    };

    let mut bytes = BytesMut::with_capacity(hex.len().div_ceil(2));
    let mut pending: Option<u8> = None;
    for (i, c) in hex.chars().enumerate() {
        let nibble = c
            .to_digit(16)
            .ok_or(Error::InvalidHex(c, offset + i))? as u8;
        match pending.take() {
            Some(high) => bytes.put_u8((high << 4) | nibble),
            None => pending = Some(nibble),
        }
    }
    let digits = hex.chars().count();
    if let Some(high) = pending {
        bytes.put_u8(high << 4);
    }
    Ok((bytes.freeze(), digits * BITS_PER_DIGIT))
}

/// Renders the first `num_bits` bits of `bytes` as uppercase hexadecimal.
///
/// If `num_bits` is not a multiple of 4, the last digit is padded with zero bits.
///
/// # Panics
///
/// Panics if `bytes` holds fewer than `num_bits` bits.
pub fn to_hex(bytes: &[u8], num_bits: usize) -> String {
    assert!(num_bits <= bytes.len() * 8, "not enough bytes for {num_bits} bits");
    let digits = num_bits.div_ceil(BITS_PER_DIGIT);
    let spare = digits * BITS_PER_DIGIT - num_bits;
    let mut hex = String::with_capacity(digits);
    for i in 0..digits {
        let byte = bytes[i / 2];
        let mut nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0F };

        // Zero any bits past `num_bits` in the final digit.
        if i + 1 == digits {
            nibble &= (0x0F << spare) & 0x0F;
        }
        hex.push(DIGITS[nibble as usize] as char);
    }
    hex
}
