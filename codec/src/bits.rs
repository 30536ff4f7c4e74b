//! Bit-addressable cursors over immutable buffers.
//!
//! [BitReader] and [BitWriter] both operate most-significant-bit first: bit 0 of the stream is
//! the high bit of the first byte. Buffers are [Bytes] so a reader can be cloned cheaply and
//! the writer's output can be handed to a reader without copying.
//!
//! A stream's length is tracked in bits, independently of the length of the backing buffer. Any
//! bits in the final byte beyond that length are never observed by the reader.

use crate::{hex, Error};
use bytes::{BufMut, Bytes, BytesMut};

/// Maximum number of bits that can be read or written in a single call.
pub const MAX_WIDTH: usize = u64::BITS as usize;

/// Reads fixed-width unsigned integers from a bit stream.
///
/// The cursor only moves forward through `read_*` calls. [BitReader::peek_uint_list] reads ahead
/// without moving it.
#[derive(Clone, Debug)]
pub struct BitReader {
    data: Bytes,
    num_bits: usize,
    position: usize,
}

impl BitReader {
    /// Creates a reader over the first `num_bits` bits of `data`.
    ///
    /// Returns an error if `data` holds fewer than `num_bits` bits.
    pub fn new(data: impl Into<Bytes>, num_bits: usize) -> Result<Self, Error> {
        let data = data.into();
        if num_bits > data.len() * 8 {
            return Err(Error::Invalid("BitReader", "length exceeds buffer"));
        }
        Ok(Self {
            data,
            num_bits,
            position: 0,
        })
    }

    /// Creates a reader over a hexadecimal string (4 bits per digit).
    pub fn from_hex(hex: &str) -> Result<Self, Error> {
        let (data, num_bits) = hex::from_hex(hex)?;
        Self::new(data, num_bits)
    }

    /// Consumes the next `width` bits and returns them as an unsigned integer.
    ///
    /// Fails with [Error::OutOfBits] (leaving the cursor untouched) if fewer than `width` bits
    /// remain.
    pub fn read_uint(&mut self, width: usize) -> Result<u64, Error> {
        if width > MAX_WIDTH {
            return Err(Error::Invalid("BitReader", "width exceeds 64 bits"));
        }
        let remaining = self.remaining();
        if width > remaining {
            return Err(Error::OutOfBits(width, remaining));
        }

        let mut result = 0u64;
        let mut left = width;
        while left > 0 {
            let byte = self.data[self.position / 8];
            let offset = self.position % 8;

            // Take as many bits as are both wanted and available in this byte.
            let available = 8 - offset;
            let take = left.min(available);
            let bits = (byte >> (available - take)) & (0xFF >> (8 - take));

            result = (result << take) | bits as u64;
            self.position += take;
            left -= take;
        }
        Ok(result)
    }

    /// Consumes a single bit.
    pub fn read_bool(&mut self) -> Result<bool, Error> {
        Ok(self.read_uint(1)? != 0)
    }

    /// Reads one integer per entry of `widths` without advancing the cursor.
    pub fn peek_uint_list(&mut self, widths: &[usize]) -> Result<Vec<u64>, Error> {
        let start = self.position;
        let result = widths.iter().map(|&width| self.read_uint(width)).collect();
        self.position = start;
        result
    }

    /// Returns the cursor offset in bits.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the number of unread bits.
    pub fn remaining(&self) -> usize {
        self.num_bits - self.position
    }

    /// Returns the total length of the stream in bits.
    pub fn len(&self) -> usize {
        self.num_bits
    }

    /// Returns true if the stream holds no bits at all.
    pub fn is_empty(&self) -> bool {
        self.num_bits == 0
    }
}

/// Appends fixed-width unsigned integers to a bit stream.
///
/// Bits past the end of the stream in the final byte are always zero.
#[derive(Clone, Debug, Default)]
pub struct BitWriter {
    bytes: BytesMut,
    num_bits: usize,
}

impl BitWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty writer with room for `num_bits` bits.
    pub fn with_capacity(num_bits: usize) -> Self {
        Self {
            bytes: BytesMut::with_capacity(num_bits.div_ceil(8)),
            num_bits: 0,
        }
    }

    /// Appends the low `width` bits of `value`, most significant first.
    ///
    /// # Panics
    ///
    /// Panics if `width` exceeds [MAX_WIDTH] or if `value` does not fit in `width` bits.
    pub fn write_uint(&mut self, value: u64, width: usize) {
        assert!(width <= MAX_WIDTH, "width {width} exceeds {MAX_WIDTH} bits");
        assert!(
            width == MAX_WIDTH || value >> width == 0,
            "value {value} does not fit in {width} bits"
        );

        let mut left = width;
        while left > 0 {
            let offset = self.num_bits % 8;
            if offset == 0 {
                self.bytes.put_u8(0);
            }

            // Fill as much of the current byte as possible.
            let available = 8 - offset;
            let take = left.min(available);
            let bits = ((value >> (left - take)) & ((1 << take) - 1)) as u8;

            let last = self.bytes.len() - 1;
            self.bytes[last] |= bits << (available - take);
            self.num_bits += take;
            left -= take;
        }
    }

    /// Appends a single bit.
    pub fn write_bool(&mut self, value: bool) {
        self.write_uint(value as u64, 1);
    }

    /// Returns the number of bits written so far.
    pub fn len(&self) -> usize {
        self.num_bits
    }

    /// Returns true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.num_bits == 0
    }

    /// Renders the written bits as hexadecimal, zero-padded to a whole digit.
    pub fn to_hex(&self) -> String {
        hex::to_hex(&self.bytes, self.num_bits)
    }

    /// Returns the written bytes and the number of bits they carry.
    pub fn finish(self) -> (Bytes, usize) {
        (self.bytes.freeze(), self.num_bits)
    }

    /// Converts the written bits into a reader positioned at the first bit.
    pub fn into_reader(self) -> BitReader {
        BitReader {
            data: self.bytes.freeze(),
            num_bits: self.num_bits,
            position: 0,
        }
    }
}
