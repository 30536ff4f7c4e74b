//! Core codec traits

use crate::{
    bits::{BitReader, BitWriter},
    error::Error,
};
use tracing::trace;

/// Trait for types that can be written (encoded) to a bit stream.
pub trait Write {
    /// Encodes this value by appending to a [BitWriter].
    ///
    /// Implementations should panic if a field does not fit its encoded width.
    fn write(&self, writer: &mut BitWriter);
}

/// Trait for types with an encoded length.
pub trait EncodeSize {
    /// Returns the encoded length of this value in bits.
    ///
    /// This method MUST return the exact number of bits that will be written by `write()`.
    fn encode_size(&self) -> usize;
}

/// Trait for types that can be read/decoded from a bit stream.
pub trait Read: Sized {
    /// The `Cfg` type parameter allows for configuration during the read process. For example,
    /// it can be used to bound the nesting depth accepted from untrusted input.
    ///
    /// Use `()` for types that do not require configuration.
    type Cfg;

    /// Reads a value from the stream using the provided configuration `cfg`, consuming the
    /// necessary bits.
    ///
    /// Returns an error if decoding fails (e.g., invalid data, not enough bits).
    fn read_cfg(reader: &mut BitReader, cfg: &Self::Cfg) -> Result<Self, Error>;
}

/// Trait for types that can be encoded to a bit stream.
pub trait Encode: Write + EncodeSize {
    /// Encodes a value to a new [BitWriter].
    ///
    /// Panics if the `write` implementation does not write the expected number of bits.
    ///
    /// (Provided method).
    fn encode(&self) -> BitWriter {
        let len = self.encode_size();
        let mut writer = BitWriter::with_capacity(len);
        self.write(&mut writer);
        assert_eq!(writer.len(), len, "write() did not write expected bits");
        writer
    }
}

// Automatically implement `Encode` for types that implement `Write` and `EncodeSize`.
impl<T: Write + EncodeSize> Encode for T {}

/// Trait for types that can be decoded from a whole stream.
///
/// Unlike [Read], which stops wherever the value ends, decoding treats the stream as the
/// complete input: any bits left over after the value are padding and are discarded.
pub trait Decode: Read {
    /// Decodes a value from the start of `reader`, ignoring trailing padding.
    ///
    /// (Provided method).
    fn decode_cfg(mut reader: BitReader, cfg: &Self::Cfg) -> Result<Self, Error> {
        let result = Self::read_cfg(&mut reader, cfg)?;
        let padding = reader.remaining();
        if padding > 0 {
            trace!(padding, "ignored trailing bits");
        }
        Ok(result)
    }

    /// Decodes a value from hexadecimal text.
    ///
    /// (Provided method).
    fn decode_hex_cfg(hex: &str, cfg: &Self::Cfg) -> Result<Self, Error> {
        Self::decode_cfg(BitReader::from_hex(hex)?, cfg)
    }
}

// Automatically implement `Decode` for types that implement `Read`.
impl<T: Read> Decode for T {}

/// Extension trait providing an ergonomic read method for types whose config has a default.
pub trait ReadExt: Read<Cfg: Default> {
    /// Reads a value using the default config.
    fn read(reader: &mut BitReader) -> Result<Self, Error> {
        Self::read_cfg(reader, &Self::Cfg::default())
    }
}

// Automatically implement `ReadExt` for types whose config has a default.
impl<T: Read<Cfg: Default>> ReadExt for T {}

/// Extension trait providing ergonomic decode methods for types whose config has a default.
pub trait DecodeExt: Decode<Cfg: Default> {
    /// Decodes a value using the default config.
    fn decode(reader: BitReader) -> Result<Self, Error> {
        Self::decode_cfg(reader, &Self::Cfg::default())
    }

    /// Decodes a value from hexadecimal text using the default config.
    fn decode_hex(hex: &str) -> Result<Self, Error> {
        Self::decode_hex_cfg(hex, &Self::Cfg::default())
    }
}

// Automatically implement `DecodeExt` for types whose config has a default.
impl<T: Decode<Cfg: Default>> DecodeExt for T {}
