//! Transmission packets.
//!
//! # Format
//!
//! Every packet starts with a 6-bit header:
//!
//! ```text
//! +-------------+-------------+
//! | version (3) | type_id (3) |
//! +-------------+-------------+
//! ```
//!
//! A `type_id` of 4 marks a [Literal]. Its value follows as a sequence of 5-bit groups, each a
//! continuation bit followed by 4 value bits (most significant group first). The first group
//! with a continuation bit of 0 is the last.
//!
//! Any other `type_id` marks an [Operator]. A single "length type" bit follows the header:
//! - `0`: a 15-bit field holds the total length in bits of the sub-packets that follow.
//! - `1`: an 11-bit field holds the number of sub-packets that follow.
//!
//! Sub-packets are complete packets, so operators nest arbitrarily.
//!
//! # Dispatch
//!
//! [Packet::read_cfg] peeks at the header of each packet without consuming it and picks the
//! variant from `type_id`. The variant-specific readers then consume the header themselves and
//! reject a `type_id` that belongs to the other variant.

use crate::{
    bits::{BitReader, BitWriter},
    evaluate::Operation,
    Config, EncodeSize, Error, Read, ReadExt, Write,
};
use std::fmt;
use tracing::trace;

/// Width of the version field.
pub const VERSION_BITS: usize = 3;

/// Width of the type id field.
pub const TYPE_ID_BITS: usize = 3;

/// Width of the header shared by all packets.
pub const HEADER_BITS: usize = VERSION_BITS + TYPE_ID_BITS;

/// The type id reserved for [Literal] packets.
pub const LITERAL_TYPE_ID: u8 = 4;

/// The largest version that fits in [VERSION_BITS].
pub const MAX_VERSION: u8 = (1 << VERSION_BITS) - 1;

/// Number of value bits in each literal group.
const GROUP_VALUE_BITS: usize = 4;

/// Width of a literal group including its continuation bit.
const GROUP_BITS: usize = GROUP_VALUE_BITS + 1;

/// Number of value bits a literal may carry.
const MAX_VALUE_BITS: usize = u64::BITS as usize;

/// How an [Operator] delimits its sub-packets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LengthType {
    /// Sub-packets span a declared number of bits (length type id 0).
    TotalBits,
    /// A declared number of sub-packets follows (length type id 1).
    Count,
}

impl LengthType {
    /// Returns the width of the framing field that follows the length type bit.
    pub const fn width(self) -> usize {
        match self {
            Self::TotalBits => 15,
            Self::Count => 11,
        }
    }

    /// Returns the largest value the framing field can hold.
    pub const fn limit(self) -> usize {
        (1 << self.width()) - 1
    }

    fn from_bit(bit: bool) -> Self {
        if bit {
            Self::Count
        } else {
            Self::TotalBits
        }
    }

    fn bit(self) -> bool {
        matches!(self, Self::Count)
    }
}

/// A packet carrying a single unsigned integer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Literal {
    version: u8,
    value: u64,

    // Leading groups may be zero, so the count is kept to re-encode the original bits.
    groups: usize,
}

impl Literal {
    /// Creates a literal encoded with the fewest groups that hold `value`.
    pub fn new(version: u8, value: u64) -> Result<Self, Error> {
        if version > MAX_VERSION {
            return Err(Error::Invalid("Literal", "version exceeds 3 bits"));
        }
        let significant = MAX_VALUE_BITS - value.leading_zeros() as usize;
        let groups = significant.div_ceil(GROUP_VALUE_BITS).max(1);
        Ok(Self {
            version,
            value,
            groups,
        })
    }

    /// Returns the version field.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Returns the encoded value.
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Returns the number of 5-bit groups the value is encoded with.
    pub fn groups(&self) -> usize {
        self.groups
    }

    /// Returns the 4 value bits of group `index`, counting from the least significant group.
    fn group(&self, index: usize) -> u64 {
        let shift = index * GROUP_VALUE_BITS;
        if shift >= MAX_VALUE_BITS {
            return 0;
        }
        (self.value >> shift) & 0xF
    }
}

impl Read for Literal {
    type Cfg = ();

    fn read_cfg(reader: &mut BitReader, _: &()) -> Result<Self, Error> {
        let start = reader.position();
        let version = reader.read_uint(VERSION_BITS)? as u8;
        let type_id = reader.read_uint(TYPE_ID_BITS)? as u8;
        if type_id != LITERAL_TYPE_ID {
            return Err(Error::MalformedPacket(start, "expected literal type id"));
        }

        let mut value = 0u64;
        let mut groups = 0;
        loop {
            let more = reader.read_bool()?;
            let group = reader.read_uint(GROUP_VALUE_BITS)?;

            // Shifting in another group must not push set bits off the top.
            if value >> (MAX_VALUE_BITS - GROUP_VALUE_BITS) != 0 {
                return Err(Error::MalformedPacket(start, "literal exceeds 64 bits"));
            }
            value = (value << GROUP_VALUE_BITS) | group;
            groups += 1;
            if !more {
                break;
            }
        }
        trace!(position = start, version, value, "decoded literal");

        Ok(Self {
            version,
            value,
            groups,
        })
    }
}

impl Write for Literal {
    fn write(&self, writer: &mut BitWriter) {
        writer.write_uint(self.version as u64, VERSION_BITS);
        writer.write_uint(LITERAL_TYPE_ID as u64, TYPE_ID_BITS);
        for index in (0..self.groups).rev() {
            writer.write_bool(index > 0);
            writer.write_uint(self.group(index), GROUP_VALUE_BITS);
        }
    }
}

impl EncodeSize for Literal {
    fn encode_size(&self) -> usize {
        HEADER_BITS + self.groups * GROUP_BITS
    }
}

/// A packet whose value is computed from its sub-packets.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Operator {
    version: u8,
    operation: Operation,
    length_type: LengthType,
    sub_packets: Vec<Packet>,
}

impl Operator {
    /// Creates an operator, checking that `sub_packets` is non-empty and fits the framing field
    /// selected by `length_type`.
    pub fn new(
        version: u8,
        operation: Operation,
        length_type: LengthType,
        sub_packets: Vec<Packet>,
    ) -> Result<Self, Error> {
        if version > MAX_VERSION {
            return Err(Error::Invalid("Operator", "version exceeds 3 bits"));
        }
        if sub_packets.is_empty() {
            return Err(Error::Invalid("Operator", "no sub-packets"));
        }
        let field = match length_type {
            LengthType::TotalBits => sub_packets.iter().map(EncodeSize::encode_size).sum(),
            LengthType::Count => sub_packets.len(),
        };
        if field > length_type.limit() {
            return Err(Error::Invalid("Operator", "sub-packets exceed framing field"));
        }
        Ok(Self {
            version,
            operation,
            length_type,
            sub_packets,
        })
    }

    /// Returns the version field.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Returns the operation selected by the type id.
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Returns how the sub-packets are framed.
    pub fn length_type(&self) -> LengthType {
        self.length_type
    }

    /// Returns the sub-packets in stream order.
    pub fn sub_packets(&self) -> &[Packet] {
        &self.sub_packets
    }

    fn sub_packets_size(&self) -> usize {
        self.sub_packets.iter().map(EncodeSize::encode_size).sum()
    }

    fn read_at(reader: &mut BitReader, cfg: &Config, depth: usize) -> Result<Self, Error> {
        let start = reader.position();
        let version = reader.read_uint(VERSION_BITS)? as u8;
        let type_id = reader.read_uint(TYPE_ID_BITS)? as u8;
        let operation = Operation::try_from(type_id)
            .map_err(|_| Error::MalformedPacket(start, "expected operator type id"))?;
        let length_type = LengthType::from_bit(reader.read_bool()?);
        let field = reader.read_uint(length_type.width())? as usize;
        if field == 0 {
            return Err(Error::MalformedPacket(start, "operator without sub-packets"));
        }

        let mut sub_packets = Vec::new();
        match length_type {
            LengthType::TotalBits => {
                let region = reader.position();
                while reader.position() - region < field {
                    sub_packets.push(Packet::read_at(reader, cfg, depth + 1)?);
                }
                if reader.position() - region != field {
                    return Err(Error::MalformedPacket(
                        start,
                        "sub-packets overrun declared length",
                    ));
                }
            }
            LengthType::Count => {
                sub_packets.reserve(field);
                for _ in 0..field {
                    sub_packets.push(Packet::read_at(reader, cfg, depth + 1)?);
                }
            }
        }
        trace!(
            position = start,
            version,
            %operation,
            sub_packets = sub_packets.len(),
            "decoded operator"
        );

        Ok(Self {
            version,
            operation,
            length_type,
            sub_packets,
        })
    }
}

impl Read for Operator {
    type Cfg = Config;

    fn read_cfg(reader: &mut BitReader, cfg: &Config) -> Result<Self, Error> {
        if !cfg.allows(1) {
            return Err(Error::DepthExceeded(cfg.max_depth));
        }
        Self::read_at(reader, cfg, 1)
    }
}

impl Write for Operator {
    fn write(&self, writer: &mut BitWriter) {
        writer.write_uint(self.version as u64, VERSION_BITS);
        writer.write_uint(self.operation.type_id() as u64, TYPE_ID_BITS);
        writer.write_bool(self.length_type.bit());
        let field = match self.length_type {
            LengthType::TotalBits => self.sub_packets_size(),
            LengthType::Count => self.sub_packets.len(),
        };
        writer.write_uint(field as u64, self.length_type.width());
        for packet in &self.sub_packets {
            packet.write(writer);
        }
    }
}

impl EncodeSize for Operator {
    fn encode_size(&self) -> usize {
        HEADER_BITS + 1 + self.length_type.width() + self.sub_packets_size()
    }
}

/// A decoded packet: the root of a (possibly single-node) packet tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Packet {
    Literal(Literal),
    Operator(Operator),
}

impl Packet {
    /// Returns the version field.
    pub fn version(&self) -> u8 {
        match self {
            Self::Literal(literal) => literal.version(),
            Self::Operator(operator) => operator.version(),
        }
    }

    /// Returns the type id that appears on the wire.
    pub fn type_id(&self) -> u8 {
        match self {
            Self::Literal(_) => LITERAL_TYPE_ID,
            Self::Operator(operator) => operator.operation().type_id(),
        }
    }

    fn read_at(reader: &mut BitReader, cfg: &Config, depth: usize) -> Result<Self, Error> {
        if !cfg.allows(depth) {
            return Err(Error::DepthExceeded(cfg.max_depth));
        }
        let header = reader.peek_uint_list(&[VERSION_BITS, TYPE_ID_BITS])?;
        if header[1] as u8 == LITERAL_TYPE_ID {
            Literal::read(reader).map(Self::Literal)
        } else {
            Operator::read_at(reader, cfg, depth).map(Self::Operator)
        }
    }
}

impl From<Literal> for Packet {
    fn from(literal: Literal) -> Self {
        Self::Literal(literal)
    }
}

impl From<Operator> for Packet {
    fn from(operator: Operator) -> Self {
        Self::Operator(operator)
    }
}

impl Read for Packet {
    type Cfg = Config;

    fn read_cfg(reader: &mut BitReader, cfg: &Config) -> Result<Self, Error> {
        Self::read_at(reader, cfg, 1)
    }
}

impl Write for Packet {
    fn write(&self, writer: &mut BitWriter) {
        match self {
            Self::Literal(literal) => literal.write(writer),
            Self::Operator(operator) => operator.write(writer),
        }
    }
}

impl EncodeSize for Packet {
    fn encode_size(&self) -> usize {
        match self {
            Self::Literal(literal) => literal.encode_size(),
            Self::Operator(operator) => operator.encode_size(),
        }
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(literal) => write!(f, "literal(v{}, {})", literal.version, literal.value),
            Self::Operator(operator) => {
                write!(f, "{}(v{}", operator.operation, operator.version)?;
                for packet in &operator.sub_packets {
                    write!(f, ", {packet}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{hex, DecodeExt, Encode};

    fn reader(bits: &str) -> BitReader {
        let mut writer = BitWriter::new();
        for c in bits.chars().filter(|c| !c.is_whitespace()) {
            writer.write_bool(c == '1');
        }
        writer.into_reader()
    }

    fn literal(version: u8, value: u64) -> Packet {
        Literal::new(version, value).unwrap().into()
    }

    fn operator(operation: Operation, length_type: LengthType, sub_packets: Vec<Packet>) -> Packet {
        Operator::new(0, operation, length_type, sub_packets)
            .unwrap()
            .into()
    }

    #[test]
    fn test_literal() {
        let mut reader = reader("110100101111111000101000");
        let packet = Packet::read(&mut reader).unwrap();
        assert_eq!(packet, literal(6, 2021));
        assert_eq!(packet.type_id(), LITERAL_TYPE_ID);
        assert_eq!(reader.position(), 21);
    }

    #[test]
    fn test_operator_total_bits() {
        let mut reader = reader("00111000000000000110111101000101001010010001001000000000");
        let Packet::Operator(operator) = Packet::read(&mut reader).unwrap() else {
            panic!("expected operator");
        };
        assert_eq!(operator.version(), 1);
        assert_eq!(operator.operation(), Operation::LessThan);
        assert_eq!(operator.operation().type_id(), 6);
        assert_eq!(operator.length_type(), LengthType::TotalBits);
        assert_eq!(operator.sub_packets(), &[literal(6, 10), literal(2, 20)]);
        assert_eq!(reader.position(), 49);
    }

    #[test]
    fn test_operator_count() {
        let packet = Packet::decode_hex("EE00D40C823060").unwrap();
        let Packet::Operator(operator) = &packet else {
            panic!("expected operator");
        };
        assert_eq!(operator.version(), 7);
        assert_eq!(operator.operation(), Operation::Maximum);
        assert_eq!(operator.length_type(), LengthType::Count);
        assert_eq!(
            operator.sub_packets(),
            &[literal(2, 1), literal(4, 2), literal(1, 3)]
        );
    }

    #[test]
    fn test_nested() {
        // An operator containing an operator containing an operator containing a literal.
        let packet = Packet::decode_hex("8A004A801A8002F478").unwrap();
        let mut depth = 0;
        let mut current = &packet;
        while let Packet::Operator(operator) = current {
            assert_eq!(operator.sub_packets().len(), 1);
            current = &operator.sub_packets()[0];
            depth += 1;
        }
        assert_eq!(depth, 3);
        assert_eq!(current.version(), 6);
        assert_eq!(current.type_id(), LITERAL_TYPE_ID);
    }

    #[test]
    fn test_literal_reader_rejects_operator() {
        let mut reader = BitReader::from_hex("38006F45291200").unwrap();
        assert_eq!(
            Literal::read(&mut reader),
            Err(Error::MalformedPacket(0, "expected literal type id"))
        );
    }

    #[test]
    fn test_operator_reader_rejects_literal() {
        let mut reader = BitReader::from_hex("D2FE28").unwrap();
        assert_eq!(
            Operator::read(&mut reader),
            Err(Error::MalformedPacket(0, "expected operator type id"))
        );
    }

    #[test]
    fn test_total_bits_overrun() {
        // Declares 10 bits of sub-packets, but the literal inside takes 11.
        let mut reader = reader("000000 0 000000000001010 000100 00001");
        assert_eq!(
            Packet::read(&mut reader),
            Err(Error::MalformedPacket(0, "sub-packets overrun declared length"))
        );
    }

    #[test]
    fn test_empty_operator() {
        let mut r = reader("000000 1 00000000000");
        assert_eq!(
            Packet::read(&mut r),
            Err(Error::MalformedPacket(0, "operator without sub-packets"))
        );

        let mut r = reader("000000 0 000000000000000");
        assert_eq!(
            Packet::read(&mut r),
            Err(Error::MalformedPacket(0, "operator without sub-packets"))
        );
    }

    #[test]
    fn test_truncated_header() {
        assert_eq!(Packet::decode_hex("D"), Err(Error::OutOfBits(3, 1)));
    }

    #[test]
    fn test_truncated_literal() {
        assert_eq!(Packet::decode_hex("D2FE"), Err(Error::OutOfBits(1, 0)));
    }

    #[test]
    fn test_truncated_length_field() {
        assert_eq!(Packet::decode_hex("38"), Err(Error::OutOfBits(15, 1)));
    }

    #[test]
    fn test_truncated_sub_packet() {
        // The operator announces two sub-packets but the stream ends inside the second.
        let mut reader = reader("000000 1 00000000010 000100 00001 000100 0");
        assert_eq!(Packet::read(&mut reader), Err(Error::OutOfBits(4, 0)));
    }

    #[test]
    fn test_literal_overflow() {
        // 16 groups of 0xF fit exactly; a 17th group does not.
        let mut bits = String::from("000100");
        for _ in 0..16 {
            bits.push_str("11111");
        }
        bits.push_str("00001");
        assert_eq!(
            Packet::read(&mut reader(&bits)),
            Err(Error::MalformedPacket(0, "literal exceeds 64 bits"))
        );

        let mut bits = String::from("000100");
        for _ in 0..15 {
            bits.push_str("11111");
        }
        bits.push_str("01111");
        assert_eq!(Packet::read(&mut reader(&bits)).unwrap(), literal(0, u64::MAX));
    }

    #[test]
    fn test_literal_leading_zero_groups() {
        // Two groups where one suffices.
        let mut reader = reader("010100 10000 00111");
        let Packet::Literal(literal) = Packet::read(&mut reader).unwrap() else {
            panic!("expected literal");
        };
        assert_eq!(literal.value(), 7);
        assert_eq!(literal.groups(), 2);
        assert_eq!(literal.encode_size(), 16);
    }

    #[test]
    fn test_depth_limit() {
        let packet = operator(
            Operation::Sum,
            LengthType::Count,
            vec![operator(Operation::Sum, LengthType::TotalBits, vec![literal(1, 5)])],
        );
        let (bytes, num_bits) = packet.encode().finish();

        let mut reader = BitReader::new(bytes.clone(), num_bits).unwrap();
        assert_eq!(
            Packet::read_cfg(&mut reader, &Config::new(2)),
            Err(Error::DepthExceeded(2))
        );

        let mut reader = BitReader::new(bytes, num_bits).unwrap();
        assert_eq!(Packet::read_cfg(&mut reader, &Config::new(3)).unwrap(), packet);
    }

    #[test]
    fn test_literal_new() {
        assert_eq!(Literal::new(0, 0).unwrap().groups(), 1);
        assert_eq!(Literal::new(0, 0xF).unwrap().groups(), 1);
        assert_eq!(Literal::new(0, 0x10).unwrap().groups(), 2);
        assert_eq!(Literal::new(0, u64::MAX).unwrap().groups(), 16);
        assert!(matches!(Literal::new(8, 0), Err(Error::Invalid(_, _))));
    }

    #[test]
    fn test_operator_new() {
        assert!(matches!(
            Operator::new(8, Operation::Sum, LengthType::Count, vec![literal(0, 1)]),
            Err(Error::Invalid(_, _))
        ));
        assert!(matches!(
            Operator::new(0, Operation::Sum, LengthType::Count, vec![]),
            Err(Error::Invalid(_, _))
        ));

        // 2048 sub-packets overflow the 11-bit count field.
        assert!(matches!(
            Operator::new(0, Operation::Sum, LengthType::Count, vec![literal(0, 0); 2048]),
            Err(Error::Invalid(_, _))
        ));

        // 2979 literals of 11 bits take 32769 bits, past the 15-bit length field.
        assert!(matches!(
            Operator::new(0, Operation::Sum, LengthType::TotalBits, vec![literal(0, 0); 2979]),
            Err(Error::Invalid(_, _))
        ));
        assert!(Operator::new(
            0,
            Operation::Sum,
            LengthType::TotalBits,
            vec![literal(0, 0); 2978]
        )
        .is_ok());
    }

    #[test]
    fn test_encode_literal() {
        let packet = literal(6, 2021);
        assert_eq!(packet.encode_size(), 21);
        assert_eq!(packet.encode().to_hex(), "D2FE28");
    }

    #[test]
    fn test_encode_matches_input() {
        for input in [
            "D2FE28",
            "38006F45291200",
            "EE00D40C823060",
            "8A004A801A8002F478",
            "620080001611562C8802118E34",
            "C0015000016115A2E0802F182340",
            "A0016C880162017C3686B18A3D4780",
        ] {
            let packet = Packet::decode_hex(input).unwrap();
            let encoded = packet.encode();
            let (original, _) = hex::from_hex(input).unwrap();
            assert_eq!(encoded.to_hex(), hex::to_hex(&original, encoded.len()));
        }
    }

    #[test]
    fn test_display() {
        let packet = Packet::decode_hex("38006F45291200").unwrap();
        assert_eq!(
            packet.to_string(),
            "less_than(v1, literal(v6, 10), literal(v2, 20))"
        );
    }
}
