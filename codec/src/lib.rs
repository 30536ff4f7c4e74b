//! Decode, encode, and evaluate nested transmission packets.
//!
//! # Overview
//!
//! A transmission is a bit stream (usually delivered as a line of hexadecimal text) carrying a
//! single root packet. Packets are either literals, which carry an unsigned integer, or
//! operators, which carry one or more sub-packets and an operation to apply to their values.
//! See [packet] for the wire format.
//!
//! Decoding runs in three layers:
//! - [bits]: a cursor over an immutable bit stream with fixed-width reads and non-advancing
//!   peeks.
//! - [packet]: a recursive-descent parser that produces a [Packet] tree, and its inverse.
//! - [evaluate]: pure folds over the tree ([evaluate()] and [version_sum]).
//!
//! Input is untrusted: every read is bounds-checked, framing is verified exactly, and nesting
//! is bounded by a [Config].
//!
//! # Example
//!
//! ```
//! use transmission_codec::{evaluate, version_sum, DecodeExt, Packet};
//!
//! // 1 + 2
//! let packet = Packet::decode_hex("C200B40A82").unwrap();
//! assert_eq!(evaluate(&packet).unwrap(), 3);
//! assert_eq!(version_sum(&packet), 14);
//! ```
//!
//! # Example (Encoding)
//!
//! ```
//! use transmission_codec::{Encode, LengthType, Literal, Operation, Operator, Packet};
//!
//! let packet: Packet = Operator::new(
//!     1,
//!     Operation::LessThan,
//!     LengthType::TotalBits,
//!     vec![
//!         Literal::new(6, 10).unwrap().into(),
//!         Literal::new(2, 20).unwrap().into(),
//!     ],
//! )
//! .unwrap()
//! .into();
//! assert_eq!(packet.encode().to_hex(), "38006F4529120");
//! ```

pub mod bits;
pub mod codec;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod hex;
pub mod packet;

// Re-export main types and traits
pub use bits::{BitReader, BitWriter};
pub use codec::{Decode, DecodeExt, Encode, EncodeSize, Read, ReadExt, Write};
pub use config::Config;
pub use error::Error;
pub use evaluate::{evaluate, version_sum, Operation};
pub use packet::{LengthType, Literal, Operator, Packet};
