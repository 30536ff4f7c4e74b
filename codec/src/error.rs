//! Error types for codec operations

use thiserror::Error;

/// Error type for codec operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("out of bits: requested {0}, remaining {1}")]
    OutOfBits(usize, usize), // requested, remaining
    #[error("malformed packet at bit {0}: {1}")]
    MalformedPacket(usize, &'static str), // position, reason
    #[error("invalid operator {0}: {1}")]
    InvalidOperator(u8, &'static str), // type_id, reason
    #[error("invalid hex digit {0:?} at offset {1}")]
    InvalidHex(char, usize), // digit, offset
    #[error("nesting exceeds maximum depth of {0}")]
    DepthExceeded(usize),
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str), // operation
    #[error("invalid {0}: {1}")]
    Invalid(&'static str, &'static str), // context, message
}
