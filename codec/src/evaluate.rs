//! Folds over a decoded [Packet] tree.
//!
//! Both folds are pure: they only read the tree, so any number of them may run over the same
//! tree.

use crate::{Error, Packet};
use std::fmt;

/// The operation an [crate::Operator] applies to the values of its sub-packets.
///
/// Discriminants are the `type_id` values on the wire. Type id 4 belongs to literals and has no
/// operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Operation {
    Sum = 0,
    Product = 1,
    Minimum = 2,
    Maximum = 3,
    GreaterThan = 5,
    LessThan = 6,
    EqualTo = 7,
}

impl Operation {
    /// Returns the type id of this operation.
    pub fn type_id(self) -> u8 {
        self as u8
    }

    /// Applies the operation to `operands`, in sub-packet order.
    pub fn apply(self, operands: &[u64]) -> Result<u64, Error> {
        match self {
            Self::Sum => operands
                .iter()
                .try_fold(0u64, |acc, &v| acc.checked_add(v))
                .ok_or(Error::Overflow("sum")),
            Self::Product => operands
                .iter()
                .try_fold(1u64, |acc, &v| acc.checked_mul(v))
                .ok_or(Error::Overflow("product")),
            Self::Minimum => operands.iter().min().copied().ok_or(Error::InvalidOperator(
                self.type_id(),
                "expected at least one operand",
            )),
            Self::Maximum => operands.iter().max().copied().ok_or(Error::InvalidOperator(
                self.type_id(),
                "expected at least one operand",
            )),
            Self::GreaterThan | Self::LessThan | Self::EqualTo => {
                let [first, second] = operands else {
                    return Err(Error::InvalidOperator(
                        self.type_id(),
                        "expected exactly two operands",
                    ));
                };
                let result = match self {
                    Self::GreaterThan => first > second,
                    Self::LessThan => first < second,
                    _ => first == second,
                };
                Ok(result as u64)
            }
        }
    }
}

impl TryFrom<u8> for Operation {
    type Error = Error;

    fn try_from(type_id: u8) -> Result<Self, Error> {
        match type_id {
            0 => Ok(Self::Sum),
            1 => Ok(Self::Product),
            2 => Ok(Self::Minimum),
            3 => Ok(Self::Maximum),
            5 => Ok(Self::GreaterThan),
            6 => Ok(Self::LessThan),
            7 => Ok(Self::EqualTo),
            _ => Err(Error::InvalidOperator(type_id, "unknown type id")),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sum => "sum",
            Self::Product => "product",
            Self::Minimum => "minimum",
            Self::Maximum => "maximum",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::EqualTo => "equal_to",
        };
        f.write_str(name)
    }
}

/// Returns the sum of the version fields of every packet in the tree.
pub fn version_sum(packet: &Packet) -> u64 {
    match packet {
        Packet::Literal(literal) => literal.version() as u64,
        Packet::Operator(operator) => {
            operator.version() as u64 + operator.sub_packets().iter().map(version_sum).sum::<u64>()
        }
    }
}

/// Returns the value of the expression rooted at `packet`.
///
/// Fails if a comparison does not have exactly two operands or if a sum or product overflows.
pub fn evaluate(packet: &Packet) -> Result<u64, Error> {
    match packet {
        Packet::Literal(literal) => Ok(literal.value()),
        Packet::Operator(operator) => {
            let operands = operator
                .sub_packets()
                .iter()
                .map(evaluate)
                .collect::<Result<Vec<_>, _>>()?;
            operator.operation().apply(&operands)
        }
    }
}
