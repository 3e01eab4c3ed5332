//! Failures raised by construction and arithmetic on measured values.
//!
//! There are exactly two kinds: the operand is not a number at all
//! ([`ErrorKind::Type`]), or it is a number that breaks a precondition of the
//! operation ([`ErrorKind::Value`]). Every error names the [`Operation`] it
//! was raised for, so an augmented assignment reports `/=` rather than the
//! `/` it is built on.

use std::fmt::{Display, Formatter};

use thiserror::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Type,
    Value,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Construct,
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    RAdd,
    RSub,
    RMul,
    RDiv,
    RPow,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    PowAssign,
}

impl Operation {
    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Construct => "MeasuredValue::construct",
            Operation::Add | Operation::RAdd => "+",
            Operation::Sub | Operation::RSub => "-",
            Operation::Mul | Operation::RMul => "*",
            Operation::Div | Operation::RDiv => "/",
            Operation::Pow | Operation::RPow => "**",
            Operation::AddAssign => "+=",
            Operation::SubAssign => "-=",
            Operation::MulAssign => "*=",
            Operation::DivAssign => "/=",
            Operation::PowAssign => "**=",
        }
    }
    pub fn is_reflected(self) -> bool {
        matches!(
            self,
            Operation::RAdd | Operation::RSub | Operation::RMul | Operation::RDiv | Operation::RPow
        )
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_reflected() {
            write!(f, "{} (reflected)", self.symbol())
        } else {
            write!(f, "{}", self.symbol())
        }
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
    /// The operand is not a real number and does not expose a valid
    /// (real mean, non-negative real uncertainty) pair.
    #[error("`{op}`: {value} is not a real number or a measured value (expected {expected})")]
    Type {
        op: Operation,
        value: String,
        expected: &'static str,
    },

    /// The operand or receiver breaks a numeric precondition of the operation.
    #[error("`{op}`: {value} does not satisfy {condition}")]
    Value {
        op: Operation,
        value: String,
        condition: &'static str,
    },
}

impl Error {
    pub fn type_error(op: Operation, value: impl Display, expected: &'static str) -> Self {
        let value = value.to_string();
        tracing::debug!(%op, %value, expected, kind = "type", "rejected operand");
        Error::Type { op, value, expected }
    }

    pub fn value_error(op: Operation, value: impl Display, condition: &'static str) -> Self {
        let value = value.to_string();
        tracing::debug!(%op, %value, condition, kind = "value", "rejected operand");
        Error::Value { op, value, condition }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Type { .. } => ErrorKind::Type,
            Error::Value { .. } => ErrorKind::Value,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Error::Type { op, .. } | Error::Value { op, .. } => *op,
        }
    }

    /// Re-attributes the error to another operation, keeping everything else.
    pub fn with_operation(self, op: Operation) -> Self {
        match self {
            Error::Type { value, expected, .. } => Error::Type { op, value, expected },
            Error::Value { value, condition, .. } => Error::Value { op, value, condition },
        }
    }
}

#[test]
fn test_message() {
    let e = Error::value_error(Operation::DivAssign, 0, "!= 0");
    assert_eq!(e.kind(), ErrorKind::Value);
    assert_eq!(e.operation(), Operation::DivAssign);
    assert_eq!(e.to_string(), "`/=`: 0 does not satisfy != 0");
}

#[test]
fn test_reattribute() {
    let e = Error::type_error(Operation::Pow, "NaN", "int, float or measured value");
    let e = e.with_operation(Operation::PowAssign);
    assert_eq!(e.kind(), ErrorKind::Type);
    assert_eq!(e.operation(), Operation::PowAssign);
    assert_eq!(Operation::RDiv.to_string(), "/ (reflected)");
}
