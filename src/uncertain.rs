use std::fmt::{Debug, Display, Formatter};

use num::Zero;

use crate::error::{Error, Operation};
use crate::measured::MeasuredValue;
use crate::real::Real;
use crate::Result;

pub(crate) const EXPECTED_OPERAND: &str = "int, float or a value with mean and uncertainty";

/// Anything that carries a mean and a standard error.
///
/// Operators accept any implementor, not only [`MeasuredValue`]. An
/// implementor is a valid operand when both numbers are real (not NaN) and the
/// uncertainty is non-negative.
pub trait Uncertain {
    fn mean(&self) -> Real;
    fn uncertainty(&self) -> Real;

    /// The concrete measured value behind this implementor, if there is one.
    /// Used to recognise `x op x` when `x` arrives as a trait object.
    fn as_measured(&self) -> Option<&MeasuredValue> { None }
}

/// `(mean, uncertainty)` pairs of plain numbers.
impl<T: Copy + Into<Real>> Uncertain for (T, T) {
    fn mean(&self) -> Real { self.0.into() }
    fn uncertainty(&self) -> Real { self.1.into() }
}

/// The right-hand side of an operation: a plain number or an uncertain value.
#[derive(Copy, Clone)]
pub enum Operand<'a> {
    Plain(Real),
    Measured(&'a MeasuredValue),
    Foreign(&'a dyn Uncertain),
}

pub(crate) enum Checked<'a> {
    Plain(Real),
    Uncertain {
        mean: Real,
        uncertainty: Real,
        source: Option<&'a MeasuredValue>,
    },
}

impl<'a> Operand<'a> {
    pub fn uncertain<T: Uncertain + 'a>(value: &'a T) -> Self {
        match value.as_measured() {
            Some(measured) => Operand::Measured(measured),
            None => Operand::Foreign(value),
        }
    }

    pub fn is_plain(&self) -> bool { matches!(self, Operand::Plain(_)) }

    pub fn mean(&self) -> Real {
        match self {
            Operand::Plain(x) => *x,
            Operand::Measured(x) => x.mean(),
            Operand::Foreign(x) => x.mean(),
        }
    }

    /// Zero for plain numbers.
    pub fn uncertainty(&self) -> Real {
        match self {
            Operand::Plain(_) => Real::zero(),
            Operand::Measured(x) => x.uncertainty(),
            Operand::Foreign(x) => x.uncertainty(),
        }
    }

    /// The check every arithmetic entry point runs before doing any work.
    pub(crate) fn check(self, op: Operation) -> Result<Checked<'a>> {
        match self {
            Operand::Plain(x) if x.is_nan() => Err(Error::type_error(op, self, EXPECTED_OPERAND)),
            Operand::Plain(x) => Ok(Checked::Plain(x)),
            _ => {
                let (mean, uncertainty) = (self.mean(), self.uncertainty());
                if mean.is_nan() || uncertainty.is_nan() || uncertainty.is_negative() {
                    return Err(Error::type_error(op, self, EXPECTED_OPERAND));
                }
                let source = match self {
                    Operand::Measured(x) => Some(x),
                    _ => None,
                };
                Ok(Checked::Uncertain { mean, uncertainty, source })
            }
        }
    }
}

pub(crate) fn write_pair(f: &mut Formatter<'_>, mean: Real, uncertainty: Real) -> std::fmt::Result {
    if uncertainty.is_positive() {
        write!(f, "({} +/- {})", mean, uncertainty)
    } else {
        write!(f, "{}", mean)
    }
}

impl Display for Operand<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Plain(x) => write!(f, "{}", x),
            Operand::Measured(x) => Display::fmt(x, f),
            Operand::Foreign(x) => write_pair(f, x.mean(), x.uncertainty()),
        }
    }
}

impl Debug for Operand<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Plain(x) => write!(f, "Plain({})", x),
            Operand::Measured(x) => write!(f, "Measured({:?})", x),
            Operand::Foreign(x) => write!(f, "Foreign({},{})", x.mean(), x.uncertainty()),
        }
    }
}

impl From<Real> for Operand<'_> {
    fn from(x: Real) -> Self { Operand::Plain(x) }
}

macro_rules! impl_from_plain {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Operand<'_> {
                fn from(x: $t) -> Self { Operand::Plain(Real::from(x)) }
            }
        )*
    };
}

impl_from_plain!(i8, i16, i32, i64, u8, u16, u32, f32, f64);

impl<'a> From<&'a MeasuredValue> for Operand<'a> {
    fn from(x: &'a MeasuredValue) -> Self { Operand::Measured(x) }
}

impl<'a> From<&'a dyn Uncertain> for Operand<'a> {
    fn from(x: &'a dyn Uncertain) -> Self {
        match x.as_measured() {
            Some(measured) => Operand::Measured(measured),
            None => Operand::Foreign(x),
        }
    }
}

impl<'a, T: Copy + Into<Real> + 'a> From<&'a (T, T)> for Operand<'a> {
    fn from(x: &'a (T, T)) -> Self { Operand::Foreign(x) }
}

#[test]
fn test_plain_operand() {
    let op = Operand::from(2.5);
    assert!(op.is_plain());
    assert_eq!(op.mean(), Real::Float(2.5));
    assert_eq!(op.uncertainty(), Real::Int(0));
    assert!(matches!(op.check(Operation::Add), Ok(Checked::Plain(_))));
}

#[test]
fn test_nan_is_not_a_number() {
    let err = Operand::from(f64::NAN).check(Operation::Mul).err().unwrap();
    assert_eq!(err.kind(), crate::ErrorKind::Type);
    let pair = (1.0, f64::NAN);
    assert!(Operand::from(&pair).check(Operation::Mul).is_err());
}

#[test]
fn test_negative_pair_rejected() {
    let pair = (1.0, -0.5);
    let err = Operand::from(&pair).check(Operation::Sub).err().unwrap();
    assert_eq!(err.kind(), crate::ErrorKind::Type);
    assert_eq!(err.operation(), Operation::Sub);
}

#[test]
fn test_trait_object_resolves_to_measured() {
    let x = MeasuredValue::new(1, 1).unwrap();
    let dynamic: &dyn Uncertain = &x;
    assert!(matches!(Operand::from(dynamic), Operand::Measured(_)));
    let pair = (1, 2);
    assert!(matches!(Operand::uncertain(&pair), Operand::Foreign(_)));
    assert_eq!(format!("{}", Operand::uncertain(&pair)), "(1 +/- 2)");
}
