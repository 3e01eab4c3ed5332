//! The measured value type and its error-propagating arithmetic.
//!
//! Every binary operation sorts its right-hand side into one of three cases,
//! in this order:
//!
//! 1. a plain number, which carries no uncertainty;
//! 2. the receiver itself (same address), which is perfectly correlated with
//!    the receiver;
//! 3. any other uncertain value, assumed independent of the receiver.
//!
//! Results are always fresh values. The `try_*_assign` forms compute the
//! result first and overwrite `self` only on success.

use std::fmt::{Debug, Display, Formatter};
use std::iter::{Product, Sum};
use std::ops::{Add, Mul};

use by_address::ByAddress;
use num::{One, ToPrimitive, Zero};

use crate::error::{Error, Operation};
use crate::real::Real;
use crate::uncertain::{write_pair, Checked, Operand, Uncertain, EXPECTED_OPERAND};
use crate::Result;

/// A mean together with its standard error. The uncertainty is never negative.
#[derive(Clone)]
pub struct MeasuredValue {
    mean: Real,
    uncertainty: Real,
}

/// Right-hand side of a binary operation after validation.
#[derive(Copy, Clone)]
enum Rhs {
    Plain(Real),
    Same,
    Other { mean: Real, uncertainty: Real },
}

impl Rhs {
    fn describe(self, receiver: &MeasuredValue) -> MeasuredValue {
        match self {
            Rhs::Plain(x) => MeasuredValue::exact_unchecked(x),
            Rhs::Same => receiver.clone(),
            Rhs::Other { mean, uncertainty } => MeasuredValue::raw(mean, uncertainty),
        }
    }
    fn mean(self, receiver: &MeasuredValue) -> Real {
        match self {
            Rhs::Plain(x) => x,
            Rhs::Same => receiver.mean,
            Rhs::Other { mean, .. } => mean,
        }
    }
}

fn two() -> Real { Real::Int(2) }

fn quadrature(a: Real, b: Real) -> Real { (a.square() + b.square()).sqrt() }

impl MeasuredValue {
    pub(crate) fn raw(mean: Real, uncertainty: Real) -> Self { MeasuredValue { mean, uncertainty } }
    fn exact_unchecked(mean: Real) -> Self { Self::raw(mean, Real::zero()) }

    /// Builds a value from a plain number or from anything [`Uncertain`],
    /// optionally replacing its uncertainty.
    ///
    /// Fails with a type error when the source or the explicit uncertainty is
    /// not a real number, and with a value error when the resulting
    /// uncertainty is negative.
    pub fn construct<'a>(source: impl Into<Operand<'a>>, uncertainty: Option<Real>) -> Result<Self> {
        let op = Operation::Construct;
        let source = source.into();
        let mean = source.mean();
        if mean.is_nan() {
            return Err(Error::type_error(op, source, EXPECTED_OPERAND));
        }
        let uncertainty = match uncertainty {
            Some(se) if se.is_nan() => return Err(Error::type_error(op, se, "int, float or None")),
            Some(se) => se,
            None => {
                let se = source.uncertainty();
                if se.is_nan() {
                    return Err(Error::type_error(op, source, EXPECTED_OPERAND));
                }
                se
            }
        };
        if uncertainty.is_negative() {
            return Err(Error::value_error(op, uncertainty, ">= 0"));
        }
        Ok(Self::raw(mean, uncertainty))
    }

    pub fn new(mean: impl Into<Real>, uncertainty: impl Into<Real>) -> Result<Self> {
        Self::construct(Operand::Plain(mean.into()), Some(uncertainty.into()))
    }

    /// A value known exactly, with zero uncertainty.
    pub fn exact(mean: impl Into<Real>) -> Result<Self> { Self::construct(Operand::Plain(mean.into()), None) }

    pub fn from_uncertain<T: Uncertain>(source: &T) -> Result<Self> {
        Self::construct(Operand::uncertain(source), None)
    }

    pub fn with_uncertainty<T: Uncertain>(source: &T, uncertainty: impl Into<Real>) -> Result<Self> {
        Self::construct(Operand::uncertain(source), Some(uncertainty.into()))
    }

    pub fn mean(&self) -> Real { self.mean }
    pub fn uncertainty(&self) -> Real { self.uncertainty }

    pub fn is_exact(&self) -> bool { self.uncertainty.is_zero() }

    /// `uncertainty / |mean|`, or `None` when the mean is zero.
    pub fn relative_uncertainty(&self) -> Option<f64> {
        if self.mean.is_zero() {
            None
        } else {
            Some(self.uncertainty.to_f64() / self.mean.abs().to_f64())
        }
    }

    /// Integer coercions truncate (or floor/ceil) the mean and saturate at the
    /// `i64` bounds, so an infinite mean maps to `i64::MAX` or `i64::MIN`.
    pub fn to_int(&self) -> i64 { self.mean.trunc().to_i64_saturating() }
    pub fn to_float(&self) -> f64 { self.mean.to_f64() }
    pub fn truncate(&self) -> i64 { self.to_int() }
    pub fn floor(&self) -> i64 { self.mean.floor().to_i64_saturating() }
    pub fn ceil(&self) -> i64 { self.mean.ceil().to_i64_saturating() }

    /// Rounds the mean, ties to even. `None` yields an integer; with
    /// `Some(digits)` a float mean stays a float.
    pub fn round(&self, digits: Option<i32>) -> Real { self.mean.round(digits) }

    /// `|mean|`; the uncertainty is dropped.
    pub fn abs(&self) -> Real { self.mean.abs() }

    /// Unary plus: a fresh copy.
    pub fn pos(&self) -> Self { self.clone() }

    fn rhs(&self, op: Operation, other: Operand<'_>) -> Result<Rhs> {
        Ok(match other.check(op)? {
            Checked::Plain(x) => Rhs::Plain(x),
            Checked::Uncertain { source: Some(source), .. } if ByAddress(self) == ByAddress(source) => {
                Rhs::Same
            }
            Checked::Uncertain { mean, uncertainty, .. } => Rhs::Other { mean, uncertainty },
        })
    }

    fn add_rhs(&self, rhs: Rhs) -> Self {
        match rhs {
            Rhs::Plain(k) => Self::raw(self.mean + k, self.uncertainty),
            Rhs::Same => Self::raw(two() * self.mean, two() * self.uncertainty),
            Rhs::Other { mean, uncertainty } => {
                Self::raw(self.mean + mean, quadrature(self.uncertainty, uncertainty))
            }
        }
    }

    fn sub_rhs(&self, rhs: Rhs) -> Self {
        match rhs {
            Rhs::Plain(k) => Self::raw(self.mean - k, self.uncertainty),
            Rhs::Same => Self::raw(Real::zero(), Real::zero()),
            Rhs::Other { mean, uncertainty } => {
                Self::raw(self.mean - mean, quadrature(self.uncertainty, uncertainty))
            }
        }
    }

    fn mul_rhs(&self, rhs: Rhs) -> Self {
        match rhs {
            Rhs::Plain(k) => Self::raw(self.mean * k, self.uncertainty * k.abs()),
            Rhs::Same => Self::raw(self.mean.square(), two() * self.uncertainty * self.mean.abs()),
            Rhs::Other { mean, uncertainty } => Self::raw(
                self.mean * mean,
                quadrature(self.uncertainty * mean, uncertainty * self.mean),
            ),
        }
    }

    fn check_divisor(&self, rhs: Rhs, op: Operation) -> Result<()> {
        match rhs {
            Rhs::Same => Ok(()),
            _ if rhs.mean(self).is_zero() => Err(Error::value_error(op, rhs.describe(self), "!= 0")),
            _ => Ok(()),
        }
    }

    fn div_rhs(&self, rhs: Rhs, op: Operation) -> Result<Self> {
        self.check_divisor(rhs, op)?;
        Ok(match rhs {
            Rhs::Plain(k) => Self::raw(self.mean / k, self.uncertainty / k.abs()),
            Rhs::Same => Self::raw(Real::one(), Real::zero()),
            Rhs::Other { mean, uncertainty } => Self::raw(
                self.mean / mean,
                quadrature(self.uncertainty / mean, uncertainty * self.mean / mean.square()),
            ),
        })
    }

    fn pow_rhs(&self, rhs: Rhs, op: Operation) -> Result<Self> {
        match rhs {
            Rhs::Plain(k) => self.pow_plain(k, op),
            Rhs::Same => {
                self.check_log_base(op)?;
                let mean = self.mean.pow(self.mean);
                let uncertainty = self.uncertainty * (mean * (Real::one() + self.mean.ln())).abs();
                Ok(Self::raw(mean, uncertainty))
            }
            Rhs::Other { mean: exp, uncertainty: exp_uncertainty } => {
                self.check_log_base(op)?;
                let mean = self.mean.pow(exp);
                let from_base = (exp * self.uncertainty).square() * self.mean.pow(two() * (exp - Real::one()));
                let from_exp = (exp_uncertainty * self.mean.ln() * mean).square();
                Ok(Self::raw(mean, (from_base + from_exp).sqrt()))
            }
        }
    }

    fn pow_plain(&self, exp: Real, op: Operation) -> Result<Self> {
        if exp.is_zero() {
            return Ok(Self::raw(Real::one(), Real::zero()));
        }
        if self.mean.is_negative() && !exp.is_integral() {
            return Err(Error::value_error(op, self, ">= 0 for a non-integer exponent"));
        }
        if self.mean.is_zero() && exp.is_negative() {
            return Err(Error::value_error(op, self, "!= 0 for a negative exponent"));
        }
        let mean = self.mean.pow(exp);
        let uncertainty = if self.mean.is_zero() {
            // 0 ** exp with exp > 0; zero uncertainty stays zero.
            self.uncertainty.pow(exp)
        } else {
            self.uncertainty * (exp * mean / self.mean).abs()
        };
        Ok(Self::raw(mean, uncertainty))
    }

    fn check_log_base(&self, op: Operation) -> Result<()> {
        if self.mean.is_positive() {
            Ok(())
        } else {
            Err(Error::value_error(op, self, "> 0 for an uncertain exponent"))
        }
    }

    pub fn try_add<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Self> {
        Ok(self.add_rhs(self.rhs(Operation::Add, other.into())?))
    }

    /// `other + self`.
    pub fn try_radd<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Self> {
        Ok(self.add_rhs(self.rhs(Operation::RAdd, other.into())?))
    }

    pub fn try_sub<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Self> {
        Ok(self.sub_rhs(self.rhs(Operation::Sub, other.into())?))
    }

    /// `other - self`, computed as `-(self - other)`.
    pub fn try_rsub<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Self> {
        Ok(-self.sub_rhs(self.rhs(Operation::RSub, other.into())?))
    }

    pub fn try_mul<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Self> {
        Ok(self.mul_rhs(self.rhs(Operation::Mul, other.into())?))
    }

    /// `other * self`.
    pub fn try_rmul<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Self> {
        Ok(self.mul_rhs(self.rhs(Operation::RMul, other.into())?))
    }

    pub fn try_div<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Self> {
        let op = Operation::Div;
        self.div_rhs(self.rhs(op, other.into())?, op)
    }

    /// `other / self`. Fails when the mean of `self` is zero.
    pub fn try_rdiv<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Self> {
        let op = Operation::RDiv;
        match self.rhs(op, other.into())? {
            Rhs::Same => Ok(Self::raw(Real::one(), Real::zero())),
            _ if self.mean.is_zero() => Err(Error::value_error(op, self, "!= 0")),
            Rhs::Plain(k) => Ok(Self::raw(k / self.mean, self.uncertainty * k.abs() / self.mean.square())),
            Rhs::Other { mean, uncertainty } => Ok(Self::raw(
                mean / self.mean,
                quadrature(uncertainty / self.mean, self.uncertainty * mean / self.mean.square()),
            )),
        }
    }

    /// `self ** other`, for a plain or an uncertain exponent.
    pub fn try_pow<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Self> {
        let op = Operation::Pow;
        self.pow_rhs(self.rhs(op, other.into())?, op)
    }

    /// `base ** self`. A plain base must be strictly positive.
    pub fn try_rpow<'a>(&self, base: impl Into<Operand<'a>>) -> Result<Self> {
        let op = Operation::RPow;
        match self.rhs(op, base.into())? {
            Rhs::Plain(base) => {
                if !base.is_positive() {
                    return Err(Error::value_error(op, base, "> 0"));
                }
                let mean = base.pow(self.mean);
                Ok(Self::raw(mean, (mean * base.ln()).abs() * self.uncertainty))
            }
            Rhs::Same => self.pow_rhs(Rhs::Same, op),
            Rhs::Other { mean, uncertainty } => Self::raw(mean, uncertainty).pow_rhs(
                Rhs::Other { mean: self.mean, uncertainty: self.uncertainty },
                op,
            ),
        }
    }

    fn assign(&mut self, next: Result<Self>) -> Result<()> {
        *self = next?;
        Ok(())
    }

    pub fn try_add_assign<'a>(&mut self, other: impl Into<Operand<'a>>) -> Result<()> {
        let next = self.rhs(Operation::AddAssign, other.into()).map(|rhs| self.add_rhs(rhs));
        self.assign(next)
    }

    pub fn try_sub_assign<'a>(&mut self, other: impl Into<Operand<'a>>) -> Result<()> {
        let next = self.rhs(Operation::SubAssign, other.into()).map(|rhs| self.sub_rhs(rhs));
        self.assign(next)
    }

    pub fn try_mul_assign<'a>(&mut self, other: impl Into<Operand<'a>>) -> Result<()> {
        let next = self.rhs(Operation::MulAssign, other.into()).map(|rhs| self.mul_rhs(rhs));
        self.assign(next)
    }

    /// Rejects a zero divisor up front, then divides.
    pub fn try_div_assign<'a>(&mut self, other: impl Into<Operand<'a>>) -> Result<()> {
        let op = Operation::DivAssign;
        let rhs = self.rhs(op, other.into())?;
        self.check_divisor(rhs, op)?;
        let next = self.div_rhs(rhs, op);
        self.assign(next)
    }

    pub fn try_pow_assign<'a>(&mut self, other: impl Into<Operand<'a>>) -> Result<()> {
        let op = Operation::PowAssign;
        let next = self.rhs(op, other.into()).and_then(|rhs| self.pow_rhs(rhs, op));
        self.assign(next)
    }
}

impl Uncertain for MeasuredValue {
    fn mean(&self) -> Real { self.mean }
    fn uncertainty(&self) -> Real { self.uncertainty }
    fn as_measured(&self) -> Option<&MeasuredValue> { Some(self) }
}

impl std::ops::Neg for MeasuredValue {
    type Output = Self;
    fn neg(self) -> Self::Output { Self::raw(-self.mean, self.uncertainty) }
}

impl std::ops::Neg for &MeasuredValue {
    type Output = MeasuredValue;
    fn neg(self) -> Self::Output { -self.clone() }
}

impl From<i64> for MeasuredValue {
    fn from(x: i64) -> Self { Self::exact_unchecked(Real::Int(x)) }
}

impl From<i32> for MeasuredValue {
    fn from(x: i32) -> Self { Self::exact_unchecked(Real::from(x)) }
}

impl TryFrom<f64> for MeasuredValue {
    type Error = Error;
    fn try_from(x: f64) -> Result<Self> { Self::exact(x) }
}

impl TryFrom<Real> for MeasuredValue {
    type Error = Error;
    fn try_from(x: Real) -> Result<Self> { Self::exact(x) }
}

impl Zero for MeasuredValue {
    fn zero() -> Self { Self::exact_unchecked(Real::zero()) }
    fn is_zero(&self) -> bool { self.mean.is_zero() && self.uncertainty.is_zero() }
}

impl One for MeasuredValue {
    fn one() -> Self { Self::exact_unchecked(Real::one()) }
}

/// Sums independent measurements; uncertainties add in quadrature.
impl Sum for MeasuredValue {
    fn sum<I: Iterator<Item=Self>>(iter: I) -> Self { iter.fold(Self::zero(), Self::add) }
}

impl<'a> Sum<&'a MeasuredValue> for MeasuredValue {
    fn sum<I: Iterator<Item=&'a MeasuredValue>>(iter: I) -> Self {
        iter.fold(Self::zero(), |total, x| total + x)
    }
}

impl Product for MeasuredValue {
    fn product<I: Iterator<Item=Self>>(iter: I) -> Self { iter.fold(Self::one(), Self::mul) }
}

impl<'a> Product<&'a MeasuredValue> for MeasuredValue {
    fn product<I: Iterator<Item=&'a MeasuredValue>>(iter: I) -> Self {
        iter.fold(Self::one(), |total, x| total * x)
    }
}

impl ToPrimitive for MeasuredValue {
    fn to_i64(&self) -> Option<i64> { self.mean.to_i64() }
    fn to_u64(&self) -> Option<u64> { self.mean.to_u64() }
    fn to_f64(&self) -> Option<f64> { Some(self.mean.to_f64()) }
}

impl Display for MeasuredValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write_pair(f, self.mean, self.uncertainty) }
}

impl Debug for MeasuredValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "MeasuredValue({},{})", self.mean, self.uncertainty)
    }
}

#[cfg(test)]
fn close(a: Real, b: f64) -> bool { (a.to_f64() - b).abs() < 1e-9 }

#[test]
fn test_construct_shapes() {
    let a = MeasuredValue::exact(3).unwrap();
    assert!(matches!((a.mean(), a.uncertainty()), (Real::Int(3), Real::Int(0))));
    let b = MeasuredValue::new(1.5, 0.25).unwrap();
    assert_eq!((b.mean(), b.uncertainty()), (Real::Float(1.5), Real::Float(0.25)));
    let c = MeasuredValue::from_uncertain(&b).unwrap();
    assert_eq!((c.mean(), c.uncertainty()), (Real::Float(1.5), Real::Float(0.25)));
    let d = MeasuredValue::with_uncertainty(&b, 2).unwrap();
    assert!(matches!(d.uncertainty(), Real::Int(2)));
    let e = MeasuredValue::from_uncertain(&(4, 1)).unwrap();
    assert!(matches!((e.mean(), e.uncertainty()), (Real::Int(4), Real::Int(1))));
}

#[test]
fn test_construct_errors() {
    use crate::ErrorKind;
    assert_eq!(MeasuredValue::new(1, -1).unwrap_err().kind(), ErrorKind::Value);
    assert_eq!(MeasuredValue::new(f64::NAN, 1).unwrap_err().kind(), ErrorKind::Type);
    assert_eq!(MeasuredValue::new(1, f64::NAN).unwrap_err().kind(), ErrorKind::Type);
    assert_eq!(MeasuredValue::from_uncertain(&(1.0, -0.1)).unwrap_err().kind(), ErrorKind::Value);
    // An explicit uncertainty replaces the source's, even an invalid one.
    assert!(MeasuredValue::with_uncertainty(&(1.0, -0.1), 0.1).is_ok());
    assert_eq!(MeasuredValue::new(1, -1).unwrap_err().operation(), Operation::Construct);
}

#[test]
fn test_coercions() {
    let x = MeasuredValue::new(-2.7, 0.5).unwrap();
    assert_eq!(x.to_int(), -2);
    assert_eq!(x.truncate(), -2);
    assert_eq!(x.to_float(), -2.7);
    assert_eq!(x.floor(), -3);
    assert_eq!(x.ceil(), -2);
    assert!(matches!(x.round(None), Real::Int(-3)));
    assert!(matches!(x.round(Some(0)), Real::Float(r) if r == -3.0));
    assert_eq!(x.abs(), Real::Float(2.7));
    assert_eq!(x.to_i64(), Some(-2));
    let y = x.pos();
    assert_eq!((y.mean(), y.uncertainty()), (x.mean(), x.uncertainty()));
    let z = -&x;
    assert_eq!((z.mean(), z.uncertainty()), (Real::Float(2.7), Real::Float(0.5)));
}

#[test]
fn test_coercions_of_extreme_means() {
    let x = MeasuredValue::new(f64::INFINITY, 1).unwrap();
    assert_eq!(x.to_int(), i64::MAX);
    assert_eq!(x.floor(), i64::MAX);
    assert!(matches!(x.round(None), Real::Float(r) if r == f64::INFINITY));
    let y = MeasuredValue::new(-1e300, 0).unwrap();
    assert_eq!(y.ceil(), i64::MIN);
    assert!(matches!(y.round(Some(10)), Real::Float(r) if r == -1e300));
}

#[test]
fn test_text_forms() {
    assert_eq!(MeasuredValue::new(1.5, 0.25).unwrap().to_string(), "(1.5 +/- 0.25)");
    assert_eq!(MeasuredValue::new(2, 0).unwrap().to_string(), "2");
    assert_eq!(format!("{:?}", MeasuredValue::new(2, 1).unwrap()), "MeasuredValue(2,1)");
    assert_eq!(format!("{:?}", MeasuredValue::new(2.0, 0.0).unwrap()), "MeasuredValue(2.0,0.0)");
}

#[test]
fn test_self_aliasing() {
    let x = MeasuredValue::new(3.0, 0.5).unwrap();
    let twice = x.try_add(&x).unwrap();
    assert_eq!((twice.mean(), twice.uncertainty()), (Real::Float(6.0), Real::Float(1.0)));
    let copy = x.clone();
    let independent = x.try_add(&copy).unwrap();
    assert!(close(independent.uncertainty(), 0.5 * 2f64.sqrt()));
    let zero = x.try_sub(&x).unwrap();
    assert!(matches!((zero.mean(), zero.uncertainty()), (Real::Int(0), Real::Int(0))));
    let square = x.try_mul(&x).unwrap();
    assert_eq!((square.mean(), square.uncertainty()), (Real::Float(9.0), Real::Float(3.0)));
    let one = x.try_div(&x).unwrap();
    assert!(matches!((one.mean(), one.uncertainty()), (Real::Int(1), Real::Int(0))));
}

#[test]
fn test_self_division_of_zero_mean() {
    let x = MeasuredValue::new(0, 1).unwrap();
    let one = x.try_div(&x).unwrap();
    assert!(matches!((one.mean(), one.uncertainty()), (Real::Int(1), Real::Int(0))));
    assert!(x.try_div(&x.clone()).is_err());
}

#[test]
fn test_self_power() {
    let x = MeasuredValue::new(2.0, 0.1).unwrap();
    let y = x.try_pow(&x).unwrap();
    assert!(close(y.mean(), 4.0));
    assert!(close(y.uncertainty(), 0.1 * 4.0 * (1.0 + 2f64.ln())));
    assert!(MeasuredValue::new(-2.0, 0.1).unwrap().try_pow(&x).is_err());
    let negative = MeasuredValue::new(-2.0, 0.1).unwrap();
    assert!(negative.try_pow(&negative).is_err());
}

#[test]
fn test_failed_assign_leaves_receiver() {
    let mut x = MeasuredValue::new(5, 1).unwrap();
    let err = x.try_div_assign(0).unwrap_err();
    assert_eq!(err.operation(), Operation::DivAssign);
    assert!(matches!((x.mean(), x.uncertainty()), (Real::Int(5), Real::Int(1))));
    assert!(x.try_pow_assign(0.5).is_ok());
    assert!(close(x.mean(), 5f64.sqrt()));
}
