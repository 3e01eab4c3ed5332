use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Neg, Sub};

use num::{One, ToPrimitive, Zero};

/// A plain real number that remembers whether it is an integer or a float.
///
/// Integer arithmetic stays integral until it overflows `i64` or an operation
/// needs a float (true division, square roots, logarithms, fractional powers).
#[derive(Copy, Clone, Debug)]
pub enum Real {
    Int(i64),
    Float(f64),
}

fn int_or_float(checked: Option<i64>, fallback: impl FnOnce() -> f64) -> Real {
    match checked {
        Some(x) => Real::Int(x),
        None => Real::Float(fallback()),
    }
}

impl Real {
    pub fn to_f64(self) -> f64 {
        match self {
            Real::Int(x) => x as f64,
            Real::Float(x) => x,
        }
    }
    pub fn is_float(self) -> bool { matches!(self, Real::Float(_)) }
    pub fn is_nan(self) -> bool {
        match self {
            Real::Int(_) => false,
            Real::Float(x) => x.is_nan(),
        }
    }
    /// True for integers and for floats with no fractional part.
    pub fn is_integral(self) -> bool {
        match self {
            Real::Int(_) => true,
            Real::Float(x) => x.is_finite() && x.fract() == 0.0,
        }
    }
    pub fn is_negative(self) -> bool {
        match self {
            Real::Int(x) => x < 0,
            Real::Float(x) => x < 0.0,
        }
    }
    pub fn is_positive(self) -> bool {
        match self {
            Real::Int(x) => x > 0,
            Real::Float(x) => x > 0.0,
        }
    }
    pub fn abs(self) -> Self {
        match self {
            Real::Int(x) => int_or_float(x.checked_abs(), || (x as f64).abs()),
            Real::Float(x) => Real::Float(x.abs()),
        }
    }
    pub fn sqrt(self) -> Self { Real::Float(self.to_f64().sqrt()) }
    pub fn ln(self) -> Self { Real::Float(self.to_f64().ln()) }
    pub fn square(self) -> Self { self * self }

    /// Raises `self` to `exp`.
    ///
    /// `Int ** Int` with a non-negative exponent stays an integer; every other
    /// combination is computed in floating point.
    pub fn pow(self, exp: Real) -> Self {
        match (self, exp) {
            (Real::Int(b), Real::Int(e)) if e >= 0 => int_or_float(
                u32::try_from(e).ok().and_then(|e| b.checked_pow(e)),
                || (b as f64).powf(e as f64),
            ),
            (b, Real::Int(e)) => match i32::try_from(e) {
                Ok(e) => Real::Float(b.to_f64().powi(e)),
                Err(_) => Real::Float(b.to_f64().powf(e as f64)),
            },
            (b, Real::Float(e)) => Real::Float(b.to_f64().powf(e)),
        }
    }

    pub fn trunc(self) -> Self {
        match self {
            Real::Int(_) => self,
            Real::Float(x) => Real::Float(x.trunc()),
        }
    }
    pub fn floor(self) -> Self {
        match self {
            Real::Int(_) => self,
            Real::Float(x) => Real::Float(x.floor()),
        }
    }
    pub fn ceil(self) -> Self {
        match self {
            Real::Int(_) => self,
            Real::Float(x) => Real::Float(x.ceil()),
        }
    }

    /// Rounds half to even. Without `digits` the result is an integer, except
    /// for floats outside the `i64` range (including infinities), which are
    /// returned as rounded floats. With `digits` the kind of `self` is kept.
    pub fn round(self, digits: Option<i32>) -> Self {
        match (self, digits) {
            (Real::Int(_), None) => self,
            (Real::Float(x), None) => {
                let r = x.round_ties_even();
                int_or_float(r.to_i64(), || r)
            }
            (Real::Int(_), Some(d)) if d >= 0 => self,
            (Real::Int(x), Some(d)) => {
                let step = u32::try_from(-(d as i64)).ok().and_then(|p| 10i64.checked_pow(p));
                let Some(step) = step else { return Real::Int(0) };
                let (mut q, r) = (x.div_euclid(step), x.rem_euclid(step));
                if 2 * (r as i128) > step as i128 || (2 * (r as i128) == step as i128 && q % 2 != 0) {
                    q += 1;
                }
                int_or_float(q.checked_mul(step), || q as f64 * step as f64)
            }
            (Real::Float(x), Some(d)) => {
                let scale = 10f64.powi(d);
                if scale.is_infinite() {
                    return self;
                }
                if scale == 0.0 {
                    return Real::Float(0.0);
                }
                // Too large to carry `d` more digits, so already rounded.
                let scaled = x * scale;
                if !scaled.is_finite() {
                    return self;
                }
                Real::Float(scaled.round_ties_even() / scale)
            }
        }
    }

    /// Truncating conversion to `i64`, saturating at the bounds. Infinities
    /// map to `i64::MIN`/`i64::MAX` and NaN to 0.
    pub fn to_i64_saturating(self) -> i64 {
        match self {
            Real::Int(x) => x,
            Real::Float(x) => x as i64,
        }
    }
}

impl Add for Real {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Real::Int(a), Real::Int(b)) => int_or_float(a.checked_add(b), || a as f64 + b as f64),
            (a, b) => Real::Float(a.to_f64() + b.to_f64()),
        }
    }
}

impl Sub for Real {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Real::Int(a), Real::Int(b)) => int_or_float(a.checked_sub(b), || a as f64 - b as f64),
            (a, b) => Real::Float(a.to_f64() - b.to_f64()),
        }
    }
}

impl Mul for Real {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Real::Int(a), Real::Int(b)) => int_or_float(a.checked_mul(b), || a as f64 * b as f64),
            (a, b) => Real::Float(a.to_f64() * b.to_f64()),
        }
    }
}

// True division: the quotient is a float even for two integers.
impl Div for Real {
    type Output = Self;
    fn div(self, rhs: Self) -> Self::Output { Real::Float(self.to_f64() / rhs.to_f64()) }
}

impl Neg for Real {
    type Output = Self;
    fn neg(self) -> Self::Output {
        match self {
            Real::Int(x) => int_or_float(x.checked_neg(), || -(x as f64)),
            Real::Float(x) => Real::Float(-x),
        }
    }
}

impl Zero for Real {
    fn zero() -> Self { Real::Int(0) }
    fn is_zero(&self) -> bool {
        match *self {
            Real::Int(x) => x == 0,
            Real::Float(x) => x == 0.0,
        }
    }
}

impl One for Real {
    fn one() -> Self { Real::Int(1) }
}

impl Sum for Real {
    fn sum<I: Iterator<Item=Self>>(iter: I) -> Self { iter.fold(Self::zero(), Self::add) }
}

impl PartialEq for Real {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Real::Int(a), Real::Int(b)) => a == b,
            (a, b) => a.to_f64() == b.to_f64(),
        }
    }
}

impl PartialOrd for Real {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (*self, *other) {
            (Real::Int(a), Real::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.to_f64().partial_cmp(&b.to_f64()),
        }
    }
}

impl ToPrimitive for Real {
    fn to_i64(&self) -> Option<i64> {
        match *self {
            Real::Int(x) => Some(x),
            Real::Float(x) => x.to_i64(),
        }
    }
    fn to_u64(&self) -> Option<u64> {
        match *self {
            Real::Int(x) => x.to_u64(),
            Real::Float(x) => x.to_u64(),
        }
    }
    fn to_f64(&self) -> Option<f64> { Some(Real::to_f64(*self)) }
}

macro_rules! impl_from_primitive {
    ($variant:ident as $repr:ty: $($t:ty),*) => {
        $(
            impl From<$t> for Real {
                fn from(x: $t) -> Self { Real::$variant(<$repr>::from(x)) }
            }
        )*
    };
}

impl_from_primitive!(Int as i64: i8, i16, i32, i64, u8, u16, u32);
impl_from_primitive!(Float as f64: f32, f64);

impl Display for Real {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Real::Int(x) => write!(f, "{}", x),
            // `{:?}` keeps the trailing `.0` on integral floats.
            Real::Float(x) => write!(f, "{:?}", x),
        }
    }
}

#[test]
fn test_int_stays_int() {
    assert!(matches!(Real::Int(3) + Real::Int(4), Real::Int(7)));
    assert!(matches!(Real::Int(3) * Real::Int(-4), Real::Int(-12)));
    assert!(matches!(-Real::Int(3), Real::Int(-3)));
    assert!(matches!(Real::Int(2).pow(Real::Int(10)), Real::Int(1024)));
    assert!(matches!(Real::Int(-3).abs(), Real::Int(3)));
}

#[test]
fn test_promotion() {
    assert!(matches!(Real::Int(6) / Real::Int(3), Real::Float(x) if x == 2.0));
    assert!(matches!(Real::Int(2) + Real::Float(0.5), Real::Float(x) if x == 2.5));
    assert!(Real::Int(4).sqrt().is_float());
    assert!(matches!(Real::Int(2).pow(Real::Int(-1)), Real::Float(x) if x == 0.5));
    assert!(matches!(Real::Int(4).pow(Real::Float(0.5)), Real::Float(x) if x == 2.0));
}

#[test]
fn test_overflow_promotes() {
    let big = Real::Int(i64::MAX) + Real::Int(1);
    assert!(big.is_float());
    assert_eq!(big.to_f64(), i64::MAX as f64 + 1.0);
    assert!((-Real::Int(i64::MIN)).is_float());
    assert!(Real::Int(10).pow(Real::Int(30)).is_float());
}

#[test]
fn test_cross_kind_equality() {
    assert_eq!(Real::Int(3), Real::Float(3.0));
    assert_ne!(Real::Int(3), Real::Float(3.5));
    assert!(Real::Int(2) < Real::Float(2.5));
}

#[test]
fn test_round() {
    assert!(matches!(Real::Float(2.5).round(None), Real::Int(2)));
    assert!(matches!(Real::Float(3.5).round(None), Real::Int(4)));
    assert!(matches!(Real::Float(-1.7).round(None), Real::Int(-2)));
    assert!(matches!(Real::Float(1.2345).round(Some(2)), Real::Float(x) if (x - 1.23).abs() < 1e-12));
    assert!(matches!(Real::Int(7).round(Some(2)), Real::Int(7)));
    assert!(matches!(Real::Int(1250).round(Some(-2)), Real::Int(1200)));
    assert!(matches!(Real::Int(1351).round(Some(-2)), Real::Int(1400)));
}

#[test]
fn test_round_large_digits() {
    assert!(matches!(Real::Float(1e300).round(Some(10)), Real::Float(x) if x == 1e300));
    assert!(matches!(Real::Float(1e10).round(Some(300)), Real::Float(x) if x == 1e10));
    assert!(matches!(Real::Float(-2.5e307).round(Some(5)), Real::Float(x) if x == -2.5e307));
}

#[test]
fn test_non_finite_rounding() {
    assert!(matches!(Real::Float(f64::INFINITY).round(None), Real::Float(x) if x == f64::INFINITY));
    assert!(matches!(Real::Float(1e30).round(None), Real::Float(x) if x == 1e30));
    assert_eq!(Real::Float(f64::INFINITY).to_i64_saturating(), i64::MAX);
    assert_eq!(Real::Float(f64::NEG_INFINITY).to_i64_saturating(), i64::MIN);
}

#[test]
fn test_display() {
    assert_eq!(Real::Int(3).to_string(), "3");
    assert_eq!(Real::Float(3.0).to_string(), "3.0");
    assert_eq!(Real::Float(0.25).to_string(), "0.25");
}
