use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};

use num::traits::Pow;

use crate::measured::MeasuredValue;
use crate::real::Real;
use crate::Result;

/// Unwraps the result of a fallible operation for the operator traits, which
/// cannot return errors. Use the `try_*` methods to handle them instead.
#[track_caller]
pub(crate) fn or_panic<T>(result: Result<T>) -> T {
    match result {
        Ok(x) => x,
        Err(e) => panic!("{}", e),
    }
}

macro_rules! impl_binary_op {
    (impl $TraitName:ident { fn $method:ident => $try_method:ident, $try_reflected:ident; } for [$($Plain:ty),*]) => {
        impl $TraitName<&MeasuredValue> for &MeasuredValue {
            type Output = MeasuredValue;
            #[track_caller]
            fn $method(self, rhs: &MeasuredValue) -> MeasuredValue { or_panic(self.$try_method(rhs)) }
        }
        impl $TraitName<MeasuredValue> for &MeasuredValue {
            type Output = MeasuredValue;
            #[track_caller]
            fn $method(self, rhs: MeasuredValue) -> MeasuredValue { or_panic(self.$try_method(&rhs)) }
        }
        impl $TraitName<&MeasuredValue> for MeasuredValue {
            type Output = MeasuredValue;
            #[track_caller]
            fn $method(self, rhs: &MeasuredValue) -> MeasuredValue { or_panic(self.$try_method(rhs)) }
        }
        impl $TraitName<MeasuredValue> for MeasuredValue {
            type Output = MeasuredValue;
            #[track_caller]
            fn $method(self, rhs: MeasuredValue) -> MeasuredValue { or_panic(self.$try_method(&rhs)) }
        }
        $(
            impl $TraitName<$Plain> for &MeasuredValue {
                type Output = MeasuredValue;
                #[track_caller]
                fn $method(self, rhs: $Plain) -> MeasuredValue { or_panic(self.$try_method(rhs)) }
            }
            impl $TraitName<$Plain> for MeasuredValue {
                type Output = MeasuredValue;
                #[track_caller]
                fn $method(self, rhs: $Plain) -> MeasuredValue { or_panic(self.$try_method(rhs)) }
            }
            impl $TraitName<&MeasuredValue> for $Plain {
                type Output = MeasuredValue;
                #[track_caller]
                fn $method(self, rhs: &MeasuredValue) -> MeasuredValue { or_panic(rhs.$try_reflected(self)) }
            }
            impl $TraitName<MeasuredValue> for $Plain {
                type Output = MeasuredValue;
                #[track_caller]
                fn $method(self, rhs: MeasuredValue) -> MeasuredValue { or_panic(rhs.$try_reflected(self)) }
            }
        )*
    };
}

macro_rules! impl_assign_op {
    (impl $TraitName:ident { fn $method:ident => $try_method:ident; } for [$($Plain:ty),*]) => {
        impl $TraitName<&MeasuredValue> for MeasuredValue {
            #[track_caller]
            fn $method(&mut self, rhs: &MeasuredValue) { or_panic(self.$try_method(rhs)) }
        }
        impl $TraitName<MeasuredValue> for MeasuredValue {
            #[track_caller]
            fn $method(&mut self, rhs: MeasuredValue) { or_panic(self.$try_method(&rhs)) }
        }
        $(
            impl $TraitName<$Plain> for MeasuredValue {
                #[track_caller]
                fn $method(&mut self, rhs: $Plain) { or_panic(self.$try_method(rhs)) }
            }
        )*
    };
}

impl_binary_op! {
    impl Add { fn add => try_add, try_radd; } for [Real, f64, i64]
}
impl_binary_op! {
    impl Sub { fn sub => try_sub, try_rsub; } for [Real, f64, i64]
}
impl_binary_op! {
    impl Mul { fn mul => try_mul, try_rmul; } for [Real, f64, i64]
}
impl_binary_op! {
    impl Div { fn div => try_div, try_rdiv; } for [Real, f64, i64]
}
impl_binary_op! {
    impl Pow { fn pow => try_pow, try_rpow; } for [Real, f64, i64]
}

impl_assign_op! {
    impl AddAssign { fn add_assign => try_add_assign; } for [Real, f64, i64]
}
impl_assign_op! {
    impl SubAssign { fn sub_assign => try_sub_assign; } for [Real, f64, i64]
}
impl_assign_op! {
    impl MulAssign { fn mul_assign => try_mul_assign; } for [Real, f64, i64]
}
impl_assign_op! {
    impl DivAssign { fn div_assign => try_div_assign; } for [Real, f64, i64]
}

#[test]
fn test_operators_alias_by_reference() {
    let x = MeasuredValue::new(3.0, 0.5).unwrap();
    let doubled = &x + &x;
    assert_eq!(doubled.uncertainty(), Real::Float(1.0));
    let independent = &x + x.clone();
    assert!((independent.uncertainty().to_f64() - 0.5 * 2f64.sqrt()).abs() < 1e-12);
    let zero = &x - &x;
    assert!(matches!(zero.mean(), Real::Int(0)));
}

#[test]
fn test_plain_operands_both_sides() {
    let x = MeasuredValue::new(2, 1).unwrap();
    let a = &x * 3;
    let b = 3 * &x;
    assert!(matches!((a.mean(), a.uncertainty()), (Real::Int(6), Real::Int(3))));
    assert!(matches!((b.mean(), b.uncertainty()), (Real::Int(6), Real::Int(3))));
    let c = 10 - &x;
    assert!(matches!((c.mean(), c.uncertainty()), (Real::Int(8), Real::Int(1))));
    let d = 8.0 / &x;
    assert_eq!((d.mean(), d.uncertainty()), (Real::Float(4.0), Real::Float(2.0)));
}

#[test]
fn test_pow_operator() {
    let x = MeasuredValue::new(2, 1).unwrap();
    let cube = (&x).pow(3);
    assert!(matches!(cube.mean(), Real::Int(8)));
    assert_eq!(cube.uncertainty(), Real::Float(12.0));
    let exp = 2.0_f64.pow(&x);
    assert_eq!(exp.mean(), Real::Float(4.0));
    let inverse = x.pow(-1);
    assert_eq!(inverse.mean(), Real::Float(0.5));
}

#[test]
fn test_integer_literals() {
    let x = MeasuredValue::new(4, 2).unwrap();
    let sum = &x + 1;
    let difference = 1 - &x;
    let quotient = 2 / &x;
    assert!(matches!(sum.mean(), Real::Int(5)));
    assert!(matches!(difference.mean(), Real::Int(-3)));
    assert_eq!(quotient.mean(), Real::Float(0.5));
    let mut y = x.clone();
    y *= 3;
    y += -2;
    y /= 5;
    assert_eq!(y.mean(), Real::Float(2.0));
}

#[test]
fn test_assign_operators() {
    let mut x = MeasuredValue::new(1, 1).unwrap();
    x += 2;
    x *= MeasuredValue::new(2, 0).unwrap();
    x -= 1.5;
    assert_eq!(x.mean(), Real::Float(4.5));
    x /= Real::Int(3);
    assert_eq!(x.mean(), Real::Float(1.5));
}

#[test]
#[should_panic(expected = "!= 0")]
fn test_division_by_zero_panics() {
    let x = MeasuredValue::new(1, 1).unwrap();
    let _ = &x / 0;
}
