use itertools::iproduct;
use num::traits::Pow;

use measured_value::{ErrorKind, MeasuredValue, Operand, Operation, Real, Uncertain};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn mv(mean: impl Into<Real>, uncertainty: impl Into<Real>) -> MeasuredValue {
    MeasuredValue::new(mean, uncertainty).unwrap()
}

#[track_caller]
fn assert_close(actual: Real, expected: f64) {
    let actual = actual.to_f64();
    assert!(
        (actual - expected).abs() <= 1e-9 * expected.abs().max(1.0),
        "{} != {}",
        actual,
        expected
    );
}

/// A caller-side type exposing the capability without being a `MeasuredValue`.
struct Reading {
    value: f64,
    sigma: f64,
}

impl Uncertain for Reading {
    fn mean(&self) -> Real { Real::Float(self.value) }
    fn uncertainty(&self) -> Real { Real::Float(self.sigma) }
}

#[test]
fn test_sum_of_independent() {
    let x = mv(10, 1) + mv(20, 2);
    assert_eq!(x.mean(), Real::Int(30));
    assert_close(x.uncertainty(), 2.2360679774997896);
}

#[test]
fn test_quotient() {
    let x = mv(6, 0.3) / mv(2, 0.1);
    assert_close(x.mean(), 3.0);
    assert_close(x.uncertainty(), 0.21213203435596426);
}

#[test]
fn test_cube() {
    let x = mv(2, 0.1).pow(3);
    assert!(matches!(x.mean(), Real::Int(8)));
    assert_close(x.uncertainty(), 1.2);
}

#[test]
fn test_product_rule_uses_mean() {
    let x = mv(3.0, 0.2) * mv(5.0, 0.4);
    assert_close(x.mean(), 15.0);
    assert_close(x.uncertainty(), ((0.2f64 * 5.0).powi(2) + (0.4f64 * 3.0).powi(2)).sqrt());
}

#[test]
fn test_plain_operands_keep_uncertainty() {
    let x = mv(4.0, 0.5);
    for k in [-3.0_f64, -0.5, 0.25, 7.0] {
        assert_close((&x + k).uncertainty(), 0.5);
        assert_close((&x - k).uncertainty(), 0.5);
        assert_close((&x * k).uncertainty(), 0.5 * k.abs());
        assert_close((&x / k).uncertainty(), 0.5 / k.abs());
        assert_close((k - &x).mean(), k - 4.0);
        assert_close((k / &x).mean(), k / 4.0);
        assert_close((k / &x).uncertainty(), 0.5 * k.abs() / 16.0);
    }
}

#[test]
fn test_integer_kind_grid() {
    let means = [-7i64, -1, 2, 9];
    let uncertainties = [0i64, 1, 3];
    let factors = [-2i64, 1, 5];
    for (&m, &s, &k) in iproduct!(&means, &uncertainties, &factors) {
        let x = mv(m, s);
        let sum = &x + k;
        let product = &x * k;
        let doubled = &x + &x;
        assert!(matches!(sum.mean(), Real::Int(v) if v == m + k));
        assert!(matches!(sum.uncertainty(), Real::Int(v) if v == s));
        assert!(matches!(product.mean(), Real::Int(v) if v == m * k));
        assert!(matches!(product.uncertainty(), Real::Int(v) if v == s * k.abs()));
        assert!(matches!(doubled.uncertainty(), Real::Int(v) if v == 2 * s));
        // Division always yields floats.
        assert!((&x / k).mean().is_float());
    }
}

#[test]
fn test_reflected_matches_forward() {
    let x = mv(2.5, 0.3);
    for (k, y) in iproduct!([-4.0, 0.5, 3.0], [mv(1.5, 0.2), mv(-6, 1)]) {
        let forward = &x + k;
        let reflected = k + &x;
        assert_eq!(forward.mean(), reflected.mean());
        assert_eq!(forward.uncertainty(), reflected.uncertainty());
        let forward = &x * k;
        let reflected = k * &x;
        assert_eq!(forward.mean(), reflected.mean());
        assert_eq!(forward.uncertainty(), reflected.uncertainty());
        let forward = &y - &x;
        let reflected = x.try_rsub(&y).unwrap();
        assert_close(reflected.mean(), forward.mean().to_f64());
        assert_close(reflected.uncertainty(), forward.uncertainty().to_f64());
        let forward = &y / &x;
        let reflected = x.try_rdiv(&y).unwrap();
        assert_close(reflected.mean(), forward.mean().to_f64());
        assert_close(reflected.uncertainty(), forward.uncertainty().to_f64());
    }
}

#[test]
fn test_foreign_operands() {
    let reading = Reading { value: 4.0, sigma: 0.3 };
    let x = mv(1.0, 0.4);
    let sum = x.try_add(&reading as &dyn Uncertain).unwrap();
    assert_close(sum.mean(), 5.0);
    assert_close(sum.uncertainty(), 0.5);
    let pair = (2.0, 0.1);
    let product = x.try_mul(&pair).unwrap();
    assert_close(product.mean(), 2.0);
    let copied = MeasuredValue::from_uncertain(&reading).unwrap();
    assert_eq!(copied.mean(), Real::Float(4.0));
    assert_eq!(copied.uncertainty(), Real::Float(0.3));
}

#[test]
fn test_foreign_negative_uncertainty() {
    init_logging();
    let bad = Reading { value: 1.0, sigma: -0.1 };
    let x = mv(1.0, 0.4);
    let err = x.try_add(Operand::uncertain(&bad)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    let err = MeasuredValue::from_uncertain(&bad).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);
}

#[test]
fn test_trait_object_of_self_is_aliased() {
    let x = mv(3.0, 0.5);
    let dynamic: &dyn Uncertain = &x;
    let zero = x.try_sub(dynamic).unwrap();
    assert_eq!(zero.mean(), Real::Int(0));
    assert_eq!(zero.uncertainty(), Real::Int(0));
}

#[test]
fn test_division_by_zero() {
    init_logging();
    let x = mv(5.0, 0.5);
    for err in [
        x.try_div(0).unwrap_err(),
        x.try_div(0.0).unwrap_err(),
        x.try_div(&mv(0, 3)).unwrap_err(),
        x.try_div(&mv(0.0, 0.0)).unwrap_err(),
        mv(0, 1).try_rdiv(4).unwrap_err(),
    ] {
        assert_eq!(err.kind(), ErrorKind::Value);
    }
}

#[test]
fn test_assign_error_attribution() {
    init_logging();
    let mut x = mv(5, 1);
    assert_eq!(x.try_div_assign(0).unwrap_err().operation(), Operation::DivAssign);
    assert_eq!(x.try_div_assign(&mv(0.0, 1.0)).unwrap_err().operation(), Operation::DivAssign);
    assert_eq!(x.try_add_assign(f64::NAN).unwrap_err().operation(), Operation::AddAssign);
    let mut zero = mv(0, 1);
    let err = zero.try_pow_assign(-1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);
    assert_eq!(err.operation(), Operation::PowAssign);
    assert!(matches!((zero.mean(), zero.uncertainty()), (Real::Int(0), Real::Int(1))));
    assert!(matches!((x.mean(), x.uncertainty()), (Real::Int(5), Real::Int(1))));
}

#[test]
fn test_assign_matches_forward() {
    let y = mv(1.5, 0.25);
    let base = mv(4.0, 0.5);
    let mut x = base.clone();
    x += &y;
    let forward = &base + &y;
    assert_eq!(x.mean(), forward.mean());
    assert_eq!(x.uncertainty(), forward.uncertainty());
    let mut x = base.clone();
    x /= &y;
    let forward = &base / &y;
    assert_eq!(x.mean(), forward.mean());
    assert_eq!(x.uncertainty(), forward.uncertainty());
    let mut x = base.clone();
    x.try_pow_assign(&y).unwrap();
    let forward = base.try_pow(&y).unwrap();
    assert_eq!(x.mean(), forward.mean());
    assert_eq!(x.uncertainty(), forward.uncertainty());
}

#[test]
fn test_zero_power() {
    for x in [mv(0, 0), mv(0.0, 2.0), mv(-3, 1), mv(-2.5, 0.5), mv(7.0, 0.1)] {
        for exp in [Real::Int(0), Real::Float(0.0)] {
            let one = x.try_pow(exp).unwrap();
            assert!(matches!(one.mean(), Real::Int(1)));
            assert!(matches!(one.uncertainty(), Real::Int(0)));
        }
    }
}

#[test]
fn test_power_edge_cases() {
    init_logging();
    for err in [
        mv(-4, 0.1).try_pow(0.5).unwrap_err(),
        mv(-4.5, 0.1).try_pow(-1.5).unwrap_err(),
        mv(0, 0.1).try_pow(-2).unwrap_err(),
        mv(0.0, 0.1).try_pow(-0.5).unwrap_err(),
        mv(0.0, 0.1).try_pow(&mv(2.0, 0.1)).unwrap_err(),
        mv(-3.0, 0.1).try_pow(&mv(2, 0.1)).unwrap_err(),
        mv(2.0, 0.1).try_rpow(0).unwrap_err(),
        mv(2.0, 0.1).try_rpow(-2.5).unwrap_err(),
    ] {
        assert_eq!(err.kind(), ErrorKind::Value);
    }
    // An integral exponent is fine on a negative base.
    let x = mv(-2.0, 0.1).try_pow(3).unwrap();
    assert_close(x.mean(), -8.0);
    assert_close(x.uncertainty(), 0.1 * 3.0 * 4.0);
    let x = mv(-2, 1).try_pow(2.0).unwrap();
    assert_close(x.mean(), 4.0);
}

#[test]
fn test_zero_base_positive_power() {
    let x = mv(0.0, 0.2).try_pow(2).unwrap();
    assert_close(x.mean(), 0.0);
    assert_close(x.uncertainty(), 0.04);
    let x = mv(0, 0).try_pow(3).unwrap();
    assert!(matches!((x.mean(), x.uncertainty()), (Real::Int(0), Real::Int(0))));
}

#[test]
fn test_fractional_and_negative_powers() {
    let (m, s) = (3.7_f64, 0.4_f64);
    for p in [-2.5_f64, -1.0, 0.5, 1.75] {
        let x = mv(m, s).try_pow(p).unwrap();
        assert_close(x.mean(), m.powf(p));
        assert_close(x.uncertainty(), m.powf(p - 1.0).abs() * p.abs() * s);
    }
}

#[test]
fn test_uncertain_exponent() {
    let (m1, s1, m2, s2): (f64, f64, f64, f64) = (2.3, 0.2, 1.7, 0.3);
    let x = mv(m1, s1).try_pow(&mv(m2, s2)).unwrap();
    let mean = m1.powf(m2);
    let expected = ((m2 * s1).powi(2) * m1.powf(2.0 * (m2 - 1.0)) + (s2 * m1.ln() * mean).powi(2)).sqrt();
    assert_close(x.mean(), mean);
    assert_close(x.uncertainty(), expected);
}

#[test]
fn test_reflected_power() {
    for (base, m, s) in [(2.5_f64, 1.3_f64, 0.2_f64), (1.5, -2.2, 0.4), (3.0, 2.0, 0.1)] {
        let x = mv(m, s);
        let y = base.pow(&x);
        let mean = f64::powf(base, m);
        assert_close(y.mean(), mean);
        assert_close(y.uncertainty(), (mean * f64::ln(base)).abs() * s);
    }
    // An uncertain base is the forward power of that base.
    let (b, e) = (mv(2.0, 0.1), mv(3.0, 0.2));
    let reflected = e.try_rpow(&b).unwrap();
    let forward = b.try_pow(&e).unwrap();
    assert_close(reflected.mean(), forward.mean().to_f64());
    assert_close(reflected.uncertainty(), forward.uncertainty().to_f64());
}

#[test]
fn test_sum_and_product() {
    let values = vec![mv(1.0, 0.1), mv(2.0, 0.2), mv(3.0, 0.2)];
    let total: MeasuredValue = values.iter().sum();
    assert_close(total.mean(), 6.0);
    assert_close(total.uncertainty(), 0.3);
    let product: MeasuredValue = values.into_iter().product();
    assert_close(product.mean(), 6.0);
}

#[test]
fn test_display() {
    assert_eq!(mv(1, 0).to_string(), "1");
    assert_eq!(mv(1.5, 0.5).to_string(), "(1.5 +/- 0.5)");
    assert_eq!((mv(10, 1) + mv(20, 2)).to_string(), "(30 +/- 2.23606797749979)");
    assert_eq!(format!("{:?}", mv(-2, 1)), "MeasuredValue(-2,1)");
}

#[test]
fn test_relative_uncertainty() {
    assert_eq!(mv(-4.0, 1.0).relative_uncertainty(), Some(0.25));
    assert_eq!(mv(0, 1).relative_uncertainty(), None);
    assert!(mv(3, 0).is_exact());
}
