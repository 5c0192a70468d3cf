//! Property-based round-trip tests over the operator catalogue
//!
//! For every operator with both evaluate and invert defined,
//! `invert(evaluate(x))` must recover `x` within the working precision, for
//! small, large (beyond 1e100) and boundary inputs. Integral round trips get
//! the same treatment where the antiderivative is invertible.

use quickcheck::{QuickCheck, TestResult};

use super::variable_at;
use crate::{formula, Decimal, Formula};

fn round_trips(build: impl Fn(Formula) -> Formula, x: &Decimal) -> bool {
    let (var, _level) = variable_at(0);
    let f = build(var);
    let out = f.evaluate_with(Some(x));
    if out.is_nan() || out.is_infinite() {
        return true;
    }
    match f.invert(&out) {
        Ok(back) => back.eq_tolerance(x, 1e-9),
        Err(_) => false,
    }
}

fn integral_round_trips(build: impl Fn(Formula) -> Formula, x: &Decimal) -> bool {
    let (var, _level) = variable_at(0);
    let f = build(var);
    let out = match f.evaluate_integral(Some(x)) {
        Ok(v) if v.is_finite() => v,
        _ => return true,
    };
    match f.invert_integral(&out) {
        Ok(back) => back.eq_tolerance(x, 1e-9),
        Err(_) => false,
    }
}

/// Positive test points spanning boundary, small, and far-beyond-f64 ranges
fn magnitude_sweep() -> Vec<Decimal> {
    vec![
        Decimal::from_f64(0.001),
        Decimal::one(),
        Decimal::from(2),
        Decimal::from(1000),
        "1e100".parse().unwrap(),
        "1e300".parse().unwrap(),
    ]
}

#[test]
fn arithmetic_round_trips_across_magnitudes() {
    for x in magnitude_sweep() {
        assert!(round_trips(|v| v.add(123), &x), "add at {}", x);
        assert!(round_trips(|v| v.sub(123), &x), "sub at {}", x);
        assert!(round_trips(|v| formula::sub(123, v), &x), "rsub at {}", x);
        assert!(round_trips(|v| v.mul(17), &x), "mul at {}", x);
        assert!(round_trips(|v| v.div(17), &x), "div at {}", x);
        assert!(round_trips(|v| v.neg(), &x), "neg at {}", x);
        assert!(round_trips(|v| v.recip(), &x), "recip at {}", x);
    }
}

#[test]
fn power_and_log_round_trips_across_magnitudes() {
    for x in magnitude_sweep() {
        assert!(round_trips(|v| v.pow(3), &x), "pow at {}", x);
        assert!(round_trips(|v| v.root(3), &x), "root at {}", x);
        assert!(round_trips(|v| v.ln(), &x), "ln at {}", x);
        assert!(round_trips(|v| v.log10(), &x), "log10 at {}", x);
        assert!(round_trips(|v| v.log2(), &x), "log2 at {}", x);
        assert!(round_trips(|v| v.log(7), &x), "log base 7 at {}", x);
    }
    // exponent-side variable stays within exp's overflow guard
    for x in [Decimal::one(), Decimal::from(10), Decimal::from(500)] {
        assert!(round_trips(|v| formula::pow_base(v, 2), &x), "pow_base at {}", x);
        assert!(round_trips(|v| v.exp(), &x), "exp at {}", x);
        assert!(round_trips(|v| formula::pow10(v), &x), "pow10 at {}", x);
    }
}

#[test]
fn hyper_round_trips() {
    for x in [Decimal::from(2), Decimal::from(5), Decimal::from(100)] {
        assert!(round_trips(|v| v.slog(10), &x), "slog at {}", x);
        assert!(round_trips(|v| formula::lambert_w(v), &x), "lambert_w at {}", x);
        assert!(round_trips(|v| formula::ssqrt(v), &x), "ssqrt at {}", x);
    }
    // x^x towers invert through the super square root
    for x in [Decimal::from(2), Decimal::from(3), Decimal::from(4)] {
        assert!(round_trips(|v| v.tetrate(2, 1), &x), "tetrate at {}", x);
    }
    // one layer up from 1000 is 10^1000; the inverse peels it back off
    assert!(round_trips(
        |v| v.layer_add(1, 10),
        &Decimal::from(1000),
    ));
}

#[test]
fn integral_round_trips_for_invertible_antiderivatives() {
    for x in [Decimal::from(2), Decimal::from(9), "1e100".parse().unwrap()] {
        assert!(integral_round_trips(|v| v.pow(2), &x), "pow integral at {}", x);
        assert!(integral_round_trips(|v| v.mul(4), &x), "mul integral at {}", x);
        assert!(integral_round_trips(|v| v.add(20), &x), "add integral at {}", x);
        assert!(
            integral_round_trips(|v| formula::pow_base(v, 2).mul(3), &Decimal::from(12)),
            "scaled pow_base integral"
        );
    }
}

#[test]
fn random_affine_chains_round_trip() {
    fn prop(scale: u16, offset: u16, x: u16) -> TestResult {
        if scale == 0 {
            return TestResult::discard();
        }
        let x = Decimal::from(x as i64);
        let ok = round_trips(
            |v| v.mul(scale as i64).add(offset as i64).div(7),
            &x,
        );
        TestResult::from_bool(ok)
    }
    QuickCheck::new()
        .tests(300)
        .quickcheck(prop as fn(u16, u16, u16) -> TestResult);
}

#[test]
fn random_power_curves_round_trip() {
    fn prop(base_raw: u8, x: u16) -> TestResult {
        // bases in [1.1, 3.65], the shape real cost curves use
        let base = 1.1 + f64::from(base_raw) / 100.0;
        let x = Decimal::from(x as i64 % 1000);
        let ok = round_trips(
            |v| formula::pow_base(v, Decimal::from_f64(base)).mul(10),
            &x,
        );
        TestResult::from_bool(ok)
    }
    QuickCheck::new()
        .tests(300)
        .quickcheck(prop as fn(u8, u16) -> TestResult);
}

#[test]
fn random_integral_round_trips() {
    fn prop(exponent: u8, x: u16) -> TestResult {
        let exponent = i64::from(exponent % 6) + 1;
        let x = Decimal::from(i64::from(x) + 1);
        let ok = integral_round_trips(|v| v.pow(exponent).mul(3), &x);
        TestResult::from_bool(ok)
    }
    QuickCheck::new()
        .tests(300)
        .quickcheck(prop as fn(u8, u16) -> TestResult);
}
