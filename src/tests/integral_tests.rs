//! Symbolic integration: antiderivatives, substitution threading, and the
//! integral-inversion path used by cumulative costing

use super::{assert_close, assert_close_f64, variable_at};
use crate::error::FormulaError;
use crate::{formula, Decimal};

#[test]
fn bare_variable_integrates_to_half_square() {
    let (x, _level) = variable_at(0);
    assert!(x.is_integrable());
    // x²/2 at x = 4
    assert_eq!(
        x.evaluate_integral(Some(&Decimal::from(4))).unwrap(),
        Decimal::from(8)
    );
    assert!(x.is_integral_invertible());
    assert_close(
        &x.invert_integral(&Decimal::from(8)).unwrap(),
        &Decimal::from(4),
    );
}

#[test]
fn power_rule() {
    let (x, _level) = variable_at(0);
    let square = formula::pow(x, 2);
    // ∫x² dx = x³/3
    assert_close_f64(&square.evaluate_integral(Some(&Decimal::from(3))).unwrap(), 9.0);
    assert_close(
        &square.invert_integral(&Decimal::from(9)).unwrap(),
        &Decimal::from(3),
    );
}

#[test]
fn exponential_with_constant_base() {
    let (x, _level) = variable_at(0);
    let growth = formula::pow_base(x, 2);
    // ∫2^x dx = 2^x/ln 2
    let expected = 2f64.powi(5) / 2f64.ln();
    assert_close_f64(&growth.evaluate_integral(Some(&Decimal::from(5))).unwrap(), expected);
    assert!(growth.is_integral_invertible());
}

#[test]
fn linear_wrapper_distributes_over_the_integral() {
    // ∫(x + 5) dx = 5x + x²/2; the linear term reads the live variable, so
    // the full value appears when evaluating at the current level
    let (x, _level) = variable_at(4);
    let cost = formula::add(x, 5);
    assert_close_f64(&cost.evaluate_integral(None).unwrap(), 28.0);
    assert!(cost.is_integral_invertible());

    // ∫3x dx = 3x²/2
    let (x, _level) = variable_at(0);
    let scaled = formula::mul(3, x);
    assert_close_f64(&scaled.evaluate_integral(Some(&Decimal::from(4))).unwrap(), 24.0);
}

#[test]
fn substitution_rescales_nested_antiderivative() {
    // ∫(2x)² dx = (2x)³/6, i.e. 4x³/3
    let (x, _level) = variable_at(0);
    let nested = formula::pow(formula::mul(x, 2), 2);
    assert_close_f64(
        &nested.evaluate_integral(Some(&Decimal::from(3))).unwrap(),
        36.0,
    );

    // ∫(x + 1)² dx = (x + 1)³/3: additive wrappers need no rescaling
    let (x, _level) = variable_at(0);
    let shifted = formula::pow(formula::add(x, 1), 2);
    assert_close_f64(
        &shifted.evaluate_integral(Some(&Decimal::from(2))).unwrap(),
        9.0,
    );
}

#[test]
fn reciprocal_integrates_to_logarithm() {
    let (x, _level) = variable_at(0);
    let inverse = formula::recip(x);
    assert_close_f64(
        &inverse.evaluate_integral(Some(&Decimal::from_f64(std::f64::consts::E))).unwrap(),
        1.0,
    );
}

#[test]
fn logarithm_antiderivative() {
    // ∫ln x dx = x·ln x − x
    let (x, _level) = variable_at(0);
    let log_cost = formula::ln(x);
    let at = 5.0f64;
    assert_close_f64(
        &log_cost.evaluate_integral(Some(&Decimal::from_f64(at))).unwrap(),
        at * at.ln() - at,
    );
    // x·ln x − x is not closed-form invertible
    assert!(!log_cost.is_integral_invertible());
}

#[test]
fn trig_antiderivatives() {
    let (x, _level) = variable_at(0);
    let wave = formula::sin(x);
    // ∫sin = −cos
    assert_close_f64(
        &wave.evaluate_integral(Some(&Decimal::from_f64(1.0))).unwrap(),
        -(1.0f64.cos()),
    );

    let (x, _level) = variable_at(0);
    let hyper = formula::sinh(x);
    assert_close_f64(
        &hyper.evaluate_integral(Some(&Decimal::from_f64(2.0))).unwrap(),
        2.0f64.cosh(),
    );
}

#[test]
fn nested_complex_operations_are_rejected() {
    let (x, _level) = variable_at(0);
    let tangled = formula::pow(formula::sin(x), 2);
    assert!(matches!(
        tangled.integral_formula(),
        Err(FormulaError::NestedComplexOperation { .. })
    ));
}

#[test]
fn integral_requires_the_variable() {
    let flat = formula::pow(formula::constant(Decimal::from(2)), 2);
    assert!(!flat.is_integrable());
    assert!(flat.evaluate_integral(None).is_err());
}

#[test]
fn integral_is_memoized() {
    let (x, _level) = variable_at(0);
    let square = formula::pow(x, 2);
    let first = square.integral_formula().unwrap();
    let second = square.integral_formula().unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
}

#[test]
fn constant_of_integration_matches_trapezoid_identity() {
    // for f = x + 5 at level 0: the integral evaluated at 1 carries only the
    // x²/2 part (the 5x term reads the live level, 0), so C makes up the
    // trapezoid average: (5 + 6)/2 − 1/2 = 5
    let (x, _level) = variable_at(0);
    let cost = formula::add(x, 5);
    assert_close_f64(&cost.calculate_constant_of_integration().unwrap(), 5.0);

    // for f = 2^x: C = (1 + 2)/2 − 2/ln 2
    let (x, _level) = variable_at(0);
    let growth = formula::pow_base(x, 2);
    let expected = 1.5 - 2.0 / 2f64.ln();
    assert_close_f64(&growth.calculate_constant_of_integration().unwrap(), expected);
}

#[test]
fn integral_inverts_composed_linear_wrappers() {
    // F(x) = ∫3x dx = 3x²/2; F⁻¹(24) = 4
    let (x, _level) = variable_at(0);
    let scaled = formula::mul(3, x);
    assert!(scaled.is_integral_invertible());
    assert_close(
        &scaled.invert_integral(&Decimal::from(24)).unwrap(),
        &Decimal::from(4),
    );
}
