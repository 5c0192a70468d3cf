//! Evaluation and inversion over the operator catalogue

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{assert_close, assert_close_f64, variable_at};
use crate::error::FormulaError;
use crate::{formula, Decimal, Formula};

#[test]
fn constants_evaluate_to_themselves() {
    let c = Formula::constant(Decimal::from(42));
    assert_eq!(c.evaluate(), Decimal::from(42));
    assert!(!c.has_variable());
    assert!(!c.is_invertible());
    assert!(!c.is_integrable());
}

#[test]
fn variable_reads_live_value_and_override() {
    let (x, level) = variable_at(3);
    assert_eq!(x.evaluate(), Decimal::from(3));
    level.set_amount(Decimal::from(11));
    assert_eq!(x.evaluate(), Decimal::from(11));
    assert_eq!(x.evaluate_with(Some(&Decimal::from(5))), Decimal::from(5));
}

#[test]
fn identity_formula_inverts_as_identity() {
    let (x, _level) = variable_at(0);
    assert!(x.is_invertible());
    assert!(x.is_integrable());
    assert_eq!(x.invert(&Decimal::from(7)).unwrap(), Decimal::from(7));
}

#[test]
fn square_evaluates_and_inverts() {
    let (x, level) = variable_at(3);
    let square = formula::pow(x, 2);
    assert_eq!(square.evaluate(), Decimal::from(9));
    assert_close(&square.invert(&Decimal::from(9)).unwrap(), &Decimal::from(3));
    level.set_amount(Decimal::from(5));
    assert_eq!(square.evaluate(), Decimal::from(25));
}

#[test]
fn chained_arithmetic_inverts_through_each_layer() {
    // cost(x) = (x·4 + 10)/2
    let (x, _level) = variable_at(0);
    let cost = formula::div(formula::add(formula::mul(x, 4), 10), 2);
    assert_eq!(cost.evaluate_with(Some(&Decimal::from(3))), Decimal::from(11));
    assert_eq!(cost.invert(&Decimal::from(11)).unwrap(), Decimal::from(3));
}

#[test]
fn either_operand_may_carry_the_variable() {
    let (x, _level) = variable_at(0);
    let from_left = formula::sub(x, 5);
    assert_eq!(
        from_left.invert(&Decimal::from(10)).unwrap(),
        Decimal::from(15)
    );

    let (x, _level) = variable_at(0);
    let from_right = formula::sub(100, x);
    assert_eq!(
        from_right.invert(&Decimal::from(30)).unwrap(),
        Decimal::from(70)
    );
}

#[test]
fn exponent_side_variable_inverts_with_logarithm() {
    let (x, _level) = variable_at(0);
    let doubling = formula::pow_base(x, 2);
    assert_eq!(
        doubling.evaluate_with(Some(&Decimal::from(10))),
        Decimal::from(1024)
    );
    assert_close(
        &doubling.invert(&Decimal::from(1024)).unwrap(),
        &Decimal::from(10),
    );
}

#[test]
fn two_variable_occurrences_disable_the_algebra() {
    let (x, _level) = variable_at(2);
    let (y, _other) = variable_at(3);
    let product = formula::mul(x, y);
    assert!(!product.has_variable());
    assert!(!product.is_invertible());
    assert!(!product.is_integrable());
    assert!(matches!(
        product.invert(&Decimal::from(6)),
        Err(FormulaError::NotInvertible { .. })
    ));
    // evaluation is unaffected
    assert_eq!(product.evaluate(), Decimal::from(6));
}

#[test]
fn constant_only_formula_reports_missing_variable() {
    let flat = formula::add(2, 3);
    assert_eq!(flat.evaluate(), Decimal::from(5));
    assert!(matches!(
        flat.invert(&Decimal::from(5)),
        Err(FormulaError::NotInvertible { .. })
    ));
}

#[test]
fn max_invert_is_a_passthrough_placeholder() {
    // documented incompleteness: the "inverse" returns the target unchanged
    // regardless of the constant operand
    let (x, _level) = variable_at(4);
    let clamped = formula::max(x, 10);
    assert_eq!(clamped.evaluate(), Decimal::from(10));
    assert_eq!(
        clamped.invert(&Decimal::from(123)).unwrap(),
        Decimal::from(123)
    );
    assert!(!clamped.is_integrable());

    let (x, _level) = variable_at(4);
    let low = formula::clamp_min(x, 1);
    assert_eq!(low.invert(&Decimal::from(77)).unwrap(), Decimal::from(77));
}

#[test]
fn conditional_reads_condition_at_evaluate_time() {
    let flag = Arc::new(AtomicBool::new(true));
    let read = Arc::clone(&flag);
    let (x, level) = variable_at(6);
    let doubled = formula::conditional(x, move || read.load(Ordering::Relaxed), |inner| {
        inner.mul(2)
    });

    assert_eq!(doubled.evaluate(), Decimal::from(12));
    assert_eq!(doubled.invert(&Decimal::from(12)).unwrap(), Decimal::from(6));

    // flip the condition after construction: passthrough now
    flag.store(false, Ordering::Relaxed);
    assert_eq!(doubled.evaluate(), Decimal::from(6));
    assert_eq!(doubled.invert(&Decimal::from(6)).unwrap(), Decimal::from(6));
    level.set_amount(Decimal::from(9));
    assert_eq!(doubled.evaluate(), Decimal::from(9));
}

#[test]
fn step_applies_modifier_above_threshold_only() {
    let (x, level) = variable_at(5);
    let softcap = formula::step(x, 10, |above| above.div(2));

    // below the threshold the value passes through
    assert_eq!(softcap.evaluate(), Decimal::from(5));

    // above it, only the excess is halved: 10 + (30-10)/2 = 20
    level.set_amount(Decimal::from(30));
    assert_eq!(softcap.evaluate(), Decimal::from(20));

    assert_eq!(softcap.invert(&Decimal::from(20)).unwrap(), Decimal::from(30));
    assert_eq!(softcap.invert(&Decimal::from(5)).unwrap(), Decimal::from(5));
}

#[test]
fn trig_inverts_on_principal_domain() {
    let (x, _level) = variable_at(0);
    let wave = formula::sin(x);
    let half = Decimal::from_f64(0.5);
    let out = wave.evaluate_with(Some(&half));
    assert_close(&wave.invert(&out).unwrap(), &half);
}

#[test]
fn hyper_operator_inverts() {
    // x^x = 256 → x = 4, through the tetration inverse
    let (x, _level) = variable_at(0);
    let tower = formula::tetrate(x, 2, 1);
    assert_close_f64(&tower.evaluate_with(Some(&Decimal::from(4))), 256.0);
    assert_close(&tower.invert(&Decimal::from(256)).unwrap(), &Decimal::from(4));
}

#[test]
fn display_names_operations() {
    let (x, _level) = variable_at(0);
    let cost = formula::add(formula::pow(x, 2), 5);
    assert_eq!(format!("{}", cost), "add(pow(x, 2), 5)");
}

#[test]
fn shared_subtrees_are_safe() {
    let (x, _level) = variable_at(2);
    let shared = Arc::new(formula::pow(x, 2));
    let a = formula::add(Arc::clone(&shared), 1);
    let b = formula::mul(shared, 3);
    assert_eq!(a.evaluate(), Decimal::from(5));
    assert_eq!(b.evaluate(), Decimal::from(12));
}
