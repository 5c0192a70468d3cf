mod formula_tests;
mod integral_tests;
mod property_tests;
mod purchase_tests;

use crate::{Decimal, Formula, Resource};

/// A formula variable backed by a fresh resource, plus the resource to
/// steer it
pub(crate) fn variable_at(value: i64) -> (Formula, Resource) {
    let resource = Resource::new("level", Decimal::from(value));
    let variable = Formula::variable(resource.reference());
    (variable, resource)
}

pub(crate) fn assert_close(actual: &Decimal, expected: &Decimal) {
    assert!(
        actual.eq_tolerance(expected, 1e-9),
        "expected {} ≈ {}",
        actual,
        expected
    );
}

pub(crate) fn assert_close_f64(actual: &Decimal, expected: f64) {
    assert_close(actual, &Decimal::from_f64(expected));
}
