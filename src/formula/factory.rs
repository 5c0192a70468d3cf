//! Operator catalogue: one canonical constructor per operation
//!
//! Each constructor wires an evaluation function to the matching strategies
//! from [`ops`]. The catalogue is large but mechanical; the fluent methods
//! and std operator overloads at the bottom are thin forwarders so content
//! can be written either as `formula::pow(x, 2)` or `x.pow(2)`.

use std::sync::Arc;

use crate::decimal::Decimal;

use super::ops;
use super::{BoolRef, DecimalRef, Formula, FormulaSource, Op};

fn unary(
    name: &'static str,
    evaluate: fn(&[Decimal]) -> Decimal,
    invert: Option<super::InvertFn>,
    integrate: Option<super::IntegrateFn>,
    value: FormulaSource,
) -> Formula {
    Formula::operation(
        Op {
            name,
            evaluate,
            invert,
            integrate,
            integrate_inner: None,
            apply_substitution: None,
        },
        vec![value],
    )
}

// ========== Leaf constructors ==========

/// The designated free variable
pub fn variable(value: DecimalRef) -> Formula {
    Formula::variable(value)
}

/// An opaque constant or reactive input
pub fn constant(value: impl Into<FormulaSource>) -> Formula {
    Formula::constant(value)
}

// ========== Sign and rounding ==========

pub fn neg(value: impl Into<FormulaSource>) -> Formula {
    Formula::operation(
        Op {
            name: "neg",
            evaluate: |i: &[Decimal]| -&i[0],
            invert: Some(ops::invert_neg),
            integrate: Some(ops::integrate_neg),
            integrate_inner: None,
            apply_substitution: Some(ops::substitute_neg),
        },
        vec![value.into()],
    )
}

pub fn abs(value: impl Into<FormulaSource>) -> Formula {
    unary("abs", |i: &[Decimal]| i[0].abs(), None, None, value.into())
}

pub fn sign(value: impl Into<FormulaSource>) -> Formula {
    unary("sign", |i: &[Decimal]| i[0].signum(), None, None, value.into())
}

pub fn round(value: impl Into<FormulaSource>) -> Formula {
    unary("round", |i: &[Decimal]| i[0].round(), None, None, value.into())
}

pub fn floor(value: impl Into<FormulaSource>) -> Formula {
    unary("floor", |i: &[Decimal]| i[0].floor(), None, None, value.into())
}

pub fn ceil(value: impl Into<FormulaSource>) -> Formula {
    unary("ceil", |i: &[Decimal]| i[0].ceil(), None, None, value.into())
}

pub fn trunc(value: impl Into<FormulaSource>) -> Formula {
    unary("trunc", |i: &[Decimal]| i[0].trunc(), None, None, value.into())
}

// ========== Arithmetic ==========

pub fn add(value: impl Into<FormulaSource>, other: impl Into<FormulaSource>) -> Formula {
    Formula::operation(
        Op {
            name: "add",
            evaluate: |i: &[Decimal]| &i[0] + &i[1],
            invert: Some(ops::invert_add),
            integrate: Some(ops::integrate_add),
            integrate_inner: Some(ops::integrate_inner_add),
            apply_substitution: Some(ops::substitute_passthrough),
        },
        vec![value.into(), other.into()],
    )
}

pub fn sub(value: impl Into<FormulaSource>, other: impl Into<FormulaSource>) -> Formula {
    Formula::operation(
        Op {
            name: "sub",
            evaluate: |i: &[Decimal]| &i[0] - &i[1],
            invert: Some(ops::invert_sub),
            integrate: Some(ops::integrate_sub),
            integrate_inner: Some(ops::integrate_inner_sub),
            apply_substitution: Some(ops::substitute_passthrough),
        },
        vec![value.into(), other.into()],
    )
}

pub fn mul(value: impl Into<FormulaSource>, other: impl Into<FormulaSource>) -> Formula {
    Formula::operation(
        Op {
            name: "mul",
            evaluate: |i: &[Decimal]| &i[0] * &i[1],
            invert: Some(ops::invert_mul),
            integrate: Some(ops::integrate_mul),
            integrate_inner: None,
            apply_substitution: Some(ops::substitute_mul),
        },
        vec![value.into(), other.into()],
    )
}

pub fn div(value: impl Into<FormulaSource>, other: impl Into<FormulaSource>) -> Formula {
    Formula::operation(
        Op {
            name: "div",
            evaluate: |i: &[Decimal]| &i[0] / &i[1],
            invert: Some(ops::invert_div),
            integrate: Some(ops::integrate_div),
            integrate_inner: None,
            apply_substitution: Some(ops::substitute_div),
        },
        vec![value.into(), other.into()],
    )
}

pub fn recip(value: impl Into<FormulaSource>) -> Formula {
    unary(
        "recip",
        |i: &[Decimal]| i[0].recip(),
        Some(ops::invert_recip),
        Some(ops::integrate_recip),
        value.into(),
    )
}

// ========== Clamping (pass-through inverses, not integrable) ==========

fn clampish(
    name: &'static str,
    evaluate: fn(&[Decimal]) -> Decimal,
    value: FormulaSource,
    other: FormulaSource,
) -> Formula {
    Formula::operation(
        Op {
            name,
            evaluate,
            invert: Some(ops::invert_passthrough),
            integrate: None,
            integrate_inner: None,
            apply_substitution: None,
        },
        vec![value, other],
    )
}

pub fn max(value: impl Into<FormulaSource>, other: impl Into<FormulaSource>) -> Formula {
    clampish("max", |i: &[Decimal]| i[0].max(&i[1]), value.into(), other.into())
}

pub fn min(value: impl Into<FormulaSource>, other: impl Into<FormulaSource>) -> Formula {
    clampish("min", |i: &[Decimal]| i[0].min(&i[1]), value.into(), other.into())
}

pub fn max_abs(value: impl Into<FormulaSource>, other: impl Into<FormulaSource>) -> Formula {
    clampish("max_abs", |i: &[Decimal]| i[0].max_abs(&i[1]), value.into(), other.into())
}

pub fn min_abs(value: impl Into<FormulaSource>, other: impl Into<FormulaSource>) -> Formula {
    clampish("min_abs", |i: &[Decimal]| i[0].min_abs(&i[1]), value.into(), other.into())
}

pub fn clamp_min(value: impl Into<FormulaSource>, min: impl Into<FormulaSource>) -> Formula {
    clampish("clamp_min", |i: &[Decimal]| i[0].clamp_min(&i[1]), value.into(), min.into())
}

pub fn clamp_max(value: impl Into<FormulaSource>, max: impl Into<FormulaSource>) -> Formula {
    clampish("clamp_max", |i: &[Decimal]| i[0].clamp_max(&i[1]), value.into(), max.into())
}

pub fn clamp(
    value: impl Into<FormulaSource>,
    min: impl Into<FormulaSource>,
    max: impl Into<FormulaSource>,
) -> Formula {
    Formula::operation(
        Op {
            name: "clamp",
            evaluate: |i: &[Decimal]| i[0].clamp(&i[1], &i[2]),
            invert: None,
            integrate: None,
            integrate_inner: None,
            apply_substitution: None,
        },
        vec![value.into(), min.into(), max.into()],
    )
}

// ========== Logarithms ==========

pub fn log10(value: impl Into<FormulaSource>) -> Formula {
    unary(
        "log10",
        |i: &[Decimal]| i[0].log10(),
        Some(ops::invert_log10),
        Some(ops::integrate_log10),
        value.into(),
    )
}

pub fn log(value: impl Into<FormulaSource>, base: impl Into<FormulaSource>) -> Formula {
    Formula::operation(
        Op {
            name: "log",
            evaluate: |i: &[Decimal]| i[0].log(&i[1]),
            invert: Some(ops::invert_log),
            integrate: Some(ops::integrate_log),
            integrate_inner: None,
            apply_substitution: None,
        },
        vec![value.into(), base.into()],
    )
}

pub fn log2(value: impl Into<FormulaSource>) -> Formula {
    unary(
        "log2",
        |i: &[Decimal]| i[0].log2(),
        Some(ops::invert_log2),
        Some(ops::integrate_log2),
        value.into(),
    )
}

pub fn ln(value: impl Into<FormulaSource>) -> Formula {
    unary(
        "ln",
        |i: &[Decimal]| i[0].ln(),
        Some(ops::invert_ln),
        Some(ops::integrate_ln),
        value.into(),
    )
}

/// log10 clamped to zero for non-positive inputs
pub fn plog10(value: impl Into<FormulaSource>) -> Formula {
    unary("plog10", |i: &[Decimal]| i[0].plog10(), None, None, value.into())
}

pub fn abs_log10(value: impl Into<FormulaSource>) -> Formula {
    unary("abs_log10", |i: &[Decimal]| i[0].abs_log10(), None, None, value.into())
}

// ========== Powers and exponentials ==========

pub fn pow(value: impl Into<FormulaSource>, exponent: impl Into<FormulaSource>) -> Formula {
    Formula::operation(
        Op {
            name: "pow",
            evaluate: |i: &[Decimal]| i[0].pow(&i[1]),
            invert: Some(ops::invert_pow),
            integrate: Some(ops::integrate_pow),
            integrate_inner: None,
            apply_substitution: None,
        },
        vec![value.into(), exponent.into()],
    )
}

pub fn pow10(value: impl Into<FormulaSource>) -> Formula {
    unary(
        "pow10",
        |i: &[Decimal]| i[0].pow10(),
        Some(ops::invert_pow10),
        Some(ops::integrate_pow10),
        value.into(),
    )
}

/// `base^value`, with the exponent as the first operand so cost curves read
/// as "the variable, raised through a base"
pub fn pow_base(value: impl Into<FormulaSource>, base: impl Into<FormulaSource>) -> Formula {
    Formula::operation(
        Op {
            name: "pow_base",
            evaluate: |i: &[Decimal]| i[1].pow(&i[0]),
            invert: Some(ops::invert_pow_base),
            integrate: Some(ops::integrate_pow_base),
            integrate_inner: None,
            apply_substitution: None,
        },
        vec![value.into(), base.into()],
    )
}

pub fn root(value: impl Into<FormulaSource>, degree: impl Into<FormulaSource>) -> Formula {
    Formula::operation(
        Op {
            name: "root",
            evaluate: |i: &[Decimal]| i[0].root(&i[1]),
            invert: Some(ops::invert_root),
            integrate: Some(ops::integrate_root),
            integrate_inner: None,
            apply_substitution: None,
        },
        vec![value.into(), degree.into()],
    )
}

pub fn sqrt(value: impl Into<FormulaSource>) -> Formula {
    root(value, 2)
}

pub fn cbrt(value: impl Into<FormulaSource>) -> Formula {
    root(value, 3)
}

pub fn exp(value: impl Into<FormulaSource>) -> Formula {
    unary(
        "exp",
        |i: &[Decimal]| i[0].exp(),
        Some(ops::invert_exp),
        Some(ops::integrate_exp),
        value.into(),
    )
}

// ========== Trigonometric ==========

pub fn sin(value: impl Into<FormulaSource>) -> Formula {
    unary("sin", |i: &[Decimal]| i[0].sin(), Some(ops::invert_sin), Some(ops::integrate_sin), value.into())
}

pub fn cos(value: impl Into<FormulaSource>) -> Formula {
    unary("cos", |i: &[Decimal]| i[0].cos(), Some(ops::invert_cos), Some(ops::integrate_cos), value.into())
}

pub fn tan(value: impl Into<FormulaSource>) -> Formula {
    unary("tan", |i: &[Decimal]| i[0].tan(), Some(ops::invert_tan), Some(ops::integrate_tan), value.into())
}

pub fn asin(value: impl Into<FormulaSource>) -> Formula {
    unary("asin", |i: &[Decimal]| i[0].asin(), Some(ops::invert_asin), Some(ops::integrate_asin), value.into())
}

pub fn acos(value: impl Into<FormulaSource>) -> Formula {
    unary("acos", |i: &[Decimal]| i[0].acos(), Some(ops::invert_acos), Some(ops::integrate_acos), value.into())
}

pub fn atan(value: impl Into<FormulaSource>) -> Formula {
    unary("atan", |i: &[Decimal]| i[0].atan(), Some(ops::invert_atan), Some(ops::integrate_atan), value.into())
}

pub fn sinh(value: impl Into<FormulaSource>) -> Formula {
    unary("sinh", |i: &[Decimal]| i[0].sinh(), Some(ops::invert_sinh), Some(ops::integrate_sinh), value.into())
}

pub fn cosh(value: impl Into<FormulaSource>) -> Formula {
    unary("cosh", |i: &[Decimal]| i[0].cosh(), Some(ops::invert_cosh), Some(ops::integrate_cosh), value.into())
}

pub fn tanh(value: impl Into<FormulaSource>) -> Formula {
    unary("tanh", |i: &[Decimal]| i[0].tanh(), Some(ops::invert_tanh), Some(ops::integrate_tanh), value.into())
}

pub fn asinh(value: impl Into<FormulaSource>) -> Formula {
    unary("asinh", |i: &[Decimal]| i[0].asinh(), Some(ops::invert_asinh), Some(ops::integrate_asinh), value.into())
}

pub fn acosh(value: impl Into<FormulaSource>) -> Formula {
    unary("acosh", |i: &[Decimal]| i[0].acosh(), Some(ops::invert_acosh), Some(ops::integrate_acosh), value.into())
}

pub fn atanh(value: impl Into<FormulaSource>) -> Formula {
    unary("atanh", |i: &[Decimal]| i[0].atanh(), Some(ops::invert_atanh), Some(ops::integrate_atanh), value.into())
}

// ========== Hyperoperations ==========

pub fn tetrate(
    value: impl Into<FormulaSource>,
    height: impl Into<FormulaSource>,
    payload: impl Into<FormulaSource>,
) -> Formula {
    Formula::operation(
        Op {
            name: "tetrate",
            evaluate: |i: &[Decimal]| i[0].tetrate(&i[1], &i[2]),
            invert: Some(ops::invert_tetrate),
            integrate: None,
            integrate_inner: None,
            apply_substitution: None,
        },
        vec![value.into(), height.into(), payload.into()],
    )
}

pub fn iterated_exp(
    value: impl Into<FormulaSource>,
    height: impl Into<FormulaSource>,
    payload: impl Into<FormulaSource>,
) -> Formula {
    Formula::operation(
        Op {
            name: "iterated_exp",
            evaluate: |i: &[Decimal]| i[0].iterated_exp(&i[1], &i[2]),
            invert: None,
            integrate: None,
            integrate_inner: None,
            apply_substitution: None,
        },
        vec![value.into(), height.into(), payload.into()],
    )
}

pub fn iterated_log(
    value: impl Into<FormulaSource>,
    base: impl Into<FormulaSource>,
    times: impl Into<FormulaSource>,
) -> Formula {
    Formula::operation(
        Op {
            name: "iterated_log",
            evaluate: |i: &[Decimal]| i[0].iterated_log(&i[1], &i[2]),
            invert: None,
            integrate: None,
            integrate_inner: None,
            apply_substitution: None,
        },
        vec![value.into(), base.into(), times.into()],
    )
}

pub fn slog(value: impl Into<FormulaSource>, base: impl Into<FormulaSource>) -> Formula {
    Formula::operation(
        Op {
            name: "slog",
            evaluate: |i: &[Decimal]| i[0].slog(&i[1]),
            invert: Some(ops::invert_slog),
            integrate: None,
            integrate_inner: None,
            apply_substitution: None,
        },
        vec![value.into(), base.into()],
    )
}

pub fn layer_add(
    value: impl Into<FormulaSource>,
    diff: impl Into<FormulaSource>,
    base: impl Into<FormulaSource>,
) -> Formula {
    Formula::operation(
        Op {
            name: "layer_add",
            evaluate: |i: &[Decimal]| i[0].layer_add(&i[1], &i[2]),
            invert: Some(ops::invert_layer_add),
            integrate: None,
            integrate_inner: None,
            apply_substitution: None,
        },
        vec![value.into(), diff.into(), base.into()],
    )
}

pub fn layer_add_10(value: impl Into<FormulaSource>, diff: impl Into<FormulaSource>) -> Formula {
    Formula::operation(
        Op {
            name: "layer_add_10",
            evaluate: |i: &[Decimal]| i[0].layer_add_10(&i[1]),
            invert: None,
            integrate: None,
            integrate_inner: None,
            apply_substitution: None,
        },
        vec![value.into(), diff.into()],
    )
}

pub fn lambert_w(value: impl Into<FormulaSource>) -> Formula {
    unary(
        "lambert_w",
        |i: &[Decimal]| i[0].lambert_w(),
        Some(ops::invert_lambert_w),
        None,
        value.into(),
    )
}

pub fn ssqrt(value: impl Into<FormulaSource>) -> Formula {
    unary(
        "ssqrt",
        |i: &[Decimal]| i[0].ssqrt(),
        Some(ops::invert_ssqrt),
        None,
        value.into(),
    )
}

pub fn pentate(value: impl Into<FormulaSource>, height: impl Into<FormulaSource>) -> Formula {
    Formula::operation(
        Op {
            name: "pentate",
            evaluate: |i: &[Decimal]| i[0].pentate(&i[1]),
            invert: None,
            integrate: None,
            integrate_inner: None,
            apply_substitution: None,
        },
        vec![value.into(), height.into()],
    )
}

pub fn factorial(value: impl Into<FormulaSource>) -> Formula {
    unary("factorial", |i: &[Decimal]| i[0].factorial(), None, None, value.into())
}

pub fn gamma(value: impl Into<FormulaSource>) -> Formula {
    unary("gamma", |i: &[Decimal]| i[0].gamma(), None, None, value.into())
}

// ========== Combinators ==========

/// Applies `modifier` to the part of `value` above `start`; below the
/// threshold the value passes through unchanged. The comparison happens at
/// evaluate/invert time, against the threshold's current value.
pub fn step(
    value: impl Into<FormulaSource>,
    start: impl Into<FormulaSource>,
    modifier: impl FnOnce(Formula) -> Formula,
) -> Formula {
    let inner = modifier(Formula::variable(Arc::new(Decimal::zero)));
    Formula::step_node(value.into(), start.into(), Arc::new(inner))
}

/// Applies `modifier` only while `condition` currently reads true; inversion
/// picks the branch from the condition at invert time
pub fn conditional(
    value: impl Into<FormulaSource>,
    condition: impl Fn() -> bool + Send + Sync + 'static,
    modifier: impl FnOnce(Formula) -> Formula,
) -> Formula {
    let inner = modifier(Formula::variable(Arc::new(Decimal::zero)));
    let condition: BoolRef = Arc::new(condition);
    Formula::conditional_node(value.into(), condition, Arc::new(inner))
}

// ========== Fluent layer ==========

macro_rules! fluent_unary {
    ($($name:ident),* $(,)?) => {
        impl Formula {
            $(
                pub fn $name(self) -> Formula {
                    $name(self)
                }
            )*
        }
    };
}

fluent_unary!(
    neg, abs, sign, round, floor, ceil, trunc, recip, log10, log2, ln, plog10, abs_log10,
    pow10, sqrt, cbrt, exp, sin, cos, tan, asin, acos, atan, sinh, cosh, tanh, asinh, acosh,
    atanh, lambert_w, ssqrt, factorial, gamma,
);

macro_rules! fluent_binary {
    ($($name:ident($arg:ident)),* $(,)?) => {
        impl Formula {
            $(
                pub fn $name(self, $arg: impl Into<FormulaSource>) -> Formula {
                    $name(self, $arg)
                }
            )*
        }
    };
}

fluent_binary!(
    add(other),
    sub(other),
    mul(other),
    div(other),
    log(base),
    pow(exponent),
    pow_base(base),
    root(degree),
    max(other),
    min(other),
    max_abs(other),
    min_abs(other),
    clamp_min(min),
    clamp_max(max),
    slog(base),
    layer_add_10(diff),
    pentate(height),
);

impl Formula {
    pub fn clamp(
        self,
        min: impl Into<FormulaSource>,
        max: impl Into<FormulaSource>,
    ) -> Formula {
        clamp(self, min, max)
    }

    pub fn tetrate(
        self,
        height: impl Into<FormulaSource>,
        payload: impl Into<FormulaSource>,
    ) -> Formula {
        tetrate(self, height, payload)
    }

    pub fn iterated_exp(
        self,
        height: impl Into<FormulaSource>,
        payload: impl Into<FormulaSource>,
    ) -> Formula {
        iterated_exp(self, height, payload)
    }

    pub fn iterated_log(
        self,
        base: impl Into<FormulaSource>,
        times: impl Into<FormulaSource>,
    ) -> Formula {
        iterated_log(self, base, times)
    }

    pub fn layer_add(
        self,
        diff: impl Into<FormulaSource>,
        base: impl Into<FormulaSource>,
    ) -> Formula {
        layer_add(self, diff, base)
    }

    pub fn step(
        self,
        start: impl Into<FormulaSource>,
        modifier: impl FnOnce(Formula) -> Formula,
    ) -> Formula {
        step(self, start, modifier)
    }

    pub fn conditional(
        self,
        condition: impl Fn() -> bool + Send + Sync + 'static,
        modifier: impl FnOnce(Formula) -> Formula,
    ) -> Formula {
        conditional(self, condition, modifier)
    }
}

// ========== Operator overloads ==========

impl<T: Into<FormulaSource>> std::ops::Add<T> for Formula {
    type Output = Formula;

    fn add(self, rhs: T) -> Formula {
        add(self, rhs)
    }
}

impl<T: Into<FormulaSource>> std::ops::Sub<T> for Formula {
    type Output = Formula;

    fn sub(self, rhs: T) -> Formula {
        sub(self, rhs)
    }
}

impl<T: Into<FormulaSource>> std::ops::Mul<T> for Formula {
    type Output = Formula;

    fn mul(self, rhs: T) -> Formula {
        mul(self, rhs)
    }
}

impl<T: Into<FormulaSource>> std::ops::Div<T> for Formula {
    type Output = Formula;

    fn div(self, rhs: T) -> Formula {
        div(self, rhs)
    }
}

impl std::ops::Neg for Formula {
    type Output = Formula;

    fn neg(self) -> Formula {
        neg(self)
    }
}
