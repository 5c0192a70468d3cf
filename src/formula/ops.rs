//! Closed-form inversion and integration strategies, one set per operator
//!
//! Every strategy first locates the operand carrying the free variable and
//! reports a distinguishable error when none does — a silent wrong answer
//! here would surface as a mispriced purchase. Antiderivatives follow the
//! standard tables: power rule, b^x/ln b, u(ln u − 1)/ln b for logarithms,
//! and the usual trigonometric/hyperbolic forms.

use crate::decimal::Decimal;
use crate::error::FormulaError;

use super::*;

/// The operand carrying the free variable and its partner, for binary
/// operations. `true` means the left side carries it.
fn split_binary<'a>(
    inputs: &'a [FormulaSource],
    op: &'static str,
) -> Result<(&'a FormulaSource, &'a FormulaSource, bool), FormulaError> {
    let lhs = &inputs[0];
    let rhs = &inputs[1];
    if lhs.has_variable() {
        Ok((lhs, rhs, true))
    } else if rhs.has_variable() {
        Ok((rhs, lhs, false))
    } else {
        Err(FormulaError::VariableMissing { op })
    }
}

fn unary_operand<'a>(
    inputs: &'a [FormulaSource],
    op: &'static str,
) -> Result<&'a FormulaSource, FormulaError> {
    let operand = &inputs[0];
    if operand.has_variable() {
        Ok(operand)
    } else {
        Err(FormulaError::VariableMissing { op })
    }
}

/// The variable's raw reference as an opaque input, for the c·x terms of
/// additive antiderivatives. Reading it live (instead of through the
/// override) keeps the integral a single-occurrence tree, so it stays
/// invertible; the term cancels in the integral differences the purchase
/// layer computes.
fn innermost_or_zero(source: &FormulaSource) -> Formula {
    match source.innermost_variable() {
        Some(live) => Formula::constant(FormulaSource::Dynamic(live)),
        None => Formula::constant(Decimal::zero()),
    }
}

// ========== Placeholders ==========

/// Documented placeholder for max/min/clamp-style operations: evaluation
/// works, but the "inverse" hands the target back unchanged. Content relies
/// on this behavior during bulk purchases, so it stays.
pub(crate) fn invert_passthrough(
    value: &Decimal,
    _inputs: &[FormulaSource],
) -> Result<Decimal, FormulaError> {
    Ok(value.clone())
}

/// Substitution for wrappers that need no rescaling (u = x ± c)
pub(crate) fn substitute_passthrough(
    formula: Formula,
    _inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    Ok(formula)
}

// ========== Negation ==========

pub(crate) fn invert_neg(
    value: &Decimal,
    inputs: &[FormulaSource],
) -> Result<Decimal, FormulaError> {
    unary_operand(inputs, "neg")?.invert(&-value)
}

pub(crate) fn integrate_neg(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    let x = unary_operand(inputs, "neg")?.integral(stack)?;
    Ok(neg(x))
}

pub(crate) fn substitute_neg(
    formula: Formula,
    _inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    Ok(neg(formula))
}

// ========== Addition / subtraction ==========

pub(crate) fn invert_add(
    value: &Decimal,
    inputs: &[FormulaSource],
) -> Result<Decimal, FormulaError> {
    let (carrier, other, _) = split_binary(inputs, "add")?;
    carrier.invert(&(value - &other.value()))
}

pub(crate) fn integrate_add(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    // ∫(f + c) dx = c·x + ∫f dx
    let (carrier, other, _) = split_binary(inputs, "add")?;
    let x = carrier.integral(stack)?;
    Ok(add(mul(other.clone(), innermost_or_zero(carrier)), x))
}

pub(crate) fn integrate_inner_add(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    let (carrier, other, _) = split_binary(inputs, "add")?;
    let x = carrier.integral(stack)?;
    Ok(add(x, other.clone()))
}

pub(crate) fn invert_sub(
    value: &Decimal,
    inputs: &[FormulaSource],
) -> Result<Decimal, FormulaError> {
    let (carrier, other, lhs_carries) = split_binary(inputs, "sub")?;
    if lhs_carries {
        carrier.invert(&(value + &other.value()))
    } else {
        carrier.invert(&(&other.value() - value))
    }
}

pub(crate) fn integrate_sub(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    let (carrier, other, lhs_carries) = split_binary(inputs, "sub")?;
    let x = carrier.integral(stack)?;
    let linear = mul(other.clone(), innermost_or_zero(carrier));
    if lhs_carries {
        Ok(sub(x, linear))
    } else {
        Ok(sub(linear, x))
    }
}

pub(crate) fn integrate_inner_sub(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    let (carrier, other, lhs_carries) = split_binary(inputs, "sub")?;
    let x = carrier.integral(stack)?;
    if lhs_carries {
        Ok(sub(x, other.clone()))
    } else {
        Ok(sub(other.clone(), x))
    }
}

// ========== Multiplication / division ==========

pub(crate) fn invert_mul(
    value: &Decimal,
    inputs: &[FormulaSource],
) -> Result<Decimal, FormulaError> {
    let (carrier, other, _) = split_binary(inputs, "mul")?;
    carrier.invert(&(value / &other.value()))
}

pub(crate) fn integrate_mul(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    let (carrier, other, _) = split_binary(inputs, "mul")?;
    let x = carrier.integral(stack)?;
    Ok(mul(x, other.clone()))
}

pub(crate) fn substitute_mul(
    formula: Formula,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    // u = k·x rescales the antiderivative by 1/k
    let (_, other, _) = split_binary(inputs, "mul")?;
    Ok(div(formula, other.clone()))
}

pub(crate) fn invert_div(
    value: &Decimal,
    inputs: &[FormulaSource],
) -> Result<Decimal, FormulaError> {
    let (carrier, other, lhs_carries) = split_binary(inputs, "div")?;
    if lhs_carries {
        carrier.invert(&(value * &other.value()))
    } else {
        carrier.invert(&(&other.value() / value))
    }
}

pub(crate) fn integrate_div(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    let (carrier, other, lhs_carries) = split_binary(inputs, "div")?;
    if !lhs_carries {
        return Err(FormulaError::NotIntegrable { op: "div" });
    }
    let x = carrier.integral(stack)?;
    Ok(div(x, other.clone()))
}

pub(crate) fn substitute_div(
    formula: Formula,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    let (_, other, lhs_carries) = split_binary(inputs, "div")?;
    if !lhs_carries {
        return Err(FormulaError::NotIntegrable { op: "div" });
    }
    Ok(mul(formula, other.clone()))
}

pub(crate) fn invert_recip(
    value: &Decimal,
    inputs: &[FormulaSource],
) -> Result<Decimal, FormulaError> {
    unary_operand(inputs, "recip")?.invert(&value.recip())
}

pub(crate) fn integrate_recip(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    // ∫1/x dx = ln x
    let x = unary_operand(inputs, "recip")?.integral(stack)?;
    Ok(ln(x))
}

// ========== Logarithms ==========

pub(crate) fn invert_log10(
    value: &Decimal,
    inputs: &[FormulaSource],
) -> Result<Decimal, FormulaError> {
    unary_operand(inputs, "log10")?.invert(&value.pow10())
}

/// ∫log_b(u) du = u·(ln u − 1)/ln b
fn log_antiderivative(x: Formula, base: Decimal) -> Formula {
    div(mul(sub(ln(x.clone()), 1), x), base.ln())
}

pub(crate) fn integrate_log10(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    let x = unary_operand(inputs, "log10")?.integral(stack)?;
    Ok(log_antiderivative(x, Decimal::from(10)))
}

pub(crate) fn invert_log(
    value: &Decimal,
    inputs: &[FormulaSource],
) -> Result<Decimal, FormulaError> {
    let (carrier, other, lhs_carries) = split_binary(inputs, "log")?;
    if lhs_carries {
        // log_b(f) = v  →  f = b^v
        carrier.invert(&other.value().pow(value))
    } else {
        // log_f(a) = v  →  f = a^(1/v)
        carrier.invert(&other.value().pow(&value.recip()))
    }
}

pub(crate) fn integrate_log(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    let (carrier, other, lhs_carries) = split_binary(inputs, "log")?;
    if !lhs_carries {
        return Err(FormulaError::NotIntegrable { op: "log" });
    }
    let x = carrier.integral(stack)?;
    Ok(log_antiderivative(x, other.value()))
}

pub(crate) fn invert_log2(
    value: &Decimal,
    inputs: &[FormulaSource],
) -> Result<Decimal, FormulaError> {
    unary_operand(inputs, "log2")?.invert(&Decimal::from(2).pow(value))
}

pub(crate) fn integrate_log2(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    let x = unary_operand(inputs, "log2")?.integral(stack)?;
    Ok(log_antiderivative(x, Decimal::from(2)))
}

pub(crate) fn invert_ln(
    value: &Decimal,
    inputs: &[FormulaSource],
) -> Result<Decimal, FormulaError> {
    unary_operand(inputs, "ln")?.invert(&value.exp())
}

pub(crate) fn integrate_ln(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    // ∫ln u du = u·ln u − u
    let x = unary_operand(inputs, "ln")?.integral(stack)?;
    Ok(sub(mul(x.clone(), ln(x.clone())), x))
}

// ========== Powers and exponentials ==========

pub(crate) fn invert_pow(
    value: &Decimal,
    inputs: &[FormulaSource],
) -> Result<Decimal, FormulaError> {
    let (carrier, other, base_carries) = split_binary(inputs, "pow")?;
    if base_carries {
        // f^c = v  →  f = v^(1/c)
        carrier.invert(&value.pow(&other.value().recip()))
    } else {
        // c^f = v  →  f = log_c(v)
        carrier.invert(&value.log(&other.value()))
    }
}

pub(crate) fn integrate_pow(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    let (carrier, other, base_carries) = split_binary(inputs, "pow")?;
    let x = carrier.integral(stack)?;
    if base_carries {
        // power rule: ∫u^c du = u^(c+1)/(c+1)
        let exponent = add(other.clone(), 1);
        Ok(div(pow(x, exponent.clone()), exponent))
    } else {
        // ∫c^u du = c^u/ln c
        Ok(div(pow(other.clone(), x), ln(other.clone())))
    }
}

pub(crate) fn invert_pow10(
    value: &Decimal,
    inputs: &[FormulaSource],
) -> Result<Decimal, FormulaError> {
    unary_operand(inputs, "pow10")?.invert(&value.log10())
}

pub(crate) fn integrate_pow10(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    let x = unary_operand(inputs, "pow10")?.integral(stack)?;
    Ok(div(pow10(x), Decimal::from(10).ln()))
}

pub(crate) fn invert_pow_base(
    value: &Decimal,
    inputs: &[FormulaSource],
) -> Result<Decimal, FormulaError> {
    let (carrier, other, exponent_carries) = split_binary(inputs, "pow_base")?;
    if exponent_carries {
        // b^f = v  →  f = log_b(v)
        carrier.invert(&value.log(&other.value()))
    } else {
        // f^c = v  →  f = v^(1/c)
        carrier.invert(&value.pow(&other.value().recip()))
    }
}

pub(crate) fn integrate_pow_base(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    let (carrier, other, exponent_carries) = split_binary(inputs, "pow_base")?;
    if !exponent_carries {
        return Err(FormulaError::NotIntegrable { op: "pow_base" });
    }
    let x = carrier.integral(stack)?;
    Ok(div(pow_base(x, other.clone()), ln(other.clone())))
}

pub(crate) fn invert_root(
    value: &Decimal,
    inputs: &[FormulaSource],
) -> Result<Decimal, FormulaError> {
    let (carrier, other, value_carries) = split_binary(inputs, "root")?;
    if value_carries {
        // f^(1/n) = v  →  f = v^n
        carrier.invert(&value.pow(&other.value()))
    } else {
        // c^(1/f) = v  →  f = ln c / ln v
        carrier.invert(&(&other.value().ln() / &value.ln()))
    }
}

pub(crate) fn integrate_root(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    let (carrier, other, value_carries) = split_binary(inputs, "root")?;
    if !value_carries {
        return Err(FormulaError::NotIntegrable { op: "root" });
    }
    let x = carrier.integral(stack)?;
    let exponent = add(recip(other.clone()), 1);
    Ok(div(pow(x, exponent.clone()), exponent))
}

pub(crate) fn invert_exp(
    value: &Decimal,
    inputs: &[FormulaSource],
) -> Result<Decimal, FormulaError> {
    unary_operand(inputs, "exp")?.invert(&value.ln())
}

pub(crate) fn integrate_exp(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    let x = unary_operand(inputs, "exp")?.integral(stack)?;
    Ok(exp(x))
}

// ========== Trigonometric ==========

macro_rules! inverse_pair {
    ($invert:ident, $name:literal, $apply:ident) => {
        pub(crate) fn $invert(
            value: &Decimal,
            inputs: &[FormulaSource],
        ) -> Result<Decimal, FormulaError> {
            unary_operand(inputs, $name)?.invert(&value.$apply())
        }
    };
}

inverse_pair!(invert_sin, "sin", asin);
inverse_pair!(invert_cos, "cos", acos);
inverse_pair!(invert_tan, "tan", atan);
inverse_pair!(invert_asin, "asin", sin);
inverse_pair!(invert_acos, "acos", cos);
inverse_pair!(invert_atan, "atan", tan);
inverse_pair!(invert_sinh, "sinh", asinh);
inverse_pair!(invert_cosh, "cosh", acosh);
inverse_pair!(invert_tanh, "tanh", atanh);
inverse_pair!(invert_asinh, "asinh", sinh);
inverse_pair!(invert_acosh, "acosh", cosh);
inverse_pair!(invert_atanh, "atanh", tanh);

pub(crate) fn integrate_sin(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    let x = unary_operand(inputs, "sin")?.integral(stack)?;
    Ok(neg(cos(x)))
}

pub(crate) fn integrate_cos(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    let x = unary_operand(inputs, "cos")?.integral(stack)?;
    Ok(sin(x))
}

pub(crate) fn integrate_tan(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    // ∫tan u du = −ln(cos u)
    let x = unary_operand(inputs, "tan")?.integral(stack)?;
    Ok(neg(ln(cos(x))))
}

pub(crate) fn integrate_asin(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    let x = unary_operand(inputs, "asin")?.integral(stack)?;
    Ok(add(mul(asin(x.clone()), x.clone()), sqrt(sub(1, pow(x, 2)))))
}

pub(crate) fn integrate_acos(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    let x = unary_operand(inputs, "acos")?.integral(stack)?;
    Ok(sub(mul(acos(x.clone()), x.clone()), sqrt(sub(1, pow(x, 2)))))
}

pub(crate) fn integrate_atan(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    let x = unary_operand(inputs, "atan")?.integral(stack)?;
    Ok(sub(
        mul(atan(x.clone()), x.clone()),
        div(ln(add(pow(x, 2), 1)), 2),
    ))
}

pub(crate) fn integrate_sinh(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    let x = unary_operand(inputs, "sinh")?.integral(stack)?;
    Ok(cosh(x))
}

pub(crate) fn integrate_cosh(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    let x = unary_operand(inputs, "cosh")?.integral(stack)?;
    Ok(sinh(x))
}

pub(crate) fn integrate_tanh(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    let x = unary_operand(inputs, "tanh")?.integral(stack)?;
    Ok(ln(cosh(x)))
}

pub(crate) fn integrate_asinh(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    let x = unary_operand(inputs, "asinh")?.integral(stack)?;
    Ok(sub(mul(asinh(x.clone()), x.clone()), sqrt(add(pow(x, 2), 1))))
}

pub(crate) fn integrate_acosh(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    let x = unary_operand(inputs, "acosh")?.integral(stack)?;
    Ok(sub(mul(acosh(x.clone()), x.clone()), sqrt(sub(pow(x, 2), 1))))
}

pub(crate) fn integrate_atanh(
    stack: Option<&mut SubstitutionStack>,
    inputs: &[FormulaSource],
) -> Result<Formula, FormulaError> {
    let x = unary_operand(inputs, "atanh")?.integral(stack)?;
    Ok(add(
        mul(atanh(x.clone()), x.clone()),
        div(ln(sub(1, pow(x, 2))), 2),
    ))
}

// ========== Hyperoperations ==========

pub(crate) fn invert_tetrate(
    value: &Decimal,
    inputs: &[FormulaSource],
) -> Result<Decimal, FormulaError> {
    let base = &inputs[0];
    if base.has_variable() {
        // only the default height-2 tower inverts in closed form
        return base.invert(&value.ssqrt());
    }
    // height/payload sides have no closed-form inverse
    Err(FormulaError::VariableMissing { op: "tetrate" })
}

pub(crate) fn invert_slog(
    value: &Decimal,
    inputs: &[FormulaSource],
) -> Result<Decimal, FormulaError> {
    let (carrier, other, value_carries) = split_binary(inputs, "slog")?;
    if !value_carries {
        return Err(FormulaError::VariableMissing { op: "slog" });
    }
    carrier.invert(&other.value().tetrate(value, &Decimal::one()))
}

pub(crate) fn invert_layer_add(
    value: &Decimal,
    inputs: &[FormulaSource],
) -> Result<Decimal, FormulaError> {
    let carrier = unary_operand(inputs, "layer_add")?;
    let diff = inputs[1].value();
    let base = inputs[2].value();
    carrier.invert(&value.layer_add(&-&diff, &base))
}

pub(crate) fn invert_lambert_w(
    value: &Decimal,
    inputs: &[FormulaSource],
) -> Result<Decimal, FormulaError> {
    unary_operand(inputs, "lambert_w")?.invert(&(value * &value.exp()))
}

pub(crate) fn invert_ssqrt(
    value: &Decimal,
    inputs: &[FormulaSource],
) -> Result<Decimal, FormulaError> {
    unary_operand(inputs, "ssqrt")?.invert(&value.pow(value))
}
