//! Symbolic cost formulas
//!
//! A [`Formula`] is an immutable node in an expression tree over [`Decimal`]
//! values. Leaves are constants, reactive references or the designated free
//! variable; interior nodes carry a static operation record wiring up
//! evaluation and, where they exist, closed-form inversion and integration
//! strategies. Inversion and integration are defined relative to the single
//! free variable occurrence — trees with more than one occurrence evaluate
//! fine but refuse both.
//!
//! Construction goes through the free factory functions in this module
//! (`formula::add`, `formula::pow`, ...), the fluent methods on `Formula`
//! that forward to them, or the std arithmetic operators.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::decimal::Decimal;
use crate::error::FormulaError;

mod factory;
pub(crate) mod ops;

pub use factory::*;

/// Reactive scalar reference: an opaque handle whose current value can be
/// read. Re-invocation on change is the host's concern, not the engine's.
pub type DecimalRef = Arc<dyn Fn() -> Decimal + Send + Sync>;

/// Reactive boolean reference, read by the conditional combinator at
/// evaluate/invert time
pub type BoolRef = Arc<dyn Fn() -> bool + Send + Sync>;

/// An input to a formula node: an opaque constant, a reactive reference, or
/// another formula
#[derive(Clone)]
pub enum FormulaSource {
    Constant(Decimal),
    Dynamic(DecimalRef),
    Formula(Arc<Formula>),
}

impl FormulaSource {
    /// Current value, substituting `variable` for free-variable leaves
    pub fn value_with(&self, variable: Option<&Decimal>) -> Decimal {
        match self {
            FormulaSource::Constant(v) => v.clone(),
            FormulaSource::Dynamic(r) => r(),
            FormulaSource::Formula(f) => f.evaluate_with(variable),
        }
    }

    pub fn value(&self) -> Decimal {
        self.value_with(None)
    }

    pub fn has_variable(&self) -> bool {
        self.variable_count() == 1
    }

    pub(crate) fn variable_count(&self) -> u32 {
        match self {
            FormulaSource::Formula(f) => f.variable_count,
            _ => 0,
        }
    }

    pub(crate) fn innermost_variable(&self) -> Option<DecimalRef> {
        match self {
            FormulaSource::Formula(f) => f.innermost_variable.clone(),
            _ => None,
        }
    }

    /// Invert the formula carried by this input
    pub(crate) fn invert(&self, value: &Decimal) -> Result<Decimal, FormulaError> {
        match self {
            FormulaSource::Formula(f) => f.invert(value),
            _ => Err(FormulaError::NotInvertible { op: "constant" }),
        }
    }

    /// Integrate the formula carried by this input. `stack` present means
    /// inner mode (a substitution stack is being accumulated); absent means
    /// outer mode.
    pub(crate) fn integral(
        &self,
        stack: Option<&mut SubstitutionStack>,
    ) -> Result<Formula, FormulaError> {
        match self {
            FormulaSource::Formula(f) => match stack {
                Some(stack) => f.integral_formula_with(stack),
                None => f.integral_formula().map(|f| (*f).clone()),
            },
            _ => Err(FormulaError::VariableMissing { op: "integral" }),
        }
    }
}

impl From<Decimal> for FormulaSource {
    fn from(value: Decimal) -> Self {
        FormulaSource::Constant(value)
    }
}

impl From<i64> for FormulaSource {
    fn from(value: i64) -> Self {
        FormulaSource::Constant(Decimal::from(value))
    }
}

impl From<i32> for FormulaSource {
    fn from(value: i32) -> Self {
        FormulaSource::Constant(Decimal::from(value))
    }
}

impl From<f64> for FormulaSource {
    fn from(value: f64) -> Self {
        FormulaSource::Constant(Decimal::from_f64(value))
    }
}

impl From<Formula> for FormulaSource {
    fn from(value: Formula) -> Self {
        FormulaSource::Formula(Arc::new(value))
    }
}

impl From<&Formula> for FormulaSource {
    fn from(value: &Formula) -> Self {
        FormulaSource::Formula(Arc::new(value.clone()))
    }
}

impl From<Arc<Formula>> for FormulaSource {
    fn from(value: Arc<Formula>) -> Self {
        FormulaSource::Formula(value)
    }
}

impl From<DecimalRef> for FormulaSource {
    fn from(value: DecimalRef) -> Self {
        FormulaSource::Dynamic(value)
    }
}

/// Static strategy record for one operation, in the style of a function
/// registry entry: evaluation always, the algebra only where it exists
#[derive(Clone, Copy)]
pub(crate) struct Op {
    pub name: &'static str,
    pub evaluate: fn(&[Decimal]) -> Decimal,
    pub invert: Option<InvertFn>,
    pub integrate: Option<IntegrateFn>,
    pub integrate_inner: Option<IntegrateFn>,
    pub apply_substitution: Option<SubstituteFn>,
}

pub(crate) type InvertFn = fn(&Decimal, &[FormulaSource]) -> Result<Decimal, FormulaError>;
pub(crate) type IntegrateFn =
    fn(Option<&mut SubstitutionStack>, &[FormulaSource]) -> Result<Formula, FormulaError>;
pub(crate) type SubstituteFn = fn(Formula, &[FormulaSource]) -> Result<Formula, FormulaError>;

/// Undo-transformations accumulated while descending through linear wrapper
/// operations, applied in order to rescale a nested antiderivative
#[derive(Default)]
pub struct SubstitutionStack {
    entries: Vec<(SubstituteFn, Vec<FormulaSource>)>,
}

impl SubstitutionStack {
    pub(crate) fn push(&mut self, apply: SubstituteFn, inputs: Vec<FormulaSource>) {
        self.entries.push((apply, inputs));
    }

    fn apply_all(self, formula: Formula) -> Result<Formula, FormulaError> {
        let mut formula = formula;
        for (apply, inputs) in self.entries {
            formula = apply(formula, &inputs)?;
        }
        Ok(formula)
    }
}

#[derive(Clone)]
pub(crate) struct Operation {
    pub op: Op,
    pub inputs: Vec<FormulaSource>,
}

#[derive(Clone)]
enum Repr {
    /// The designated free variable
    Variable(DecimalRef),
    /// An opaque constant or reactive reference
    Constant(FormulaSource),
    /// A derived operation over one or more inputs
    Operation(Operation),
    /// Applies `inner` to the part of `value` above `start`
    Step {
        value: FormulaSource,
        start: FormulaSource,
        inner: Arc<Formula>,
    },
    /// Applies `inner` only while `condition` currently holds
    Conditional {
        value: FormulaSource,
        condition: BoolRef,
        inner: Arc<Formula>,
    },
}

/// Immutable node in a symbolic expression tree
#[derive(Clone)]
pub struct Formula {
    repr: Repr,
    /// Transitive free-variable occurrences; anything but 1 disables the
    /// algebra
    variable_count: u32,
    innermost_variable: Option<DecimalRef>,
    /// Memoized outer-mode integral; idempotent, so cloning it along with
    /// the node is harmless
    integral: OnceLock<Result<Arc<Formula>, FormulaError>>,
}

impl Formula {
    fn new(repr: Repr, variable_count: u32, innermost_variable: Option<DecimalRef>) -> Self {
        Formula {
            repr,
            variable_count,
            innermost_variable,
            integral: OnceLock::new(),
        }
    }

    /// The free variable, reading its live value from `value` when no
    /// override is in scope
    pub fn variable(value: DecimalRef) -> Formula {
        Formula::new(Repr::Variable(value.clone()), 1, Some(value))
    }

    /// An opaque constant or reactive input. Passing a formula returns it
    /// unchanged.
    pub fn constant(value: impl Into<FormulaSource>) -> Formula {
        match value.into() {
            FormulaSource::Formula(f) => (*f).clone(),
            source => Formula::new(Repr::Constant(source), 0, None),
        }
    }

    pub(crate) fn operation(op: Op, inputs: Vec<FormulaSource>) -> Formula {
        let variable_count = inputs.iter().map(|i| i.variable_count()).sum();
        let innermost_variable = if variable_count == 1 {
            inputs.iter().find_map(|i| i.innermost_variable())
        } else {
            None
        };
        Formula::new(Repr::Operation(Operation { op, inputs }), variable_count, innermost_variable)
    }

    pub(crate) fn step_node(
        value: FormulaSource,
        start: FormulaSource,
        inner: Arc<Formula>,
    ) -> Formula {
        let count = value.variable_count();
        let innermost = if count == 1 { value.innermost_variable() } else { None };
        Formula::new(Repr::Step { value, start, inner }, count, innermost)
    }

    pub(crate) fn conditional_node(
        value: FormulaSource,
        condition: BoolRef,
        inner: Arc<Formula>,
    ) -> Formula {
        let count = value.variable_count();
        let innermost = if count == 1 { value.innermost_variable() } else { None };
        Formula::new(Repr::Conditional { value, condition, inner }, count, innermost)
    }

    // ========== Inspection ==========

    /// Whether exactly one free-variable occurrence exists in this tree
    pub fn has_variable(&self) -> bool {
        self.variable_count == 1
    }

    /// The raw reference behind the free variable, used as the purchase
    /// baseline by the bulk calculator
    pub fn innermost_variable(&self) -> Option<&DecimalRef> {
        self.innermost_variable.as_ref()
    }

    /// Live value of the free variable, or zero when there is none
    pub fn current_variable_value(&self) -> Decimal {
        match &self.innermost_variable {
            Some(r) => r(),
            None => Decimal::zero(),
        }
    }

    fn op_name(&self) -> &'static str {
        match &self.repr {
            Repr::Variable(_) => "variable",
            Repr::Constant(_) => "constant",
            Repr::Operation(o) => o.op.name,
            Repr::Step { .. } => "step",
            Repr::Conditional { .. } => "conditional",
        }
    }

    /// Whether a closed-form inverse exists (the bare variable inverts as
    /// the identity)
    pub fn is_invertible(&self) -> bool {
        match &self.repr {
            Repr::Variable(_) => true,
            Repr::Operation(o) => self.has_variable() && o.op.invert.is_some(),
            Repr::Step { value, inner, .. } | Repr::Conditional { value, inner, .. } => {
                value.has_variable() && inner.is_invertible()
            }
            Repr::Constant(_) => false,
        }
    }

    /// Whether an antiderivative strategy exists at this node. This is a
    /// shallow check; nesting two non-linear operations still fails at
    /// integration time.
    pub fn is_integrable(&self) -> bool {
        match &self.repr {
            Repr::Variable(_) => true,
            Repr::Operation(o) => self.has_variable() && o.op.integrate.is_some(),
            _ => false,
        }
    }

    /// Whether the integral, once computed as a formula, is itself
    /// invertible
    pub fn is_integral_invertible(&self) -> bool {
        self.integral_formula()
            .map(|f| f.is_invertible())
            .unwrap_or(false)
    }

    // ========== Evaluation ==========

    pub fn evaluate(&self) -> Decimal {
        self.evaluate_with(None)
    }

    /// Evaluate, substituting `variable` for every free-variable leaf
    pub fn evaluate_with(&self, variable: Option<&Decimal>) -> Decimal {
        match &self.repr {
            Repr::Variable(live) => match variable {
                Some(v) => v.clone(),
                None => live(),
            },
            Repr::Constant(source) => source.value_with(variable),
            Repr::Operation(o) => {
                let inputs: Vec<Decimal> =
                    o.inputs.iter().map(|i| i.value_with(variable)).collect();
                (o.op.evaluate)(&inputs)
            }
            Repr::Step { value, start, inner } => {
                let lhs = value.value_with(variable);
                let start = start.value();
                if lhs < start {
                    lhs
                } else {
                    &start + &inner.evaluate_with(Some(&(&lhs - &start)))
                }
            }
            Repr::Conditional { value, condition, inner } => {
                let lhs = value.value_with(variable);
                if condition() {
                    inner.evaluate_with(Some(&lhs))
                } else {
                    lhs
                }
            }
        }
    }

    // ========== Inversion ==========

    /// Solve for the free variable value that evaluates to `value`
    pub fn invert(&self, value: &Decimal) -> Result<Decimal, FormulaError> {
        match &self.repr {
            Repr::Variable(_) => Ok(value.clone()),
            Repr::Operation(o) => {
                if !self.has_variable() {
                    return Err(FormulaError::NotInvertible { op: o.op.name });
                }
                let invert = o.op.invert.ok_or(FormulaError::NotInvertible { op: o.op.name })?;
                invert(value, &o.inputs)
            }
            Repr::Step { value: input, start, inner } => {
                if !input.has_variable() || !inner.is_invertible() {
                    return Err(FormulaError::NotInvertible { op: "step" });
                }
                let start = start.value();
                let target = if *value > start {
                    &start + &inner.invert(&(value - &start))?
                } else {
                    value.clone()
                };
                input.invert(&target)
            }
            Repr::Conditional { value: input, condition, inner } => {
                if !input.has_variable() || !inner.is_invertible() {
                    return Err(FormulaError::NotInvertible { op: "conditional" });
                }
                let target = if condition() {
                    inner.invert(value)?
                } else {
                    value.clone()
                };
                input.invert(&target)
            }
            Repr::Constant(_) => Err(FormulaError::NotInvertible { op: "constant" }),
        }
    }

    // ========== Integration ==========

    /// The antiderivative as a formula (outer mode, memoized)
    pub fn integral_formula(&self) -> Result<Arc<Formula>, FormulaError> {
        self.integral
            .get_or_init(|| self.compute_integral().map(Arc::new))
            .clone()
    }

    fn compute_integral(&self) -> Result<Formula, FormulaError> {
        match &self.repr {
            // ∫x dx = x²/2
            Repr::Variable(live) => {
                Ok(div(pow(Formula::variable(live.clone()), 2), 2))
            }
            Repr::Operation(o) if self.has_variable() => {
                let integrate =
                    o.op.integrate.ok_or(FormulaError::NotIntegrable { op: o.op.name })?;
                if o.op.apply_substitution.is_none() {
                    // This node is the single complex operation anchoring the
                    // expression; substitutions collected on the way down are
                    // threaded back through the finished antiderivative.
                    let mut stack = SubstitutionStack::default();
                    let formula = integrate(Some(&mut stack), &o.inputs)?;
                    stack.apply_all(formula)
                } else {
                    // A linear wrapper on the outside distributes over the
                    // integral directly.
                    integrate(None, &o.inputs)
                }
            }
            _ => Err(FormulaError::NotIntegrable { op: self.op_name() }),
        }
    }

    /// Inner-mode integration: this node sits beneath the complex operation
    /// and must be a linear wrapper (or the variable itself)
    pub(crate) fn integral_formula_with(
        &self,
        stack: &mut SubstitutionStack,
    ) -> Result<Formula, FormulaError> {
        match &self.repr {
            Repr::Variable(live) => Ok(Formula::variable(live.clone())),
            Repr::Operation(o) if self.has_variable() => {
                let apply = o.op.apply_substitution.ok_or(
                    FormulaError::NestedComplexOperation { op: o.op.name },
                )?;
                stack.push(apply, o.inputs.clone());
                let integrate = o
                    .op
                    .integrate_inner
                    .or(o.op.integrate)
                    .ok_or(FormulaError::NotIntegrable { op: o.op.name })?;
                integrate(Some(stack), &o.inputs)
            }
            _ => Err(FormulaError::NotIntegrable { op: self.op_name() }),
        }
    }

    /// Evaluate the antiderivative, optionally at an overridden variable
    /// value. The constant of integration is not included.
    pub fn evaluate_integral(&self, variable: Option<&Decimal>) -> Result<Decimal, FormulaError> {
        Ok(self.integral_formula()?.evaluate_with(variable))
    }

    /// Solve the antiderivative for the variable value producing `value`
    pub fn invert_integral(&self, value: &Decimal) -> Result<Decimal, FormulaError> {
        let integral = self.integral_formula()?;
        if !integral.is_invertible() {
            return Err(FormulaError::NotInvertible { op: integral.op_name() });
        }
        integral.invert(value)
    }

    /// Estimate the constant of integration from the identity that the
    /// integral at 1 should match the trapezoidal average of the function at
    /// 0 and 1
    pub fn calculate_constant_of_integration(&self) -> Result<Decimal, FormulaError> {
        let one = Decimal::one();
        let integral = self.evaluate_integral(Some(&one))?;
        let average = (&self.evaluate_with(Some(&Decimal::zero())) + &self.evaluate_with(Some(&one)))
            / Decimal::from(2);
        Ok(&average - &integral)
    }
}

// ========== Display ==========

impl fmt::Display for FormulaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaSource::Constant(v) => write!(f, "{}", v),
            FormulaSource::Dynamic(r) => write!(f, "{}", r()),
            FormulaSource::Formula(inner) => write!(f, "{}", inner),
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Variable(_) => write!(f, "x"),
            Repr::Constant(source) => write!(f, "{}", source),
            Repr::Operation(o) => {
                write!(f, "{}(", o.op.name)?;
                for (i, input) in o.inputs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", input)?;
                }
                write!(f, ")")
            }
            Repr::Step { value, start, inner } => {
                write!(f, "step({}, {}, {})", value, start, inner)
            }
            Repr::Conditional { value, inner, .. } => {
                write!(f, "if({}, {})", value, inner)
            }
        }
    }
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Formula({})", self)
    }
}

impl fmt::Debug for FormulaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FormulaSource({})", self)
    }
}
