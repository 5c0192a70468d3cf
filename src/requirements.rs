//! Requirements: the boundary between cost formulas and purchase actions
//!
//! A requirement pairs a cost or condition with visibility and payment
//! semantics. UI code asks how many levels are currently affordable
//! (`requirement_met`), whether bulk buying past the direct-sum window is
//! supported (`can_maximize`), and triggers the pay side effect once the
//! player commits. Display callbacks are carried opaquely; rendering them is
//! the host's concern.

use std::sync::Arc;

use crate::decimal::Decimal;
use crate::formula::{Formula, FormulaSource};
use crate::purchase::{calculate_cost, calculate_max_affordable, DEFAULT_DIRECT_SUM};
use crate::resource::Resource;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// UI rendering callback, opaque to the engine
pub type DisplayFn = Arc<dyn Fn(&Decimal) -> String + Send + Sync>;

pub trait Requirement {
    fn visibility(&self) -> Visibility {
        Visibility::Visible
    }

    /// How many levels are currently affordable (0 or 1 for plain checks)
    fn requirement_met(&self) -> Decimal;

    fn requires_pay(&self) -> bool {
        true
    }

    /// Whether bulk amounts beyond the direct-sum window can be computed.
    /// Callers should fall back to single-level behavior when this is false.
    fn can_maximize(&self) -> bool {
        false
    }

    fn pay(&self, _amount: &Decimal) {}

    fn display(&self, _amount: &Decimal) -> Option<String> {
        None
    }

    fn partial_display(&self, amount: &Decimal) -> Option<String> {
        self.display(amount)
    }
}

/// A cost in a resource: a plain (possibly reactive) amount per level, or a
/// formula over the purchase level
pub struct CostRequirement {
    resource: Resource,
    cost: FormulaSource,
    visibility: Visibility,
    requires_pay: bool,
    cumulative_cost: bool,
    max_bulk_amount: FormulaSource,
    direct_sum: Option<u32>,
    display: Option<DisplayFn>,
}

impl CostRequirement {
    pub fn new(resource: Resource, cost: impl Into<FormulaSource>) -> Self {
        CostRequirement {
            resource,
            cost: cost.into(),
            visibility: Visibility::Visible,
            requires_pay: true,
            cumulative_cost: true,
            max_bulk_amount: FormulaSource::Constant(Decimal::one()),
            direct_sum: None,
            display: None,
        }
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn requires_pay(mut self, requires_pay: bool) -> Self {
        self.requires_pay = requires_pay;
        self
    }

    /// Whether each level's price assumes earlier levels in the same
    /// transaction were already bought
    pub fn cumulative_cost(mut self, cumulative_cost: bool) -> Self {
        self.cumulative_cost = cumulative_cost;
        self
    }

    pub fn max_bulk_amount(mut self, max_bulk_amount: impl Into<FormulaSource>) -> Self {
        self.max_bulk_amount = max_bulk_amount.into();
        self
    }

    pub fn direct_sum(mut self, direct_sum: u32) -> Self {
        self.direct_sum = Some(direct_sum);
        self
    }

    pub fn display_with(mut self, display: DisplayFn) -> Self {
        self.display = Some(display);
        self
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    fn direct_sum_window(&self) -> u32 {
        self.direct_sum
            .unwrap_or(if self.cumulative_cost { DEFAULT_DIRECT_SUM } else { 0 })
    }

    fn cost_formula(&self) -> Option<&Arc<Formula>> {
        match &self.cost {
            FormulaSource::Formula(f) => Some(f),
            _ => None,
        }
    }
}

impl Requirement for CostRequirement {
    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn requirement_met(&self) -> Decimal {
        let available = self.resource.amount();
        match self.cost_formula() {
            Some(formula) => calculate_max_affordable(
                formula,
                &available,
                self.cumulative_cost,
                self.direct_sum,
                &self.max_bulk_amount.value(),
            ),
            None => {
                if available >= self.cost.value() {
                    Decimal::one()
                } else {
                    Decimal::zero()
                }
            }
        }
    }

    fn requires_pay(&self) -> bool {
        self.requires_pay
    }

    fn can_maximize(&self) -> bool {
        let Some(formula) = self.cost_formula() else {
            return false;
        };
        let max_bulk = self.max_bulk_amount.value();
        if max_bulk <= Decimal::from(self.direct_sum_window()) {
            // direct summation alone answers; no invertibility needed
            return true;
        }
        if self.cumulative_cost {
            formula.is_invertible() && formula.is_integral_invertible()
        } else {
            formula.is_invertible()
        }
    }

    fn pay(&self, amount: &Decimal) {
        if !self.requires_pay {
            return;
        }
        let cost = match self.cost_formula() {
            Some(formula) => {
                calculate_cost(formula, amount, self.cumulative_cost, self.direct_sum)
            }
            None => &self.cost.value() * amount,
        };
        self.resource.spend(&cost);
    }

    fn display(&self, amount: &Decimal) -> Option<String> {
        self.display.as_ref().map(|display| display(amount))
    }
}

/// A plain boolean condition as a requirement
pub struct BooleanRequirement {
    predicate: Arc<dyn Fn() -> bool + Send + Sync>,
    visibility: Visibility,
    display: Option<DisplayFn>,
}

impl BooleanRequirement {
    pub fn new(predicate: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        BooleanRequirement {
            predicate: Arc::new(predicate),
            visibility: Visibility::Visible,
            display: None,
        }
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn display_with(mut self, display: DisplayFn) -> Self {
        self.display = Some(display);
        self
    }
}

impl Requirement for BooleanRequirement {
    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn requirement_met(&self) -> Decimal {
        if (self.predicate)() {
            Decimal::one()
        } else {
            Decimal::zero()
        }
    }

    fn requires_pay(&self) -> bool {
        false
    }

    fn display(&self, amount: &Decimal) -> Option<String> {
        self.display.as_ref().map(|display| display(amount))
    }
}

/// Whether every requirement is currently met at least once
pub fn requirements_met(requirements: &[&dyn Requirement]) -> bool {
    requirements
        .iter()
        .all(|req| req.requirement_met() >= Decimal::one())
}

/// The highest level count satisfying every requirement simultaneously
pub fn max_requirements_met(requirements: &[&dyn Requirement]) -> Decimal {
    requirements
        .iter()
        .map(|req| req.requirement_met())
        .fold(Decimal::infinity(), |acc, met| acc.min(&met))
}

/// Trigger every paying requirement's side effect for a purchase of
/// `amount` levels
pub fn pay_requirements(requirements: &[&dyn Requirement], amount: &Decimal) {
    for req in requirements {
        if req.requires_pay() {
            req.pay(amount);
        }
    }
}
