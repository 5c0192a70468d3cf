//! Invertible and integrable cost formulas for incremental games
//!
//! `buymax` represents numeric cost/goal functions as composable symbolic
//! expression trees over arbitrary-precision decimals, and uses closed-form
//! inversion and integration of those trees to answer bulk-purchase
//! questions — "how many levels can I afford at once?" — without iterating a
//! cost curve level by level.
//!
//! # Features
//! - Arbitrary-precision [`Decimal`] numbers with infinity/NaN sentinels and
//!   the full hyperoperation family (tetration, super-log, Lambert W, ...)
//! - Immutable [`Formula`] expression trees with per-operator inversion and
//!   integration strategies and a substitution stack for composed expressions
//! - Hybrid bulk-purchase solving: closed-form estimates corrected by direct
//!   summation near the affordability boundary
//! - A thin requirement layer adapting formulas (or plain checks) into
//!   visibility/payment semantics for purchase actions
//!
//! # Example
//! ```
//! use buymax::{formula, Decimal, Formula, Resource};
//! use buymax::purchase::calculate_max_affordable;
//!
//! // cost(x) = x² + 5, where x is the number of upgrades already bought
//! let upgrades = Resource::new("upgrades", Decimal::zero());
//! let cost = formula::pow(Formula::variable(upgrades.reference()), 2) + 5;
//!
//! assert_eq!(cost.evaluate(), Decimal::from(5));
//! assert!(cost.is_invertible());
//!
//! let affordable = calculate_max_affordable(
//!     &cost,
//!     &Decimal::from(1000),
//!     false,
//!     None,
//!     &Decimal::infinity(),
//! );
//! // the highest level whose own price fits in 1000: 31² + 5 = 966
//! assert_eq!(affordable, Decimal::from(32));
//! ```
//!
//! Evaluation is synchronous, pure and single-threaded; the host's
//! reactivity system decides when to re-invoke it.

pub mod decimal;
mod error;
pub mod formula;
pub mod purchase;
pub mod requirements;
pub mod resource;

#[cfg(test)]
mod tests;

pub use decimal::{Decimal, DecimalError, MAX_HYPER_HEIGHT};
pub use error::FormulaError;
pub use formula::{BoolRef, DecimalRef, Formula, FormulaSource, SubstitutionStack};
pub use purchase::{calculate_cost, calculate_max_affordable};
pub use requirements::{
    max_requirements_met, pay_requirements, requirements_met, BooleanRequirement,
    CostRequirement, Requirement, Visibility,
};
pub use resource::Resource;
