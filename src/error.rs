//! Error types for formula evaluation, inversion and integration

use thiserror::Error;

/// Errors raised while inverting or integrating a formula
///
/// These are recoverable by design: the bulk-purchase layer catches them,
/// reports through `tracing` and substitutes a zero sentinel, so nothing
/// propagates into reactive recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// Inversion was requested on an operation with no inverse strategy,
    /// or on a formula without exactly one free variable occurrence
    #[error("formula is not invertible at operation '{op}'")]
    NotInvertible { op: &'static str },

    /// Integration was requested on an operation with no antiderivative
    /// strategy
    #[error("formula is not integrable at operation '{op}'")]
    NotIntegrable { op: &'static str },

    /// An invert/integrate strategy found no operand carrying the free
    /// variable
    #[error("no input to operation '{op}' carries the free variable")]
    VariableMissing { op: &'static str },

    /// Two non-linear operations were nested inside one integrable formula
    #[error("cannot have two complex operations in an integrable formula (at '{op}')")]
    NestedComplexOperation { op: &'static str },
}

pub use crate::decimal::DecimalError;
