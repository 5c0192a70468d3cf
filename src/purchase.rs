//! Bulk-purchase calculations: how many levels a balance affords, and what
//! buying a batch of levels costs
//!
//! Both entry points combine a closed-form estimate (inverting the formula,
//! or its integral for cumulative costing) with a direct per-level summation
//! near the affordability boundary. The closed form is a continuous
//! relaxation of a stepped cost curve and drifts near the boundary; summing
//! the last few levels directly removes the visible rounding error while
//! keeping huge purchase counts cheap to answer.
//!
//! These functions run inside reactive getters, so failures never propagate:
//! they are reported through `tracing` and collapse to a zero sentinel
//! ("behaves as unaffordable").

use tracing::error;

use crate::decimal::Decimal;
use crate::formula::Formula;

/// Default number of boundary levels summed directly under cumulative
/// costing
pub const DEFAULT_DIRECT_SUM: u32 = 10;

/// Upper bound on greedy correction steps, for degenerate (non-increasing)
/// cost formulas that would otherwise never leave the loop
const DIRECT_SUM_HARD_CAP: u32 = 65_536;

/// Target purchase counts past this magnitude skip per-level work entirely
fn large_target_threshold() -> Decimal {
    Decimal::from_f64(f64::MAX)
}

fn direct_sum_window(direct_sum: Option<u32>, cumulative_cost: bool) -> u32 {
    direct_sum.unwrap_or(if cumulative_cost { DEFAULT_DIRECT_SUM } else { 0 })
}

/// How many levels of `formula` the `available` balance affords
///
/// With `cumulative_cost`, each level's price is modeled as if earlier levels
/// in the same transaction were already bought (area under the cost curve);
/// the formula then needs an invertible integral. Without it, a single
/// inversion of the balance answers the question. `max_bulk_amount` caps the
/// result; when the cap is within the direct-sum window no invertibility is
/// needed at all.
pub fn calculate_max_affordable(
    formula: &Formula,
    available: &Decimal,
    cumulative_cost: bool,
    direct_sum: Option<u32>,
    max_bulk_amount: &Decimal,
) -> Decimal {
    if *max_bulk_amount == Decimal::one() {
        return if *available >= formula.evaluate() {
            Decimal::one()
        } else {
            Decimal::zero()
        };
    }

    let window = direct_sum_window(direct_sum, cumulative_cost);
    let window_dec = Decimal::from(window);
    let baseline = formula.current_variable_value();

    let mut affordable = if *max_bulk_amount > window_dec {
        let estimate = if cumulative_cost {
            bulk_estimate_cumulative(formula, available, &baseline)
        } else {
            bulk_estimate_plain(formula, available, &baseline)
        };
        match estimate {
            Ok(value) => value,
            Err(err) => {
                error!(%err, "cannot compute bulk affordability for {}", formula);
                return Decimal::zero();
            }
        }
    } else {
        // the cap fits inside the direct-sum window; summation alone answers
        Decimal::zero()
    };

    affordable = affordable.clamp_max(max_bulk_amount);

    if window > 0 {
        affordable = (&affordable - &window_dec).clamp_min(&Decimal::zero());
        let mut summed = if affordable.is_zero() {
            Decimal::zero()
        } else {
            calculate_cost(formula, &affordable, cumulative_cost, Some(0))
        };
        let mut steps = 0u32;
        while affordable < *max_bulk_amount && steps < DIRECT_SUM_HARD_CAP {
            let next_cost = formula.evaluate_with(Some(&(&baseline + &affordable)));
            if next_cost.is_nan() {
                break;
            }
            let total = &summed + &next_cost;
            if total <= *available {
                summed = total;
                affordable = &affordable + &Decimal::one();
                steps += 1;
            } else {
                break;
            }
        }
    }

    affordable.clamp_min(&Decimal::zero())
}

/// floor(F⁻¹(balance + F(current))) − current, the area-under-the-curve
/// approximation of cumulative affordability
fn bulk_estimate_cumulative(
    formula: &Formula,
    available: &Decimal,
    baseline: &Decimal,
) -> Result<Decimal, crate::error::FormulaError> {
    if !formula.is_invertible() {
        return Err(crate::error::FormulaError::NotInvertible { op: "cumulative" });
    }
    let spent_so_far = formula.evaluate_integral(None)?;
    let inverted = formula.invert_integral(&(available + &spent_so_far))?;
    Ok(&inverted.floor() - baseline)
}

/// floor(f⁻¹(balance)) + 1 − current: the highest level whose own price fits
fn bulk_estimate_plain(
    formula: &Formula,
    available: &Decimal,
    baseline: &Decimal,
) -> Result<Decimal, crate::error::FormulaError> {
    let inverted = formula.invert(available)?;
    Ok(&(&inverted.floor() + &Decimal::one()) - baseline)
}

/// Total cost of buying `amount` levels of `formula` starting at its current
/// variable value
///
/// An amount of exactly 1 always short-circuits to direct evaluation. The
/// levels beyond the direct-sum window are costed in closed form: an
/// integral difference under cumulative costing, a flat
/// final-level-price × count otherwise. Astronomically large targets skip
/// the per-level loop and charge the marginal price for the whole remainder.
pub fn calculate_cost(
    formula: &Formula,
    amount: &Decimal,
    cumulative_cost: bool,
    direct_sum: Option<u32>,
) -> Decimal {
    if *amount == Decimal::one() {
        return formula.evaluate();
    }

    let baseline = formula.current_variable_value();
    let target = &baseline + amount;
    let window = Decimal::from(direct_sum_window(direct_sum, cumulative_cost));
    let bulk_target = (&target - &window).clamp_min(&baseline);

    let mut cost = if bulk_target > baseline {
        if cumulative_cost {
            let upper = formula.evaluate_integral(Some(&bulk_target));
            let lower = formula.evaluate_integral(None);
            match (upper, lower) {
                (Ok(upper), Ok(lower)) => &upper - &lower,
                (Err(err), _) | (_, Err(err)) => {
                    error!(%err, "cannot compute cumulative cost for {}", formula);
                    return Decimal::zero();
                }
            }
        } else {
            let final_level = &bulk_target - &Decimal::one();
            (&bulk_target - &baseline) * formula.evaluate_with(Some(&final_level))
        }
    } else {
        Decimal::zero()
    };

    if target > large_target_threshold() {
        let remaining = &target - &bulk_target;
        return &cost + &(remaining * formula.evaluate_with(Some(&bulk_target)));
    }

    let mut level = bulk_target;
    while level < target {
        cost = &cost + &formula.evaluate_with(Some(&level));
        level = &level + &Decimal::one();
    }
    cost
}
