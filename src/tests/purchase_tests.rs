//! Bulk-purchase calculations against brute-force per-level loops

use super::{assert_close, variable_at};
use crate::purchase::{calculate_cost, calculate_max_affordable};
use crate::{formula, Decimal, Formula};

/// Greedy reference: buy one level at a time while the next level's own
/// price fits in what remains (non-cumulative prices never deduct)
fn brute_force_affordable(cost: &Formula, available: &Decimal, cumulative: bool) -> Decimal {
    let baseline = cost.current_variable_value();
    let mut bought = Decimal::zero();
    let mut remaining = available.clone();
    loop {
        let next = cost.evaluate_with(Some(&(&baseline + &bought)));
        if next > remaining {
            return bought;
        }
        if cumulative {
            remaining = &remaining - &next;
        }
        bought = &bought + &Decimal::one();
        if bought > Decimal::from(100_000) {
            return bought;
        }
    }
}

#[test]
fn single_purchase_identity() {
    // an amount of exactly 1 always short-circuits to direct evaluation
    let (x, _level) = variable_at(7);
    let cost = formula::pow(x, 2) + 3;
    let expected = cost.evaluate();
    for cumulative in [false, true] {
        for direct_sum in [None, Some(0), Some(25)] {
            assert_eq!(
                calculate_cost(&cost, &Decimal::one(), cumulative, direct_sum),
                expected
            );
        }
    }
}

#[test]
fn flat_cost_of_three_levels() {
    // cost(x) = x + 5 bought 3 at once, non-cumulative: every level in the
    // bulk zone is charged the zone's final price, 3 × 7
    let (x, _level) = variable_at(0);
    let cost = formula::add(x, 5);
    assert_eq!(
        calculate_cost(&cost, &Decimal::from(3), false, Some(0)),
        Decimal::from(21)
    );
}

#[test]
fn direct_sum_window_charges_exact_prices() {
    // with the window covering the whole purchase, each level pays its own
    // price: 5 + 6 + 7
    let (x, _level) = variable_at(0);
    let cost = formula::add(x, 5);
    assert_eq!(
        calculate_cost(&cost, &Decimal::from(3), false, Some(10)),
        Decimal::from(18)
    );
}

#[test]
fn doubling_cost_affordability() {
    // cost(x) = 2^x, 100 currency, non-cumulative: levels 0..6 cost up to
    // 64 each, level 7 would cost 128
    let (x, _level) = variable_at(0);
    let cost = formula::pow_base(x, 2);
    let affordable =
        calculate_max_affordable(&cost, &Decimal::from(100), false, Some(0), &Decimal::infinity());
    assert_eq!(affordable, Decimal::from(7));
    assert_eq!(affordable, brute_force_affordable(&cost, &Decimal::from(100), false));
}

#[test]
fn single_level_short_circuit() {
    let (x, _level) = variable_at(0);
    let cost = formula::add(x, 5);
    let one = Decimal::one();
    assert_eq!(
        calculate_max_affordable(&cost, &Decimal::from(5), false, None, &one),
        Decimal::one()
    );
    assert_eq!(
        calculate_max_affordable(&cost, &Decimal::from(4), false, None, &one),
        Decimal::zero()
    );
}

#[test]
fn max_bulk_caps_the_result() {
    let (x, _level) = variable_at(0);
    let cost = formula::pow_base(x, 2);
    let capped =
        calculate_max_affordable(&cost, &Decimal::from(1_000_000), false, Some(0), &Decimal::from(4));
    assert_eq!(capped, Decimal::from(4));
}

#[test]
fn affordability_is_monotone_in_the_balance() {
    let (x, _level) = variable_at(0);
    let cost = formula::mul(formula::pow(x, 2), 3) + 10;
    let mut previous = Decimal::zero();
    for balance in [0i64, 5, 13, 50, 120, 1000, 25_000, 1_000_000] {
        let affordable = calculate_max_affordable(
            &cost,
            &Decimal::from(balance),
            true,
            None,
            &Decimal::infinity(),
        );
        assert!(
            affordable >= previous,
            "affordability regressed at balance {}: {} < {}",
            balance,
            affordable,
            previous
        );
        previous = affordable;
    }
}

#[test]
fn fully_direct_summed_matches_greedy_loop() {
    // direct_sum == max_bulk: the answer must equal the greedy loop exactly,
    // with no invertibility involved
    let (x, _level) = variable_at(0);
    let cost = formula::pow_base(x, 2);
    for balance in [0i64, 1, 2, 5, 100, 1000] {
        let balance = Decimal::from(balance);
        let affordable =
            calculate_max_affordable(&cost, &balance, true, Some(12), &Decimal::from(12));
        assert_eq!(
            affordable,
            brute_force_affordable(&cost, &balance, true).min(&Decimal::from(12)),
            "mismatch at balance {}",
            balance
        );
    }
}

#[test]
fn direct_summation_needs_no_invertibility() {
    // max(x, 3) has only a placeholder inverse, but a capped bulk amount
    // within the window never asks for one
    let (x, _level) = variable_at(0);
    let cost = formula::max(x, 3);
    let affordable =
        calculate_max_affordable(&cost, &Decimal::from(9), true, Some(5), &Decimal::from(5));
    assert_eq!(affordable, Decimal::from(3));
}

#[test]
fn non_invertible_bulk_request_fails_to_zero() {
    // pentate has no inverse; asking for unbounded bulk must collapse to the
    // zero sentinel rather than crash
    let (x, _level) = variable_at(0);
    let cost = formula::pentate(x, 2);
    let affordable =
        calculate_max_affordable(&cost, &Decimal::from(100), false, Some(0), &Decimal::infinity());
    assert_eq!(affordable, Decimal::zero());
}

#[test]
fn cumulative_affordability_covers_the_area() {
    // cost(x) = x bought cumulatively from 50 currency: n²/2 ≤ 50 plus the
    // direct-sum correction lands on the greedy answer
    let (x, _level) = variable_at(0);
    let cost = formula::mul(x, 1);
    let affordable =
        calculate_max_affordable(&cost, &Decimal::from(50), true, None, &Decimal::infinity());
    assert_eq!(affordable, brute_force_affordable(&cost, &Decimal::from(50), true));
}

#[test]
fn cumulative_cost_is_integral_difference_plus_window() {
    let (x, level) = variable_at(0);
    let cost = formula::mul(x, 1);
    // 20 levels from a baseline of 4, window 10: integral over [4, 14] plus
    // exact prices for levels 14..23
    level.set_amount(Decimal::from(4));
    let total = calculate_cost(&cost, &Decimal::from(20), true, None);
    let integral_part = (14.0 * 14.0 - 4.0 * 4.0) / 2.0;
    let direct_part: f64 = (14..24).map(|l| l as f64).sum();
    assert_close(&total, &Decimal::from_f64(integral_part + direct_part));
}

#[test]
fn astronomically_large_targets_skip_the_loop() {
    let (x, _level) = variable_at(0);
    let cost = formula::add(x, 1);
    let huge: Decimal = "1e320".parse().unwrap();
    let total = calculate_cost(&cost, &huge, false, Some(10));
    // final-level pricing dominates; the answer must stay finite and huge
    assert!(total.is_finite());
    assert!(total.approx_log10() > 600.0);
}

#[test]
fn growing_costs_against_brute_force() {
    let (x, _level) = variable_at(0);
    let cost = formula::mul(formula::pow_base(x, Decimal::from_f64(1.15)), 10);
    for balance in [10i64, 100, 1000, 123_456] {
        let balance = Decimal::from(balance);
        let fast =
            calculate_max_affordable(&cost, &balance, false, Some(0), &Decimal::infinity());
        assert_eq!(
            fast,
            brute_force_affordable(&cost, &balance, false),
            "mismatch at balance {}",
            balance
        );
    }
}
