//! Buy-max walkthrough: a growing cost curve, a balance, and one bulk
//! purchase paid through the requirement layer.
//!
//!     cargo run --example buy_max

use buymax::{formula, CostRequirement, Decimal, Formula, Requirement, Resource};

fn main() {
    let points = Resource::new("points", Decimal::from(2_500));
    let generators = Resource::new("generators", Decimal::zero());

    // cost(n) = 10 · 1.15^n, the n-th generator's price
    let cost = formula::mul(
        formula::pow_base(
            Formula::variable(generators.reference()),
            Decimal::from_f64(1.15),
        ),
        10,
    );

    let requirement = CostRequirement::new(points.clone(), cost)
        .cumulative_cost(true)
        .max_bulk_amount(Decimal::infinity());

    let affordable = requirement.requirement_met();
    println!("{} afford {} generators", points, affordable);
    assert!(requirement.can_maximize());

    requirement.pay(&affordable);
    generators.add_amount(&affordable);
    println!("after buying: {} and {}", points, generators);
}
