//! Shared game resources
//!
//! A [`Resource`] is a named decimal amount behind a shared lock. Formula
//! evaluation only ever reads it; the one mutation path is the requirement
//! layer's pay side effect, which runs synchronously inside a single game
//! action.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::decimal::Decimal;
use crate::formula::DecimalRef;

#[derive(Clone)]
pub struct Resource {
    name: Arc<str>,
    amount: Arc<RwLock<Decimal>>,
}

impl Resource {
    pub fn new(name: impl Into<String>, initial: Decimal) -> Self {
        Resource {
            name: Arc::from(name.into()),
            amount: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> Decimal {
        self.amount.read().clone()
    }

    pub fn set_amount(&self, value: Decimal) {
        *self.amount.write() = value;
    }

    pub fn add_amount(&self, delta: &Decimal) {
        let mut amount = self.amount.write();
        *amount = &*amount + delta;
    }

    /// Deduct a cost, clamping at zero
    pub fn spend(&self, cost: &Decimal) {
        let mut amount = self.amount.write();
        *amount = (&*amount - cost).clamp_min(&Decimal::zero());
    }

    /// A reactive reference reading this resource's current amount, for use
    /// as a formula variable or dynamic input
    pub fn reference(&self) -> DecimalRef {
        let amount = Arc::clone(&self.amount);
        Arc::new(move || amount.read().clone())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount(), self.name)
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Resource({} = {})", self.name, self.amount())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spend_clamps_at_zero() {
        let points = Resource::new("points", Decimal::from(10));
        points.spend(&Decimal::from(4));
        assert_eq!(points.amount(), Decimal::from(6));
        points.spend(&Decimal::from(100));
        assert_eq!(points.amount(), Decimal::zero());
    }

    #[test]
    fn reference_tracks_updates() {
        let points = Resource::new("points", Decimal::from(3));
        let reference = points.reference();
        assert_eq!(reference(), Decimal::from(3));
        points.set_amount(Decimal::from(8));
        assert_eq!(reference(), Decimal::from(8));
    }
}
