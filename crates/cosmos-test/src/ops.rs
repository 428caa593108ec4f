//! Integer transforms used across tests and benches

use cosmos_core::{Possibility, Transform, Transition};

/// `x -> x * mul + add`, wrapping on overflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affine {
    pub mul: i64,
    pub add: i64,
}

impl Affine {
    pub fn add(n: i64) -> Self {
        Affine { mul: 1, add: n }
    }

    pub fn mul(n: i64) -> Self {
        Affine { mul: n, add: 0 }
    }

    /// Maps every state to `n`
    pub fn constant(n: i64) -> Self {
        Affine { mul: 0, add: n }
    }

    /// `other` applied after `self`
    pub fn then(self, other: Affine) -> Affine {
        Affine {
            mul: self.mul.wrapping_mul(other.mul),
            add: self.add.wrapping_mul(other.mul).wrapping_add(other.add),
        }
    }
}

impl Transform<i64> for Affine {
    fn apply(&self, state: &i64) -> i64 {
        state.wrapping_mul(self.mul).wrapping_add(self.add)
    }
}

/// A transition over `i64` backed by an [`Affine`] map
pub fn affine_transition(name: impl Into<String>, op: Affine, duration: f64) -> Transition<i64> {
    Transition::from_fn(name, op, duration)
}

/// A possibility over `i64` backed by an [`Affine`] map
pub fn affine_possibility(label: impl Into<String>, op: Affine, duration: f64) -> Possibility<i64> {
    Possibility::from_fn(label, op, duration)
}
