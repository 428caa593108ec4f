//! proptest strategies for COSMOS types

use std::ops::Range;

use cosmos_core::{Constants, PotentialTransition, Transition};
use proptest::collection::vec;
use proptest::option;
use proptest::prelude::*;

use crate::{affine_possibility, affine_transition, Affine};

/// Small affine maps; coefficients stay small so failures read easily
pub fn affine() -> impl Strategy<Value = Affine> {
    (-4i64..=4, -100i64..=100).prop_map(|(mul, add)| Affine { mul, add })
}

/// Valid constants across several orders of magnitude
pub fn constants() -> impl Strategy<Value = Constants> {
    (0.01f64..10.0, 0.01f64..10.0, 0.1f64..100.0).prop_map(|(d, e, c)| {
        Constants::new(d, e, c).expect("strategy only yields positive scalars")
    })
}

/// Shortest duration that both validates and keeps every pairwise
/// composition within the rate bound
pub fn composable_floor(constants: &Constants) -> f64 {
    constants.min_duration().max(1.0 / constants.max_rate())
}

/// Validated transitions that compose left to right without error
pub fn composable_chain(
    constants: Constants,
    len: Range<usize>,
) -> impl Strategy<Value = Vec<Transition<i64>>> {
    let floor = composable_floor(&constants);
    let min_entropy = constants.min_entropy();

    vec(
        (
            affine(),
            floor..floor * 4.0,
            option::of(min_entropy..min_entropy * 4.0),
        ),
        len,
    )
    .prop_map(move |steps| {
        steps
            .into_iter()
            .enumerate()
            .map(|(i, (op, duration, entropy))| {
                let mut t = affine_transition(format!("t{}", i), op, duration);
                if let Some(entropy) = entropy {
                    t = t.with_entropy(entropy);
                }
                t.validate(&constants)
                    .expect("strategy only yields valid transitions");
                t
            })
            .collect()
    })
}

/// Potential transitions over `state` whose labels collide often
pub fn potential(state: i64) -> impl Strategy<Value = PotentialTransition<i64>> {
    vec((0u8..6, affine(), 0.5f64..3.0), 0..6).prop_map(move |candidates| {
        PotentialTransition::new(
            state,
            candidates
                .into_iter()
                .map(|(label, op, duration)| affine_possibility(format!("p{}", label), op, duration)),
        )
    })
}
