//! COSMOS Axioms
//!
//! These are the laws every transition is held to.
//!
//! # The Five Axioms
//!
//! 1. **Functional Composition** - The universe is a compositional structure of functions
//! 2. **Minimum Duration** - Every transition lasts at least `min_duration`
//! 3. **Minimum Entropy** - Every irreducible transition carries at least `min_entropy`
//! 4. **Causal Ordering** - Causality is the ordered composability of transitions
//! 5. **Composition Bound** - Composition never outruns `causal_bound / min_duration`
//!
//! ```rust
//! use cosmos_core::axioms::Axiom;
//!
//! assert_eq!(Axiom::MinimumDuration.code(), "AX-2");
//! assert_eq!(Axiom::all().len(), 5);
//! ```

use std::fmt;

/// The five axioms of a functional universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Axiom {
    /// AX-1: Functional Composition
    ///
    /// Every state change is a function from state to state, and chains of
    /// changes are the composition of those functions.
    FunctionalComposition = 1,

    /// AX-2: Minimum Duration
    ///
    /// No transition is shorter than `min_duration`. The bound is inclusive.
    MinimumDuration = 2,

    /// AX-3: Minimum Entropy
    ///
    /// No irreducible transition carries less than `min_entropy`.
    /// Unset entropy resolves to exactly the minimum.
    MinimumEntropy = 3,

    /// AX-4: Causal Ordering
    ///
    /// Only composable transitions influence each other, and committed
    /// transitions never form a cycle.
    CausalOrdering = 4,

    /// AX-5: Composition Bound
    ///
    /// `n` composed transitions span at least `n / max_rate` time units.
    CompositionBound = 5,
}

impl Axiom {
    /// Get the axiom code (e.g., "AX-1")
    pub fn code(&self) -> &'static str {
        match self {
            Axiom::FunctionalComposition => "AX-1",
            Axiom::MinimumDuration => "AX-2",
            Axiom::MinimumEntropy => "AX-3",
            Axiom::CausalOrdering => "AX-4",
            Axiom::CompositionBound => "AX-5",
        }
    }

    /// Get the short name of the axiom
    pub fn name(&self) -> &'static str {
        match self {
            Axiom::FunctionalComposition => "Functional Composition",
            Axiom::MinimumDuration => "Minimum Duration",
            Axiom::MinimumEntropy => "Minimum Entropy",
            Axiom::CausalOrdering => "Causal Ordering",
            Axiom::CompositionBound => "Composition Bound",
        }
    }

    /// Get all axioms
    pub fn all() -> &'static [Axiom] {
        &[
            Axiom::FunctionalComposition,
            Axiom::MinimumDuration,
            Axiom::MinimumEntropy,
            Axiom::CausalOrdering,
            Axiom::CompositionBound,
        ]
    }
}

impl fmt::Display for Axiom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.name())
    }
}
