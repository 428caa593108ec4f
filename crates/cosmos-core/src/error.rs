//! Error types for COSMOS

use thiserror::Error;

use crate::Axiom;

/// Core COSMOS errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CosmosError {
    // Configuration errors
    #[error("Invalid constant: {name} must be finite and positive, got {value}")]
    InvalidConstant { name: &'static str, value: f64 },

    // Axiom violations on a single transition
    #[error("Transition '{name}' duration {duration} is below minimum duration {min}")]
    BelowMinimumDuration { name: String, duration: f64, min: f64 },

    #[error("Transition '{name}' entropy {entropy} is below minimum entropy {min}")]
    BelowMinimumEntropy { name: String, entropy: f64, min: f64 },

    // Composition errors
    #[error("Composition would violate causal rate bound: {duration} < {min_allowed}")]
    CausalRateViolation { duration: f64, min_allowed: f64 },

    #[error("Cannot compose empty transition chain")]
    EmptyChain,

    #[error("Transitions '{left}' and '{right}' are not composable")]
    NotComposable { left: String, right: String },

    // Potential transition errors
    #[error("Cannot aggregate potential transitions over different states")]
    StateMismatch,

    #[error("Decision rule selected no viable outcome")]
    NoViableOutcome,

    // Causality errors
    #[error("Causal inconsistency: {0}")]
    CausalInconsistency(String),

    #[error("Transition '{name}' has unresolved entropy; validate it first")]
    UnresolvedEntropy { name: String },

    // Universe errors
    #[error("Universe has no current state")]
    NoCurrentState,
}

impl CosmosError {
    /// The axiom this error is a violation of, if any
    pub fn axiom(&self) -> Option<Axiom> {
        match self {
            CosmosError::BelowMinimumDuration { .. } => Some(Axiom::MinimumDuration),
            CosmosError::BelowMinimumEntropy { .. } => Some(Axiom::MinimumEntropy),
            CosmosError::CausalRateViolation { .. } => Some(Axiom::CompositionBound),
            CosmosError::NotComposable { .. } | CosmosError::CausalInconsistency(_) => {
                Some(Axiom::CausalOrdering)
            }
            _ => None,
        }
    }

    /// Whether a commit batch may drop the offending candidate and carry on.
    ///
    /// Only axiom failures of the candidate itself and rejected graph
    /// insertions qualify; everything else aborts the commit.
    pub fn is_commit_recoverable(&self) -> bool {
        matches!(
            self,
            CosmosError::BelowMinimumDuration { .. }
                | CosmosError::BelowMinimumEntropy { .. }
                | CosmosError::CausalInconsistency(_)
        )
    }
}

/// Result type for COSMOS operations
pub type CosmosResult<T> = Result<T, CosmosError>;
