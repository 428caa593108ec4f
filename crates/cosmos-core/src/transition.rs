//! Transitions - irreducible units of state change
//!
//! A transition is constructed free-standing and becomes valid only after
//! [`Transition::validate`] succeeds against a set of [`Constants`]. Until
//! then it can still be applied; it simply carries no axiom guarantees.

use std::fmt;
use std::ops::Shr;
use std::sync::Arc;

use tracing::trace;

use crate::{Constants, CosmosError, CosmosResult, Sequence, SharedTransform, Transform};

/// A named state transformation with duration, entropy and causal order
pub struct Transition<S> {
    name: String,
    transform: SharedTransform<S>,
    duration: f64,
    /// `None` until resolved by validation or given explicitly
    entropy: Option<f64>,
    causal_order: u64,
}

impl<S> Transition<S> {
    /// Create a transition with unresolved entropy and causal order 0
    pub fn new(name: impl Into<String>, transform: SharedTransform<S>, duration: f64) -> Self {
        Transition {
            name: name.into(),
            transform,
            duration,
            entropy: None,
            causal_order: 0,
        }
    }

    /// Create a transition from any transform value
    pub fn from_fn<T>(name: impl Into<String>, transform: T, duration: f64) -> Self
    where
        T: Transform<S> + 'static,
    {
        Self::new(name, Arc::new(transform), duration)
    }

    /// Set an explicit entropy
    pub fn with_entropy(mut self, entropy: f64) -> Self {
        self.entropy = Some(entropy);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transform(&self) -> &SharedTransform<S> {
        &self.transform
    }

    #[inline]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    #[inline]
    pub fn entropy(&self) -> Option<f64> {
        self.entropy
    }

    #[inline]
    pub fn causal_order(&self) -> u64 {
        self.causal_order
    }

    /// Assign the transition's position in a causal registry
    pub fn set_causal_order(&mut self, order: u64) {
        self.causal_order = order;
    }

    /// Apply the transform. No validation is performed.
    #[inline]
    pub fn apply(&self, state: &S) -> S {
        self.transform.apply(state)
    }

    /// Check the transition against the minimum duration and entropy.
    ///
    /// Unset entropy is resolved to `constants.min_entropy()` first and stays
    /// resolved even if a later check fails.
    pub fn validate(&mut self, constants: &Constants) -> CosmosResult<()> {
        let entropy = *self.entropy.get_or_insert(constants.min_entropy());

        if !(self.duration >= constants.min_duration()) {
            return Err(CosmosError::BelowMinimumDuration {
                name: self.name.clone(),
                duration: self.duration,
                min: constants.min_duration(),
            });
        }

        if !(entropy >= constants.min_entropy()) {
            return Err(CosmosError::BelowMinimumEntropy {
                name: self.name.clone(),
                entropy,
                min: constants.min_entropy(),
            });
        }

        Ok(())
    }

    /// Compose `self` then `other` into a new transition.
    ///
    /// Only the two immediate operands are checked against the rate bound:
    /// their combined duration must reach `2 / max_rate`.
    pub fn compose_with(&self, other: &Transition<S>, constants: &Constants) -> CosmosResult<Self>
    where
        S: 'static,
    {
        let duration = self.duration + other.duration;
        let min_allowed = constants.min_chain_duration(2);

        if !(duration >= min_allowed) {
            return Err(CosmosError::CausalRateViolation {
                duration,
                min_allowed,
            });
        }

        let entropy = match (self.entropy, other.entropy) {
            (Some(a), Some(b)) => Some(a + b),
            _ => None,
        };

        let composed = Transition {
            name: format!("{} >> {}", self.name, other.name),
            transform: Arc::new(Sequence::new(
                self.transform.clone(),
                other.transform.clone(),
            )),
            duration,
            entropy,
            causal_order: self.causal_order.max(other.causal_order) + 1,
        };

        trace!(
            name = %composed.name,
            duration,
            causal_order = composed.causal_order,
            "composed transitions"
        );

        Ok(composed)
    }

    /// Whether `other` can follow this transition.
    ///
    /// Every present transition is composable; finer compatibility rules are
    /// layered on by the orchestrator.
    pub fn is_composable_with(&self, other: Option<&Transition<S>>) -> bool {
        other.is_some()
    }
}

/// A composition waiting for the constants that bound it
pub type DeferredComposition<S> =
    Box<dyn Fn(&Constants) -> CosmosResult<Transition<S>> + Send + Sync>;

/// `&a >> &b` defers [`Transition::compose_with`] until constants are given:
/// `(&a >> &b)(&constants)`.
impl<S: 'static> Shr<&Transition<S>> for &Transition<S> {
    type Output = DeferredComposition<S>;

    fn shr(self, other: &Transition<S>) -> Self::Output {
        let (first, second) = (self.clone(), other.clone());
        Box::new(move |constants| first.compose_with(&second, constants))
    }
}

impl<S> Clone for Transition<S> {
    fn clone(&self) -> Self {
        Transition {
            name: self.name.clone(),
            transform: self.transform.clone(),
            duration: self.duration,
            entropy: self.entropy,
            causal_order: self.causal_order,
        }
    }
}

impl<S> fmt::Debug for Transition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("name", &self.name)
            .field("duration", &self.duration)
            .field("entropy", &self.entropy)
            .field("causal_order", &self.causal_order)
            .finish()
    }
}

impl<S> fmt::Display for Transition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (duration={}", self.name, self.duration)?;
        match self.entropy {
            Some(entropy) => write!(f, ", entropy={}", entropy)?,
            None => f.write_str(", entropy=unresolved")?,
        }
        write!(f, ", causal_order={})", self.causal_order)
    }
}
