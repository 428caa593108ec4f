//! Potential transitions - superposed candidate outcomes awaiting commitment
//!
//! A [`PotentialTransition`] pairs a latent state with the set of outcomes
//! that could follow it. Potentials over the same state aggregate by set
//! union; a [`DecisionRule`] later commits one outcome to a concrete
//! [`Transition`].

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::{CosmosError, CosmosResult, SharedTransform, Transform, Transition};

/// A candidate outcome. Identity is the label.
pub struct Possibility<S> {
    label: String,
    transform: SharedTransform<S>,
    duration: f64,
    entropy: Option<f64>,
}

impl<S> Possibility<S> {
    pub fn new(label: impl Into<String>, transform: SharedTransform<S>, duration: f64) -> Self {
        Possibility {
            label: label.into(),
            transform,
            duration,
            entropy: None,
        }
    }

    pub fn from_fn<T>(label: impl Into<String>, transform: T, duration: f64) -> Self
    where
        T: Transform<S> + 'static,
    {
        Self::new(label, Arc::new(transform), duration)
    }

    pub fn with_entropy(mut self, entropy: f64) -> Self {
        self.entropy = Some(entropy);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn entropy(&self) -> Option<f64> {
        self.entropy
    }

    /// Wrap this outcome into a fresh, unvalidated transition
    pub fn to_transition(&self) -> Transition<S> {
        let transition = Transition::new(self.label.clone(), self.transform.clone(), self.duration);
        match self.entropy {
            Some(entropy) => transition.with_entropy(entropy),
            None => transition,
        }
    }
}

impl<S> Clone for Possibility<S> {
    fn clone(&self) -> Self {
        Possibility {
            label: self.label.clone(),
            transform: self.transform.clone(),
            duration: self.duration,
            entropy: self.entropy,
        }
    }
}

impl<S> fmt::Debug for Possibility<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Possibility")
            .field("label", &self.label)
            .field("duration", &self.duration)
            .field("entropy", &self.entropy)
            .finish()
    }
}

/// Selects one possibility, by index, or none
pub trait DecisionRule<S>: Send + Sync {
    fn select(&self, possibilities: &[Possibility<S>]) -> Option<usize>;
}

impl<S, F> DecisionRule<S> for F
where
    F: Fn(&[Possibility<S>]) -> Option<usize> + Send + Sync,
{
    fn select(&self, possibilities: &[Possibility<S>]) -> Option<usize> {
        self(possibilities)
    }
}

/// Picks the first possibility in label order
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstViable;

impl<S> DecisionRule<S> for FirstViable {
    fn select(&self, possibilities: &[Possibility<S>]) -> Option<usize> {
        if possibilities.is_empty() {
            None
        } else {
            Some(0)
        }
    }
}

/// Picks the shortest possibility; ties go to the lowest label
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortestDuration;

impl<S> DecisionRule<S> for ShortestDuration {
    fn select(&self, possibilities: &[Possibility<S>]) -> Option<usize> {
        possibilities
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.duration.partial_cmp(&b.duration).unwrap_or(Ordering::Equal))
            .map(|(i, _)| i)
    }
}

/// Picks the possibility with the highest explicit entropy
#[derive(Debug, Clone, Copy, Default)]
pub struct HighestEntropy;

impl<S> DecisionRule<S> for HighestEntropy {
    fn select(&self, possibilities: &[Possibility<S>]) -> Option<usize> {
        possibilities
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.entropy.map(|e| (i, e)))
            .fold(None, |best: Option<(usize, f64)>, (i, e)| match best {
                Some((_, top)) if top >= e => best,
                _ => Some((i, e)),
            })
            .map(|(i, _)| i)
    }
}

/// Picks the possibility with the given label
#[derive(Debug, Clone)]
pub struct ByLabel(pub String);

impl<S> DecisionRule<S> for ByLabel {
    fn select(&self, possibilities: &[Possibility<S>]) -> Option<usize> {
        possibilities
            .binary_search_by(|p| p.label.as_str().cmp(self.0.as_str()))
            .ok()
    }
}

/// A latent state and its space of possible outcomes
pub struct PotentialTransition<S> {
    state: S,
    /// Sorted by label, no duplicate labels
    possibilities: Vec<Possibility<S>>,
}

impl<S> PotentialTransition<S> {
    /// Create a potential transition. The first occurrence of a label wins.
    pub fn new(state: S, possibilities: impl IntoIterator<Item = Possibility<S>>) -> Self {
        let mut potential = PotentialTransition {
            state,
            possibilities: Vec::new(),
        };
        for possibility in possibilities {
            potential.insert(possibility);
        }
        potential
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Possibilities in label order
    pub fn possibilities(&self) -> &[Possibility<S>] {
        &self.possibilities
    }

    pub fn len(&self) -> usize {
        self.possibilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.possibilities.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.position(label).is_ok()
    }

    fn position(&self, label: &str) -> Result<usize, usize> {
        self.possibilities
            .binary_search_by(|p| p.label.as_str().cmp(label))
    }

    /// Insert unless the label is already present
    fn insert(&mut self, possibility: Possibility<S>) -> bool {
        match self.position(&possibility.label) {
            Ok(_) => false,
            Err(at) => {
                self.possibilities.insert(at, possibility);
                true
            }
        }
    }

    /// Merge two potentials over the same state.
    ///
    /// The result holds the union of both possibility sets keyed by label.
    pub fn aggregate(&self, other: &PotentialTransition<S>) -> CosmosResult<Self>
    where
        S: Clone + PartialEq,
    {
        if self.state != other.state {
            return Err(CosmosError::StateMismatch);
        }

        let mut merged = self.clone();
        for possibility in &other.possibilities {
            merged.insert(possibility.clone());
        }
        Ok(merged)
    }

    /// Commit to a single outcome chosen by `rule`.
    ///
    /// The returned transition is unvalidated.
    pub fn commit<R>(&self, rule: &R) -> CosmosResult<Transition<S>>
    where
        R: DecisionRule<S> + ?Sized,
    {
        rule.select(&self.possibilities)
            .and_then(|i| self.possibilities.get(i))
            .map(Possibility::to_transition)
            .ok_or(CosmosError::NoViableOutcome)
    }
}

impl<S: Clone> Clone for PotentialTransition<S> {
    fn clone(&self) -> Self {
        PotentialTransition {
            state: self.state.clone(),
            possibilities: self.possibilities.clone(),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for PotentialTransition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PotentialTransition")
            .field("state", &self.state)
            .field("possibilities", &self.possibilities)
            .finish()
    }
}
