//! Universe - orchestrates transitions under one set of constants
//!
//! Two modes share the constants and the transition registry:
//! - Direct mode: create, compose and evolve through explicit transitions
//! - Aggregate/commit mode: collect potential transitions, then commit each
//!   through a decision rule into the causal graph

use std::fmt;
use std::hash::Hash;
use std::mem;
use std::sync::Arc;

use cosmos_core::{
    Constants, CosmosError, CosmosResult, DecisionRule, PotentialTransition, Transform, Transition,
};
use tracing::debug;

use crate::CausalGraph;

/// Extra compatibility check applied by [`Universe::compose`]
pub trait CompositionRule<S>: Send + Sync {
    fn allows(&self, first: &Transition<S>, second: &Transition<S>) -> bool;
}

impl<S, F> CompositionRule<S> for F
where
    F: Fn(&Transition<S>, &Transition<S>) -> bool + Send + Sync,
{
    fn allows(&self, first: &Transition<S>, second: &Transition<S>) -> bool {
        self(first, second)
    }
}

/// Accepts every pair of transitions
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyComposable;

impl<S> CompositionRule<S> for AnyComposable {
    fn allows(&self, _first: &Transition<S>, _second: &Transition<S>) -> bool {
        true
    }
}

/// The universe as a compositional structure of transitions
pub struct Universe<S> {
    /// Governing constants
    constants: Constants,
    /// Registered transitions in causal order
    transitions: Vec<Transition<S>>,
    /// Aggregation space awaiting commitment
    pending: Vec<PotentialTransition<S>>,
    /// Committed transitions between states
    graph: CausalGraph<S>,
    /// Current state cursor
    current_state: Option<S>,
    composition_rule: Arc<dyn CompositionRule<S>>,
}

impl<S> Universe<S>
where
    S: Clone + Eq + Hash + 'static,
{
    /// Create a universe with default constants
    pub fn new() -> Self {
        Self::with_constants(Constants::default())
    }

    /// Create a universe with the given constants
    pub fn with_constants(constants: Constants) -> Self {
        Universe {
            constants,
            transitions: Vec::new(),
            pending: Vec::new(),
            graph: CausalGraph::new(),
            current_state: None,
            composition_rule: Arc::new(AnyComposable),
        }
    }

    /// Replace the composition rule used by [`Universe::compose`]
    pub fn with_composition_rule<R>(mut self, rule: R) -> Self
    where
        R: CompositionRule<S> + 'static,
    {
        self.composition_rule = Arc::new(rule);
        self
    }

    pub fn constants(&self) -> &Constants {
        &self.constants
    }

    /// All registered transitions in causal order
    pub fn transitions(&self) -> &[Transition<S>] {
        &self.transitions
    }

    /// Potential transitions awaiting commitment
    pub fn pending(&self) -> &[PotentialTransition<S>] {
        &self.pending
    }

    pub fn graph(&self) -> &CausalGraph<S> {
        &self.graph
    }

    pub fn current_state(&self) -> Option<&S> {
        self.current_state.as_ref()
    }

    pub fn set_current_state(&mut self, state: S) {
        self.current_state = Some(state);
    }

    fn next_causal_order(&self) -> u64 {
        self.transitions.len() as u64 + 1
    }

    /// Validate and register a transition.
    ///
    /// Its causal order becomes the registry size after insertion.
    pub fn add_transition(&mut self, transition: Transition<S>) -> CosmosResult<&mut Self> {
        self.register(transition)?;
        Ok(self)
    }

    /// Build, validate and register a transition, returning the registered copy
    pub fn create_transition<T>(
        &mut self,
        name: impl Into<String>,
        transform: T,
        duration: f64,
        entropy: Option<f64>,
    ) -> CosmosResult<Transition<S>>
    where
        T: Transform<S> + 'static,
    {
        let mut transition = Transition::from_fn(name, transform, duration);
        if let Some(entropy) = entropy {
            transition = transition.with_entropy(entropy);
        }

        self.register(transition)
    }

    fn register(&mut self, mut transition: Transition<S>) -> CosmosResult<Transition<S>> {
        transition.validate(&self.constants)?;
        transition.set_causal_order(self.next_causal_order());

        debug!(
            name = transition.name(),
            causal_order = transition.causal_order(),
            "registered transition"
        );
        self.transitions.push(transition.clone());
        Ok(transition)
    }

    /// Compose two transitions under this universe's constants
    pub fn compose(&self, first: &Transition<S>, second: &Transition<S>) -> CosmosResult<Transition<S>> {
        if !first.is_composable_with(Some(second)) || !self.composition_rule.allows(first, second) {
            return Err(CosmosError::NotComposable {
                left: first.name().to_string(),
                right: second.name().to_string(),
            });
        }

        first.compose_with(second, &self.constants)
    }

    /// Compose a chain left to right into a single transition
    pub fn compose_chain(&self, transitions: &[Transition<S>]) -> CosmosResult<Transition<S>> {
        let (head, rest) = transitions.split_first().ok_or(CosmosError::EmptyChain)?;

        rest.iter()
            .try_fold(head.clone(), |acc, next| self.compose(&acc, next))
    }

    /// Apply transitions in order, moving the current state cursor each step
    pub fn evolve(&mut self, initial: S, transitions: &[Transition<S>]) -> S {
        let mut state = initial;
        self.current_state = Some(state.clone());

        for transition in transitions {
            state = transition.apply(&state);
            self.current_state = Some(state.clone());
        }

        state
    }

    /// Add a potential transition to the aggregation space
    pub fn aggregate(&mut self, potential: PotentialTransition<S>) -> &mut Self {
        self.pending.push(potential);
        self
    }

    /// Remove and return every pending potential transition
    pub fn discard_pending(&mut self) -> Vec<PotentialTransition<S>> {
        mem::take(&mut self.pending)
    }

    /// Commit every pending potential transition from `state`.
    ///
    /// Every potential is resolved through `rule` before anything is
    /// recorded. If one cannot be resolved the error is returned and the
    /// universe is left untouched, pending set included. Otherwise the
    /// pending set is emptied; candidates that violate an axiom or would
    /// close a causal cycle are dropped, and the current state moves to the
    /// last committed post-state.
    pub fn commit<R>(&mut self, state: &S, rule: &R) -> CosmosResult<Vec<Transition<S>>>
    where
        R: DecisionRule<S> + ?Sized,
    {
        let resolved = self
            .pending
            .iter()
            .map(|potential| potential.commit(rule))
            .collect::<CosmosResult<Vec<_>>>()?;
        self.pending.clear();

        let mut committed = Vec::with_capacity(resolved.len());
        let mut last_post = None;
        let mut failure = None;

        for transition in resolved {
            match self.record_candidate(state, transition) {
                Ok((transition, post)) => {
                    debug!(
                        name = transition.name(),
                        causal_order = transition.causal_order(),
                        "committed transition"
                    );
                    self.transitions.push(transition.clone());
                    committed.push(transition);
                    last_post = Some(post);
                }
                Err(err) if err.is_commit_recoverable() => {
                    debug!("dropped candidate: {}", err);
                }
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        if let Some(post) = last_post {
            self.current_state = Some(post);
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(committed),
        }
    }

    fn record_candidate(&mut self, state: &S, mut transition: Transition<S>) -> CosmosResult<(Transition<S>, S)> {
        transition.validate(&self.constants)?;
        transition.set_causal_order(self.next_causal_order());

        let post = self.graph.record_transition(state, transition.clone())?;
        Ok((transition, post))
    }

    /// Commit pending potentials from the current state
    pub fn step<R>(&mut self, rule: &R) -> CosmosResult<Vec<Transition<S>>>
    where
        R: DecisionRule<S> + ?Sized,
    {
        let state = self.current_state.clone().ok_or(CosmosError::NoCurrentState)?;
        self.commit(&state, rule)
    }

    /// Total duration of a sequence of transitions
    pub fn total_duration(&self, transitions: &[Transition<S>]) -> f64 {
        transitions.iter().map(Transition::duration).sum()
    }

    /// Total entropy of a sequence of validated transitions
    pub fn total_entropy(&self, transitions: &[Transition<S>]) -> CosmosResult<f64> {
        transitions.iter().try_fold(0.0, |total, t| {
            t.entropy()
                .map(|e| total + e)
                .ok_or_else(|| CosmosError::UnresolvedEntropy {
                    name: t.name().to_string(),
                })
        })
    }

    /// Whether the sequence respects the composition rate bound
    pub fn is_causal_rate_valid(&self, transitions: &[Transition<S>]) -> bool {
        transitions.is_empty()
            || self.total_duration(transitions) >= self.constants.min_chain_duration(transitions.len())
    }
}

impl<S> Default for Universe<S>
where
    S: Clone + Eq + Hash + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for Universe<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Universe")
            .field("constants", &self.constants)
            .field("transitions", &self.transitions.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}
