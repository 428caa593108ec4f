//! Shared universe - one exclusive lock per logical operation
//!
//! Operations are short and CPU-bound, so a single mutex over the whole
//! universe is enough. Each method below takes the lock exactly once.

use std::hash::Hash;
use std::sync::Arc;

use cosmos_core::{Constants, CosmosResult, DecisionRule, PotentialTransition, Transform, Transition};
use parking_lot::Mutex;

use crate::Universe;

/// Cloneable, thread-safe handle to a [`Universe`]
pub struct SharedUniverse<S> {
    inner: Arc<Mutex<Universe<S>>>,
}

impl<S> Clone for SharedUniverse<S> {
    fn clone(&self) -> Self {
        SharedUniverse {
            inner: self.inner.clone(),
        }
    }
}

impl<S> SharedUniverse<S>
where
    S: Clone + Eq + Hash + Send + 'static,
{
    pub fn new(universe: Universe<S>) -> Self {
        SharedUniverse {
            inner: Arc::new(Mutex::new(universe)),
        }
    }

    pub fn with_constants(constants: Constants) -> Self {
        Self::new(Universe::with_constants(constants))
    }

    /// Run `f` with exclusive access to the universe
    pub fn with<R>(&self, f: impl FnOnce(&mut Universe<S>) -> R) -> R {
        f(&mut *self.inner.lock())
    }

    pub fn constants(&self) -> Constants {
        *self.inner.lock().constants()
    }

    pub fn add_transition(&self, transition: Transition<S>) -> CosmosResult<()> {
        self.inner.lock().add_transition(transition).map(|_| ())
    }

    pub fn create_transition<T>(
        &self,
        name: impl Into<String>,
        transform: T,
        duration: f64,
        entropy: Option<f64>,
    ) -> CosmosResult<Transition<S>>
    where
        T: Transform<S> + 'static,
    {
        self.inner
            .lock()
            .create_transition(name, transform, duration, entropy)
    }

    pub fn compose_chain(&self, transitions: &[Transition<S>]) -> CosmosResult<Transition<S>> {
        self.inner.lock().compose_chain(transitions)
    }

    pub fn evolve(&self, initial: S, transitions: &[Transition<S>]) -> S {
        self.inner.lock().evolve(initial, transitions)
    }

    pub fn aggregate(&self, potential: PotentialTransition<S>) {
        self.inner.lock().aggregate(potential);
    }

    pub fn commit<R>(&self, state: &S, rule: &R) -> CosmosResult<Vec<Transition<S>>>
    where
        R: DecisionRule<S> + ?Sized,
    {
        self.inner.lock().commit(state, rule)
    }

    pub fn step<R>(&self, rule: &R) -> CosmosResult<Vec<Transition<S>>>
    where
        R: DecisionRule<S> + ?Sized,
    {
        self.inner.lock().step(rule)
    }

    pub fn current_state(&self) -> Option<S> {
        self.inner.lock().current_state().cloned()
    }

    /// Registered transitions, cloned out of the lock
    pub fn transitions(&self) -> Vec<Transition<S>> {
        self.inner.lock().transitions().to_vec()
    }

    pub fn pending_len(&self) -> usize {
        self.inner.lock().pending().len()
    }

    pub fn discard_pending(&self) -> Vec<PotentialTransition<S>> {
        self.inner.lock().discard_pending()
    }
}

impl<S> From<Universe<S>> for SharedUniverse<S>
where
    S: Clone + Eq + Hash + Send + 'static,
{
    fn from(universe: Universe<S>) -> Self {
        Self::new(universe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmos_core::{FirstViable, Possibility};
    use std::thread;

    #[test]
    fn test_concurrent_registration() {
        let shared: SharedUniverse<i64> = SharedUniverse::with_constants(Constants::default());

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for j in 0..25 {
                        shared
                            .create_transition(format!("t{}-{}", i, j), |x: &i64| x + 1, 1.0, None)
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let mut orders: Vec<_> = shared.transitions().iter().map(|t| t.causal_order()).collect();
        orders.sort_unstable();
        assert_eq!(orders, (1..=100).collect::<Vec<u64>>());
    }

    #[test]
    fn test_concurrent_aggregate_then_commit() {
        let shared: SharedUniverse<i64> = SharedUniverse::with_constants(Constants::default());

        let handles: Vec<_> = (1..=8)
            .map(|n| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let possibility = Possibility::from_fn(format!("+{}", n), move |x: &i64| x + n, 1.0);
                    shared.aggregate(PotentialTransition::new(0, vec![possibility]));
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.pending_len(), 8);
        let committed = shared.commit(&0, &FirstViable).unwrap();
        assert_eq!(committed.len(), 8);
        assert_eq!(shared.pending_len(), 0);
        shared.with(|u| {
            assert_eq!(u.graph().edge_count(), 8);
            assert!(u.graph().validate().is_ok());
        });
    }

    #[test]
    fn test_evolve_moves_cursor() {
        let shared = SharedUniverse::from(Universe::<i64>::new());
        let inc = shared.create_transition("inc", |x: &i64| x + 1, 1.0, None).unwrap();

        assert_eq!(shared.evolve(1, &[inc.clone(), inc]), 3);
        assert_eq!(shared.current_state(), Some(3));
        assert_eq!(shared.constants(), Constants::default());
    }
}
