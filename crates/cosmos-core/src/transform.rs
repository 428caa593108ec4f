//! State transforms - the functional content of a transition
//!
//! A transform is an opaque capability `state -> state`. Closures implement
//! it directly; named types can implement it to stay substitutable.

use std::fmt;
use std::sync::Arc;

/// A state transformation.
///
/// Implementations must be total over the states they are applied to.
/// Composition calls them repeatedly, so they should not rely on being
/// called once.
pub trait Transform<S>: Send + Sync {
    fn apply(&self, state: &S) -> S;
}

impl<S, F> Transform<S> for F
where
    F: Fn(&S) -> S + Send + Sync,
{
    #[inline]
    fn apply(&self, state: &S) -> S {
        self(state)
    }
}

/// Shared handle to a transform
pub type SharedTransform<S> = Arc<dyn Transform<S>>;

/// Sequential composition: `first` then `second`
pub struct Sequence<S> {
    first: SharedTransform<S>,
    second: SharedTransform<S>,
}

impl<S> Sequence<S> {
    pub fn new(first: SharedTransform<S>, second: SharedTransform<S>) -> Self {
        Sequence { first, second }
    }
}

impl<S> Transform<S> for Sequence<S> {
    fn apply(&self, state: &S) -> S {
        let intermediate = self.first.apply(state);
        self.second.apply(&intermediate)
    }
}

impl<S> fmt::Debug for Sequence<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sequence(..)")
    }
}

/// The identity transform
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<S: Clone> Transform<S> for Identity {
    fn apply(&self, state: &S) -> S {
        state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_transform() {
        let inc = |x: &i64| x + 1;
        assert_eq!(Transform::apply(&inc, &4), 5);
    }

    #[test]
    fn test_sequence_order() {
        let inc: SharedTransform<i64> = Arc::new(|x: &i64| x + 1);
        let dbl: SharedTransform<i64> = Arc::new(|x: &i64| x * 2);

        assert_eq!(Sequence::new(inc.clone(), dbl.clone()).apply(&5), 12);
        assert_eq!(Sequence::new(dbl, inc).apply(&5), 11);
    }

    #[test]
    fn test_identity() {
        assert_eq!(Identity.apply(&"same".to_string()), "same");
    }
}
