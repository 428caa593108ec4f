//! Causal graph - states linked by committed transitions
//!
//! Nodes are states (by value), edges are committed transitions from a
//! pre-state to a post-state. Parallel edges are kept. The graph is a DAG
//! at all times: an insertion that closes a cycle is rolled back.

use std::collections::HashMap;
use std::hash::Hash;

use cosmos_core::{CosmosError, CosmosResult, Transition};
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::stable_graph::{EdgeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use tracing::{trace, warn};

pub use petgraph::stable_graph::NodeIndex;

/// A committed transition between two states
#[derive(Debug)]
pub struct CausalEdge<'a, S> {
    /// Pre-state node
    pub from: NodeIndex,
    /// Post-state node
    pub to: NodeIndex,
    /// The committed transition
    pub transition: &'a Transition<S>,
}

/// Directed acyclic graph of states
#[derive(Debug, Clone)]
pub struct CausalGraph<S> {
    graph: StableDiGraph<S, Transition<S>>,
    /// State -> node index
    index: HashMap<S, NodeIndex>,
}

impl<S> Default for CausalGraph<S> {
    fn default() -> Self {
        CausalGraph {
            graph: StableDiGraph::default(),
            index: HashMap::new(),
        }
    }
}

impl<S> CausalGraph<S>
where
    S: Clone + Eq + Hash,
{
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Get node count
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get edge count
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Check if a state has been recorded
    pub fn contains_state(&self, state: &S) -> bool {
        self.index.contains_key(state)
    }

    /// Get the state stored at a node
    pub fn state(&self, node: NodeIndex) -> Option<&S> {
        self.graph.node_weight(node)
    }

    /// Iterate over all states
    pub fn states(&self) -> impl Iterator<Item = &S> {
        self.graph
            .node_indices()
            .filter_map(move |node| self.graph.node_weight(node))
    }

    /// Iterate over all edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = CausalEdge<'_, S>> {
        self.graph.edge_indices().filter_map(move |edge| {
            let (from, to) = self.graph.edge_endpoints(edge)?;
            Some(CausalEdge {
                from,
                to,
                transition: &self.graph[edge],
            })
        })
    }

    /// States directly caused by `state`, one entry per edge
    pub fn successors(&self, state: &S) -> Vec<&S> {
        self.neighbours(state, Direction::Outgoing)
    }

    /// States that directly caused `state`, one entry per edge
    pub fn predecessors(&self, state: &S) -> Vec<&S> {
        self.neighbours(state, Direction::Incoming)
    }

    /// Edges touching `node` in `direction`, oldest first
    fn edges_of(&self, node: NodeIndex, direction: Direction) -> Vec<(EdgeIndex, NodeIndex)> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(node, direction)
            .map(|edge| match direction {
                Direction::Outgoing => (edge.id(), edge.target()),
                Direction::Incoming => (edge.id(), edge.source()),
            })
            .collect();
        edges.sort_by_key(|&(edge, _)| edge);
        edges
    }

    fn neighbours(&self, state: &S, direction: Direction) -> Vec<&S> {
        let Some(&node) = self.index.get(state) else {
            return Vec::new();
        };

        self.edges_of(node, direction)
            .into_iter()
            .filter_map(|(_, other)| self.graph.node_weight(other))
            .collect()
    }

    /// All transitions recorded from `pre` to `post`
    pub fn transitions_between(&self, pre: &S, post: &S) -> Vec<&Transition<S>> {
        let (Some(&from), Some(&to)) = (self.index.get(pre), self.index.get(post)) else {
            return Vec::new();
        };

        self.edges_of(from, Direction::Outgoing)
            .into_iter()
            .filter(|&(_, target)| target == to)
            .map(|(edge, _)| &self.graph[edge])
            .collect()
    }

    /// Record a committed transition from `pre`.
    ///
    /// Returns the post-state. If the new edge closes a cycle the graph is
    /// restored to its previous shape and `CausalInconsistency` is returned.
    pub fn record_transition(&mut self, pre: &S, transition: Transition<S>) -> CosmosResult<S> {
        let post = transition.apply(pre);
        let name = transition.name().to_string();

        let (from, from_added) = self.intern(pre);
        let (to, to_added) = self.intern(&post);
        let edge = self.graph.add_edge(from, to, transition);

        if is_cyclic_directed(&self.graph) {
            self.graph.remove_edge(edge);
            if to_added {
                self.remove_state(to);
            }
            if from_added {
                self.remove_state(from);
            }
            let err = CosmosError::CausalInconsistency(format!(
                "transition {} closes a cycle",
                name
            ));
            warn!(transition = %name, "causal graph rejected transition: {}", err);
            return Err(err);
        }

        trace!(
            transition = %name,
            from = from.index(),
            to = to.index(),
            "recorded transition"
        );
        Ok(post)
    }

    /// Check the whole graph for cycles. Read-only.
    pub fn validate(&self) -> CosmosResult<()> {
        toposort(&self.graph, None).map(|_| ()).map_err(|cycle| {
            CosmosError::CausalInconsistency(format!(
                "cycle detected through state node {}",
                cycle.node_id().index()
            ))
        })
    }

    /// Look up or add the node for `state`; the flag is true when it was added
    fn intern(&mut self, state: &S) -> (NodeIndex, bool) {
        if let Some(&node) = self.index.get(state) {
            return (node, false);
        }
        let node = self.graph.add_node(state.clone());
        self.index.insert(state.clone(), node);
        (node, true)
    }

    fn remove_state(&mut self, node: NodeIndex) {
        if let Some(state) = self.graph.remove_node(node) {
            self.index.remove(&state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn add(n: i64) -> Transition<i64> {
        Transition::from_fn(format!("+{}", n), move |x: &i64| x + n, 1.0)
    }

    fn set(to: i64) -> Transition<i64> {
        Transition::from_fn(format!("={}", to), move |_: &i64| to, 1.0)
    }

    #[test]
    fn test_record_returns_post_state() {
        let mut graph = CausalGraph::new();
        let post = graph.record_transition(&5, add(1)).unwrap();

        assert_eq!(post, 6);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.contains_state(&5));
        assert!(graph.contains_state(&6));
        assert_eq!(graph.successors(&5), vec![&6]);
        assert_eq!(graph.predecessors(&6), vec![&5]);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_parallel_edges_kept() {
        let mut graph = CausalGraph::new();
        graph.record_transition(&1, add(1)).unwrap();
        graph.record_transition(&1, set(2)).unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 2);
        let between: Vec<_> = graph
            .transitions_between(&1, &2)
            .into_iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(between, vec!["+1", "=2"]);
        assert_eq!(graph.successors(&1), vec![&2, &2]);
    }

    #[test]
    fn test_cycle_rejected_and_rolled_back() {
        let mut graph = CausalGraph::new();
        graph.record_transition(&1, add(1)).unwrap();
        graph.record_transition(&2, add(1)).unwrap();

        let before: Vec<_> = graph.edges().map(|e| (e.from, e.to)).collect();
        let err = graph.record_transition(&3, set(1)).unwrap_err();

        assert!(matches!(err, CosmosError::CausalInconsistency(_)));
        let after: Vec<_> = graph.edges().map(|e| (e.from, e.to)).collect();
        assert_eq!(before, after);
        assert!(graph.successors(&3).is_empty());
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_self_loop_rejected_removes_new_node() {
        let mut graph = CausalGraph::new();
        let err = graph.record_transition(&42, set(42)).unwrap_err();

        assert!(matches!(err, CosmosError::CausalInconsistency(_)));
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
        assert!(!graph.contains_state(&42));
    }

    #[test]
    fn test_rejection_removes_both_new_nodes() {
        let mut graph = CausalGraph::new();
        graph.record_transition(&1, add(1)).unwrap();

        // 7 -> 7 adds nothing reachable, but both ends are new
        assert!(graph.record_transition(&7, set(7)).is_err());
        assert_eq!(graph.node_count(), 2);
        assert!(!graph.contains_state(&7));

        graph.record_transition(&7, add(1)).unwrap();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.successors(&7), vec![&8]);
    }

    #[test]
    fn test_graph_usable_after_rejection() {
        let mut graph = CausalGraph::new();
        graph.record_transition(&1, add(1)).unwrap();
        assert!(graph.record_transition(&2, set(1)).is_err());

        let post = graph.record_transition(&2, add(10)).unwrap();
        assert_eq!(post, 12);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.state(NodeIndex::new(2)), Some(&12));
        let names: Vec<_> = graph.edges().map(|e| e.transition.name().to_string()).collect();
        assert_eq!(names, vec!["+1", "+10"]);
    }

    #[test]
    fn test_diamond_is_acyclic() {
        let mut graph = CausalGraph::new();
        graph.record_transition(&0, add(1)).unwrap();
        graph.record_transition(&0, add(2)).unwrap();
        graph.record_transition(&1, add(2)).unwrap();
        graph.record_transition(&2, add(1)).unwrap();

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.predecessors(&3), vec![&1, &2]);
        assert!(graph.validate().is_ok());
    }

    proptest! {
        #[test]
        fn forward_only_transitions_never_rejected(steps in proptest::collection::vec(1i64..50, 1..60)) {
            let mut graph = CausalGraph::new();
            let mut state = 0i64;

            for (i, step) in steps.iter().enumerate() {
                let n = *step;
                let t = Transition::from_fn(format!("s{}", i), move |x: &i64| x + n, 1.0);
                state = graph.record_transition(&state, t).unwrap();
            }

            prop_assert_eq!(state, steps.iter().sum::<i64>());
            prop_assert_eq!(graph.edge_count(), steps.len());
            prop_assert_eq!(graph.node_count(), steps.len() + 1);
        }
    }
}
