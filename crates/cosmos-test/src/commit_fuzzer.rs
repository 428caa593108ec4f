//! Commit Fuzzer - randomized aggregate/commit rounds against one universe
//!
//! Checks after every run:
//! - The causal graph is still acyclic
//! - Every committed transition satisfies the duration and entropy minimums
//! - Every committed transition is exactly one graph edge
//! - Causal orders in the registry are 1..=n

use cosmos_core::{
    Constants, ConstantsConfig, CosmosResult, DecisionRule, FirstViable, HighestEntropy,
    PotentialTransition, ShortestDuration,
};
use cosmos_state::Universe;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::{affine_possibility, Affine};

/// Fuzzer configuration
#[derive(Clone, Debug)]
pub struct FuzzerConfig {
    /// Number of commit rounds
    pub rounds: usize,
    /// Potential transitions aggregated per round
    pub potentials_per_round: usize,
    /// Candidate outcomes per potential transition
    pub possibilities_per_potential: usize,
    /// Probability a candidate breaks the duration or entropy minimum
    pub invalid_prob: f64,
    /// Probability a candidate jumps back to an earlier state
    pub rewind_prob: f64,
    /// Universe constants
    pub constants: ConstantsConfig,
    /// Random seed
    pub seed: u64,
}

impl Default for FuzzerConfig {
    fn default() -> Self {
        FuzzerConfig {
            rounds: 50,
            potentials_per_round: 4,
            possibilities_per_potential: 3,
            invalid_prob: 0.2,
            rewind_prob: 0.1,
            constants: ConstantsConfig::relaxed(),
            seed: 42,
        }
    }
}

impl FuzzerConfig {
    /// Light fuzzing for quick tests
    pub fn light() -> Self {
        FuzzerConfig {
            rounds: 10,
            potentials_per_round: 2,
            possibilities_per_potential: 2,
            ..Default::default()
        }
    }

    /// Heavy fuzzing for thorough testing
    pub fn heavy() -> Self {
        FuzzerConfig {
            rounds: 500,
            potentials_per_round: 8,
            possibilities_per_potential: 5,
            invalid_prob: 0.4,
            rewind_prob: 0.3,
            ..Default::default()
        }
    }
}

/// Outcome of a fuzz run
#[derive(Clone, Debug, Default)]
pub struct FuzzResult {
    pub rounds: usize,
    pub aggregated: usize,
    pub committed: usize,
    pub dropped: usize,
    pub graph_nodes: usize,
    pub graph_edges: usize,
    pub violations: Vec<String>,
}

impl FuzzResult {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Aggregate/commit fuzzer
pub struct CommitFuzzer {
    config: FuzzerConfig,
    universe: Universe<i64>,
    rng: StdRng,
    /// States reached so far, candidates for rewinds
    visited: Vec<i64>,
}

impl CommitFuzzer {
    /// Create a new fuzzer
    pub fn new(config: FuzzerConfig) -> CosmosResult<Self> {
        let constants = Constants::from_config(&config.constants)?;
        let mut universe = Universe::with_constants(constants);
        universe.set_current_state(0);

        Ok(CommitFuzzer {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            universe,
            visited: vec![0],
        })
    }

    pub fn universe(&self) -> &Universe<i64> {
        &self.universe
    }

    /// Run all rounds and check invariants
    pub fn run(&mut self) -> FuzzResult {
        let mut result = FuzzResult::default();

        for round in 0..self.config.rounds {
            let state = self.universe.current_state().copied().unwrap_or(0);

            for p in 0..self.config.potentials_per_round {
                let potential = self.generate_potential(state, round, p);
                self.universe.aggregate(potential);
                result.aggregated += 1;
            }

            let outcome = match self.rng.gen_range(0..3) {
                0 => self.step(&FirstViable),
                1 => self.step(&ShortestDuration),
                _ => self.step(&HighestEntropy),
            };

            match outcome {
                Ok(committed) => {
                    result.committed += committed;
                    result.dropped += self.config.potentials_per_round - committed;
                }
                Err(err) => {
                    result.dropped += self.universe.discard_pending().len();
                    result
                        .violations
                        .push(format!("round {}: commit failed: {}", round, err));
                }
            }
            result.rounds += 1;
        }

        result.graph_nodes = self.universe.graph().node_count();
        result.graph_edges = self.universe.graph().edge_count();
        result.violations.extend(self.check_invariants(result.committed));

        debug!(
            rounds = result.rounds,
            committed = result.committed,
            dropped = result.dropped,
            "fuzz run finished"
        );
        result
    }

    fn step<R: DecisionRule<i64>>(&mut self, rule: &R) -> CosmosResult<usize> {
        let committed = self.universe.step(rule)?;
        if let Some(&state) = self.universe.current_state() {
            self.visited.push(state);
        }
        Ok(committed.len())
    }

    fn generate_potential(&mut self, state: i64, round: usize, index: usize) -> PotentialTransition<i64> {
        let constants = *self.universe.constants();

        let possibilities: Vec<_> = (0..self.config.possibilities_per_potential)
            .map(|k| {
                let op = if self.rng.gen::<f64>() < self.config.rewind_prob {
                    let target = self.visited[self.rng.gen_range(0..self.visited.len())];
                    Affine::constant(target)
                } else {
                    Affine {
                        mul: self.rng.gen_range(1..4),
                        add: self.rng.gen_range(1..1000),
                    }
                };

                let invalid = self.rng.gen::<f64>() < self.config.invalid_prob;
                let duration = if invalid && self.rng.gen::<bool>() {
                    constants.min_duration() * self.rng.gen_range(0.1..0.9)
                } else {
                    constants.min_duration() * self.rng.gen_range(1.0..3.0)
                };

                let possibility =
                    affine_possibility(format!("r{}-p{}-c{}", round, index, k), op, duration);
                if invalid {
                    possibility.with_entropy(constants.min_entropy() * self.rng.gen_range(0.1..0.9))
                } else {
                    possibility.with_entropy(constants.min_entropy() * self.rng.gen_range(1.0..2.0))
                }
            })
            .collect();

        PotentialTransition::new(state, possibilities)
    }

    fn check_invariants(&self, committed: usize) -> Vec<String> {
        let mut violations = Vec::new();
        let universe = &self.universe;
        let constants = universe.constants();

        if let Err(err) = universe.graph().validate() {
            violations.push(format!("graph invalid: {}", err));
        }

        if universe.graph().edge_count() != committed {
            violations.push(format!(
                "{} committed transitions but {} graph edges",
                committed,
                universe.graph().edge_count()
            ));
        }

        for (i, t) in universe.transitions().iter().enumerate() {
            if t.duration() < constants.min_duration() {
                violations.push(format!("{} below minimum duration", t.name()));
            }
            match t.entropy() {
                Some(e) if e >= constants.min_entropy() => {}
                _ => violations.push(format!("{} below minimum entropy", t.name())),
            }
            if t.causal_order() != i as u64 + 1 {
                violations.push(format!(
                    "{} has causal order {}, expected {}",
                    t.name(),
                    t.causal_order(),
                    i + 1
                ));
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzzer_light() {
        let mut fuzzer = CommitFuzzer::new(FuzzerConfig::light()).unwrap();
        let result = fuzzer.run();

        assert!(result.is_valid(), "violations: {:?}", result.violations);
        assert_eq!(result.rounds, 10);
        assert_eq!(result.committed + result.dropped, result.aggregated);
    }

    #[test]
    fn test_fuzzer_default() {
        let mut fuzzer = CommitFuzzer::new(FuzzerConfig::default()).unwrap();
        let result = fuzzer.run();

        assert!(result.is_valid(), "violations: {:?}", result.violations);
        assert_eq!(result.graph_edges, result.committed);
        assert!(result.committed > 0);
    }

    #[test]
    fn test_fuzzer_is_deterministic() {
        let a = CommitFuzzer::new(FuzzerConfig::light()).unwrap().run();
        let b = CommitFuzzer::new(FuzzerConfig::light()).unwrap().run();

        assert_eq!(a.committed, b.committed);
        assert_eq!(a.graph_nodes, b.graph_nodes);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = FuzzerConfig {
            constants: ConstantsConfig {
                min_duration: 0.0,
                ..ConstantsConfig::default()
            },
            ..FuzzerConfig::light()
        };
        assert!(CommitFuzzer::new(config).is_err());
    }
}
