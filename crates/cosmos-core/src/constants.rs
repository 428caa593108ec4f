//! Universe constants
//!
//! Three strictly positive scalars govern every transition:
//! - `min_duration` (dτmin): lower bound on a single transition's duration
//! - `min_entropy`: lower bound on a single transition's entropy
//! - `causal_bound` (c): upper bound on causal composition
//!
//! The maximum composition rate is derived as `causal_bound / min_duration`.

use std::fmt;

use crate::{CosmosError, CosmosResult};

/// Constants configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantsConfig {
    /// Minimum duration of any transition
    pub min_duration: f64,
    /// Minimum entropy of any irreducible transition
    pub min_entropy: f64,
    /// Upper bound on causal composition
    pub causal_bound: f64,
}

impl Default for ConstantsConfig {
    fn default() -> Self {
        ConstantsConfig {
            min_duration: 1.0,
            min_entropy: 1.0,
            causal_bound: 1.0,
        }
    }
}

impl ConstantsConfig {
    /// Short transitions, low entropy floor
    pub fn fine_grained() -> Self {
        ConstantsConfig {
            min_duration: 0.1,
            min_entropy: 0.1,
            causal_bound: 1.0,
        }
    }

    /// Permissive composition bound (max rate 10)
    pub fn relaxed() -> Self {
        ConstantsConfig {
            min_duration: 1.0,
            min_entropy: 0.5,
            causal_bound: 10.0,
        }
    }
}

/// Validated, immutable universe constants
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Constants {
    min_duration: f64,
    min_entropy: f64,
    causal_bound: f64,
}

impl Constants {
    /// Create constants, rejecting any scalar that is not finite and positive
    pub fn new(min_duration: f64, min_entropy: f64, causal_bound: f64) -> CosmosResult<Self> {
        check_positive("min_duration", min_duration)?;
        check_positive("min_entropy", min_entropy)?;
        check_positive("causal_bound", causal_bound)?;

        Ok(Constants {
            min_duration,
            min_entropy,
            causal_bound,
        })
    }

    /// Create constants from a configuration
    pub fn from_config(config: &ConstantsConfig) -> CosmosResult<Self> {
        Self::new(config.min_duration, config.min_entropy, config.causal_bound)
    }

    #[inline]
    pub fn min_duration(&self) -> f64 {
        self.min_duration
    }

    #[inline]
    pub fn min_entropy(&self) -> f64 {
        self.min_entropy
    }

    #[inline]
    pub fn causal_bound(&self) -> f64 {
        self.causal_bound
    }

    /// Maximum transitions per unit time
    #[inline]
    pub fn max_rate(&self) -> f64 {
        self.causal_bound / self.min_duration
    }

    /// Minimum total duration for `count` transitions to respect the rate bound
    #[inline]
    pub fn min_chain_duration(&self, count: usize) -> f64 {
        count as f64 / self.max_rate()
    }
}

impl Default for Constants {
    fn default() -> Self {
        let config = ConstantsConfig::default();
        Constants {
            min_duration: config.min_duration,
            min_entropy: config.min_entropy,
            causal_bound: config.causal_bound,
        }
    }
}

impl fmt::Display for Constants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Constants(min_duration={}, min_entropy={}, causal_bound={})",
            self.min_duration, self.min_entropy, self.causal_bound
        )
    }
}

fn check_positive(name: &'static str, value: f64) -> CosmosResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CosmosError::InvalidConstant { name, value })
    }
}
