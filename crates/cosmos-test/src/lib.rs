//! COSMOS Test Harness - Property testing and commit fuzzing
//!
//! This crate provides:
//! - Named integer transforms with overflow-safe arithmetic
//! - proptest strategies for constants, chains and potential transitions
//! - A seeded aggregate/commit fuzzer that checks graph invariants
//! - Tracing setup for tests

pub mod commit_fuzzer;
pub mod ops;
pub mod strategies;

pub use commit_fuzzer::*;
pub use ops::*;
pub use strategies::*;

use tracing_subscriber::EnvFilter;

/// Install a test-friendly tracing subscriber honouring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
