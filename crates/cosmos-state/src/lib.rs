//! COSMOS State Engine - Causal graph and universe orchestration
//!
//! This crate implements the stateful half of COSMOS:
//! - Causal graph of committed transitions with acyclicity enforcement
//! - Universe orchestrator (direct composition and aggregate/commit modes)
//! - Thread-safe shared handle over a universe

pub mod graph;
pub mod shared;
pub mod universe;

pub use graph::*;
pub use shared::*;
pub use universe::*;
