//! COSMOS Core - Fundamental types for functional state evolution
//!
//! This crate defines the primitives the rest of COSMOS is built on:
//! - The five axioms and the error taxonomy for violating them
//! - Universe constants (minimum duration, minimum entropy, causal bound)
//! - Transforms, transitions and their composition
//! - Potential transitions and decision rules

pub mod axioms;
pub mod constants;
pub mod error;
pub mod potential;
pub mod transform;
pub mod transition;

pub use axioms::*;
pub use constants::*;
pub use error::*;
pub use potential::*;
pub use transform::*;
pub use transition::*;
