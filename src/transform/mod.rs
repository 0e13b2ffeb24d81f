//! Transformation module.
//!
//! - Ops: the six row-level operators and their parameters
//! - Pipeline: ordered, fail-fast execution of an operation list

pub mod ops;
pub mod pipeline;

pub use ops::*;
pub use pipeline::*;
