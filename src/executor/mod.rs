//! Run execution engine
//!
//! Sequences readiness, checks and aggregation for a single run.

mod runner;

pub use runner::HarnessRunner;
