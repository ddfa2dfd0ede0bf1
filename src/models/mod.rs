//! Data models for edge service checks
//!
//! This module contains the check declarations, results and failure kinds
//! shared by every phase of a run.

mod error;
mod test_result;

pub use error::{FailureKind, HarnessError};
pub use test_result::{Expectation, RunSummary, TestCase, TestResult};
