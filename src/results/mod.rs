//! Result aggregation and persistence
//!
//! Turns the ordered check results into printed output, a sentinel artifact
//! and an exit code.

mod aggregator;
mod artifact;

pub use aggregator::{Aggregator, RunOutcome, Verdict};
pub use artifact::{SentinelArtifact, FAILED_MARKER, PASSED_MARKER, REPORT_FILE};
