//! Readiness detection for the service under test
//!
//! Provides the bounded polling loop that gates every other check.

mod prober;

pub use prober::{ProbeConfig, ReadinessProber};
