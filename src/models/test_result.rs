//! Check models for edge service verification
//!
//! Defines declared test cases, their expectations, and the immutable
//! results produced when they run.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::FailureKind;

/// What a declared check expects back from its endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expectation {
    /// Exact status code, optionally with a required body fragment
    Response {
        status: u16,
        body_contains: Option<String>,
    },

    /// Excess requests must be answered with this limiting status
    Rejection { status: u16 },
}

impl Expectation {
    pub fn status(status: u16) -> Self {
        Expectation::Response {
            status,
            body_contains: None,
        }
    }

    pub fn status_with_body(status: u16, fragment: impl Into<String>) -> Self {
        Expectation::Response {
            status,
            body_contains: Some(fragment.into()),
        }
    }

    pub fn rejection(status: u16) -> Self {
        Expectation::Rejection { status }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Response {
                status,
                body_contains: Some(fragment),
            } => write!(f, "status {status}, body contains {fragment:?}"),
            Expectation::Response { status, .. } => write!(f, "status {status}"),
            Expectation::Rejection { status } => write!(f, "burst rejected with {status}"),
        }
    }
}

/// A statically declared check against one endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub url: String,
    pub expectation: Expectation,
}

impl TestCase {
    pub fn new(name: impl Into<String>, url: impl Into<String>, expectation: Expectation) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            expectation,
        }
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self.expectation, Expectation::Rejection { .. })
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.url)
    }
}

/// Outcome of a single check execution.
///
/// Fields are private so a result cannot be amended once built; the
/// aggregator only ever reads them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    name: String,
    passed: bool,
    detail: String,
    failure: Option<FailureKind>,
    duration_ms: u64,
}

impl TestResult {
    pub fn pass(name: impl Into<String>, duration_ms: u64, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            detail: detail.into(),
            failure: None,
            duration_ms,
        }
    }

    pub fn fail(
        name: impl Into<String>,
        duration_ms: u64,
        kind: FailureKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            passed: false,
            detail: detail.into(),
            failure: Some(kind),
            duration_ms,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn failure(&self) -> Option<FailureKind> {
        self.failure
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn symbol(&self) -> &'static str {
        if self.passed {
            "✓"
        } else {
            "✗"
        }
    }

    pub fn marker(&self) -> &'static str {
        if self.passed {
            "PASS"
        } else {
            "FAIL"
        }
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} [{}ms]",
            self.symbol(),
            self.name,
            self.marker(),
            self.duration_ms
        )?;
        if !self.detail.is_empty() {
            write!(f, " - {}", self.detail)?;
        }
        Ok(())
    }
}

/// Ordered results of one harness run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub target: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub total_duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl RunSummary {
    pub fn new(target: impl Into<String>, results: Vec<TestResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed()).count();
        let total_duration_ms = results.iter().map(|r| r.duration_ms()).sum();

        Self {
            target: target.into(),
            total,
            passed,
            failed: total - passed,
            total_duration_ms,
            results,
        }
    }

    /// True only when every recorded result passed
    pub fn overall_passed(&self) -> bool {
        self.results.iter().all(TestResult::passed)
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }

    pub fn failed_names(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| !r.passed())
            .map(TestResult::name)
            .collect()
    }
}
