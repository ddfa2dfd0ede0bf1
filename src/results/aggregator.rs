//! Result aggregation and exit signal
//!
//! Consumes the ordered results of a run exactly once, prints them, writes
//! the sentinel artifact and decides the process exit code.

use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{error, info, warn};

use super::artifact::{RunReport, SentinelArtifact};
use crate::models::{HarnessError, RunSummary, TestResult};
use crate::output::ResultFormatter;

/// How a run ended before aggregation
#[derive(Debug)]
pub enum RunOutcome {
    /// Readiness succeeded and every check produced a result
    Completed(Vec<TestResult>),

    /// The run aborted before any check executed
    Aborted(HarnessError),
}

/// Overall pass/fail of a run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed,
}

impl Verdict {
    pub fn from_summary(summary: &RunSummary) -> Self {
        if summary.overall_passed() {
            Verdict::Passed
        } else {
            Verdict::Failed
        }
    }

    pub fn is_passed(self) -> bool {
        self == Verdict::Passed
    }

    /// 0 when every check passed, 1 otherwise
    pub fn exit_code(self) -> u8 {
        match self {
            Verdict::Passed => 0,
            Verdict::Failed => 1,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Passed => write!(f, "PASSED"),
            Verdict::Failed => write!(f, "FAILED"),
        }
    }
}

/// Everything derived from an outcome, before any side effect
#[derive(Debug)]
pub struct Conclusion {
    pub verdict: Verdict,
    pub rendered: String,
    pub report: RunReport,
}

/// Collects results and produces the run's external signals
pub struct Aggregator {
    target: String,
    formatter: ResultFormatter,
    artifact: Option<SentinelArtifact>,
    started_at: DateTime<Utc>,
}

impl Aggregator {
    pub fn new(target: impl Into<String>, formatter: ResultFormatter) -> Self {
        Self {
            target: target.into(),
            formatter,
            artifact: None,
            started_at: Utc::now(),
        }
    }

    pub fn with_artifact(mut self, artifact: SentinelArtifact) -> Self {
        self.artifact = Some(artifact);
        self
    }

    /// Compute verdict, printable output and report for `outcome`
    pub fn conclude(&self, outcome: RunOutcome) -> Conclusion {
        match outcome {
            RunOutcome::Completed(results) => {
                let summary = RunSummary::new(&self.target, results);
                let verdict = Verdict::from_summary(&summary);
                if !verdict.is_passed() {
                    warn!("Failed checks: {}", summary.failed_names().join(", "));
                }
                let rendered = self.formatter.format_summary(&summary);
                let report = RunReport::new(
                    &self.target,
                    self.started_at,
                    verdict.is_passed(),
                    None,
                    summary.results,
                );
                Conclusion {
                    verdict,
                    rendered,
                    report,
                }
            }
            RunOutcome::Aborted(err) => {
                let reason = err.to_string();
                let rendered = self.formatter.format_fatal(&self.target, &reason);
                let report = RunReport::new(
                    &self.target,
                    self.started_at,
                    false,
                    Some(reason),
                    Vec::new(),
                );
                Conclusion {
                    verdict: Verdict::Failed,
                    rendered,
                    report,
                }
            }
        }
    }

    /// Print results, write the artifact once, and return the verdict.
    ///
    /// A failed artifact write turns the verdict into a failure since the
    /// pipeline would otherwise see no signal.
    pub fn finish(self, outcome: RunOutcome) -> Verdict {
        let conclusion = self.conclude(outcome);
        println!("{}", conclusion.rendered);

        let mut verdict = conclusion.verdict;
        if let Some(artifact) = &self.artifact {
            if let Err(e) = artifact.write(&conclusion.report) {
                error!(
                    "Failed to write sentinel artifact to {}: {e:#}",
                    artifact.dir().display()
                );
                eprintln!("edge-check: failed to write sentinel artifact: {e:#}");
                verdict = Verdict::Failed;
            }
        }

        info!("Run {} (exit code {})", verdict, verdict.exit_code());
        verdict
    }
}
