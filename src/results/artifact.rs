//! Sentinel artifact for the surrounding pipeline
//!
//! A run leaves exactly one marker file, `PASSED` or `FAILED`, in the output
//! directory, next to a JSON report of every result.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::models::TestResult;

pub const PASSED_MARKER: &str = "PASSED";
pub const FAILED_MARKER: &str = "FAILED";
pub const REPORT_FILE: &str = "results.json";

/// Persisted record of one run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique run ID
    pub id: String,

    /// Target the checks ran against
    pub target: String,

    pub started_at: DateTime<Utc>,

    pub completed_at: DateTime<Utc>,

    /// Overall outcome
    pub passed: bool,

    /// Reason the run aborted before any check, if it did
    pub fatal: Option<String>,

    /// Ordered check results
    pub results: Vec<TestResult>,

    /// Tool version
    pub tool_version: String,
}

impl RunReport {
    pub fn new(
        target: impl Into<String>,
        started_at: DateTime<Utc>,
        passed: bool,
        fatal: Option<String>,
        results: Vec<TestResult>,
    ) -> Self {
        Self {
            id: generate_run_id(started_at),
            target: target.into(),
            started_at,
            completed_at: Utc::now(),
            passed,
            fatal,
            results,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn marker_name(&self) -> &'static str {
        if self.passed {
            PASSED_MARKER
        } else {
            FAILED_MARKER
        }
    }
}

/// Writes the marker and report into a directory
#[derive(Clone, Debug)]
pub struct SentinelArtifact {
    dir: PathBuf,
}

impl SentinelArtifact {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write report and marker, removing a stale marker of the other outcome.
    /// Returns the marker path.
    pub fn write(&self, report: &RunReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).with_context(|| {
            format!("Failed to create output directory: {}", self.dir.display())
        })?;

        let report_path = self.dir.join(REPORT_FILE);
        let json = serde_json::to_string_pretty(report).context("Failed to serialize run report")?;
        fs::write(&report_path, json)
            .with_context(|| format!("Failed to write report: {}", report_path.display()))?;
        debug!("Run report written to {}", report_path.display());

        let stale = if report.passed {
            FAILED_MARKER
        } else {
            PASSED_MARKER
        };
        let stale_path = self.dir.join(stale);
        if stale_path.exists() {
            fs::remove_file(&stale_path).with_context(|| {
                format!("Failed to remove stale marker: {}", stale_path.display())
            })?;
        }

        let marker_path = self.dir.join(report.marker_name());
        let failed: Vec<&str> = report
            .results
            .iter()
            .filter(|r| !r.passed())
            .map(TestResult::name)
            .collect();
        let mut content = format!("{} {}\n", report.marker_name(), report.completed_at.to_rfc3339());
        if let Some(reason) = &report.fatal {
            content.push_str(&format!("fatal: {reason}\n"));
        }
        if !failed.is_empty() {
            content.push_str(&format!("failed: {}\n", failed.join(", ")));
        }
        fs::write(&marker_path, content)
            .with_context(|| format!("Failed to write marker: {}", marker_path.display()))?;

        info!("Wrote {} marker to {}", report.marker_name(), marker_path.display());
        Ok(marker_path)
    }
}

fn generate_run_id(started_at: DateTime<Utc>) -> String {
    format!("run-{}", started_at.format("%Y%m%d-%H%M%S%3f"))
}
