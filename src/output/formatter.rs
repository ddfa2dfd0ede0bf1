//! Output formatters for check results
//!
//! Provides table, JSON, and summary output formats.

use crate::models::{RunSummary, TestCase, TestResult};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// Result formatter
#[derive(Clone, Debug)]
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// One line for a single check result
    fn format_result_line(&self, result: &TestResult) -> String {
        let marker = self.paint(
            result.passed(),
            &format!("{} {}", result.symbol(), result.marker()),
        );
        let mut line = format!(
            "{:20} {} [{:>6}ms]",
            result.name(),
            marker,
            result.duration_ms()
        );
        if !result.detail().is_empty() {
            line.push_str(&format!(" {}", result.detail()));
        }
        if let Some(kind) = result.failure() {
            line.push_str(&format!(" ({kind})"));
        }
        line
    }

    /// Whole-run output: per-result lines plus a footer
    pub fn format_summary(&self, summary: &RunSummary) -> String {
        match self.format {
            OutputFormat::Table => self.format_summary_table(summary),
            OutputFormat::Json => serde_json::to_string_pretty(summary).unwrap_or_default(),
            OutputFormat::Summary => self.format_summary_brief(summary),
        }
    }

    fn format_summary_table(&self, summary: &RunSummary) -> String {
        let mut output = String::new();

        output.push_str(&format!("\nChecks against {}\n", summary.target));
        output.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

        for result in &summary.results {
            output.push_str(&format!("  {}\n", self.format_result_line(result)));
        }

        output.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

        let fail_str = if self.colorize && summary.failed > 0 {
            format!("\x1b[31m{}\x1b[0m", summary.failed)
        } else {
            summary.failed.to_string()
        };
        output.push_str(&format!(
            "Total: {} | Pass: {} | Fail: {} | Duration: {}ms\n",
            summary.total, summary.passed, fail_str, summary.total_duration_ms
        ));
        output.push_str(&self.format_verdict(summary.overall_passed()));
        output.push('\n');

        output
    }

    fn format_summary_brief(&self, summary: &RunSummary) -> String {
        let mut output = String::new();
        for result in &summary.results {
            output.push_str(&format!(
                "{} {} ({}ms)\n",
                result.symbol(),
                result.name(),
                result.duration_ms()
            ));
        }
        output.push_str(&format!(
            "{}: {}/{} passed ({:.0}%) in {}ms",
            summary.target,
            summary.passed,
            summary.total,
            summary.pass_rate(),
            summary.total_duration_ms
        ));
        output
    }

    /// Explanation printed when the run aborts before any check
    pub fn format_fatal(&self, target: &str, reason: &str) -> String {
        match self.format {
            OutputFormat::Json => serde_json::json!({
                "target": target,
                "passed": false,
                "fatal": reason,
                "results": [],
            })
            .to_string(),
            OutputFormat::Table | OutputFormat::Summary => format!(
                "{} {}\n{}",
                self.paint(false, "✗ FATAL"),
                reason,
                self.format_verdict(false)
            ),
        }
    }

    pub fn format_verdict(&self, passed: bool) -> String {
        if passed {
            self.paint(true, "All checks passed")
        } else {
            self.paint(false, "Checks failed")
        }
    }

    /// Listing of declared checks
    pub fn format_cases(&self, cases: &[TestCase]) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(cases).unwrap_or_default(),
            OutputFormat::Table | OutputFormat::Summary => {
                let mut output = String::new();
                for (i, case) in cases.iter().enumerate() {
                    output.push_str(&format!(
                        "  {}. {:20} {:30} expects {}\n",
                        i + 1,
                        case.name,
                        case.url,
                        case.expectation
                    ));
                }
                output
            }
        }
    }

    fn paint(&self, ok: bool, text: &str) -> String {
        if !self.colorize {
            return text.to_string();
        }
        if ok {
            format!("\x1b[32m{text}\x1b[0m")
        } else {
            format!("\x1b[31m{text}\x1b[0m")
        }
    }
}
