//! Harness run driver
//!
//! Owns the run state machine:
//! `NotStarted -> AwaitingReadiness -> {Failed | Testing} -> Aggregating -> Terminated`.

use std::fmt;
use tracing::{debug, error, info};

use crate::config::HarnessConfig;
use crate::models::{HarnessError, TestCase};
use crate::readiness::ReadinessProber;
use crate::results::{Aggregator, RunOutcome, Verdict};
use crate::tests::CheckSuite;
use crate::utils::Stopwatch;

/// Phase of a harness run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunPhase {
    NotStarted,
    AwaitingReadiness,
    Testing,
    Failed,
    Aggregating,
    Terminated,
}

impl RunPhase {
    pub fn can_transition_to(self, next: RunPhase) -> bool {
        use RunPhase::*;
        matches!(
            (self, next),
            (NotStarted, AwaitingReadiness)
                | (AwaitingReadiness, Testing)
                | (AwaitingReadiness, Failed)
                | (Testing, Aggregating)
                | (Failed, Aggregating)
                | (Aggregating, Terminated)
        )
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::NotStarted => "not-started",
            RunPhase::AwaitingReadiness => "awaiting-readiness",
            RunPhase::Testing => "testing",
            RunPhase::Failed => "failed",
            RunPhase::Aggregating => "aggregating",
            RunPhase::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Tracks the current phase and every phase visited
#[derive(Debug)]
pub struct RunState {
    phase: RunPhase,
    history: Vec<RunPhase>,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            phase: RunPhase::NotStarted,
            history: vec![RunPhase::NotStarted],
        }
    }

    pub fn history(&self) -> &[RunPhase] {
        &self.history
    }

    pub fn advance(&mut self, next: RunPhase) -> Result<(), HarnessError> {
        if !self.phase.can_transition_to(next) {
            return Err(HarnessError::InvalidTransition {
                from: self.phase.to_string(),
                to: next.to_string(),
            });
        }
        info!("Run phase: {} -> {}", self.phase, next);
        self.phase = next;
        self.history.push(next);
        Ok(())
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives one harness run from readiness to exit signal
pub struct HarnessRunner {
    config: HarnessConfig,
    cases: Vec<TestCase>,
    state: RunState,
}

impl HarnessRunner {
    pub fn new(config: HarnessConfig) -> Self {
        let cases = config.test_cases();
        Self {
            config,
            cases,
            state: RunState::new(),
        }
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Execute the run and hand the outcome to `aggregator`.
    ///
    /// Readiness failure aborts before any check runs. Check failures never
    /// abort; they are recorded and the remaining checks still execute.
    pub async fn run(&mut self, aggregator: Aggregator) -> Result<Verdict, HarnessError> {
        let mut stopwatch = Stopwatch::new();

        self.state.advance(RunPhase::AwaitingReadiness)?;
        let ready = self.await_readiness().await;
        stopwatch.lap("readiness");

        let outcome = match ready {
            Ok(()) => {
                self.state.advance(RunPhase::Testing)?;
                let outcome = self.execute_checks().await;
                stopwatch.lap("checks");
                outcome
            }
            Err(e) => {
                error!("Aborting run: {}", e);
                self.state.advance(RunPhase::Failed)?;
                RunOutcome::Aborted(e)
            }
        };

        self.state.advance(RunPhase::Aggregating)?;
        let verdict = aggregator.finish(outcome);
        stopwatch.lap("aggregation");

        self.state.advance(RunPhase::Terminated)?;
        info!("Run finished in {}ms ({})", stopwatch.total().as_millis(), stopwatch.format());

        Ok(verdict)
    }

    async fn await_readiness(&self) -> Result<(), HarnessError> {
        let prober = ReadinessProber::new(self.config.probe_config())
            .map_err(|e| HarnessError::Setup(format!("{e:#}")))?;
        let report = prober.wait_ready().await?;
        debug!(
            "{} answered {} after {} attempt(s) in {}ms",
            report.url, report.status_code, report.attempts, report.elapsed_ms
        );
        Ok(())
    }

    async fn execute_checks(&self) -> RunOutcome {
        match CheckSuite::from_config(&self.config) {
            Ok(suite) => RunOutcome::Completed(suite.run_all(&self.cases).await),
            Err(e) => RunOutcome::Aborted(HarnessError::Setup(format!("{e:#}"))),
        }
    }
}
