//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::HarnessConfig;

/// Post-deployment integration checks for an edge web server
#[derive(Parser, Debug)]
#[command(name = "edge-check")]
#[command(version)]
#[command(about = "Wait for a deployed web server, verify its endpoints and rate limit")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Wait for readiness, run every check and write the sentinel marker
    Run(RunArgs),

    /// List the checks a run would execute
    List(ListArgs),

    /// Show supported environment variables
    Env,

    /// Print or save the effective configuration
    Config(ConfigArgs),
}

/// Overrides for the target and check parameters
#[derive(ClapArgs, Debug, Default)]
pub struct TargetArgs {
    /// Configuration file (yaml or json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Target host name or IP
    #[arg(long)]
    pub host: Option<String>,

    /// Port of the content endpoint, also polled for readiness
    #[arg(long)]
    pub functional_port: Option<u16>,

    /// Port of the fixed-status endpoint
    #[arg(long)]
    pub error_port: Option<u16>,

    /// Port of the rate-limited endpoint
    #[arg(long)]
    pub rate_limit_port: Option<u16>,

    /// Readiness attempts before giving up
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Milliseconds between readiness attempts
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Timeout of each readiness attempt in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Timeout of each endpoint check in milliseconds
    #[arg(long)]
    pub request_timeout_ms: Option<u64>,

    /// Requests fired in the rate-limit burst
    #[arg(long)]
    pub requests: Option<u32>,

    /// Burst allowance of the limiter
    #[arg(long)]
    pub burst: Option<u32>,

    /// Sustained rate of the limiter (req/s)
    #[arg(long)]
    pub rate: Option<f64>,
}

impl TargetArgs {
    /// Overlay the given flags onto `config`
    pub fn apply(&self, config: &mut HarnessConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.functional_port {
            config.functional.port = port;
            config.readiness.port = port;
        }
        if let Some(port) = self.error_port {
            config.fixed_response.port = port;
        }
        if let Some(port) = self.rate_limit_port {
            config.rate_limit.port = port;
        }
        if let Some(attempts) = self.max_attempts {
            config.readiness.max_attempts = attempts;
        }
        if let Some(interval) = self.interval_ms {
            config.readiness.interval_ms = interval;
        }
        if let Some(timeout) = self.timeout_ms {
            config.readiness.timeout_ms = timeout;
        }
        if let Some(timeout) = self.request_timeout_ms {
            config.request_timeout_ms = timeout;
        }
        if let Some(requests) = self.requests {
            config.rate_limit.requests = requests;
        }
        if let Some(burst) = self.burst {
            config.rate_limit.burst = burst;
        }
        if let Some(rate) = self.rate {
            config.rate_limit.sustained_rate = rate;
        }
    }
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Output format (table, json, summary)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Directory for the PASSED/FAILED marker and results.json
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Do not write the sentinel artifact
    #[arg(long)]
    pub no_artifact: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl RunArgs {
    /// Overlay the artifact flags onto `config`
    pub fn apply(&self, config: &mut HarnessConfig) {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if self.no_artifact {
            config.write_artifact = false;
        }
    }
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Output format (table, json)
    #[arg(short, long)]
    pub format: Option<String>,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Save the effective configuration to this file instead of printing it
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_defaults() {
        let args = Args::try_parse_from(["edge-check", "run"]).expect("parse");
        match args.command {
            Command::Run(run) => {
                assert!(run.target.host.is_none());
                assert!(run.format.is_none());
                assert!(!run.no_artifact);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_run_overrides() {
        let args = Args::try_parse_from([
            "edge-check",
            "run",
            "--host",
            "10.0.0.5",
            "--functional-port",
            "9080",
            "--max-attempts",
            "60",
            "--requests",
            "40",
            "--format",
            "json",
            "--no-artifact",
            "-v",
        ])
        .expect("parse");
        assert!(args.verbose);

        let Command::Run(run) = args.command else {
            panic!("expected run command");
        };
        let mut config = HarnessConfig::default();
        run.target.apply(&mut config);
        run.apply(&mut config);

        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.functional.port, 9080);
        assert_eq!(config.readiness.port, 9080);
        assert_eq!(config.readiness.max_attempts, 60);
        assert_eq!(config.rate_limit.requests, 40);
        assert!(!config.write_artifact);
        assert_eq!(run.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_unset_flags_leave_config_alone() {
        let mut config = HarnessConfig::default();
        TargetArgs::default().apply(&mut config);
        assert_eq!(config, HarnessConfig::default());
    }

    #[test]
    fn test_parse_config_output() {
        let args =
            Args::try_parse_from(["edge-check", "config", "--output", "harness.yaml"]).expect("parse");
        let Command::Config(config) = args.command else {
            panic!("expected config command");
        };
        assert_eq!(config.output, Some(PathBuf::from("harness.yaml")));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(Args::try_parse_from(["edge-check", "run", "--error-port", "70000"]).is_err());
    }
}
