//! edge-check - post-deployment integration checks for an edge web server
//!
//! Waits until a freshly deployed server answers HTTP, verifies that its
//! endpoints return the expected status and content, confirms that its rate
//! limiter rejects a burst, and leaves a `PASSED` or `FAILED` marker for the
//! surrounding pipeline. The process exit code is 0 only when every check
//! passed.
//!
//! ## Usage
//!
//! ```bash
//! # Run against the default target (http://nginx)
//! edge-check run
//!
//! # Run against another host with a longer readiness window
//! edge-check run --host 10.0.0.5 --max-attempts 60
//!
//! # Show the checks a run would execute
//! edge-check list
//!
//! # Save the effective configuration
//! edge-check config --output edge-check.yaml
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info};

mod cli;
mod config;
mod executor;
mod http;
mod models;
mod output;
mod readiness;
mod results;
mod tests;
mod utils;

use cli::{Args, TargetArgs};
use config::{EnvConfig, HarnessConfig};
use executor::HarnessRunner;
use output::{OutputFormat, ResultFormatter};
use results::{Aggregator, SentinelArtifact, FAILED_MARKER, PASSED_MARKER, REPORT_FILE};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    let env = EnvConfig::load();

    utils::init_logger(args.verbose || env.verbose.unwrap_or(false));

    match dispatch(args.command, &env).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            eprintln!("edge-check: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(command: cli::Command, env: &EnvConfig) -> Result<ExitCode> {
    match command {
        cli::Command::Run(run_args) => {
            let mut config = resolve_config(&run_args.target, env)?;
            run_args.apply(&mut config);
            config.validate().context("Invalid configuration")?;

            let format = resolve_format(run_args.format.as_deref(), env)?;
            let mut formatter = ResultFormatter::new(format);
            if run_args.no_color {
                formatter = formatter.no_color();
            }

            let verdict = run_checks(config, formatter).await?;
            Ok(ExitCode::from(verdict.exit_code()))
        }
        cli::Command::List(list_args) => {
            let config = resolve_config(&list_args.target, env)?;
            let format = resolve_format(list_args.format.as_deref(), env)?;
            list_checks(&config, ResultFormatter::new(format));
            Ok(ExitCode::SUCCESS)
        }
        cli::Command::Env => {
            config::print_env_help();
            Ok(ExitCode::SUCCESS)
        }
        cli::Command::Config(config_args) => {
            let config = resolve_config(&config_args.target, env)?;
            config.validate().context("Invalid configuration")?;
            match config_args.output {
                Some(path) => {
                    config.save(&path)?;
                    println!("✓ Configuration saved: {}", path.display());
                }
                None => println!("{}", serde_yaml::to_string(&config)?),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Layer defaults, config file, environment and flags into one config
fn resolve_config(target: &TargetArgs, env: &EnvConfig) -> Result<HarnessConfig> {
    let file = target
        .config
        .clone()
        .or_else(|| env.config_file.as_ref().map(PathBuf::from));

    let mut config = match file {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            HarnessConfig::load(&path)?
        }
        None => HarnessConfig::default(),
    };

    if env.has_any() {
        debug!("Applying EDGE_CHECK_* environment overrides");
    }
    env.apply(&mut config);
    target.apply(&mut config);

    Ok(config)
}

fn resolve_format(flag: Option<&str>, env: &EnvConfig) -> Result<OutputFormat> {
    match flag.or(env.format.as_deref()) {
        Some(name) => match OutputFormat::from_str(name) {
            Some(format) => Ok(format),
            None => bail!("Unknown output format: {name} (expected table, json or summary)"),
        },
        None => Ok(OutputFormat::Table),
    }
}

async fn run_checks(config: HarnessConfig, formatter: ResultFormatter) -> Result<results::Verdict> {
    info!(
        "Checking {} (readiness: up to {} attempts every {}ms)",
        config.target(),
        config.readiness.max_attempts,
        config.readiness.interval_ms
    );

    let mut aggregator = Aggregator::new(config.target(), formatter);
    if config.write_artifact {
        aggregator = aggregator.with_artifact(SentinelArtifact::new(&config.output_dir));
    }

    let mut runner = HarnessRunner::new(config);
    debug!("{} checks declared", runner.cases().len());

    let verdict = runner.run(aggregator).await?;
    debug!("Run phases: {:?}", runner.state().history());
    Ok(verdict)
}

fn list_checks(config: &HarnessConfig, formatter: ResultFormatter) {
    let cases = config.test_cases();

    if formatter.format() == OutputFormat::Json {
        println!("{}", formatter.format_cases(&cases));
        return;
    }

    println!("\nChecks against {} ({} total)\n", config.target(), cases.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "  readiness: {} ({} attempts, {}ms apart)",
        config.url(config.readiness.port, &config.readiness.path),
        config.readiness.max_attempts,
        config.readiness.interval_ms
    );
    print!("{}", formatter.format_cases(&cases));
    if config.write_artifact {
        println!(
            "  artifact:  {} ({} or {}, plus {})",
            config.output_dir.display(),
            PASSED_MARKER,
            FAILED_MARKER,
            REPORT_FILE
        );
    }
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
}
