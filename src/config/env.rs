//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;
use std::path::PathBuf;

use super::HarnessConfig;

/// Environment variable prefix
const ENV_PREFIX: &str = "EDGE_CHECK";

/// Configuration overrides read from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Target host from EDGE_CHECK_HOST
    pub host: Option<String>,
    /// Functional endpoint port from EDGE_CHECK_FUNCTIONAL_PORT
    pub functional_port: Option<u16>,
    /// Fixed-response endpoint port from EDGE_CHECK_ERROR_PORT
    pub error_port: Option<u16>,
    /// Rate-limited endpoint port from EDGE_CHECK_RATE_LIMIT_PORT
    pub rate_limit_port: Option<u16>,
    /// Readiness attempts from EDGE_CHECK_MAX_ATTEMPTS
    pub max_attempts: Option<u32>,
    /// Readiness interval from EDGE_CHECK_INTERVAL_MS
    pub interval_ms: Option<u64>,
    /// Readiness attempt timeout from EDGE_CHECK_TIMEOUT_MS
    pub timeout_ms: Option<u64>,
    /// Functional request timeout from EDGE_CHECK_REQUEST_TIMEOUT_MS
    pub request_timeout_ms: Option<u64>,
    /// Burst size from EDGE_CHECK_RATE_LIMIT_REQUESTS
    pub rate_limit_requests: Option<u32>,
    /// Burst allowance from EDGE_CHECK_RATE_LIMIT_BURST
    pub rate_limit_burst: Option<u32>,
    /// Sustained rate from EDGE_CHECK_RATE_LIMIT_RATE
    pub rate_limit_rate: Option<f64>,
    /// Artifact directory from EDGE_CHECK_OUTPUT_DIR
    pub output_dir: Option<String>,
    /// Config file from EDGE_CHECK_CONFIG
    pub config_file: Option<String>,
    /// Output format from EDGE_CHECK_FORMAT
    pub format: Option<String>,
    /// Verbose from EDGE_CHECK_VERBOSE
    pub verbose: Option<bool>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            host: get_env("HOST"),
            functional_port: get_env_parse("FUNCTIONAL_PORT"),
            error_port: get_env_parse("ERROR_PORT"),
            rate_limit_port: get_env_parse("RATE_LIMIT_PORT"),
            max_attempts: get_env_parse("MAX_ATTEMPTS"),
            interval_ms: get_env_parse("INTERVAL_MS"),
            timeout_ms: get_env_parse("TIMEOUT_MS"),
            request_timeout_ms: get_env_parse("REQUEST_TIMEOUT_MS"),
            rate_limit_requests: get_env_parse("RATE_LIMIT_REQUESTS"),
            rate_limit_burst: get_env_parse("RATE_LIMIT_BURST"),
            rate_limit_rate: get_env_parse("RATE_LIMIT_RATE"),
            output_dir: get_env("OUTPUT_DIR"),
            config_file: get_env("CONFIG"),
            format: get_env("FORMAT"),
            verbose: get_env_bool("VERBOSE"),
        }
    }

    /// Check if any harness override is set
    pub fn has_any(&self) -> bool {
        self.host.is_some()
            || self.functional_port.is_some()
            || self.error_port.is_some()
            || self.rate_limit_port.is_some()
            || self.max_attempts.is_some()
            || self.interval_ms.is_some()
            || self.timeout_ms.is_some()
            || self.request_timeout_ms.is_some()
            || self.rate_limit_requests.is_some()
            || self.rate_limit_burst.is_some()
            || self.rate_limit_rate.is_some()
            || self.output_dir.is_some()
    }

    /// Overlay the set variables onto `config`
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
        if let Some(requests) = self.rate_limit_requests {
            config.rate_limit.requests = requests;
        }
        if let Some(burst) = self.rate_limit_burst {
            config.rate_limit.burst = burst;
        }
        if let Some(rate) = self.rate_limit_rate {
            config.rate_limit.sustained_rate = rate;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = PathBuf::from(dir);
        }
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.trim().parse().ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Builder for setting environment variables in tests
#[cfg(test)]
pub struct EnvBuilder {
    vars: Vec<(String, String)>,
}

#[cfg(test)]
impl EnvBuilder {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    pub fn var(mut self, name: &str, value: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_{name}"), value.into()));
        self
    }

    /// Apply and return guard that restores on drop
    pub fn apply_scoped(self) -> EnvGuard {
        let previous: Vec<_> = self
            .vars
            .iter()
            .map(|(k, _)| (k.clone(), env::var(k).ok()))
            .collect();

        for (key, value) in self.vars {
            env::set_var(key, value);
        }

        EnvGuard { previous }
    }
}

/// Guard that restores environment variables on drop
#[cfg(test)]
pub struct EnvGuard {
    previous: Vec<(String, Option<String>)>,
}

#[cfg(test)]
impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

/// Print all EDGE_CHECK environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_HOST                 Target host name or IP");
    println!("  {ENV_PREFIX}_FUNCTIONAL_PORT      Port of the content endpoint (also polled for readiness)");
    println!("  {ENV_PREFIX}_ERROR_PORT           Port of the fixed-status endpoint");
    println!("  {ENV_PREFIX}_RATE_LIMIT_PORT      Port of the rate-limited endpoint");
    println!("  {ENV_PREFIX}_MAX_ATTEMPTS         Readiness attempts before giving up");
    println!("  {ENV_PREFIX}_INTERVAL_MS          Sleep between readiness attempts");
    println!("  {ENV_PREFIX}_TIMEOUT_MS           Timeout of each readiness attempt");
    println!("  {ENV_PREFIX}_REQUEST_TIMEOUT_MS   Timeout of each endpoint check");
    println!("  {ENV_PREFIX}_RATE_LIMIT_REQUESTS  Requests fired in the burst");
    println!("  {ENV_PREFIX}_RATE_LIMIT_BURST     Burst allowance of the limiter");
    println!("  {ENV_PREFIX}_RATE_LIMIT_RATE      Sustained rate of the limiter (req/s)");
    println!("  {ENV_PREFIX}_OUTPUT_DIR           Directory for the PASSED/FAILED marker");
    println!("  {ENV_PREFIX}_CONFIG               Path to configuration file (yaml or json)");
    println!("  {ENV_PREFIX}_FORMAT               Output format (table, json, summary)");
    println!("  {ENV_PREFIX}_VERBOSE              Enable debug logging (true/false)");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_HOST=nginx");
    println!("  export {ENV_PREFIX}_MAX_ATTEMPTS=60");
    println!("  edge-check run");
}
