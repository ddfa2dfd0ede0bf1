//! Configuration module
//!
//! Handles loading, layering and validating the harness configuration.
//! Precedence, lowest first: built-in defaults, config file, `EDGE_CHECK_*`
//! environment variables, command-line flags.

mod env;

pub use env::{print_env_help, EnvConfig};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::{Expectation, TestCase};
use crate::readiness::ProbeConfig;

/// Harness configuration, built once at start and passed down by reference
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Target host name or IP
    pub host: String,

    /// URL scheme used for every endpoint
    pub scheme: String,

    /// Timeout for functional endpoint requests, in milliseconds
    pub request_timeout_ms: u64,

    /// Readiness polling settings
    pub readiness: ReadinessConfig,

    /// Endpoint expected to answer with success and known content
    pub functional: EndpointConfig,

    /// Endpoint expected to answer with a constant non-success status
    pub fixed_response: EndpointConfig,

    /// Rate-limited endpoint and burst parameters
    pub rate_limit: RateLimitConfig,

    /// Directory receiving the sentinel marker and run report
    pub output_dir: PathBuf,

    /// Whether the sentinel artifact is written at all
    pub write_artifact: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            host: "nginx".to_string(),
            scheme: "http".to_string(),
            request_timeout_ms: 5000,
            readiness: ReadinessConfig::default(),
            functional: EndpointConfig {
                name: "html_endpoint".to_string(),
                port: 8080,
                path: "/".to_string(),
                expected_status: 200,
                body_contains: Some("Hello from Nginx".to_string()),
            },
            fixed_response: EndpointConfig {
                name: "error_endpoint".to_string(),
                port: 8081,
                path: "/".to_string(),
                expected_status: 418,
                body_contains: None,
            },
            rate_limit: RateLimitConfig::default(),
            output_dir: PathBuf::from("results"),
            write_artifact: true,
        }
    }
}

impl HarnessConfig {
    /// Load configuration from file.
    ///
    /// Not validated here; overrides may still fix file values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            anyhow::bail!("Target host must not be empty");
        }
        if !matches!(self.scheme.as_str(), "http" | "https") {
            anyhow::bail!("Unsupported scheme: {}", self.scheme);
        }
        if self.request_timeout_ms == 0 {
            anyhow::bail!("request_timeout_ms must be greater than 0");
        }

        let readiness = &self.readiness;
        if readiness.max_attempts == 0 {
            anyhow::bail!("readiness.max_attempts must be at least 1");
        }
        if readiness.timeout_ms == 0 {
            anyhow::bail!("readiness.timeout_ms must be greater than 0");
        }

        let limit = &self.rate_limit;
        if limit.requests == 0 {
            anyhow::bail!("rate_limit.requests must be at least 1");
        }
        if limit.burst >= limit.requests {
            anyhow::bail!(
                "rate_limit.burst ({}) must be smaller than rate_limit.requests ({})",
                limit.burst,
                limit.requests
            );
        }
        if limit.accepted_status == limit.rejected_status {
            anyhow::bail!(
                "rate_limit.accepted_status and rate_limit.rejected_status are both {}",
                limit.accepted_status
            );
        }
        if limit.request_timeout_ms == 0 {
            anyhow::bail!("rate_limit.request_timeout_ms must be greater than 0");
        }
        if limit.min_rejections == 0 {
            anyhow::bail!("rate_limit.min_rejections must be at least 1");
        }

        Ok(())
    }

    /// Build a URL on the configured host
    pub fn url(&self, port: u16, path: &str) -> String {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        format!("{}://{}:{}{}", self.scheme, self.host, port, path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Readiness settings resolved against the target host
    pub fn probe_config(&self) -> ProbeConfig {
        ProbeConfig::new(
            self.url(self.readiness.port, &self.readiness.path),
            self.readiness.max_attempts,
            Duration::from_millis(self.readiness.interval_ms),
            Duration::from_millis(self.readiness.timeout_ms),
        )
    }

    /// The fixed, ordered set of checks for this target
    pub fn test_cases(&self) -> Vec<TestCase> {
        let functional = |endpoint: &EndpointConfig| {
            let expectation = match &endpoint.body_contains {
                Some(fragment) => {
                    Expectation::status_with_body(endpoint.expected_status, fragment.clone())
                }
                None => Expectation::status(endpoint.expected_status),
            };
            TestCase::new(
                endpoint.name.clone(),
                self.url(endpoint.port, &endpoint.path),
                expectation,
            )
        };

        vec![
            functional(&self.functional),
            functional(&self.fixed_response),
            TestCase::new(
                self.rate_limit.name.clone(),
                self.url(self.rate_limit.port, &self.rate_limit.path),
                Expectation::rejection(self.rate_limit.rejected_status),
            ),
        ]
    }

    /// Human-readable target, e.g. `http://nginx`
    pub fn target(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }
}

/// Readiness polling configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Port polled for readiness
    pub port: u16,

    /// Path polled for readiness
    pub path: String,

    /// Maximum number of attempts
    pub max_attempts: u32,

    /// Sleep between attempts, in milliseconds
    pub interval_ms: u64,

    /// Per-attempt timeout, in milliseconds
    pub timeout_ms: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            path: "/".to_string(),
            max_attempts: 30,
            interval_ms: 1000,
            timeout_ms: 2000,
        }
    }
}

/// A functional endpoint and what it must answer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Name reported for this check
    pub name: String,

    pub port: u16,

    pub path: String,

    /// Exact status code required to pass
    pub expected_status: u16,

    /// Fragment the body must contain, if any
    #[serde(default)]
    pub body_contains: Option<String>,
}

/// Rate-limit probe configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Name reported for this check
    pub name: String,

    pub port: u16,

    pub path: String,

    /// Sustained rate the service is configured for, in requests per second
    pub sustained_rate: f64,

    /// Requests the service admits above the sustained rate
    pub burst: u32,

    /// Number of requests fired back to back
    pub requests: u32,

    /// Status of an admitted request
    pub accepted_status: u16,

    /// Status of a limited request
    pub rejected_status: u16,

    /// Per-request timeout, in milliseconds
    pub request_timeout_ms: u64,

    /// Rejections required to consider the limiter active.
    /// The exact accepted/rejected split depends on timing and is not checked.
    pub min_rejections: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            name: "rate_limiting".to_string(),
            port: 8080,
            path: "/".to_string(),
            sustained_rate: 1.0,
            burst: 5,
            requests: 20,
            accepted_status: 200,
            rejected_status: 429,
            request_timeout_ms: 1000,
            min_rejections: 1,
        }
    }
}

impl RateLimitConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
