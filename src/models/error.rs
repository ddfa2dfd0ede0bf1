//! Failure classification for harness checks

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::http::HttpError;

/// Why a check did not pass
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ConnectionFailure,
    Timeout,
    UnexpectedStatus,
    UnexpectedContent,
    RateLimitNotEnforced,
}

impl FailureKind {
    pub fn label(&self) -> &'static str {
        match self {
            FailureKind::ConnectionFailure => "connection failure",
            FailureKind::Timeout => "timeout",
            FailureKind::UnexpectedStatus => "unexpected status",
            FailureKind::UnexpectedContent => "unexpected content",
            FailureKind::RateLimitNotEnforced => "rate limit not enforced",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<&HttpError> for FailureKind {
    fn from(err: &HttpError) -> Self {
        match err {
            HttpError::Timeout(_) => FailureKind::Timeout,
            _ => FailureKind::ConnectionFailure,
        }
    }
}

/// Conditions that abort a run instead of producing a failed result
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("service not ready at {url} after {attempts} attempts: {last_error}")]
    NotReady {
        url: String,
        attempts: u32,
        last_error: String,
    },

    #[error("harness setup failed: {0}")]
    Setup(String),

    #[error("invalid run transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}
