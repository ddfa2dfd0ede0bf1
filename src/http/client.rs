//! HTTP client for edge service checks
//!
//! Every request carries an explicit timeout and resolves to either a
//! response (any status code) or a classified network failure.

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Network-level failures. A non-2xx status is never one of these.
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Connection refused to {0}")]
    ConnectionRefused(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// HTTP client for issuing check requests
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create client with a default per-request timeout.
    ///
    /// Redirects are followed with reqwest's default policy.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, timeout })
    }

    /// Status code of a GET, using the client's default timeout.
    ///
    /// Resolves as soon as the status line and headers arrive; the body is
    /// never read, so a truncated or slow body does not turn into an error.
    pub async fn status(&self, url: &str) -> Result<u16, HttpError> {
        let response = self.send(url, self.timeout).await?;
        let status = response.status();
        debug!("Status from {}: {}", url, status.as_u16());
        Ok(status.as_u16())
    }

    /// GET bounded by `timeout` for both the exchange and the body read
    pub async fn get_with_timeout(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<HttpResponse, HttpError> {
        let start = Instant::now();
        let response = self.send(url, timeout).await?;
        let status = response.status();

        let body = response
            .text()
            .await
            .map_err(|e| classify(e, url, timeout))?;

        debug!(
            "Response: {} {} in {}ms",
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            start.elapsed().as_millis()
        );

        Ok(HttpResponse {
            status_code: status.as_u16(),
            body,
        })
    }

    async fn send(&self, url: &str, timeout: Duration) -> Result<reqwest::Response, HttpError> {
        debug!("Sending GET request to {} (timeout {}ms)", url, timeout.as_millis());

        let parsed = reqwest::Url::parse(url).map_err(|e| HttpError::InvalidUrl(e.to_string()))?;

        self.client
            .get(parsed)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(e, url, timeout))
    }
}

fn classify(err: reqwest::Error, url: &str, timeout: Duration) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout(timeout)
    } else if err.is_connect() {
        HttpError::ConnectionRefused(url.to_string())
    } else {
        HttpError::RequestFailed(err.to_string())
    }
}

/// HTTP response
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn body_contains(&self, text: &str) -> bool {
        self.body.contains(text)
    }
}
