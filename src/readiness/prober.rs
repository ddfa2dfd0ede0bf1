//! Readiness polling for the service under test
//!
//! Polls a target until any HTTP response arrives or the attempt budget is
//! spent. This is the only place in the harness that retries.

use anyhow::Result;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::http::HttpClient;
use crate::models::HarnessError;

/// Readiness polling configuration. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeConfig {
    url: String,
    max_attempts: u32,
    interval: Duration,
    timeout: Duration,
}

impl ProbeConfig {
    pub fn new(url: impl Into<String>, max_attempts: u32, interval: Duration, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            max_attempts,
            interval,
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Upper bound on how long `wait_ready` can take
    pub fn worst_case(&self) -> Duration {
        (self.interval + self.timeout) * self.max_attempts
    }
}

/// Outcome of a successful readiness wait
#[derive(Clone, Debug)]
pub struct ReadinessReport {
    pub url: String,
    pub attempts: u32,
    pub status_code: u16,
    pub elapsed_ms: u64,
}

/// Polls the target until it answers
pub struct ReadinessProber {
    config: ProbeConfig,
    http_client: HttpClient,
}

impl ReadinessProber {
    pub fn new(config: ProbeConfig) -> Result<Self> {
        let http_client = HttpClient::with_timeout(config.timeout())?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// Wait for the target to answer.
    ///
    /// Any HTTP response counts as ready, whatever its status. Connection
    /// failures and timeouts consume an attempt. No sleep follows the last
    /// attempt.
    pub async fn wait_ready(&self) -> Result<ReadinessReport, HarnessError> {
        let start = Instant::now();
        let url = self.config.url();
        let max_attempts = self.config.max_attempts();
        let mut last_error = String::from("no attempt made");

        info!(
            "Waiting for {} to become ready ({} attempts, {}ms interval, at most {}s)",
            url,
            max_attempts,
            self.config.interval().as_millis(),
            self.config.worst_case().as_secs()
        );

        for attempt in 1..=max_attempts {
            match self.http_client.status(url).await {
                Ok(status_code) => {
                    let elapsed_ms = start.elapsed().as_millis() as u64;
                    info!(
                        "{} is ready after {} attempt(s) (status: {}, {}ms)",
                        url, attempt, status_code, elapsed_ms
                    );
                    return Ok(ReadinessReport {
                        url: url.to_string(),
                        attempts: attempt,
                        status_code,
                        elapsed_ms,
                    });
                }
                Err(e) => {
                    debug!("Readiness attempt {}/{} failed: {}", attempt, max_attempts, e);
                    last_error = e.to_string();
                }
            }

            if attempt < max_attempts {
                sleep(self.config.interval()).await;
            }
        }

        warn!(
            "{} not ready after {} attempts in {}ms",
            url,
            max_attempts,
            start.elapsed().as_millis()
        );

        Err(HarnessError::NotReady {
            url: url.to_string(),
            attempts: max_attempts,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn unused_addr() -> std::net::SocketAddr {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr")
    }

    #[test]
    fn test_worst_case_bound() {
        let config = ProbeConfig::new(
            "http://nginx:8080/",
            30,
            Duration::from_secs(1),
            Duration::from_secs(2),
        );
        assert_eq!(config.worst_case(), Duration::from_secs(90));
    }

    #[tokio::test]
    async fn test_any_status_counts_as_ready() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let config = ProbeConfig::new(
            format!("{}/", server.uri()),
            3,
            Duration::from_millis(10),
            Duration::from_millis(500),
        );
        let report = ReadinessProber::new(config)
            .expect("prober")
            .wait_ready()
            .await
            .expect("ready");

        assert_eq!(report.attempts, 1);
        assert_eq!(report.status_code, 404);
    }

    #[tokio::test]
    async fn test_unreachable_target_exhausts_budget_within_bound() {
        let config = ProbeConfig::new(
            format!("http://{}/", unused_addr()),
            3,
            Duration::from_millis(20),
            Duration::from_millis(100),
        );
        let bound = config.worst_case();
        let prober = ReadinessProber::new(config).expect("prober");

        let start = Instant::now();
        let err = prober.wait_ready().await.expect_err("never ready");
        let elapsed = start.elapsed();

        match err {
            HarnessError::NotReady { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("unexpected error: {other}"),
        }
        assert!(elapsed <= bound, "took {elapsed:?}, bound {bound:?}");
    }

    #[tokio::test]
    async fn test_slow_target_times_out_each_attempt() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let config = ProbeConfig::new(
            format!("{}/", server.uri()),
            2,
            Duration::from_millis(10),
            Duration::from_millis(100),
        );
        let bound = config.worst_case();
        let prober = ReadinessProber::new(config).expect("prober");

        let start = Instant::now();
        let err = prober.wait_ready().await.expect_err("too slow");
        let elapsed = start.elapsed();

        match err {
            HarnessError::NotReady { last_error, .. } => {
                assert!(last_error.starts_with("Timeout"), "{last_error}")
            }
            other => panic!("unexpected error: {other}"),
        }
        // Small allowance for timer granularity on top of the bound
        assert!(elapsed <= bound + Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_becomes_ready_after_late_start() {
        let addr = unused_addr();

        tokio::spawn(async move {
            sleep(Duration::from_millis(150)).await;
            let listener = TcpListener::bind(addr).await.expect("rebind");
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).await;
                let _ = stream
                    .write_all(
                        b"HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                    )
                    .await;
                let _ = stream.shutdown().await;
            }
        });

        let config = ProbeConfig::new(
            format!("http://{addr}/"),
            40,
            Duration::from_millis(25),
            Duration::from_millis(200),
        );
        let report = ReadinessProber::new(config)
            .expect("prober")
            .wait_ready()
            .await
            .expect("ready once listener is up");

        assert!(report.attempts > 1);
        assert_eq!(report.status_code, 503);
    }

    #[tokio::test]
    async fn test_truncated_body_still_counts_as_ready() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).await;
                let _ = stream
                    .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 100\r\n\r\nshort")
                    .await;
                let _ = stream.shutdown().await;
            }
        });

        let config = ProbeConfig::new(
            format!("http://{addr}/"),
            3,
            Duration::from_millis(10),
            Duration::from_millis(500),
        );
        let report = ReadinessProber::new(config)
            .expect("prober")
            .wait_ready()
            .await
            .expect("status line is enough");

        assert_eq!(report.attempts, 1);
        assert_eq!(report.status_code, 200);
    }
}
