//! Edge service check implementations
//!
//! ## Checks
//!
//! - Endpoint verification: exact status code plus optional body fragment,
//!   used for both the content endpoint and the fixed error endpoint
//! - Rate limiting: a back-to-back burst that must provoke rejections
//!
//! Checks always run one after another in declaration order.

mod endpoint;

pub use endpoint::EndpointVerifier;
pub use rate_limit::RateLimitProbe;

use anyhow::Result;
use tracing::info;

use crate::config::HarnessConfig;
use crate::http::HttpClient;
use crate::models::{TestCase, TestResult};

/// Runs declared checks in order
pub struct CheckSuite {
    verifier: EndpointVerifier,
    probe: RateLimitProbe,
}

impl CheckSuite {
    pub fn new(verifier: EndpointVerifier, probe: RateLimitProbe) -> Self {
        Self { verifier, probe }
    }

    /// Build verifier and probe over one shared client
    pub fn from_config(config: &HarnessConfig) -> Result<Self> {
        let client = HttpClient::with_timeout(config.request_timeout())?;
        Ok(Self::new(
            EndpointVerifier::new(client.clone(), config.request_timeout()),
            RateLimitProbe::new(client, config.rate_limit.clone()),
        ))
    }

    /// Run one check; failures become failed results, never errors
    pub async fn run_case(&self, case: &TestCase) -> TestResult {
        if case.is_rate_limit() {
            self.probe.run(case).await
        } else {
            self.verifier.verify(case).await
        }
    }

    /// Run every case sequentially, preserving order
    pub async fn run_all(&self, cases: &[TestCase]) -> Vec<TestResult> {
        let mut results = Vec::with_capacity(cases.len());

        for case in cases {
            let result = self.run_case(case).await;
            info!("  {}", result);
            results.push(result);
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Expectation, FailureKind};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_failures_do_not_stop_later_checks() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/teapot"))
            .respond_with(ResponseTemplate::new(418))
            .mount(&server)
            .await;

        let unreachable = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr")
        };

        let cases = vec![
            TestCase::new(
                "html_endpoint",
                format!("http://{unreachable}/"),
                Expectation::status_with_body(200, "Hello"),
            ),
            TestCase::new(
                "error_endpoint",
                format!("{}/teapot", server.uri()),
                Expectation::status(418),
            ),
        ];

        let suite = CheckSuite::from_config(&HarnessConfig::default()).expect("suite");
        let results = suite.run_all(&cases).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name(), "html_endpoint");
        assert_eq!(results[0].failure(), Some(FailureKind::ConnectionFailure));
        assert_eq!(results[1].name(), "error_endpoint");
        assert!(results[1].passed());
    }
}
