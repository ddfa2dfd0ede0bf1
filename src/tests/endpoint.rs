//! Functional endpoint verification
//!
//! One request per declared check, compared against an exact status code and
//! an optional body fragment.

use anyhow::Result;
use std::time::Duration;
use tracing::{debug, info};

use crate::http::{HttpClient, HttpError, HttpResponse};
use crate::models::{Expectation, FailureKind, TestCase, TestResult};
use crate::utils::Timer;

/// Verifies functional endpoints
#[derive(Clone)]
pub struct EndpointVerifier {
    client: HttpClient,
    timeout: Duration,
}

impl EndpointVerifier {
    pub fn new(client: HttpClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Issue one request for `case` and judge the reply.
    ///
    /// A rejection expectation is checked as a single request that must be
    /// answered with the limiting status.
    pub async fn verify(&self, case: &TestCase) -> TestResult {
        info!("Verifying {}", case);
        let timer = Timer::start(&case.name);

        let outcome = self.client.get_with_timeout(&case.url, self.timeout).await;
        let result = evaluate(case, outcome, timer.elapsed_ms());

        debug!("{}", result);
        timer.stop();
        result
    }
}

/// Judge a request outcome against the case's expectation
pub fn evaluate(
    case: &TestCase,
    outcome: Result<HttpResponse, HttpError>,
    duration_ms: u64,
) -> TestResult {
    let (expected_status, fragment) = match &case.expectation {
        Expectation::Response {
            status,
            body_contains,
        } => (*status, body_contains.as_deref()),
        Expectation::Rejection { status } => (*status, None),
    };

    let response = match outcome {
        Ok(response) => response,
        Err(e) => {
            return TestResult::fail(
                &case.name,
                duration_ms,
                FailureKind::from(&e),
                format!("request to {} failed: {e}", case.url),
            );
        }
    };

    if response.status_code != expected_status {
        return TestResult::fail(
            &case.name,
            duration_ms,
            FailureKind::UnexpectedStatus,
            format!(
                "expected {}, got {}",
                expected_status, response.status_code
            ),
        );
    }

    match fragment {
        Some(fragment) if !response.body_contains(fragment) => TestResult::fail(
            &case.name,
            duration_ms,
            FailureKind::UnexpectedContent,
            format!(
                "status {} as expected but body is missing {:?}",
                response.status_code, fragment
            ),
        ),
        Some(fragment) => TestResult::pass(
            &case.name,
            duration_ms,
            format!("{}, body contains {:?}", status_label(expected_status), fragment),
        ),
        None => TestResult::pass(&case.name, duration_ms, status_label(expected_status)),
    }
}

fn status_label(code: u16) -> String {
    match reqwest::StatusCode::from_u16(code)
        .ok()
        .and_then(|s| s.canonical_reason())
    {
        Some(reason) => format!("{code} {reason}"),
        None => code.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn response(status_code: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status_code,
            body: body.to_string(),
        }
    }

    fn html_case(url: &str) -> TestCase {
        TestCase::new(
            "html_endpoint",
            url,
            Expectation::status_with_body(200, "Hello from Nginx"),
        )
    }

    fn verifier() -> EndpointVerifier {
        let client = HttpClient::with_timeout(Duration::from_secs(2)).expect("client");
        EndpointVerifier::new(client, Duration::from_secs(2))
    }

    #[test]
    fn test_status_and_content_match() {
        let case = html_case("http://nginx:8080/");
        let result = evaluate(&case, Ok(response(200, "<h1>Hello from Nginx!</h1>")), 4);

        assert!(result.passed());
        assert_eq!(result.detail(), "200 OK, body contains \"Hello from Nginx\"");
    }

    #[test]
    fn test_status_mismatch() {
        let case = html_case("http://nginx:8080/");
        let result = evaluate(&case, Ok(response(503, "Hello from Nginx")), 4);

        assert!(!result.passed());
        assert_eq!(result.failure(), Some(FailureKind::UnexpectedStatus));
        assert_eq!(result.detail(), "expected 200, got 503");
    }

    #[test]
    fn test_content_mismatch() {
        let case = html_case("http://nginx:8080/");
        let result = evaluate(&case, Ok(response(200, "Welcome to nginx")), 4);

        assert!(!result.passed());
        assert_eq!(result.failure(), Some(FailureKind::UnexpectedContent));
    }

    #[test]
    fn test_network_failures_are_distinguished() {
        let case = html_case("http://nginx:8080/");

        let timeout = evaluate(&case, Err(HttpError::Timeout(Duration::from_secs(5))), 5000);
        assert_eq!(timeout.failure(), Some(FailureKind::Timeout));

        let refused = evaluate(
            &case,
            Err(HttpError::ConnectionRefused("http://nginx:8080/".to_string())),
            1,
        );
        assert_eq!(refused.failure(), Some(FailureKind::ConnectionFailure));
        assert!(refused.detail().starts_with("request to http://nginx:8080/ failed"));
    }

    #[test]
    fn test_expected_error_status_passes() {
        let case = TestCase::new("error_endpoint", "http://nginx:8081/", Expectation::status(418));

        let result = evaluate(&case, Ok(response(418, "")), 2);
        assert!(result.passed());
        assert_eq!(result.detail(), "418 I'm a teapot");

        let result = evaluate(&case, Ok(response(200, "")), 2);
        assert!(!result.passed());
        assert_eq!(result.failure(), Some(FailureKind::UnexpectedStatus));
    }

    #[test]
    fn test_single_rejection_expectation() {
        let case = TestCase::new("limited", "http://nginx:8080/", Expectation::rejection(429));
        assert!(evaluate(&case, Ok(response(429, "")), 1).passed());
        assert!(!evaluate(&case, Ok(response(200, "")), 1).passed());
    }

    #[tokio::test]
    async fn test_verify_against_mock_functional_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<html>Hello from Nginx</html>"),
            )
            .mount(&server)
            .await;

        let result = verifier().verify(&html_case(&format!("{}/", server.uri()))).await;
        assert!(result.passed(), "{result}");
    }

    #[tokio::test]
    async fn test_verify_against_mock_error_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(418))
            .mount(&server)
            .await;

        let case = TestCase::new(
            "error_endpoint",
            format!("{}/", server.uri()),
            Expectation::status(418),
        );
        let result = verifier().verify(&case).await;
        assert!(result.passed(), "{result}");
    }

    #[tokio::test]
    async fn test_verify_follows_redirect_to_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(301)
                    .insert_header("location", format!("{}/index.html", server.uri()).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/index.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Hello from Nginx"))
            .mount(&server)
            .await;

        let result = verifier().verify(&html_case(&format!("{}/", server.uri()))).await;
        assert!(result.passed(), "{result}");
    }

    #[tokio::test]
    async fn test_verify_mismatched_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Welcome to nginx!"))
            .mount(&server)
            .await;

        let result = verifier().verify(&html_case(&format!("{}/", server.uri()))).await;
        assert!(!result.passed());
        assert_eq!(result.failure(), Some(FailureKind::UnexpectedContent));
    }
}
