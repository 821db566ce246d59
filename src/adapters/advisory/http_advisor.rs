//! HTTP Question Advisor - recommendations from a remote advisory service.
//!
//! POSTs an [`AdvisoryRequest`] as JSON and expects
//! `{"question_id": "...", "rationale": "..."}` back.
//!
//! # Configuration
//!
//! ```ignore
//! let config = HttpAdvisorConfig::new("https://advisor.internal/v1/next-question")
//!     .with_api_key(api_key)
//!     .with_timeout(Duration::from_millis(1500));
//!
//! let advisor = HttpQuestionAdvisor::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

use crate::domain::assessment::AssessmentSession;
use crate::domain::foundation::QuestionId;
use crate::domain::knowledge::KnowledgeBase;
use crate::ports::{AdvisorInfo, AdvisoryError, AdvisoryRequest, AdvisoryResponse, QuestionAdvisor};

/// Configuration for the HTTP advisor.
#[derive(Debug, Clone)]
pub struct HttpAdvisorConfig {
    /// Full URL of the recommendation endpoint.
    pub endpoint: String,
    /// Bearer token, if the service requires one.
    api_key: Option<Secret<String>>,
    /// Request timeout.
    pub timeout: Duration,
    /// Leading conditions included in each request.
    pub top_k: usize,
}

impl HttpAdvisorConfig {
    /// Creates a new configuration for the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            timeout: Duration::from_millis(2000),
            top_k: 3,
        }
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, api_key: Secret<String>) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets how many leading conditions are sent.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(|key| key.expose_secret().as_str())
    }
}

/// Remote advisory service client.
pub struct HttpQuestionAdvisor {
    config: HttpAdvisorConfig,
    client: Client,
}

impl HttpQuestionAdvisor {
    /// Creates a new advisor with the given configuration.
    pub fn new(config: HttpAdvisorConfig) -> Result<Self, AdvisoryError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AdvisoryError::unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    async fn send_request(&self, request: &AdvisoryRequest) -> Result<Response, AdvisoryError> {
        let mut builder = self
            .client
            .post(&self.config.endpoint)
            .header("Content-Type", "application/json")
            .json(request);
        if let Some(key) = self.config.api_key() {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        builder.send().await.map_err(|e| {
            if e.is_timeout() {
                AdvisoryError::Timeout {
                    timeout_ms: self.config.timeout.as_millis() as u64,
                }
            } else if e.is_connect() {
                AdvisoryError::network(format!("Connection failed: {}", e))
            } else {
                AdvisoryError::network(e.to_string())
            }
        })
    }

    async fn handle_response_status(&self, response: Response) -> Result<Response, AdvisoryError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u32>().ok());
        let body = response.text().await.unwrap_or_default();

        Err(status_error(status.as_u16(), retry_after, &body))
    }
}

/// Maps a non-success status to an advisory error.
fn status_error(status: u16, retry_after: Option<u32>, body: &str) -> AdvisoryError {
    match status {
        401 | 403 => AdvisoryError::AuthenticationFailed,
        429 => AdvisoryError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(30),
        },
        500..=599 => AdvisoryError::unavailable(format!("Server error {}: {}", status, body)),
        _ => AdvisoryError::network(format!("Unexpected status {}: {}", status, body)),
    }
}

/// Turns the response body into a recommendation known to the catalog.
fn parse_recommendation(
    kb: &KnowledgeBase,
    response: AdvisoryResponse,
) -> Result<Option<QuestionId>, AdvisoryError> {
    let Some(raw) = response.question_id.filter(|id| !id.trim().is_empty()) else {
        return Ok(None);
    };
    let id = QuestionId::new(raw.trim()).map_err(|e| AdvisoryError::parse(e.to_string()))?;
    if kb.question(&id).is_none() {
        return Err(AdvisoryError::parse(format!("Unknown question id: {}", id)));
    }
    Ok(Some(id))
}

#[async_trait]
impl QuestionAdvisor for HttpQuestionAdvisor {
    async fn recommend(
        &self,
        kb: &KnowledgeBase,
        session: &AssessmentSession,
    ) -> Result<Option<QuestionId>, AdvisoryError> {
        let request = AdvisoryRequest::from_session(kb, session, self.config.top_k);

        let response = self.send_request(&request).await?;
        let response = self.handle_response_status(response).await?;
        let body: AdvisoryResponse = response
            .json()
            .await
            .map_err(|e| AdvisoryError::parse(format!("Failed to parse response: {}", e)))?;

        if let Some(rationale) = body.rationale.as_deref() {
            tracing::debug!(session_id = %session.id(), rationale, "Advisor rationale");
        }
        parse_recommendation(kb, body)
    }

    fn advisor_info(&self) -> AdvisorInfo {
        AdvisorInfo::remote("http")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::knowledge::BuiltinCatalog;
    use crate::ports::KnowledgeBaseSource;

    mod config {
        use super::*;

        #[test]
        fn builder_sets_fields() {
            let config = HttpAdvisorConfig::new("http://localhost/next")
                .with_api_key(Secret::new("sk-test".to_string()))
                .with_timeout(Duration::from_millis(250))
                .with_top_k(5);

            assert_eq!(config.endpoint, "http://localhost/next");
            assert_eq!(config.timeout, Duration::from_millis(250));
            assert_eq!(config.top_k, 5);
            assert_eq!(config.api_key(), Some("sk-test"));
        }

        #[test]
        fn debug_output_hides_api_key() {
            let config = HttpAdvisorConfig::new("http://localhost/next")
                .with_api_key(Secret::new("sk-very-secret".to_string()));
            assert!(!format!("{:?}", config).contains("sk-very-secret"));
        }
    }

    mod status_mapping {
        use super::*;

        #[test]
        fn unauthorized_is_authentication_failure() {
            assert_eq!(status_error(401, None, ""), AdvisoryError::AuthenticationFailed);
        }

        #[test]
        fn too_many_requests_uses_retry_after() {
            assert_eq!(
                status_error(429, Some(12), ""),
                AdvisoryError::RateLimited {
                    retry_after_secs: 12
                }
            );
            assert_eq!(
                status_error(429, None, ""),
                AdvisoryError::RateLimited {
                    retry_after_secs: 30
                }
            );
        }

        #[test]
        fn server_errors_are_retryable() {
            assert!(status_error(503, None, "down").is_retryable());
        }
    }

    mod recommendation_parsing {
        use super::*;

        fn response(id: Option<&str>) -> AdvisoryResponse {
            AdvisoryResponse {
                question_id: id.map(str::to_string),
                rationale: None,
            }
        }

        #[test]
        fn known_question_is_accepted() {
            let kb = BuiltinCatalog.load().unwrap();
            let known = kb.questions()[0].id.clone();
            assert_eq!(
                parse_recommendation(&kb, response(Some(known.as_str()))),
                Ok(Some(known))
            );
        }

        #[test]
        fn blank_or_missing_id_is_no_opinion() {
            let kb = BuiltinCatalog.load().unwrap();
            assert_eq!(parse_recommendation(&kb, response(None)), Ok(None));
            assert_eq!(parse_recommendation(&kb, response(Some("  "))), Ok(None));
        }

        #[test]
        fn unknown_id_is_a_parse_error() {
            let kb = BuiltinCatalog.load().unwrap();
            assert!(matches!(
                parse_recommendation(&kb, response(Some("made_up"))),
                Err(AdvisoryError::Parse(_))
            ));
        }
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_error() {
        let kb = BuiltinCatalog.load().unwrap();
        let session = AssessmentSession::new(&kb);
        let advisor = HttpQuestionAdvisor::new(
            HttpAdvisorConfig::new("http://127.0.0.1:9/next")
                .with_timeout(Duration::from_millis(500)),
        )
        .unwrap();

        let result = advisor.recommend(&kb, &session).await;

        assert!(result.is_err());
        assert!(advisor.advisor_info().remote);
    }
}
