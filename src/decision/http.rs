//! HTTP adapter for the decision service.
//!
//! One JSON POST per operation to a single configured endpoint. The request
//! body is a tagged union discriminated by `task`; response bodies are read
//! fully and parsed against the documented shape for each operation. The
//! client holds nothing but its `reqwest::Client` (connection reuse only), so
//! one instance can serve any number of concurrent sessions.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use async_trait::async_trait;

use crate::answers::AnswerRecord;
use crate::question::{Question, QuestionParts};

use super::{DecisionError, DecisionService, NextAction, Summary};

/// Environment variable naming the decision service endpoint.
pub const ENV_ENDPOINT: &str = "COLLOQUY_DECISION_URL";
/// Environment variable overriding the request timeout, in whole seconds.
pub const ENV_TIMEOUT_SECS: &str = "COLLOQUY_DECISION_TIMEOUT_SECS";

/// Endpoint and timeout for [`HttpDecisionClient`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use colloquy::decision::DecisionClientConfig;
///
/// let config = DecisionClientConfig::new("http://127.0.0.1:8080/v1/decision")
///     .with_timeout(Duration::from_secs(10));
/// assert_eq!(config.timeout, Duration::from_secs(10));
/// ```
#[derive(Clone, Debug)]
pub struct DecisionClientConfig {
    /// URL that receives every operation's POST.
    pub endpoint: String,
    /// Upper bound on one round trip. The transport always completes or
    /// fails within this bound; it never hangs silently.
    pub timeout: Duration,
}

impl DecisionClientConfig {
    pub const DEFAULT_ENDPOINT: &'static str = "http://127.0.0.1:8080/v1/decision";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Resolve the configuration from the environment, reading a `.env` file
    /// when one is present. Missing or unparsable variables fall back to the
    /// defaults.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let endpoint = std::env::var(ENV_ENDPOINT)
            .unwrap_or_else(|_| Self::DEFAULT_ENDPOINT.to_string());
        let timeout = std::env::var(ENV_TIMEOUT_SECS)
            .ok()
            .and_then(|raw| raw.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Self::DEFAULT_TIMEOUT);
        Self { endpoint, timeout }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ============================================================================
// Wire shapes
// ============================================================================

#[derive(Serialize)]
#[serde(tag = "task", rename_all = "snake_case")]
enum DecisionRequest<'a> {
    AnalyzeAnswer {
        question: &'a Question,
        answer: &'a str,
    },
    GenerateFollowUp {
        question: &'a Question,
        answer: &'a str,
    },
    GenerateSummary {
        collected_answers: &'a AnswerRecord,
    },
}

#[derive(Deserialize)]
struct ClassifyResponse {
    next_action: String,
}

#[derive(Deserialize)]
struct FollowUpResponse {
    follow_up_question: QuestionParts,
}

// ============================================================================
// Client
// ============================================================================

/// Production [`DecisionService`] over HTTP.
///
/// ```no_run
/// use colloquy::decision::{DecisionClientConfig, HttpDecisionClient};
///
/// let client = HttpDecisionClient::new(DecisionClientConfig::from_env()).unwrap();
/// ```
pub struct HttpDecisionClient {
    config: DecisionClientConfig,
    client: reqwest::Client,
}

impl HttpDecisionClient {
    /// Build a client for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DecisionError::Request`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: DecisionClientConfig) -> Result<Self, DecisionError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, client })
    }

    #[must_use]
    pub fn config(&self) -> &DecisionClientConfig {
        &self.config
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: &DecisionRequest<'_>,
    ) -> Result<T, DecisionError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .json(request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DecisionError::Status { status });
        }
        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|source| DecisionError::MalformedResponse { operation, source })
    }
}

#[async_trait]
impl DecisionService for HttpDecisionClient {
    #[instrument(skip_all, fields(endpoint = %self.config.endpoint, question = %question.id()))]
    async fn classify(
        &self,
        question: &Question,
        answer: &str,
    ) -> Result<NextAction, DecisionError> {
        let response: ClassifyResponse = self
            .send(
                "analyze_answer",
                &DecisionRequest::AnalyzeAnswer { question, answer },
            )
            .await?;
        let action = NextAction::from_tag(&response.next_action)?;
        debug!(action = action.tag(), "answer classified");
        Ok(action)
    }

    #[instrument(skip_all, fields(endpoint = %self.config.endpoint, parent = %question.id()))]
    async fn generate_follow_up(
        &self,
        question: &Question,
        answer: &str,
    ) -> Result<Question, DecisionError> {
        let response: FollowUpResponse = self
            .send(
                "generate_follow_up",
                &DecisionRequest::GenerateFollowUp { question, answer },
            )
            .await?;
        let follow_up = Question::try_from(response.follow_up_question)?;
        debug!(follow_up = %follow_up.id(), "follow-up generated");
        Ok(follow_up)
    }

    #[instrument(skip_all, fields(endpoint = %self.config.endpoint, answers = answers.len()))]
    async fn summarize(&self, answers: &AnswerRecord) -> Result<Summary, DecisionError> {
        let value: serde_json::Value = self
            .send(
                "generate_summary",
                &DecisionRequest::GenerateSummary {
                    collected_answers: answers,
                },
            )
            .await?;
        debug!("summary received");
        Ok(Summary::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::AnswerKey;

    #[test]
    fn requests_carry_the_task_discriminator() {
        let question = Question::new(1, "What is your name?")
            .unwrap()
            .with_topic("Personal Info")
            .with_importance(5);

        let body = serde_json::to_value(DecisionRequest::AnalyzeAnswer {
            question: &question,
            answer: "Alice",
        })
        .unwrap();
        assert_eq!(body["task"], "analyze_answer");
        assert_eq!(body["answer"], "Alice");
        assert_eq!(body["question"]["id"], 1);

        let body = serde_json::to_value(DecisionRequest::GenerateFollowUp {
            question: &question,
            answer: "Alice",
        })
        .unwrap();
        assert_eq!(body["task"], "generate_follow_up");
    }

    #[test]
    fn summary_request_embeds_answers_in_order() {
        let mut answers = AnswerRecord::new();
        answers.record(AnswerKey::Primary(1.into()), "Alice").unwrap();
        answers.record(AnswerKey::FollowUp(1.into()), "Marie").unwrap();

        let body = serde_json::to_string(&DecisionRequest::GenerateSummary {
            collected_answers: &answers,
        })
        .unwrap();
        assert!(body.contains(r#""task":"generate_summary""#));
        assert!(body.contains(r#""collected_answers":{"1":"Alice","1_follow_up":"Marie"}"#));
    }

    #[test]
    fn default_timeout_applies() {
        let config = DecisionClientConfig::new("http://localhost/decide");
        assert_eq!(config.timeout, DecisionClientConfig::DEFAULT_TIMEOUT);
    }
}
