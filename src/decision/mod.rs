//! Decision service contract.
//!
//! The decision service is the external system that looks at each answer and
//! decides what the interview does next, synthesizes follow-up questions, and
//! writes the final summary. This module defines the contract
//! ([`DecisionService`]) and its value types; [`http`] provides the
//! production HTTP adapter.
//!
//! The contract is deliberately strict at the boundary: responses are parsed
//! against the documented shapes and anything unrecognized is an error.
//! The engine never guesses a branch on the service's behalf.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use miette::Diagnostic;
use thiserror::Error;

use crate::answers::AnswerRecord;
use crate::question::{Question, QuestionError};

pub use http::{DecisionClientConfig, HttpDecisionClient};

// ============================================================================
// Value types
// ============================================================================

/// What the interview does after an answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NextAction {
    /// Move on to the next question in the plan (or to summarization at the
    /// end of the plan).
    Advance,
    /// Ask one follow-up question before moving on.
    FollowUp,
}

impl NextAction {
    /// Wire tag for [`NextAction::Advance`].
    pub const ADVANCE_TAG: &'static str = "next_question";
    /// Wire tag for [`NextAction::FollowUp`].
    pub const FOLLOW_UP_TAG: &'static str = "follow_up";

    /// Parse a wire tag.
    ///
    /// # Errors
    ///
    /// Anything other than the two known tags is
    /// [`DecisionError::UnrecognizedAction`], a distinct failure from a
    /// service outage, and never silently mapped to a default branch.
    pub fn from_tag(tag: &str) -> Result<Self, DecisionError> {
        match tag {
            Self::ADVANCE_TAG => Ok(NextAction::Advance),
            Self::FOLLOW_UP_TAG => Ok(NextAction::FollowUp),
            other => Err(DecisionError::UnrecognizedAction {
                action: other.to_string(),
            }),
        }
    }

    /// The wire tag for this action.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            NextAction::Advance => Self::ADVANCE_TAG,
            NextAction::FollowUp => Self::FOLLOW_UP_TAG,
        }
    }
}

/// Opaque structured summary returned by the decision service.
///
/// The engine passes it through verbatim and never interprets its contents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Summary(serde_json::Value);

impl Summary {
    #[must_use]
    pub fn new(value: serde_json::Value) -> Self {
        Summary(value)
    }

    #[must_use]
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    #[must_use]
    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

impl From<serde_json::Value> for Summary {
    fn from(value: serde_json::Value) -> Self {
        Summary(value)
    }
}

// ============================================================================
// Contract
// ============================================================================

/// The three operations the engine delegates to the decision service.
///
/// Implementations must be stateless and safe for concurrent invocation from
/// many sessions behind one `Arc`: no session-scoped fields, no shared
/// response buffers. Connection reuse inside an HTTP client is fine.
///
/// No operation is retried by the core. Retry policy, if wanted, wraps these
/// calls externally.
#[async_trait]
pub trait DecisionService: Send + Sync {
    /// Classify an answer into the next action.
    async fn classify(
        &self,
        question: &Question,
        answer: &str,
    ) -> Result<NextAction, DecisionError>;

    /// Synthesize a follow-up question for the given answer.
    ///
    /// The returned question satisfies the same construction invariants as a
    /// hand-built one; plan-level id uniqueness is enforced by the engine
    /// against its plan.
    async fn generate_follow_up(
        &self,
        question: &Question,
        answer: &str,
    ) -> Result<Question, DecisionError>;

    /// Produce the final summary from the accumulated answers.
    async fn summarize(&self, answers: &AnswerRecord) -> Result<Summary, DecisionError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Failures of the decision service round trip.
///
/// Transport trouble, bad payloads, and out-of-contract responses get
/// distinct variants so callers can tell an outage from a service speaking
/// the wrong dialect.
#[derive(Debug, Error, Diagnostic)]
pub enum DecisionError {
    /// The request could not be sent or timed out in flight.
    #[error("decision service request failed: {source}")]
    #[diagnostic(
        code(colloquy::decision::request),
        help("Check that the decision service endpoint is reachable and responding within the configured timeout.")
    )]
    Request {
        #[from]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("decision service returned status {status}")]
    #[diagnostic(code(colloquy::decision::status))]
    Status { status: reqwest::StatusCode },

    /// The response body did not match the documented shape.
    #[error("malformed {operation} response: {source}")]
    #[diagnostic(
        code(colloquy::decision::malformed_response),
        help("The decision service must answer with the documented JSON shape for each task.")
    )]
    MalformedResponse {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The service named an action the contract does not define.
    #[error("unrecognized next_action tag: {action:?}")]
    #[diagnostic(
        code(colloquy::decision::unrecognized_action),
        help("Known actions are \"next_question\" and \"follow_up\"; the session is aborted rather than guessing.")
    )]
    UnrecognizedAction { action: String },

    /// The synthesized follow-up question failed construction validation.
    #[error("decision service returned an invalid follow-up question: {0}")]
    #[diagnostic(code(colloquy::decision::invalid_follow_up))]
    InvalidFollowUp(#[from] QuestionError),
}
