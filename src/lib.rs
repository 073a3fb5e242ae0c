//! # Colloquy: Sequential Interview Workflow Engine
//!
//! Colloquy walks an ordered plan of questions, collects answers from a
//! respondent, and delegates every branching decision (advance, ask one
//! follow-up, or finish) to an external decision service, ending with a
//! service-produced summary of the whole exchange.
//!
//! ## Core Concepts
//!
//! - **Questions**: Immutable, validated prompts with identity, topic,
//!   importance, and expected answer shape
//! - **Plan**: The ordered, id-unique question sequence for one session
//! - **Answer Record**: Append-only, insertion-ordered map of everything the
//!   respondent said
//! - **Decision Service**: External classifier/generator consumed through a
//!   strict three-operation contract
//! - **Respondent Channel**: Abstract capability of presenting a question and
//!   obtaining an answer, satisfied by any request/reply transport
//! - **Engine**: The per-session state machine tying the above together
//!
//! ## Building a Session
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use colloquy::decision::{DecisionClientConfig, HttpDecisionClient};
//! use colloquy::engine::InterviewEngine;
//! use colloquy::plan::Plan;
//! use colloquy::question::Question;
//! use colloquy::respondent::{ChannelError, RespondentChannel};
//!
//! // Any transport that can suspend until an answer exists will do.
//! struct CannedRespondent;
//!
//! #[async_trait]
//! impl RespondentChannel for CannedRespondent {
//!     async fn present(&self, _question: &Question) -> Result<String, ChannelError> {
//!         Ok("42".to_string())
//!     }
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let plan = Plan::new(vec![
//!     Question::new(1, "What is your name?")?.with_topic("Personal Info"),
//!     Question::new(2, "How old are you?")?.with_topic("Personal Info"),
//! ])?;
//!
//! let decisions = Arc::new(HttpDecisionClient::new(DecisionClientConfig::from_env())?);
//! let mut engine = InterviewEngine::new(plan, decisions, Arc::new(CannedRespondent));
//!
//! let outcome = engine.run_until_complete().await?;
//! println!("summary: {}", outcome.summary.as_value());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every module owns a diagnostic error type; all of them abort the
//! in-progress session when they fire. The engine never falls back between
//! operations (a failed follow-up generation is a failure, not an implicit
//! advance), and the partial answer record stays readable after any failure.
//!
//! ## Module Guide
//!
//! - [`question`] - Question model, identities, and answer shapes
//! - [`plan`] - Ordered question sequences with unique identities
//! - [`answers`] - Answer keys and the append-only answer record
//! - [`decision`] - Decision service contract and the HTTP client
//! - [`respondent`] - Respondent channel capability
//! - [`engine`] - The session state machine
//! - [`events`] - Progress event emission for observers
//! - [`telemetry`] - Tracing subscriber setup

pub mod answers;
pub mod decision;
pub mod engine;
pub mod events;
pub mod plan;
pub mod question;
pub mod respondent;
pub mod telemetry;
