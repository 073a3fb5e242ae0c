//! The interview workflow engine.
//!
//! [`InterviewEngine`] owns one session: an ordered [`Plan`](crate::plan::Plan),
//! a phase cursor, and the [`AnswerRecord`] accumulated so far. It walks the
//! plan front to back, presents each question over the
//! [`RespondentChannel`], and delegates every branching decision to the
//! [`DecisionService`]: advance, insert one follow-up, or (after the last
//! question) summarize.
//!
//! The engine is strictly sequential within a session (each decision depends
//! on the previous answer) and never guesses: an unrecognized decision aborts
//! the session rather than defaulting to a branch. Answers are recorded
//! atomically per key, so cancelling the session at any suspension point
//! leaves the record uncorrupted, and every error leaves the partial record
//! readable for diagnostics.
//!
//! # Examples
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
//! struct FixedAnswers;
//!
//! #[async_trait]
//! impl RespondentChannel for FixedAnswers {
//!     async fn present(&self, question: &Question) -> Result<String, ChannelError> {
//!         Ok(format!("answer to {}", question.id()))
//!     }
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let plan = Plan::new(vec![
//!     Question::new(1, "What is your name?")?,
//!     Question::new(2, "How old are you?")?,
//! ])?;
//! let decisions = Arc::new(HttpDecisionClient::new(DecisionClientConfig::from_env())?);
//! let mut engine = InterviewEngine::new(plan, decisions, Arc::new(FixedAnswers));
//! let outcome = engine.run_until_complete().await?;
//! println!("{}", outcome.summary.as_value());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::answers::{AnswerKey, AnswerRecord, AnswersError};
use crate::decision::{DecisionError, DecisionService, NextAction, Summary};
use crate::events::{EngineEvent, EventEmitter};
use crate::plan::Plan;
use crate::question::QuestionError;
use crate::respondent::{ChannelError, RespondentChannel};

// ============================================================================
// Phases and reports
// ============================================================================

/// Where a session currently stands.
///
/// The cursor is embedded in the phase: it only moves past a question once
/// that question's answer (and, if triggered, its follow-up's answer) is in
/// the record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// About to present `plan[index]`.
    AwaitingQuestion { index: usize },
    /// `plan[parent_index]` was answered and classified as needing one
    /// follow-up, which has not been asked yet. Follow-ups are single-depth:
    /// a follow-up's answer is never classified again.
    AwaitingFollowUp { parent_index: usize },
    /// Every planned answer is recorded; the summary call is next.
    Summarizing,
    /// Terminal. The outcome is immutable and no further transitions exist.
    Done,
}

impl Phase {
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self, Phase::Done)
    }
}

/// Result of executing one transition.
#[derive(Clone, Debug)]
pub struct StepReport {
    /// 1-based number of the step that just ran.
    pub step: u64,
    /// Answer key recorded during this step, if the step recorded one.
    pub recorded: Option<AnswerKey>,
    /// Phase after the transition.
    pub phase: Phase,
    /// True once the session reached [`Phase::Done`].
    pub completed: bool,
}

/// Terminal result of a completed session.
#[derive(Clone, Debug)]
pub struct InterviewOutcome {
    pub session_id: String,
    /// The decision service's summary, verbatim.
    pub summary: Summary,
    /// Everything the respondent answered, in conversational order.
    pub answers: AnswerRecord,
    /// Total transitions executed.
    pub steps: u64,
}

// ============================================================================
// Engine
// ============================================================================

/// State machine for one interview session.
///
/// Created at session start, mutated only by its own transitions, and
/// discarded after the outcome is produced; nothing is persisted. Collaborators
/// are shared behind `Arc`, so one stateless [`DecisionService`] and one
/// transport can serve many concurrent, fully independent sessions.
pub struct InterviewEngine {
    session_id: String,
    plan: Plan,
    phase: Phase,
    answers: AnswerRecord,
    decisions: Arc<dyn DecisionService>,
    respondent: Arc<dyn RespondentChannel>,
    emitter: EventEmitter,
    summary: Option<Summary>,
    step: u64,
}

impl InterviewEngine {
    /// Start a session over the given plan.
    ///
    /// An empty plan starts directly in [`Phase::Summarizing`]: it is a
    /// defined case that summarizes an empty record without ever touching the
    /// respondent channel.
    #[must_use]
    pub fn new(
        plan: Plan,
        decisions: Arc<dyn DecisionService>,
        respondent: Arc<dyn RespondentChannel>,
    ) -> Self {
        let phase = if plan.is_empty() {
            Phase::Summarizing
        } else {
            Phase::AwaitingQuestion { index: 0 }
        };
        Self {
            session_id: Uuid::new_v4().to_string(),
            plan,
            phase,
            answers: AnswerRecord::new(),
            decisions,
            respondent,
            emitter: EventEmitter::disabled(),
            summary: None,
            step: 0,
        }
    }

    /// Use a caller-chosen session id instead of the generated one.
    #[must_use]
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    /// Attach an event emitter for progress observation.
    #[must_use]
    pub fn with_emitter(mut self, emitter: EventEmitter) -> Self {
        self.emitter = emitter;
        self
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    #[must_use]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Answers recorded so far. Remains readable after a failed step, for
    /// diagnostics.
    #[must_use]
    pub fn answers(&self) -> &AnswerRecord {
        &self.answers
    }

    /// The terminal summary, once the session reached [`Phase::Done`].
    #[must_use]
    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    #[must_use]
    pub fn steps_taken(&self) -> u64 {
        self.step
    }

    /// Execute one transition.
    ///
    /// # Errors
    ///
    /// Any collaborator failure aborts the step and surfaces here; the phase
    /// and the answer record are left exactly as they were at the last
    /// completed recording. Stepping a [`Phase::Done`] session is
    /// [`EngineError::AlreadyComplete`].
    #[instrument(skip(self), fields(session_id = %self.session_id, step = self.step + 1))]
    pub async fn step(&mut self) -> Result<StepReport, EngineError> {
        if self.phase.is_done() {
            return Err(EngineError::AlreadyComplete);
        }
        self.step += 1;
        let (next_phase, recorded) = match self.phase.clone() {
            Phase::AwaitingQuestion { index } => self.ask_primary(index).await?,
            Phase::AwaitingFollowUp { parent_index } => self.ask_follow_up(parent_index).await?,
            Phase::Summarizing => {
                let summary = self.decisions.summarize(&self.answers).await?;
                self.emit("summary", "summary produced");
                self.summary = Some(summary);
                (Phase::Done, None)
            }
            Phase::Done => return Err(EngineError::AlreadyComplete),
        };
        self.phase = next_phase;
        let completed = self.phase.is_done();
        if completed {
            info!(steps = self.step, "session complete");
        }
        Ok(StepReport {
            step: self.step,
            recorded,
            phase: self.phase.clone(),
            completed,
        })
    }

    /// Drive the session to [`Phase::Done`] and return the outcome.
    ///
    /// Calling this on an already-completed session returns the same outcome
    /// again.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn run_until_complete(&mut self) -> Result<InterviewOutcome, EngineError> {
        while !self.phase.is_done() {
            self.step().await?;
        }
        let summary = self.summary.clone().ok_or(EngineError::MissingSummary)?;
        Ok(InterviewOutcome {
            session_id: self.session_id.clone(),
            summary,
            answers: self.answers.clone(),
            steps: self.step,
        })
    }

    /// Present `plan[index]`, record its answer, and classify it.
    async fn ask_primary(
        &mut self,
        index: usize,
    ) -> Result<(Phase, Option<AnswerKey>), EngineError> {
        let question = self
            .plan
            .get(index)
            .cloned()
            .ok_or(EngineError::MissingQuestion { index })?;
        self.emit("ask", format!("presenting question {}", question.id()));
        let answer = self.respondent.present(&question).await?;
        let key = AnswerKey::Primary(question.id().clone());
        self.answers.record(key.clone(), answer.clone())?;
        self.emit("record", format!("recorded answer under {key}"));

        let action = self.decisions.classify(&question, &answer).await?;
        self.emit("decide", format!("classified as {}", action.tag()));
        debug!(question = %question.id(), action = action.tag(), "answer classified");

        let next = match action {
            NextAction::Advance => self.advance_from(index),
            NextAction::FollowUp => Phase::AwaitingFollowUp {
                parent_index: index,
            },
        };
        Ok((next, Some(key)))
    }

    /// Generate, present, and record the follow-up for `plan[parent_index]`,
    /// then advance exactly as an `advance` from the parent would have.
    async fn ask_follow_up(
        &mut self,
        parent_index: usize,
    ) -> Result<(Phase, Option<AnswerKey>), EngineError> {
        let parent = self
            .plan
            .get(parent_index)
            .cloned()
            .ok_or(EngineError::MissingQuestion {
                index: parent_index,
            })?;
        let parent_key = AnswerKey::Primary(parent.id().clone());
        let parent_answer = self
            .answers
            .get(&parent_key)
            .ok_or_else(|| EngineError::MissingAnswer {
                key: parent_key.encode(),
            })?
            .to_string();

        let follow_up = self
            .decisions
            .generate_follow_up(&parent, &parent_answer)
            .await?;
        self.plan.ensure_distinct(follow_up.id())?;
        self.emit("ask", format!("presenting follow-up to {}", parent.id()));
        let answer = self.respondent.present(&follow_up).await?;
        let key = AnswerKey::FollowUp(parent.id().clone());
        self.answers.record(key.clone(), answer)?;
        self.emit("record", format!("recorded answer under {key}"));

        Ok((self.advance_from(parent_index), Some(key)))
    }

    /// The phase after question `index` is fully settled.
    fn advance_from(&self, index: usize) -> Phase {
        if index + 1 >= self.plan.len() {
            Phase::Summarizing
        } else {
            Phase::AwaitingQuestion { index: index + 1 }
        }
    }

    fn emit(&self, scope: &str, message: impl Into<String>) {
        self.emitter.emit(EngineEvent::new(
            self.session_id.as_str(),
            self.step,
            scope,
            message,
        ));
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Session-terminating failures.
///
/// Every variant aborts the in-progress session; none is retried or masked by
/// a fallback branch. The engine's [`answers`](InterviewEngine::answers)
/// remain readable afterwards.
#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    /// Malformed or colliding question data, including a follow-up whose id
    /// collides with the plan.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Question(#[from] QuestionError),

    /// The decision service failed or answered out of contract.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Decision(#[from] DecisionError),

    /// The respondent transport failed or timed out.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Channel(#[from] ChannelError),

    /// The append-only answer record rejected a write.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Answers(#[from] AnswersError),

    /// The phase cursor points outside the plan.
    #[error("no question at plan index {index}")]
    #[diagnostic(
        code(colloquy::engine::missing_question),
        help("The cursor is derived from the plan length; this indicates an engine bug.")
    )]
    MissingQuestion { index: usize },

    /// A follow-up was requested for a question whose answer is not recorded.
    #[error("no recorded answer under key {key}")]
    #[diagnostic(
        code(colloquy::engine::missing_answer),
        help("Follow-ups are only generated after the parent answer is recorded; this indicates an engine bug.")
    )]
    MissingAnswer { key: String },

    /// The session reached `Done` without a stored summary.
    #[error("session completed without a summary")]
    #[diagnostic(code(colloquy::engine::missing_summary))]
    MissingSummary,

    /// `step` was called on a completed session.
    #[error("session already complete")]
    #[diagnostic(
        code(colloquy::engine::already_complete),
        help("`Done` is terminal; read the outcome instead of stepping further.")
    )]
    AlreadyComplete,
}
