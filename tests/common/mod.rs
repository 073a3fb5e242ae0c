//! Shared test doubles: a scripted respondent and a stubbed decision service.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use colloquy::answers::AnswerRecord;
use colloquy::decision::{DecisionError, DecisionService, NextAction, Summary};
use colloquy::question::Question;
use colloquy::respondent::{ChannelError, RespondentChannel};

/// Respondent that replays a fixed script of answers and records which
/// question ids were presented, in order.
pub struct ScriptedRespondent {
    answers: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedRespondent {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Question ids presented so far, in presentation order.
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait]
impl RespondentChannel for ScriptedRespondent {
    async fn present(&self, question: &Question) -> Result<String, ChannelError> {
        let answer = self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(ChannelError::Closed)?;
        self.asked.lock().unwrap().push(question.id().to_string());
        Ok(answer)
    }
}

/// Decision service stub with scripted classifications and follow-ups.
///
/// `classify` pops from the action script and defaults to `Advance` when the
/// script runs dry. Every call is recorded so tests can assert on what the
/// engine actually sent.
pub struct StubDecisionService {
    actions: Mutex<VecDeque<Result<NextAction, DecisionError>>>,
    follow_ups: Mutex<VecDeque<Question>>,
    summary_value: serde_json::Value,
    pub classify_requests: Mutex<Vec<(String, String)>>,
    pub follow_up_requests: Mutex<Vec<(String, String)>>,
    /// JSON text of each `summarize` payload; text (not `Value`) so member
    /// order is observable.
    pub summary_payloads: Mutex<Vec<String>>,
}

impl StubDecisionService {
    pub fn advancing() -> Self {
        Self {
            actions: Mutex::new(VecDeque::new()),
            follow_ups: Mutex::new(VecDeque::new()),
            summary_value: serde_json::json!({"status": "ok"}),
            classify_requests: Mutex::new(Vec::new()),
            follow_up_requests: Mutex::new(Vec::new()),
            summary_payloads: Mutex::new(Vec::new()),
        }
    }

    pub fn with_actions<I>(self, actions: I) -> Self
    where
        I: IntoIterator<Item = Result<NextAction, DecisionError>>,
    {
        *self.actions.lock().unwrap() = actions.into_iter().collect();
        self
    }

    pub fn with_follow_ups<I>(self, follow_ups: I) -> Self
    where
        I: IntoIterator<Item = Question>,
    {
        *self.follow_ups.lock().unwrap() = follow_ups.into_iter().collect();
        self
    }

    pub fn with_summary(mut self, value: serde_json::Value) -> Self {
        self.summary_value = value;
        self
    }

    pub fn summarize_calls(&self) -> usize {
        self.summary_payloads.lock().unwrap().len()
    }
}

#[async_trait]
impl DecisionService for StubDecisionService {
    async fn classify(
        &self,
        question: &Question,
        answer: &str,
    ) -> Result<NextAction, DecisionError> {
        self.classify_requests
            .lock()
            .unwrap()
            .push((question.id().to_string(), answer.to_string()));
        self.actions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(NextAction::Advance))
    }

    async fn generate_follow_up(
        &self,
        question: &Question,
        answer: &str,
    ) -> Result<Question, DecisionError> {
        self.follow_up_requests
            .lock()
            .unwrap()
            .push((question.id().to_string(), answer.to_string()));
        Ok(self
            .follow_ups
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted follow-up left"))
    }

    async fn summarize(&self, answers: &AnswerRecord) -> Result<Summary, DecisionError> {
        let payload = serde_json::to_string(answers).expect("answers serialize");
        self.summary_payloads.lock().unwrap().push(payload);
        Ok(Summary::new(self.summary_value.clone()))
    }
}
