//! Console interview demo.
//!
//! Runs a small plan against a decision service configured through the
//! environment (`COLLOQUY_DECISION_URL`), reading answers from stdin.
//!
//! ```bash
//! COLLOQUY_DECISION_URL=http://127.0.0.1:8080/v1/decision \
//!   cargo run --example console_interview
//! ```

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use miette::IntoDiagnostic;
use tokio::io::{AsyncBufReadExt, BufReader};

use colloquy::decision::{DecisionClientConfig, HttpDecisionClient};
use colloquy::engine::InterviewEngine;
use colloquy::events;
use colloquy::plan::Plan;
use colloquy::question::{AnswerShape, Question};
use colloquy::respondent::{ChannelError, RespondentChannel};

struct ConsoleRespondent;

#[async_trait]
impl RespondentChannel for ConsoleRespondent {
    async fn present(&self, question: &Question) -> Result<String, ChannelError> {
        println!("{}", question.text());
        print!("> ");
        std::io::stdout()
            .flush()
            .map_err(|e| ChannelError::transport(e.to_string()))?;

        let mut line = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        let read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| ChannelError::transport(e.to_string()))?;
        if read == 0 {
            return Err(ChannelError::Closed);
        }
        Ok(line.trim_end().to_string())
    }
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    colloquy::telemetry::init_tracing().ok();

    let plan = Plan::new(vec![
        Question::new(1, "What is your name?")?
            .with_topic("Personal Info")
            .with_importance(5),
        Question::new(2, "How old are you?")?
            .with_topic("Personal Info")
            .with_importance(4)
            .with_answer_shape(AnswerShape::Number),
    ])?;

    let decisions = Arc::new(HttpDecisionClient::new(DecisionClientConfig::from_env())?);

    let (emitter, events_rx) = events::channel();
    tokio::spawn(async move {
        while let Ok(event) = events_rx.recv_async().await {
            tracing::debug!(scope = %event.scope, step = event.step, "{}", event.message);
        }
    });

    let mut engine =
        InterviewEngine::new(plan, decisions, Arc::new(ConsoleRespondent)).with_emitter(emitter);

    let outcome = engine.run_until_complete().await?;
    println!(
        "\nInterview complete after {} steps. Summary:\n{}",
        outcome.steps,
        serde_json::to_string_pretty(outcome.summary.as_value()).into_diagnostic()?
    );
    Ok(())
}
