//! Wire-level tests for the HTTP decision client against a mock server.

use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;

use colloquy::answers::{AnswerKey, AnswerRecord};
use colloquy::decision::{
    DecisionClientConfig, DecisionError, DecisionService, HttpDecisionClient, NextAction,
};
use colloquy::question::{Question, QuestionError};

fn name_question() -> Question {
    Question::new(1, "What is your name?")
        .unwrap()
        .with_topic("Personal Info")
        .with_importance(5)
}

fn client_for(server: &MockServer) -> HttpDecisionClient {
    HttpDecisionClient::new(DecisionClientConfig::new(server.url("/decide"))).unwrap()
}

fn question_wire() -> serde_json::Value {
    json!({
        "id": 1,
        "text": "What is your name?",
        "topic": "Personal Info",
        "importance": 5,
        "expected_answer_type": "text"
    })
}

#[tokio::test]
async fn classify_sends_the_analyze_answer_shape() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/decide").json_body(json!({
                "task": "analyze_answer",
                "question": question_wire(),
                "answer": "Alice"
            }));
            then.status(200).json_body(json!({"next_action": "next_question"}));
        })
        .await;

    let client = client_for(&server);
    let action = client.classify(&name_question(), "Alice").await.unwrap();

    assert_eq!(action, NextAction::Advance);
    mock.assert_async().await;
}

#[tokio::test]
async fn classify_parses_follow_up() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/decide");
            then.status(200).json_body(json!({"next_action": "follow_up"}));
        })
        .await;

    let client = client_for(&server);
    let action = client.classify(&name_question(), "Alice").await.unwrap();
    assert_eq!(action, NextAction::FollowUp);
}

#[tokio::test]
async fn classify_rejects_unknown_action_tags() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/decide");
            then.status(200).json_body(json!({"next_action": "skip"}));
        })
        .await;

    let client = client_for(&server);
    let err = client.classify(&name_question(), "Alice").await.unwrap_err();
    match err {
        DecisionError::UnrecognizedAction { action } => assert_eq!(action, "skip"),
        other => panic!("expected UnrecognizedAction, got {other:?}"),
    }
}

#[tokio::test]
async fn classify_rejects_non_json_bodies() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/decide");
            then.status(200).body("definitely not json");
        })
        .await;

    let client = client_for(&server);
    let err = client.classify(&name_question(), "Alice").await.unwrap_err();
    match err {
        DecisionError::MalformedResponse { operation, .. } => {
            assert_eq!(operation, "analyze_answer");
        }
        other => panic!("expected MalformedResponse, got {other:?}"),
    }
}

#[tokio::test]
async fn classify_rejects_bodies_missing_next_action() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/decide");
            then.status(200).json_body(json!({"action": "next_question"}));
        })
        .await;

    let client = client_for(&server);
    let err = client.classify(&name_question(), "Alice").await.unwrap_err();
    assert!(matches!(err, DecisionError::MalformedResponse { .. }));
}

#[tokio::test]
async fn non_success_statuses_are_surfaced_distinctly() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/decide");
            then.status(503).body("overloaded");
        })
        .await;

    let client = client_for(&server);
    let err = client.classify(&name_question(), "Alice").await.unwrap_err();
    match err {
        DecisionError::Status { status } => assert_eq!(status.as_u16(), 503),
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn generate_follow_up_round_trips_a_valid_question() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/decide").json_body(json!({
                "task": "generate_follow_up",
                "question": question_wire(),
                "answer": "Alice"
            }));
            then.status(200).json_body(json!({
                "follow_up_question": {
                    "id": 3,
                    "text": "What is your middle name?",
                    "topic": "Personal Info",
                    "importance": 4,
                    "expected_answer_type": "text"
                }
            }));
        })
        .await;

    let client = client_for(&server);
    let follow_up = client
        .generate_follow_up(&name_question(), "Alice")
        .await
        .unwrap();

    assert_eq!(follow_up.id().to_string(), "3");
    assert_eq!(follow_up.text(), "What is your middle name?");
    assert_eq!(follow_up.importance(), 4);
    mock.assert_async().await;
}

#[tokio::test]
async fn generate_follow_up_rejects_invalid_questions() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/decide");
            then.status(200).json_body(json!({
                "follow_up_question": {
                    "id": 3,
                    "text": "",
                    "topic": "Personal Info",
                    "importance": 4,
                    "expected_answer_type": "text"
                }
            }));
        })
        .await;

    let client = client_for(&server);
    let err = client
        .generate_follow_up(&name_question(), "Alice")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DecisionError::InvalidFollowUp(QuestionError::BlankText { .. })
    ));
}

#[tokio::test]
async fn summarize_sends_answers_and_returns_the_body_verbatim() {
    let summary_body = json!({
        "profile": {"name": "Alice", "middle_name": "Marie"},
        "confidence": 0.9
    });

    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/decide").json_body(json!({
                "task": "generate_summary",
                "collected_answers": {
                    "1": "Alice",
                    "1_follow_up": "Marie"
                }
            }));
            then.status(200).json_body(summary_body.clone());
        })
        .await;

    let mut answers = AnswerRecord::new();
    answers.record(AnswerKey::Primary(1.into()), "Alice").unwrap();
    answers.record(AnswerKey::FollowUp(1.into()), "Marie").unwrap();

    let client = client_for(&server);
    let summary = client.summarize(&answers).await.unwrap();

    assert_eq!(summary.as_value(), &summary_body);
    mock.assert_async().await;
}

#[tokio::test]
async fn slow_responses_hit_the_configured_timeout() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/decide");
            then.status(200)
                .json_body(json!({"next_action": "next_question"}))
                .delay(Duration::from_secs(5));
        })
        .await;

    let config = DecisionClientConfig::new(server.url("/decide"))
        .with_timeout(Duration::from_millis(250));
    let client = HttpDecisionClient::new(config).unwrap();

    let err = client.classify(&name_question(), "Alice").await.unwrap_err();
    match err {
        DecisionError::Request { source } => assert!(source.is_timeout()),
        other => panic!("expected Request, got {other:?}"),
    }
}
