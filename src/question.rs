//! Question model for interview plans.
//!
//! A [`Question`] is an immutable value describing one prompt: identity, text,
//! topic, importance, and the shape of answer it expects. Questions are
//! created by the caller when assembling a plan, or synthesized by the
//! decision service as follow-ups; both paths go through the same validated
//! construction, so a `Question` in hand always satisfies its invariants.

use serde::{Deserialize, Serialize};
use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

// ============================================================================
// Identity
// ============================================================================

/// Identity of a question, unique within one plan.
///
/// Wire payloads may carry either an integer or a string id, so both are
/// first-class here. The untagged serde representation keeps the native JSON
/// form on the wire.
///
/// # Examples
///
/// ```
/// use colloquy::question::QuestionId;
///
/// let numeric: QuestionId = 1.into();
/// let textual: QuestionId = "intro".into();
///
/// assert_eq!(numeric.to_string(), "1");
/// assert_eq!(textual.to_string(), "intro");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionId {
    /// Numeric identity, the common case for hand-written plans.
    Int(i64),
    /// Textual identity for callers that key questions by name.
    Text(String),
}

impl QuestionId {
    /// Encoded string form, used for answer keys and uniqueness checks.
    ///
    /// Numeric and textual ids that render to the same string are treated as
    /// the same identity: `Int(1)` and `Text("1")` collide on purpose, since
    /// they would collide as answer keys.
    #[must_use]
    pub fn encode(&self) -> String {
        self.to_string()
    }

    fn is_blank(&self) -> bool {
        match self {
            QuestionId::Int(_) => false,
            QuestionId::Text(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionId::Int(n) => write!(f, "{n}"),
            QuestionId::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for QuestionId {
    fn from(n: i64) -> Self {
        QuestionId::Int(n)
    }
}

impl From<&str> for QuestionId {
    fn from(s: &str) -> Self {
        QuestionId::Text(s.to_string())
    }
}

impl From<String> for QuestionId {
    fn from(s: String) -> Self {
        QuestionId::Text(s)
    }
}

// ============================================================================
// Answer shape
// ============================================================================

/// Expected shape of a question's answer.
///
/// This is an open tag set: the well-known shapes get variants, anything else
/// round-trips through [`AnswerShape::Other`] so an unrecognized tag from the
/// decision service is preserved rather than rejected.
///
/// ```
/// use colloquy::question::AnswerShape;
///
/// assert_eq!(AnswerShape::from("number"), AnswerShape::Number);
/// assert_eq!(AnswerShape::from("rating"), AnswerShape::Other("rating".into()));
/// assert_eq!(String::from(AnswerShape::Choice), "choice");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnswerShape {
    /// Free-form text.
    Text,
    /// Numeric answer.
    Number,
    /// Selection from a fixed set.
    Choice,
    /// Any other tag, carried verbatim.
    Other(String),
}

impl Default for AnswerShape {
    fn default() -> Self {
        AnswerShape::Text
    }
}

impl From<String> for AnswerShape {
    fn from(s: String) -> Self {
        match s.as_str() {
            "text" => AnswerShape::Text,
            "number" => AnswerShape::Number,
            "choice" => AnswerShape::Choice,
            _ => AnswerShape::Other(s),
        }
    }
}

impl From<&str> for AnswerShape {
    fn from(s: &str) -> Self {
        AnswerShape::from(s.to_string())
    }
}

impl From<AnswerShape> for String {
    fn from(shape: AnswerShape) -> Self {
        match shape {
            AnswerShape::Text => "text".to_string(),
            AnswerShape::Number => "number".to_string(),
            AnswerShape::Choice => "choice".to_string(),
            AnswerShape::Other(s) => s,
        }
    }
}

impl fmt::Display for AnswerShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerShape::Text => write!(f, "text"),
            AnswerShape::Number => write!(f, "number"),
            AnswerShape::Choice => write!(f, "choice"),
            AnswerShape::Other(s) => write!(f, "{s}"),
        }
    }
}

// ============================================================================
// Question
// ============================================================================

/// One interview question. Immutable once constructed.
///
/// Construction validates the required fields; deserialization routes through
/// the same validation, so questions arriving from the decision service obey
/// the same invariants as hand-built ones.
///
/// # Examples
///
/// ```
/// use colloquy::question::{AnswerShape, Question};
///
/// let q = Question::new(1, "What is your name?")
///     .unwrap()
///     .with_topic("Personal Info")
///     .with_importance(5)
///     .with_answer_shape(AnswerShape::Text);
///
/// assert_eq!(q.id().to_string(), "1");
/// assert_eq!(q.importance(), 5);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionParts")]
pub struct Question {
    id: QuestionId,
    text: String,
    topic: String,
    importance: i32,
    expected_answer_type: AnswerShape,
}

impl Question {
    /// Create a question with the given identity and prompt text.
    ///
    /// Topic defaults to empty, importance to 0, and the answer shape to
    /// [`AnswerShape::Text`]; use the `with_*` setters to fill them in.
    ///
    /// # Errors
    ///
    /// Returns [`QuestionError::BlankId`] or [`QuestionError::BlankText`]
    /// when the respective field is empty or whitespace.
    pub fn new(id: impl Into<QuestionId>, text: impl Into<String>) -> Result<Self, QuestionError> {
        let id = id.into();
        let text = text.into();
        if id.is_blank() {
            return Err(QuestionError::BlankId);
        }
        if text.trim().is_empty() {
            return Err(QuestionError::BlankText { id });
        }
        Ok(Self {
            id,
            text,
            topic: String::new(),
            importance: 0,
            expected_answer_type: AnswerShape::default(),
        })
    }

    /// Set the free-form classification tag.
    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Set the ordered priority. The engine never sorts by importance; it is
    /// data for external consumers that tie-break with it.
    #[must_use]
    pub fn with_importance(mut self, importance: i32) -> Self {
        self.importance = importance;
        self
    }

    /// Set the expected answer shape.
    #[must_use]
    pub fn with_answer_shape(mut self, shape: AnswerShape) -> Self {
        self.expected_answer_type = shape;
        self
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn importance(&self) -> i32 {
        self.importance
    }

    #[must_use]
    pub fn answer_shape(&self) -> &AnswerShape {
        &self.expected_answer_type
    }
}

/// Raw field set of a question as it appears on the wire.
///
/// Deserialization target for [`Question`]; conversion runs the same
/// validation as [`Question::new`]. All fields are required, matching the
/// request payloads the decision service consumes and produces.
#[derive(Debug, Deserialize)]
pub(crate) struct QuestionParts {
    pub id: QuestionId,
    pub text: String,
    pub topic: String,
    pub importance: i32,
    pub expected_answer_type: AnswerShape,
}

impl TryFrom<QuestionParts> for Question {
    type Error = QuestionError;

    fn try_from(parts: QuestionParts) -> Result<Self, Self::Error> {
        Ok(Question::new(parts.id, parts.text)?
            .with_topic(parts.topic)
            .with_importance(parts.importance)
            .with_answer_shape(parts.expected_answer_type))
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Malformed or colliding question data.
///
/// Raised at construction time, for hand-built plans and for follow-ups
/// synthesized by the decision service alike. Never retried.
#[derive(Debug, Error, Diagnostic)]
pub enum QuestionError {
    /// The identity is empty or whitespace.
    #[error("question id must not be blank")]
    #[diagnostic(
        code(colloquy::question::blank_id),
        help("Give every question a non-empty integer or string id.")
    )]
    BlankId,

    /// The prompt text is empty or whitespace.
    #[error("question {id} has no prompt text")]
    #[diagnostic(
        code(colloquy::question::blank_text),
        help("A question must carry the text shown to the respondent.")
    )]
    BlankText { id: QuestionId },

    /// The identity collides with a question already in the plan.
    #[error("question id {id} already exists in this plan")]
    #[diagnostic(
        code(colloquy::question::duplicate_id),
        help("Question ids must be unique within a plan; pick a fresh id.")
    )]
    DuplicateId { id: QuestionId },
}
