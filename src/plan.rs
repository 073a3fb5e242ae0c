//! Interview plans: the ordered question sequence for one session.
//!
//! A [`Plan`] owns the questions in the order they will be asked. Order is
//! authoritative; the engine walks it front to back and never reorders.

use rustc_hash::FxHashSet;

use crate::question::{Question, QuestionError, QuestionId};

/// Ordered sequence of questions with unique identities.
///
/// Uniqueness is checked once at construction and again when the decision
/// service proposes a follow-up ([`Plan::ensure_distinct`]), so a colliding
/// identity can never produce ambiguous answer keys.
///
/// # Examples
///
/// ```
/// use colloquy::plan::Plan;
/// use colloquy::question::Question;
///
/// let plan = Plan::new(vec![
///     Question::new(1, "What is your name?").unwrap(),
///     Question::new(2, "How old are you?").unwrap(),
/// ])
/// .unwrap();
///
/// assert_eq!(plan.len(), 2);
/// assert!(plan.contains_id(&1.into()));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plan {
    questions: Vec<Question>,
    ids: FxHashSet<String>,
}

impl Plan {
    /// Build a plan from questions in ask order.
    ///
    /// # Errors
    ///
    /// Returns [`QuestionError::DuplicateId`] if two questions share an
    /// identity. Ids are compared in their encoded string form, so a numeric
    /// `1` and a textual `"1"` collide.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionError> {
        let mut ids = FxHashSet::default();
        for question in &questions {
            if !ids.insert(question.id().encode()) {
                return Err(QuestionError::DuplicateId {
                    id: question.id().clone(),
                });
            }
        }
        Ok(Self { questions, ids })
    }

    /// An empty plan. Still a valid session: it produces a summary of an
    /// empty answer record without any respondent interaction.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            questions: Vec::new(),
            ids: FxHashSet::default(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Question at the given cursor position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// True if the identity belongs to a question in this plan.
    #[must_use]
    pub fn contains_id(&self, id: &QuestionId) -> bool {
        self.ids.contains(&id.encode())
    }

    /// Reject identities already present in the plan.
    ///
    /// Used for follow-ups synthesized by the decision service: a follow-up
    /// whose id collides with the plan is refused rather than forwarded.
    pub fn ensure_distinct(&self, id: &QuestionId) -> Result<(), QuestionError> {
        if self.contains_id(id) {
            return Err(QuestionError::DuplicateId { id: id.clone() });
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}
