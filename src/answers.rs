//! Append-only answer records.
//!
//! One [`AnswerRecord`] accumulates everything a respondent said during a
//! session, keyed by [`AnswerKey`]. Insertion order is the conversational
//! order and is preserved through iteration and serialization, because the
//! summary step reconstructs the exchange from it.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

use miette::Diagnostic;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::question::QuestionId;

// ============================================================================
// Keys
// ============================================================================

/// Key under which an answer is recorded.
///
/// Primary answers use the owning question's identity; follow-up answers use
/// the parent identity with a `_follow_up` suffix, so the two key spaces can
/// never collide within a plan of unique ids.
///
/// ```
/// use colloquy::answers::AnswerKey;
///
/// assert_eq!(AnswerKey::Primary(1.into()).encode(), "1");
/// assert_eq!(AnswerKey::FollowUp(1.into()).encode(), "1_follow_up");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AnswerKey {
    /// Answer to a question from the plan.
    Primary(QuestionId),
    /// Answer to the follow-up triggered by the given parent question.
    FollowUp(QuestionId),
}

impl AnswerKey {
    /// Suffix appended to the parent id for follow-up keys.
    pub const FOLLOW_UP_SUFFIX: &'static str = "_follow_up";

    /// Encoded string form used on the wire and in the record.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            AnswerKey::Primary(id) => id.encode(),
            AnswerKey::FollowUp(id) => format!("{}{}", id.encode(), Self::FOLLOW_UP_SUFFIX),
        }
    }

    /// The question identity this key derives from.
    #[must_use]
    pub fn question_id(&self) -> &QuestionId {
        match self {
            AnswerKey::Primary(id) | AnswerKey::FollowUp(id) => id,
        }
    }
}

impl fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

// ============================================================================
// Record
// ============================================================================

/// Append-only, insertion-ordered mapping from answer key to raw answer.
///
/// The record never overwrites: once a key is present it stays, and a second
/// write to the same key is an error. Serialization produces a JSON object
/// whose members appear in insertion order, which is the shape the decision
/// service's summary operation consumes.
///
/// # Examples
///
/// ```
/// use colloquy::answers::{AnswerKey, AnswerRecord};
///
/// let mut record = AnswerRecord::new();
/// record.record(AnswerKey::Primary(1.into()), "Alice").unwrap();
/// record.record(AnswerKey::FollowUp(1.into()), "Marie").unwrap();
///
/// assert_eq!(record.len(), 2);
/// assert_eq!(record.get(&AnswerKey::Primary(1.into())), Some("Alice"));
/// assert_eq!(
///     serde_json::to_string(&record).unwrap(),
///     r#"{"1":"Alice","1_follow_up":"Marie"}"#
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnswerRecord {
    entries: Vec<(AnswerKey, String)>,
    seen: FxHashSet<String>,
}

impl AnswerRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one answer under the given key.
    ///
    /// The write is atomic: on error the record is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`AnswersError::DuplicateKey`] when the key (in encoded form)
    /// is already present.
    pub fn record(
        &mut self,
        key: AnswerKey,
        answer: impl Into<String>,
    ) -> Result<(), AnswersError> {
        let encoded = key.encode();
        if !self.seen.insert(encoded.clone()) {
            return Err(AnswersError::DuplicateKey { key: encoded });
        }
        self.entries.push((key, answer.into()));
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Answer recorded under the given key, if any.
    #[must_use]
    pub fn get(&self, key: &AnswerKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, answer)| answer.as_str())
    }

    #[must_use]
    pub fn contains(&self, key: &AnswerKey) -> bool {
        self.seen.contains(&key.encode())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&AnswerKey, &str)> {
        self.entries.iter().map(|(k, a)| (k, a.as_str()))
    }

    /// Encoded keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.entries.iter().map(|(k, _)| k.encode())
    }
}

impl Serialize for AnswerRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, answer) in &self.entries {
            map.serialize_entry(&key.encode(), answer)?;
        }
        map.end()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Violations of the record's append-only contract.
#[derive(Debug, Error, Diagnostic)]
pub enum AnswersError {
    /// A key was recorded twice.
    #[error("answer key {key} is already recorded")]
    #[diagnostic(
        code(colloquy::answers::duplicate_key),
        help("Answer keys are written once per session; this indicates a cursor bug upstream.")
    )]
    DuplicateKey { key: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_never_collide_across_spaces() {
        assert_ne!(
            AnswerKey::Primary(1.into()).encode(),
            AnswerKey::FollowUp(1.into()).encode()
        );
    }

    #[test]
    fn duplicate_key_leaves_record_intact() {
        let mut record = AnswerRecord::new();
        record.record(AnswerKey::Primary(1.into()), "first").unwrap();
        let err = record
            .record(AnswerKey::Primary(1.into()), "second")
            .unwrap_err();
        assert!(matches!(err, AnswersError::DuplicateKey { .. }));
        assert_eq!(record.len(), 1);
        assert_eq!(record.get(&AnswerKey::Primary(1.into())), Some("first"));
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut record = AnswerRecord::new();
        record.record(AnswerKey::Primary(2.into()), "b").unwrap();
        record.record(AnswerKey::Primary(1.into()), "a").unwrap();
        record.record(AnswerKey::FollowUp(1.into()), "a2").unwrap();
        let keys: Vec<String> = record.keys().collect();
        assert_eq!(keys, vec!["2", "1", "1_follow_up"]);
    }

    #[test]
    fn serializes_as_ordered_object() {
        let mut record = AnswerRecord::new();
        record.record(AnswerKey::Primary(2.into()), "thirty").unwrap();
        record.record(AnswerKey::Primary(1.into()), "Alice").unwrap();
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"2":"thirty","1":"Alice"}"#
        );
    }

    #[test]
    fn empty_record_serializes_to_empty_object() {
        assert_eq!(serde_json::to_string(&AnswerRecord::new()).unwrap(), "{}");
    }
}
