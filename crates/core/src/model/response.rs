use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreError {
    #[error("score must be between 0 and 10, got {0}")]
    OutOfRange(i64),

    #[error("score is not a whole number: {0:?}")]
    NotANumber(String),
}

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

/// A single 0-10 rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MIN: Score = Score(0);
    pub const MAX: Score = Score(10);

    /// # Errors
    ///
    /// Returns `ScoreError::OutOfRange` when `value > 10`.
    pub fn new(value: u8) -> Result<Self, ScoreError> {
        Self::try_from(i64::from(value))
    }

    /// Parses user input such as `" 7 "`.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::NotANumber` for non-integer input and
    /// `ScoreError::OutOfRange` for integers outside 0-10.
    pub fn parse(raw: &str) -> Result<Self, ScoreError> {
        let value: i64 = raw
            .trim()
            .parse()
            .map_err(|_| ScoreError::NotANumber(raw.to_string()))?;
        Self::try_from(value)
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }
}

impl TryFrom<i64> for Score {
    type Error = ScoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match u8::try_from(value) {
            Ok(v) if v <= 10 => Ok(Self(v)),
            _ => Err(ScoreError::OutOfRange(value)),
        }
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

//
// ─── RESPONSES ─────────────────────────────────────────────────────────────────
//

/// Where a response value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseOrigin {
    /// Entered (or confirmed by editing) during this assessment.
    Manual,
    /// Carried over from a prior assessment and not touched since.
    Prefilled,
}

/// One answered question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub value: Score,
    pub origin: ResponseOrigin,
}

impl Response {
    #[must_use]
    pub fn manual(value: Score) -> Self {
        Self {
            value,
            origin: ResponseOrigin::Manual,
        }
    }

    #[must_use]
    pub fn prefilled(value: Score) -> Self {
        Self {
            value,
            origin: ResponseOrigin::Prefilled,
        }
    }

    #[must_use]
    pub fn is_prefilled(&self) -> bool {
        self.origin == ResponseOrigin::Prefilled
    }
}

/// Answers keyed by question; an absent key means unanswered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Responses {
    entries: BTreeMap<QuestionId, Response>,
}

impl Responses {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds manual responses from previously saved values.
    #[must_use]
    pub fn from_saved(saved: impl IntoIterator<Item = (QuestionId, Score)>) -> Self {
        Self {
            entries: saved
                .into_iter()
                .map(|(q, s)| (q, Response::manual(s)))
                .collect(),
        }
    }

    #[must_use]
    pub fn get(&self, question: QuestionId) -> Option<&Response> {
        self.entries.get(&question)
    }

    #[must_use]
    pub fn score(&self, question: QuestionId) -> Option<Score> {
        self.entries.get(&question).map(|r| r.value)
    }

    #[must_use]
    pub fn is_answered(&self, question: QuestionId) -> bool {
        self.entries.contains_key(&question)
    }

    /// Records a manual answer, replacing any previous entry.
    pub fn set_manual(&mut self, question: QuestionId, value: Score) -> Option<Response> {
        self.entries.insert(question, Response::manual(value))
    }

    /// Inserts a prefilled value only when the question has no response yet.
    ///
    /// Returns `true` if the value was inserted.
    pub fn prefill_if_absent(&mut self, question: QuestionId, value: Score) -> bool {
        if self.entries.contains_key(&question) {
            return false;
        }
        self.entries.insert(question, Response::prefilled(value));
        true
    }

    pub fn remove(&mut self, question: QuestionId) -> Option<Response> {
        self.entries.remove(&question)
    }

    /// Drops every entry still tagged as prefilled. Returns how many were removed.
    pub fn clear_prefilled(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, r| !r.is_prefilled());
        before - self.entries.len()
    }

    #[must_use]
    pub fn prefilled_count(&self) -> usize {
        self.entries.values().filter(|r| r.is_prefilled()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, &Response)> + '_ {
        self.entries.iter().map(|(q, r)| (*q, r))
    }

    /// Plain question -> score view, dropping the origin tag.
    #[must_use]
    pub fn values(&self) -> BTreeMap<QuestionId, Score> {
        self.entries.iter().map(|(q, r)| (*q, r.value)).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn score(v: u8) -> Score {
        Score::new(v).unwrap()
    }

    #[test]
    fn score_range_is_inclusive() {
        assert_eq!(Score::new(0).unwrap(), Score::MIN);
        assert_eq!(Score::new(10).unwrap(), Score::MAX);
        assert_eq!(Score::new(11).unwrap_err(), ScoreError::OutOfRange(11));
        assert_eq!(Score::try_from(-1).unwrap_err(), ScoreError::OutOfRange(-1));
    }

    #[test]
    fn score_parses_user_input() {
        assert_eq!(Score::parse(" 7 ").unwrap().value(), 7);
        assert!(matches!(Score::parse("7.5"), Err(ScoreError::NotANumber(_))));
        assert!(matches!(Score::parse("42"), Err(ScoreError::OutOfRange(42))));
    }

    #[test]
    fn score_deserialization_enforces_range() {
        assert!(serde_json::from_str::<Score>("11").is_err());
        assert_eq!(serde_json::from_str::<Score>("4").unwrap().value(), 4);
    }

    #[test]
    fn prefill_never_overwrites_existing_answer() {
        let mut responses = Responses::new();
        responses.set_manual(QuestionId::new(1), score(3));

        assert!(!responses.prefill_if_absent(QuestionId::new(1), score(9)));
        assert!(responses.prefill_if_absent(QuestionId::new(2), score(9)));

        assert_eq!(responses.score(QuestionId::new(1)), Some(score(3)));
        assert!(responses.get(QuestionId::new(2)).unwrap().is_prefilled());
    }

    #[test]
    fn clearing_prefill_keeps_manual_and_edited_entries() {
        let mut responses = Responses::new();
        responses.prefill_if_absent(QuestionId::new(1), score(5));
        responses.prefill_if_absent(QuestionId::new(2), score(6));
        responses.set_manual(QuestionId::new(3), score(7));
        // editing a prefilled answer makes it manual
        responses.set_manual(QuestionId::new(2), score(6));

        assert_eq!(responses.prefilled_count(), 1);
        assert_eq!(responses.clear_prefilled(), 1);
        assert!(!responses.is_answered(QuestionId::new(1)));
        assert_eq!(responses.score(QuestionId::new(2)), Some(score(6)));
        assert_eq!(responses.score(QuestionId::new(3)), Some(score(7)));
    }
}
