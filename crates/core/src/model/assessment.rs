use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{AssessmentId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AssessmentRecordError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("completed assessment is missing completed_at")]
    MissingCompletion,

    #[error("in-progress assessment must not carry completed_at")]
    UnexpectedCompletion,

    #[error("unknown assessment status: {0}")]
    UnknownStatus(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssessmentStatus {
    InProgress,
    Completed,
}

impl AssessmentStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AssessmentStatus::InProgress => "in_progress",
            AssessmentStatus::Completed => "completed",
        }
    }

    /// # Errors
    ///
    /// Returns `AssessmentRecordError::UnknownStatus` for unrecognized values.
    pub fn parse(raw: &str) -> Result<Self, AssessmentRecordError> {
        match raw {
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(AssessmentRecordError::UnknownStatus(other.to_string())),
        }
    }
}

/// Server-side bookkeeping for one assessment run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    id: AssessmentId,
    user_id: UserId,
    status: AssessmentStatus,
    current_step: usize,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl AssessmentRecord {
    /// A freshly started assessment positioned on the first step.
    #[must_use]
    pub fn started(id: AssessmentId, user_id: UserId, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            status: AssessmentStatus::InProgress,
            current_step: 0,
            started_at,
            completed_at: None,
        }
    }

    /// Rehydrate an assessment from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentRecordError` if status and timestamps disagree.
    pub fn from_persisted(
        id: AssessmentId,
        user_id: UserId,
        status: AssessmentStatus,
        current_step: usize,
        started_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Self, AssessmentRecordError> {
        match (status, completed_at) {
            (AssessmentStatus::Completed, None) => {
                return Err(AssessmentRecordError::MissingCompletion);
            }
            (AssessmentStatus::InProgress, Some(_)) => {
                return Err(AssessmentRecordError::UnexpectedCompletion);
            }
            (_, Some(done)) if done < started_at => {
                return Err(AssessmentRecordError::InvalidTimeRange);
            }
            _ => {}
        }

        Ok(Self {
            id,
            user_id,
            status,
            current_step,
            started_at,
            completed_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> AssessmentId {
        self.id
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn status(&self) -> AssessmentStatus {
        self.status
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == AssessmentStatus::Completed
    }

    #[must_use]
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn set_current_step(&mut self, step: usize) {
        self.current_step = step;
    }

    /// Marks the record completed.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentRecordError::InvalidTimeRange` if `at` precedes the start.
    pub fn complete(&mut self, at: DateTime<Utc>) -> Result<(), AssessmentRecordError> {
        if at < self.started_at {
            return Err(AssessmentRecordError::InvalidTimeRange);
        }
        self.status = AssessmentStatus::Completed;
        self.completed_at = Some(at);
        Ok(())
    }
}
