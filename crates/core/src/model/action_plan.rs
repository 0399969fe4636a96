use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::allocation::ContributionAllocation;
use crate::model::ids::{ActionPlanId, AssessmentId, LifeAreaId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ActionItemError {
    #[error("action text cannot be empty")]
    EmptyAction,

    #[error("unknown action status: {0}")]
    UnknownStatus(String),
}

//
// ─── ACTIONS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

impl ActionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ActionStatus::Planned => "planned",
            ActionStatus::InProgress => "in_progress",
            ActionStatus::Completed => "completed",
            ActionStatus::Cancelled => "cancelled",
        }
    }

    /// # Errors
    ///
    /// Returns `ActionItemError::UnknownStatus` for unrecognized values.
    pub fn parse(raw: &str) -> Result<Self, ActionItemError> {
        match raw {
            "planned" => Ok(Self::Planned),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ActionItemError::UnknownStatus(other.to_string())),
        }
    }
}

/// One concrete step of an action plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    action_text: String,
    strategy_text: String,
    target_date: Option<NaiveDate>,
    status: ActionStatus,
}

impl ActionItem {
    /// # Errors
    ///
    /// Returns `ActionItemError::EmptyAction` if the action text is blank.
    pub fn new(
        action_text: impl Into<String>,
        strategy_text: impl Into<String>,
        target_date: Option<NaiveDate>,
    ) -> Result<Self, ActionItemError> {
        let action_text = action_text.into().trim().to_string();
        if action_text.is_empty() {
            return Err(ActionItemError::EmptyAction);
        }
        Ok(Self {
            action_text,
            strategy_text: strategy_text.into().trim().to_string(),
            target_date,
            status: ActionStatus::Planned,
        })
    }

    #[must_use]
    pub fn with_status(mut self, status: ActionStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn action_text(&self) -> &str {
        &self.action_text
    }

    #[must_use]
    pub fn strategy_text(&self) -> &str {
        &self.strategy_text
    }

    #[must_use]
    pub fn target_date(&self) -> Option<NaiveDate> {
        self.target_date
    }

    #[must_use]
    pub fn status(&self) -> ActionStatus {
        self.status
    }
}

//
// ─── PLAN ──────────────────────────────────────────────────────────────────────
//

/// What the user submits at the end of the action-planning step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPlanDraft {
    pub focus_area_id: LifeAreaId,
    pub allocation: ContributionAllocation,
    pub actions: Vec<ActionItem>,
}

/// A stored plan. Plans are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub id: ActionPlanId,
    pub assessment_id: AssessmentId,
    pub focus_area_id: LifeAreaId,
    pub allocation: ContributionAllocation,
    pub actions: Vec<ActionItem>,
    pub created_at: DateTime<Utc>,
}

impl ActionPlan {
    #[must_use]
    pub fn from_draft(
        id: ActionPlanId,
        assessment_id: AssessmentId,
        draft: ActionPlanDraft,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            assessment_id,
            focus_area_id: draft.focus_area_id,
            allocation: draft.allocation,
            actions: draft.actions,
            created_at,
        }
    }
}
