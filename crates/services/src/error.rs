//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use wheel_core::ProgressError;
use wheel_core::model::{
    ActionItemError, AllocationError, CatalogError, LifeAreaId, QuestionId, ScoreError,
};

/// Errors emitted while filling in and navigating an assessment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssessmentError {
    #[error(transparent)]
    InvalidScore(#[from] ScoreError),
    #[error("question {0} is not part of this assessment")]
    UnknownQuestion(QuestionId),
    #[error("step {step} does not exist")]
    UnknownStep { step: usize },
    #[error("step {step} still has unanswered questions")]
    IncompleteStep { step: usize },
    #[error("step {target} is locked until the current step is complete")]
    StepLocked { target: usize },
    #[error("assessment is already finalized")]
    Finalized,
    #[error("question catalog is unavailable: {0}")]
    CatalogUnavailable(StorageError),
    #[error(transparent)]
    InvalidCatalog(#[from] CatalogError),
    #[error(transparent)]
    PersistenceFailure(#[from] StorageError),
    #[error(transparent)]
    Progress(ProgressError),
}

impl From<ProgressError> for AssessmentError {
    fn from(err: ProgressError) -> Self {
        match err {
            ProgressError::UnknownStep { step, .. } => Self::UnknownStep { step },
            ProgressError::IncompleteStep { step } => Self::IncompleteStep { step },
            ProgressError::StepLocked { target } => Self::StepLocked { target },
            ProgressError::Finalized => Self::Finalized,
            ProgressError::NoSteps => Self::InvalidCatalog(CatalogError::Empty),
            other => Self::Progress(other),
        }
    }
}

/// Errors emitted by `ActionPlanService` and the plan editor.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ActionPlanError {
    #[error("contribution points must total 100, currently {total}")]
    AllocationInvalid { total: u32 },
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    #[error("an action plan already exists for this assessment")]
    PlanAlreadyExists,
    #[error("choose a focus area first")]
    MissingFocusArea,
    #[error("life area {0} is not part of this assessment")]
    UnknownFocusArea(LifeAreaId),
    #[error("action plans can only be created for completed assessments")]
    AssessmentNotCompleted,
    #[error("the action plan is read-only")]
    ReadOnly,
    #[error("action {index}: {source}")]
    InvalidAction {
        index: usize,
        #[source]
        source: ActionItemError,
    },
    #[error(transparent)]
    Persistence(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_errors_map_to_assessment_errors() {
        assert!(matches!(
            AssessmentError::from(ProgressError::NoSteps),
            AssessmentError::InvalidCatalog(CatalogError::Empty)
        ));
        assert!(matches!(
            AssessmentError::from(ProgressError::UnknownStep {
                step: 7,
                step_count: 4
            }),
            AssessmentError::UnknownStep { step: 7 }
        ));
        assert!(matches!(
            AssessmentError::from(ProgressError::StepLocked { target: 2 }),
            AssessmentError::StepLocked { target: 2 }
        ));
    }
}
