use thiserror::Error;

use crate::model::{
    ActionItemError, AllocationError, AssessmentRecordError, CatalogError, ScoreError,
};
use crate::progress::ProgressError;

/// Any validation failure raised by the core model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Assessment(#[from] AssessmentRecordError),
    #[error(transparent)]
    ActionItem(#[from] ActionItemError),
}
