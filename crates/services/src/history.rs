use std::sync::Arc;

use storage::repository::{AssessmentRepository, StorageError};
use wheel_core::AreaDelta;
use wheel_core::model::{AssessmentId, AssessmentRecord, AssessmentResults, UserId};
use wheel_core::scoring::compare_results;

/// A completed assessment together with its stored results.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedAssessment {
    pub record: AssessmentRecord,
    pub results: AssessmentResults,
}

/// Side-by-side view of two completed assessments.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub newer: CompletedAssessment,
    pub older: CompletedAssessment,
    pub deltas: Vec<AreaDelta>,
}

/// Read-only access to finished assessments.
#[derive(Clone)]
pub struct HistoryService {
    assessments: Arc<dyn AssessmentRepository>,
}

impl HistoryService {
    #[must_use]
    pub fn new(assessments: Arc<dyn AssessmentRepository>) -> Self {
        Self { assessments }
    }

    /// Completed assessments of a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    pub async fn list_completed(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<AssessmentRecord>, StorageError> {
        self.assessments.list_completed(user_id, limit).await
    }

    /// # Errors
    ///
    /// `NotFound` unless the assessment exists and is completed.
    pub async fn completed(&self, id: AssessmentId) -> Result<CompletedAssessment, StorageError> {
        let record = self.assessments.get_assessment(id).await?;
        let results = self.assessments.get_results(id).await?;
        Ok(CompletedAssessment { record, results })
    }

    /// Compares two completed assessments area by area.
    ///
    /// # Errors
    ///
    /// `NotFound` if either assessment is missing or still in progress.
    pub async fn compare(
        &self,
        newer: AssessmentId,
        older: AssessmentId,
    ) -> Result<Comparison, StorageError> {
        let newer = self.completed(newer).await?;
        let older = self.completed(older).await?;
        let deltas = compare_results(&newer.results, &older.results);
        Ok(Comparison {
            newer,
            older,
            deltas,
        })
    }

    /// Compares the user's two most recent completed assessments, if there are two.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    pub async fn latest_comparison(
        &self,
        user_id: UserId,
    ) -> Result<Option<Comparison>, StorageError> {
        let recent = self.assessments.list_completed(user_id, 2).await?;
        match recent.as_slice() {
            [newer, older] => Ok(Some(self.compare(newer.id(), older.id()).await?)),
            _ => Ok(None),
        }
    }
}
