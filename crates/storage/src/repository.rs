use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use wheel_core::model::{
    ActionPlan, ActionPlanDraft, ActionPlanId, AssessmentId, AssessmentRecord, AssessmentResults,
    Catalog, QuestionId, Responses, Score, UserId,
};
use wheel_core::scoring;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// One saved answer as it crosses the storage boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseRecord {
    pub question_id: QuestionId,
    pub score: Score,
}

impl ResponseRecord {
    #[must_use]
    pub fn new(question_id: QuestionId, score: Score) -> Self {
        Self { question_id, score }
    }
}

/// Saved answers of one assessment.
pub type ResponseMap = BTreeMap<QuestionId, Score>;

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Replace or update the reference hierarchy.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the catalog cannot be stored.
    async fn upsert_catalog(&self, catalog: &Catalog) -> Result<(), StorageError>;

    /// Load the full hierarchy in display order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` when no catalog has been stored.
    async fn fetch_catalog(&self) -> Result<Catalog, StorageError>;
}

#[async_trait]
pub trait AssessmentRepository: Send + Sync {
    /// Return the user's in-progress assessment, or open a new one at `now`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn start_or_resume(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<AssessmentRecord, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the assessment does not exist.
    async fn get_assessment(&self, id: AssessmentId) -> Result<AssessmentRecord, StorageError>;

    /// Saved answers of an assessment.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the assessment does not exist.
    async fn fetch_responses(&self, id: AssessmentId) -> Result<ResponseMap, StorageError>;

    /// Answers of the user's most recently completed assessment, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn fetch_prior_responses(
        &self,
        user_id: UserId,
    ) -> Result<Option<ResponseMap>, StorageError>;

    /// Insert or overwrite answers.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown assessment, `Conflict` once it is completed.
    async fn save_responses(
        &self,
        id: AssessmentId,
        responses: &[ResponseRecord],
    ) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// `NotFound` for an unknown assessment, `Conflict` once it is completed.
    async fn set_current_step(&self, id: AssessmentId, step: usize) -> Result<(), StorageError>;

    /// Score the saved answers, store the results and mark the assessment
    /// completed. Finalizing a completed assessment returns its stored results.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown assessment or a missing catalog.
    async fn finalize_assessment(
        &self,
        id: AssessmentId,
        completed_at: DateTime<Utc>,
    ) -> Result<AssessmentResults, StorageError>;

    /// # Errors
    ///
    /// `NotFound` unless the assessment exists and is completed.
    async fn get_results(&self, id: AssessmentId) -> Result<AssessmentResults, StorageError>;

    /// Completed assessments of a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn list_completed(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<AssessmentRecord>, StorageError>;
}

#[async_trait]
pub trait ActionPlanRepository: Send + Sync {
    /// Store the plan of an assessment. An assessment holds at most one plan.
    ///
    /// # Errors
    ///
    /// `Conflict` if a plan already exists, `NotFound` for an unknown assessment.
    async fn submit_contribution_plan(
        &self,
        assessment_id: AssessmentId,
        draft: &ActionPlanDraft,
        created_at: DateTime<Utc>,
    ) -> Result<ActionPlan, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn get_action_plan(
        &self,
        assessment_id: AssessmentId,
    ) -> Result<Option<ActionPlan>, StorageError>;
}

/// Shared finalization rule: both adapters score through the core model.
#[must_use]
pub fn score_saved_responses(catalog: &Catalog, saved: &ResponseMap) -> AssessmentResults {
    let responses = Responses::from_saved(saved.iter().map(|(q, s)| (*q, *s)));
    scoring::score_sheet(catalog, &responses).to_results()
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
struct AssessmentEntry {
    record: AssessmentRecord,
    responses: ResponseMap,
    results: Option<AssessmentResults>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    catalog: Arc<Mutex<Option<Catalog>>>,
    assessments: Arc<Mutex<BTreeMap<AssessmentId, AssessmentEntry>>>,
    plans: Arc<Mutex<BTreeMap<AssessmentId, ActionPlan>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e| StorageError::Connection(e.to_string()))
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository preloaded with `catalog`.
    #[must_use]
    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(Mutex::new(Some(catalog))),
            ..Self::default()
        }
    }
}

#[async_trait]
impl CatalogRepository for InMemoryRepository {
    async fn upsert_catalog(&self, catalog: &Catalog) -> Result<(), StorageError> {
        *lock(&self.catalog)? = Some(catalog.clone());
        Ok(())
    }

    async fn fetch_catalog(&self) -> Result<Catalog, StorageError> {
        lock(&self.catalog)?.clone().ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl AssessmentRepository for InMemoryRepository {
    async fn start_or_resume(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<AssessmentRecord, StorageError> {
        let mut guard = lock(&self.assessments)?;
        if let Some(entry) = guard
            .values()
            .rev()
            .find(|e| e.record.user_id() == user_id && !e.record.is_completed())
        {
            return Ok(entry.record.clone());
        }

        let next_id = guard.keys().next_back().map_or(1, |id| id.value() + 1);
        let record = AssessmentRecord::started(AssessmentId::new(next_id), user_id, now);
        guard.insert(
            record.id(),
            AssessmentEntry {
                record: record.clone(),
                responses: ResponseMap::new(),
                results: None,
            },
        );
        Ok(record)
    }

    async fn get_assessment(&self, id: AssessmentId) -> Result<AssessmentRecord, StorageError> {
        let guard = lock(&self.assessments)?;
        guard
            .get(&id)
            .map(|e| e.record.clone())
            .ok_or(StorageError::NotFound)
    }

    async fn fetch_responses(&self, id: AssessmentId) -> Result<ResponseMap, StorageError> {
        let guard = lock(&self.assessments)?;
        guard
            .get(&id)
            .map(|e| e.responses.clone())
            .ok_or(StorageError::NotFound)
    }

    async fn fetch_prior_responses(
        &self,
        user_id: UserId,
    ) -> Result<Option<ResponseMap>, StorageError> {
        let guard = lock(&self.assessments)?;
        Ok(guard
            .values()
            .filter(|e| e.record.user_id() == user_id && e.record.is_completed())
            .max_by_key(|e| (e.record.completed_at(), e.record.id()))
            .map(|e| e.responses.clone()))
    }

    async fn save_responses(
        &self,
        id: AssessmentId,
        responses: &[ResponseRecord],
    ) -> Result<(), StorageError> {
        let mut guard = lock(&self.assessments)?;
        let entry = guard.get_mut(&id).ok_or(StorageError::NotFound)?;
        if entry.record.is_completed() {
            return Err(StorageError::Conflict);
        }
        for r in responses {
            entry.responses.insert(r.question_id, r.score);
        }
        Ok(())
    }

    async fn set_current_step(&self, id: AssessmentId, step: usize) -> Result<(), StorageError> {
        let mut guard = lock(&self.assessments)?;
        let entry = guard.get_mut(&id).ok_or(StorageError::NotFound)?;
        if entry.record.is_completed() {
            return Err(StorageError::Conflict);
        }
        entry.record.set_current_step(step);
        Ok(())
    }

    async fn finalize_assessment(
        &self,
        id: AssessmentId,
        completed_at: DateTime<Utc>,
    ) -> Result<AssessmentResults, StorageError> {
        let catalog = lock(&self.catalog)?.clone().ok_or(StorageError::NotFound)?;
        let mut guard = lock(&self.assessments)?;
        let entry = guard.get_mut(&id).ok_or(StorageError::NotFound)?;
        if let Some(results) = &entry.results {
            return Ok(results.clone());
        }

        let results = score_saved_responses(&catalog, &entry.responses);
        entry
            .record
            .complete(completed_at)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        entry.results = Some(results.clone());
        Ok(results)
    }

    async fn get_results(&self, id: AssessmentId) -> Result<AssessmentResults, StorageError> {
        let guard = lock(&self.assessments)?;
        guard
            .get(&id)
            .and_then(|e| e.results.clone())
            .ok_or(StorageError::NotFound)
    }

    async fn list_completed(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<AssessmentRecord>, StorageError> {
        let guard = lock(&self.assessments)?;
        let mut done: Vec<AssessmentRecord> = guard
            .values()
            .filter(|e| e.record.user_id() == user_id && e.record.is_completed())
            .map(|e| e.record.clone())
            .collect();
        done.sort_by(|a, b| {
            b.completed_at()
                .cmp(&a.completed_at())
                .then(b.id().cmp(&a.id()))
        });
        done.truncate(limit as usize);
        Ok(done)
    }
}

#[async_trait]
impl ActionPlanRepository for InMemoryRepository {
    async fn submit_contribution_plan(
        &self,
        assessment_id: AssessmentId,
        draft: &ActionPlanDraft,
        created_at: DateTime<Utc>,
    ) -> Result<ActionPlan, StorageError> {
        if !lock(&self.assessments)?.contains_key(&assessment_id) {
            return Err(StorageError::NotFound);
        }
        let mut plans = lock(&self.plans)?;
        if plans.contains_key(&assessment_id) {
            return Err(StorageError::Conflict);
        }

        let id = ActionPlanId::new(plans.len() as u64 + 1);
        let plan = ActionPlan::from_draft(id, assessment_id, draft.clone(), created_at);
        plans.insert(assessment_id, plan.clone());
        Ok(plan)
    }

    async fn get_action_plan(
        &self,
        assessment_id: AssessmentId,
    ) -> Result<Option<ActionPlan>, StorageError> {
        Ok(lock(&self.plans)?.get(&assessment_id).cloned())
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub catalog: Arc<dyn CatalogRepository>,
    pub assessments: Arc<dyn AssessmentRepository>,
    pub plans: Arc<dyn ActionPlanRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    /// In-memory storage seeded with `catalog`.
    #[must_use]
    pub fn in_memory_with_catalog(catalog: Catalog) -> Self {
        Self::from_repository(InMemoryRepository::with_catalog(catalog))
    }

    fn from_repository(repo: InMemoryRepository) -> Self {
        let catalog: Arc<dyn CatalogRepository> = Arc::new(repo.clone());
        let assessments: Arc<dyn AssessmentRepository> = Arc::new(repo.clone());
        let plans: Arc<dyn ActionPlanRepository> = Arc::new(repo);
        Self {
            catalog,
            assessments,
            plans,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;
    use chrono::Duration;
    use wheel_core::model::{ContributionAllocation, LifeAreaId};
    use wheel_core::time::fixed_now;

    fn all_answers(catalog: &Catalog, value: u8) -> Vec<ResponseRecord> {
        catalog
            .areas()
            .iter()
            .flat_map(|a| a.questions())
            .map(|q| ResponseRecord::new(q.id, Score::new(value).unwrap()))
            .collect()
    }

    #[tokio::test]
    async fn start_resumes_open_assessment() {
        let repo = InMemoryRepository::with_catalog(default_catalog().unwrap());
        let user = UserId::new(1);

        let first = repo.start_or_resume(user, fixed_now()).await.unwrap();
        repo.set_current_step(first.id(), 2).await.unwrap();
        let again = repo.start_or_resume(user, fixed_now()).await.unwrap();

        assert_eq!(first.id(), again.id());
        assert_eq!(again.current_step(), 2);

        let other = repo.start_or_resume(UserId::new(2), fixed_now()).await.unwrap();
        assert_ne!(other.id(), first.id());
    }

    #[tokio::test]
    async fn finalize_scores_and_locks_assessment() {
        let catalog = default_catalog().unwrap();
        let repo = InMemoryRepository::with_catalog(catalog.clone());
        let user = UserId::new(1);
        let record = repo.start_or_resume(user, fixed_now()).await.unwrap();

        repo.save_responses(record.id(), &all_answers(&catalog, 8))
            .await
            .unwrap();
        let done_at = fixed_now() + Duration::minutes(10);
        let results = repo.finalize_assessment(record.id(), done_at).await.unwrap();

        assert_eq!(results.area_results.len(), 4);
        assert!(results.area_results.iter().all(|r| r.average_score == 8.0));
        assert!(results.area_results.iter().all(|r| r.percentage == 80));

        let again = repo.finalize_assessment(record.id(), done_at).await.unwrap();
        assert_eq!(again, results);
        assert_eq!(
            repo.save_responses(record.id(), &all_answers(&catalog, 1))
                .await
                .unwrap_err(),
            StorageError::Conflict
        );

        let prior = repo.fetch_prior_responses(user).await.unwrap().unwrap();
        assert_eq!(prior.len(), catalog.question_count());

        let next = repo.start_or_resume(user, done_at).await.unwrap();
        assert_ne!(next.id(), record.id());
        assert_eq!(repo.list_completed(user, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn second_plan_for_same_assessment_conflicts() {
        let catalog = default_catalog().unwrap();
        let repo = InMemoryRepository::with_catalog(catalog.clone());
        let record = repo
            .start_or_resume(UserId::new(1), fixed_now())
            .await
            .unwrap();

        let mut allocation = ContributionAllocation::for_areas(catalog.area_ids());
        allocation.set_points(LifeAreaId::new(1), 100).unwrap();
        let draft = ActionPlanDraft {
            focus_area_id: LifeAreaId::new(1),
            allocation,
            actions: Vec::new(),
        };

        repo.submit_contribution_plan(record.id(), &draft, fixed_now())
            .await
            .unwrap();
        assert_eq!(
            repo.submit_contribution_plan(record.id(), &draft, fixed_now())
                .await
                .unwrap_err(),
            StorageError::Conflict
        );
        assert!(repo.get_action_plan(record.id()).await.unwrap().is_some());
    }
}
