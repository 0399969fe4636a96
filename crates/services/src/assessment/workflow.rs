use std::sync::Arc;

use storage::repository::{AssessmentRepository, CatalogRepository};
use tracing::{debug, info, warn};
use wheel_core::model::{AssessmentResults, UserId};
use wheel_core::{Advance, AdvanceOutcome};

use super::session::AssessmentSession;
use crate::Clock;
use crate::error::AssessmentError;

/// Result of a persisted advance.
#[derive(Debug, Clone, PartialEq)]
pub enum StepAdvance {
    Moved { to: usize },
    Finalized(AssessmentResults),
}

/// Orchestrates assessment start, navigation and finalization against storage.
///
/// Every transition is planned on the session first, persisted second and
/// only then committed, so a storage failure leaves the session where it was.
#[derive(Clone)]
pub struct AssessmentLoopService {
    clock: Clock,
    catalog: Arc<dyn CatalogRepository>,
    assessments: Arc<dyn AssessmentRepository>,
}

impl AssessmentLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        catalog: Arc<dyn CatalogRepository>,
        assessments: Arc<dyn AssessmentRepository>,
    ) -> Self {
        Self {
            clock,
            catalog,
            assessments,
        }
    }

    /// Opens the user's in-progress assessment or starts a new one.
    ///
    /// Answers from the most recent completed assessment are offered as
    /// prefill for unanswered questions; a failure to load them is logged and
    /// otherwise ignored.
    ///
    /// # Errors
    ///
    /// `CatalogUnavailable` when no catalog can be loaded, `PersistenceFailure`
    /// for other storage errors.
    pub async fn start_assessment(
        &self,
        user_id: UserId,
    ) -> Result<AssessmentSession, AssessmentError> {
        let catalog = self
            .catalog
            .fetch_catalog()
            .await
            .map_err(AssessmentError::CatalogUnavailable)?;

        let record = self
            .assessments
            .start_or_resume(user_id, self.clock.now())
            .await?;
        let saved = self.assessments.fetch_responses(record.id()).await?;
        let mut session =
            AssessmentSession::resume(record.id(), catalog, record.current_step(), saved)?;

        match self.assessments.fetch_prior_responses(user_id).await {
            Ok(Some(prior)) => {
                let applied = session.apply_prefill(prior);
                debug!(assessment = %record.id(), applied, "prefilled from prior assessment");
            }
            Ok(None) => {}
            Err(err) => warn!(%user_id, error = %err, "prior answers unavailable, skipping prefill"),
        }

        info!(
            assessment = %record.id(),
            step = session.current_step(),
            "assessment opened"
        );
        Ok(session)
    }

    /// Saves the current step and moves to the next one, finalizing after
    /// the last step.
    ///
    /// # Errors
    ///
    /// `IncompleteStep` or `Finalized` from the wizard rules, and
    /// `PersistenceFailure` when saving fails. The session is unchanged on error.
    pub async fn advance(
        &self,
        session: &mut AssessmentSession,
    ) -> Result<StepAdvance, AssessmentError> {
        let Advance { state, outcome } = session.plan_advance()?;
        let id = session.assessment_id();
        // finishing saves every step so edits made after a step was left are stored
        let responses: Vec<_> = match outcome {
            AdvanceOutcome::Moved { .. } => session.step_responses(session.current_step()),
            AdvanceOutcome::Finalized => (0..session.step_count())
                .flat_map(|step| session.step_responses(step))
                .collect(),
        };
        self.assessments.save_responses(id, &responses).await?;

        match outcome {
            AdvanceOutcome::Moved { to } => {
                self.assessments.set_current_step(id, to).await?;
                session.commit_progress(state);
                debug!(assessment = %id, step = to, "step advanced");
                Ok(StepAdvance::Moved { to })
            }
            AdvanceOutcome::Finalized => {
                let results = self
                    .assessments
                    .finalize_assessment(id, self.clock.now())
                    .await?;
                session.commit_progress(state);
                session.set_results(results.clone());
                info!(assessment = %id, "assessment finalized");
                Ok(StepAdvance::Finalized(results))
            }
        }
    }

    /// Moves to another step. A finished current step is saved first.
    ///
    /// # Errors
    ///
    /// `UnknownStep`, `StepLocked` or `Finalized` from the wizard rules, and
    /// `PersistenceFailure` when saving fails.
    pub async fn jump(
        &self,
        session: &mut AssessmentSession,
        target: usize,
    ) -> Result<(), AssessmentError> {
        let state = session.plan_jump(target)?;
        if state == *session.progress() {
            return Ok(());
        }

        let id = session.assessment_id();
        if session.is_current_step_complete() {
            let responses = session.step_responses(session.current_step());
            self.assessments.save_responses(id, &responses).await?;
        }
        self.assessments.set_current_step(id, target).await?;
        session.commit_progress(state);
        debug!(assessment = %id, step = target, "jumped to step");
        Ok(())
    }

    /// Retries finalization for a session whose last advance failed while
    /// finalizing. Returns stored results for an already completed assessment.
    ///
    /// # Errors
    ///
    /// `IncompleteStep` while answers are missing, `PersistenceFailure` on
    /// storage errors.
    pub async fn finalize(
        &self,
        session: &mut AssessmentSession,
    ) -> Result<AssessmentResults, AssessmentError> {
        if let Some(results) = session.results() {
            return Ok(results.clone());
        }
        if let Some(step) = session.first_unanswered_step() {
            return Err(AssessmentError::IncompleteStep { step });
        }

        let id = session.assessment_id();
        let responses: Vec<_> = (0..session.step_count())
            .flat_map(|step| session.step_responses(step))
            .collect();
        self.assessments.save_responses(id, &responses).await?;
        let results = self
            .assessments
            .finalize_assessment(id, self.clock.now())
            .await?;

        let finished = wheel_core::ProgressState::finished(session.step_count())?;
        session.commit_progress(finished);
        session.set_results(results.clone());
        Ok(results)
    }
}
