use tracing::{debug, warn};
use wheel_core::model::{
    AssessmentId, AssessmentResults, Catalog, LifeArea, QuestionId, Responses, Score,
};
use wheel_core::progress::{self, Advance, AdvanceOutcome, ProgressState, StepStatus};
use wheel_core::scoring::{self, ScoreSheet};

use crate::error::AssessmentError;
use storage::repository::ResponseRecord;

/// In-memory state of one assessment wizard.
///
/// Holds the catalog, every response given so far and the step progress.
/// Scores are derived on demand and never cached.
#[derive(Debug, Clone)]
pub struct AssessmentSession {
    assessment_id: AssessmentId,
    catalog: Catalog,
    responses: Responses,
    progress: ProgressState,
    prefill_loaded: bool,
    results: Option<AssessmentResults>,
}

impl AssessmentSession {
    /// Fresh session positioned on the first area.
    ///
    /// # Errors
    ///
    /// Never fails for a validated catalog; kept fallible for symmetry with `resume`.
    pub fn new(assessment_id: AssessmentId, catalog: Catalog) -> Result<Self, AssessmentError> {
        let progress = ProgressState::start(catalog.step_count())?;
        Ok(Self {
            assessment_id,
            catalog,
            responses: Responses::new(),
            progress,
            prefill_loaded: false,
            results: None,
        })
    }

    /// Rebuilds a session from saved answers. Steps whose questions are all
    /// answered count as complete.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::UnknownStep` if `current_step` is out of range.
    pub fn resume(
        assessment_id: AssessmentId,
        catalog: Catalog,
        current_step: usize,
        saved: impl IntoIterator<Item = (QuestionId, Score)>,
    ) -> Result<Self, AssessmentError> {
        let responses = Responses::from_saved(
            saved
                .into_iter()
                .filter(|(question, _)| catalog.contains_question(*question)),
        );
        let completed = (0..catalog.step_count())
            .filter(|step| progress::is_step_complete(&catalog, &responses, *step));
        let progress = ProgressState::resume(catalog.step_count(), current_step, completed)?;

        Ok(Self {
            assessment_id,
            catalog,
            responses,
            progress,
            prefill_loaded: false,
            results: None,
        })
    }

    #[must_use]
    pub fn assessment_id(&self) -> AssessmentId {
        self.assessment_id
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn responses(&self) -> &Responses {
        &self.responses
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressState {
        &self.progress
    }

    #[must_use]
    pub fn current_step(&self) -> usize {
        self.progress.current()
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.progress.step_count()
    }

    /// The life area shown on the current step.
    #[must_use]
    pub fn current_area(&self) -> Option<&LifeArea> {
        self.catalog.area_at(self.progress.current())
    }

    #[must_use]
    pub fn step_statuses(&self) -> Vec<StepStatus> {
        self.progress.statuses()
    }

    #[must_use]
    pub fn is_step_complete(&self, step: usize) -> bool {
        progress::is_step_complete(&self.catalog, &self.responses, step)
    }

    #[must_use]
    pub fn is_current_step_complete(&self) -> bool {
        self.is_step_complete(self.progress.current())
    }

    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.progress.is_finalized()
    }

    /// Results returned when the assessment was finalized.
    #[must_use]
    pub fn results(&self) -> Option<&AssessmentResults> {
        self.results.as_ref()
    }

    /// Live scores for every area, recomputed from the current responses.
    #[must_use]
    pub fn score_sheet(&self) -> ScoreSheet {
        scoring::score_sheet(&self.catalog, &self.responses)
    }

    #[must_use]
    pub fn is_prefilled(&self, question: QuestionId) -> bool {
        self.responses
            .get(question)
            .is_some_and(wheel_core::model::Response::is_prefilled)
    }

    #[must_use]
    pub fn prefilled_count(&self) -> usize {
        self.responses.prefilled_count()
    }

    //
    // ─── EDITING ───────────────────────────────────────────────────────────────
    //

    /// Records a manual answer. Nothing changes when the input is rejected.
    ///
    /// # Errors
    ///
    /// `Finalized`, `UnknownQuestion` or `InvalidScore`.
    pub fn answer_question(&mut self, question: QuestionId, raw: i64) -> Result<(), AssessmentError> {
        if self.is_finalized() {
            return Err(AssessmentError::Finalized);
        }
        if !self.catalog.contains_question(question) {
            return Err(AssessmentError::UnknownQuestion(question));
        }
        let score = Score::try_from(raw)?;
        self.responses.set_manual(question, score);
        debug!(%question, score = score.value(), "answer recorded");
        Ok(())
    }

    /// Removes an answer. Returns whether one was present.
    ///
    /// # Errors
    ///
    /// `Finalized` or `UnknownQuestion`.
    pub fn clear_answer(&mut self, question: QuestionId) -> Result<bool, AssessmentError> {
        if self.is_finalized() {
            return Err(AssessmentError::Finalized);
        }
        if !self.catalog.contains_question(question) {
            return Err(AssessmentError::UnknownQuestion(question));
        }
        Ok(self.responses.remove(question).is_some())
    }

    /// Copies prior answers into questions that have none yet.
    ///
    /// Only the first call has an effect; later calls return 0. Questions
    /// missing from this catalog are skipped.
    pub fn apply_prefill(&mut self, prior: impl IntoIterator<Item = (QuestionId, Score)>) -> usize {
        if self.prefill_loaded || self.is_finalized() {
            return 0;
        }
        self.prefill_loaded = true;

        let mut applied = 0;
        for (question, score) in prior {
            if !self.catalog.contains_question(question) {
                warn!(%question, "skipping prior answer for unknown question");
                continue;
            }
            if self.responses.prefill_if_absent(question, score) {
                applied += 1;
            }
        }
        applied
    }

    /// Drops answers that are still untouched prefill values.
    pub fn clear_prefill(&mut self) -> usize {
        if self.is_finalized() {
            return 0;
        }
        self.responses.clear_prefilled()
    }

    /// Answers of the questions on `step`, ready to persist.
    #[must_use]
    pub fn step_responses(&self, step: usize) -> Vec<ResponseRecord> {
        self.catalog
            .area_at(step)
            .map(|area| {
                area.questions()
                    .filter_map(|q| {
                        self.responses
                            .score(q.id)
                            .map(|score| ResponseRecord::new(q.id, score))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    //
    // ─── NAVIGATION ────────────────────────────────────────────────────────────
    //

    /// Computes the next progress state without applying it.
    ///
    /// # Errors
    ///
    /// `Finalized` or `IncompleteStep`.
    pub fn plan_advance(&self) -> Result<Advance, AssessmentError> {
        let advance = self.progress.advanced(self.is_current_step_complete())?;
        if advance.outcome == AdvanceOutcome::Finalized {
            // answers cleared after a step was marked complete still block finishing
            if let Some(step) = self.first_unanswered_step() {
                return Err(AssessmentError::IncompleteStep { step });
            }
        }
        Ok(advance)
    }

    /// First step that still has an unanswered question.
    #[must_use]
    pub fn first_unanswered_step(&self) -> Option<usize> {
        (0..self.step_count()).find(|step| !self.is_step_complete(*step))
    }

    /// Computes the progress state after a jump without applying it.
    ///
    /// # Errors
    ///
    /// `Finalized`, `UnknownStep` or `StepLocked`.
    pub fn plan_jump(&self, target: usize) -> Result<ProgressState, AssessmentError> {
        Ok(self
            .progress
            .jumped(target, self.is_current_step_complete())?)
    }

    pub(crate) fn commit_progress(&mut self, progress: ProgressState) {
        self.progress = progress;
    }

    pub(crate) fn set_results(&mut self, results: AssessmentResults) {
        self.results = Some(results);
    }

    /// Advances without persistence.
    ///
    /// # Errors
    ///
    /// Same as [`Self::plan_advance`].
    pub fn advance(&mut self) -> Result<AdvanceOutcome, AssessmentError> {
        let Advance { state, outcome } = self.plan_advance()?;
        self.progress = state;
        if outcome == AdvanceOutcome::Finalized {
            self.results = Some(self.score_sheet().to_results());
        }
        Ok(outcome)
    }

    /// Jumps without persistence.
    ///
    /// # Errors
    ///
    /// Same as [`Self::plan_jump`].
    pub fn jump_to(&mut self, target: usize) -> Result<(), AssessmentError> {
        self.progress = self.plan_jump(target)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::default_catalog;

    fn session() -> AssessmentSession {
        AssessmentSession::new(AssessmentId::new(1), default_catalog().unwrap()).unwrap()
    }

    fn answer_step(session: &mut AssessmentSession, step: usize, value: i64) {
        let ids: Vec<QuestionId> = session
            .catalog()
            .area_at(step)
            .unwrap()
            .questions()
            .map(|q| q.id)
            .collect();
        for id in ids {
            session.answer_question(id, value).unwrap();
        }
    }

    #[test]
    fn rejected_answer_leaves_responses_untouched() {
        let mut s = session();
        let q = QuestionId::new(10101);
        s.answer_question(q, 4).unwrap();

        assert!(matches!(
            s.answer_question(q, 11),
            Err(AssessmentError::InvalidScore(_))
        ));
        assert!(matches!(
            s.answer_question(QuestionId::new(1), 5),
            Err(AssessmentError::UnknownQuestion(_))
        ));
        assert_eq!(s.responses().score(q).map(Score::value), Some(4));
        assert_eq!(s.responses().len(), 1);
    }

    #[test]
    fn advance_unlocks_with_last_answer() {
        let mut s = session();
        let questions: Vec<QuestionId> = s.current_area().unwrap().questions().map(|q| q.id).collect();
        let (last, rest) = questions.split_last().unwrap();
        for q in rest {
            s.answer_question(*q, 7).unwrap();
        }
        assert!(matches!(
            s.advance(),
            Err(AssessmentError::IncompleteStep { step: 0 })
        ));

        s.answer_question(*last, 7).unwrap();
        assert_eq!(s.advance().unwrap(), AdvanceOutcome::Moved { to: 1 });
        assert_eq!(s.step_statuses()[0], StepStatus::Complete);
    }

    #[test]
    fn walking_all_steps_finalizes_once() {
        let mut s = session();
        for step in 0..s.step_count() {
            answer_step(&mut s, step, 8);
            let outcome = s.advance().unwrap();
            if step + 1 < s.step_count() {
                assert_eq!(outcome, AdvanceOutcome::Moved { to: step + 1 });
            } else {
                assert_eq!(outcome, AdvanceOutcome::Finalized);
            }
        }
        assert!(matches!(s.advance(), Err(AssessmentError::Finalized)));
        assert!(matches!(
            s.answer_question(QuestionId::new(10101), 1),
            Err(AssessmentError::Finalized)
        ));
        let results = s.results().unwrap();
        assert!(results.area_results.iter().all(|a| a.percentage == 80));
    }

    #[test]
    fn jump_rules() {
        let mut s = session();
        assert!(matches!(
            s.jump_to(2),
            Err(AssessmentError::StepLocked { target: 2 })
        ));

        answer_step(&mut s, 0, 5);
        s.jump_to(2).unwrap();
        assert_eq!(s.current_step(), 2);
        assert_eq!(s.step_statuses()[0], StepStatus::Complete);

        // back to a completed step with the current one unfinished
        s.jump_to(0).unwrap();
        assert_eq!(s.current_step(), 0);
        assert!(matches!(
            s.jump_to(9),
            Err(AssessmentError::UnknownStep { step: 9 })
        ));
    }

    #[test]
    fn prefill_only_fills_gaps_and_only_once() {
        let mut s = session();
        let edited = QuestionId::new(10101);
        let untouched = QuestionId::new(10102);
        s.answer_question(edited, 2).unwrap();

        let prior = vec![
            (edited, Score::new(9).unwrap()),
            (untouched, Score::new(9).unwrap()),
            (QuestionId::new(1), Score::new(9).unwrap()),
        ];
        assert_eq!(s.apply_prefill(prior.clone()), 1);
        assert_eq!(s.apply_prefill(prior), 0);

        assert_eq!(s.responses().score(edited).map(Score::value), Some(2));
        assert!(s.is_prefilled(untouched));
        assert!(!s.is_prefilled(edited));
    }

    #[test]
    fn clear_prefill_spares_edited_answers() {
        let mut s = session();
        let prior: Vec<(QuestionId, Score)> = s
            .catalog()
            .areas()
            .iter()
            .flat_map(|a| a.questions())
            .map(|q| (q.id, Score::new(6).unwrap()))
            .collect();
        assert_eq!(s.apply_prefill(prior), 36);

        s.answer_question(QuestionId::new(10101), 6).unwrap();
        assert_eq!(s.clear_prefill(), 35);
        assert_eq!(s.responses().len(), 1);
        assert!(!s.is_prefilled(QuestionId::new(10101)));
    }

    #[test]
    fn clearing_prefill_after_advancing_blocks_finalization() {
        let mut s = session();
        let prior: Vec<(QuestionId, Score)> = s
            .catalog()
            .areas()
            .iter()
            .flat_map(|a| a.questions())
            .map(|q| (q.id, Score::new(9).unwrap()))
            .collect();
        assert_eq!(s.apply_prefill(prior), 36);
        for _ in 0..3 {
            s.advance().unwrap();
        }

        assert_eq!(s.clear_prefill(), 36);
        answer_step(&mut s, 3, 5);
        assert!(matches!(
            s.advance(),
            Err(AssessmentError::IncompleteStep { step: 0 })
        ));
        assert!(!s.is_finalized());
        assert!(s.results().is_none());
        assert_eq!(s.current_step(), 3);

        for step in 0..3 {
            answer_step(&mut s, step, 5);
        }
        assert_eq!(s.advance().unwrap(), AdvanceOutcome::Finalized);
        let results = s.results().unwrap();
        assert!(results.area_results.iter().all(|a| a.percentage == 50));
    }

    #[test]
    fn clearing_an_answer_on_a_completed_step_blocks_finalization() {
        let mut s = session();
        for step in 0..3 {
            answer_step(&mut s, step, 7);
            s.advance().unwrap();
        }
        assert!(s.clear_answer(QuestionId::new(10101)).unwrap());

        answer_step(&mut s, 3, 7);
        assert!(matches!(
            s.advance(),
            Err(AssessmentError::IncompleteStep { step: 0 })
        ));
        assert_eq!(s.first_unanswered_step(), Some(0));
    }

    #[test]
    fn resume_marks_fully_answered_steps_complete() {
        let catalog = default_catalog().unwrap();
        let saved: Vec<(QuestionId, Score)> = catalog
            .area_at(0)
            .unwrap()
            .questions()
            .map(|q| (q.id, Score::new(3).unwrap()))
            .collect();

        let s = AssessmentSession::resume(AssessmentId::new(5), catalog, 1, saved).unwrap();
        assert_eq!(
            s.step_statuses(),
            vec![
                StepStatus::Complete,
                StepStatus::InProgress,
                StepStatus::NotStarted,
                StepStatus::NotStarted
            ]
        );
        assert_eq!(s.prefilled_count(), 0);
    }
}
