use services::{AssessmentError, AssessmentLoopService, AssessmentSession, StepAdvance};
use wheel_core::StepStatus;
use wheel_core::model::{AssessmentId, QuestionId, UserId};

use crate::views::ViewError;
use crate::wheel::{Granularity, Segment, live_segments};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssessmentIntent {
    Answer { question: QuestionId, value: u8 },
    ClearPrefill,
    Next,
    JumpTo(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssessmentOutcome {
    Continue,
    Completed { assessment_id: AssessmentId },
}

/// One tab of the step bar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepTabVm {
    pub index: usize,
    pub name: String,
    pub color: String,
    pub status: StepStatus,
    pub is_current: bool,
    /// Clicking the tab would be accepted.
    pub reachable: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub id: QuestionId,
    pub text: String,
    pub value: Option<u8>,
    pub prefilled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionGroupVm {
    pub name: String,
    pub questions: Vec<QuestionVm>,
}

pub struct AssessmentVm {
    session: AssessmentSession,
}

impl AssessmentVm {
    #[must_use]
    pub fn new(session: AssessmentSession) -> Self {
        Self { session }
    }

    #[must_use]
    pub fn session(&self) -> &AssessmentSession {
        &self.session
    }

    #[must_use]
    pub fn assessment_id(&self) -> AssessmentId {
        self.session.assessment_id()
    }

    #[must_use]
    pub fn current_title(&self) -> String {
        self.session
            .current_area()
            .map(|area| area.name.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn current_description(&self) -> Option<String> {
        self.session
            .current_area()
            .and_then(|area| area.description.clone())
    }

    /// `"Step 2 of 4"`.
    #[must_use]
    pub fn step_label(&self) -> String {
        format!(
            "Step {} of {}",
            self.session.current_step() + 1,
            self.session.step_count()
        )
    }

    #[must_use]
    pub fn is_last_step(&self) -> bool {
        self.session.current_step() + 1 == self.session.step_count()
    }

    #[must_use]
    pub fn can_advance(&self) -> bool {
        !self.session.is_finalized() && self.session.is_current_step_complete()
    }

    #[must_use]
    pub fn prefilled_count(&self) -> usize {
        self.session.prefilled_count()
    }

    #[must_use]
    pub fn step_tabs(&self) -> Vec<StepTabVm> {
        let current = self.session.current_step();
        let current_complete = self.session.is_current_step_complete();
        self.session
            .catalog()
            .areas()
            .iter()
            .zip(self.session.step_statuses())
            .enumerate()
            .map(|(index, (area, status))| StepTabVm {
                index,
                name: area.name.clone(),
                color: area.color.clone(),
                status,
                is_current: index == current,
                reachable: index == current || status == StepStatus::Complete || current_complete,
            })
            .collect()
    }

    #[must_use]
    pub fn current_groups(&self) -> Vec<QuestionGroupVm> {
        let Some(area) = self.session.current_area() else {
            return Vec::new();
        };
        let responses = self.session.responses();
        area.subcategories
            .iter()
            .map(|sub| QuestionGroupVm {
                name: sub.name.clone(),
                questions: sub
                    .questions
                    .iter()
                    .map(|q| QuestionVm {
                        id: q.id,
                        text: q.text.clone(),
                        value: responses.score(q.id).map(|s| s.value()),
                        prefilled: self.session.is_prefilled(q.id),
                    })
                    .collect(),
            })
            .collect()
    }

    #[must_use]
    pub fn segments(&self, granularity: Granularity) -> Vec<Segment> {
        live_segments(&self.session.score_sheet(), granularity)
    }

    /// # Errors
    ///
    /// Returns `ViewError::Unknown` for rejected input.
    pub fn answer(&mut self, question: QuestionId, value: u8) -> Result<(), ViewError> {
        self.session
            .answer_question(question, i64::from(value))
            .map_err(|_| ViewError::Unknown)
    }

    pub fn clear_prefill(&mut self) -> usize {
        self.session.clear_prefill()
    }

    /// # Errors
    ///
    /// `ViewError::SaveFailed` when persistence fails; the step is unchanged.
    pub async fn next(
        &mut self,
        assessment_loop: &AssessmentLoopService,
    ) -> Result<AssessmentOutcome, ViewError> {
        match assessment_loop
            .advance(&mut self.session)
            .await
            .map_err(map_error)?
        {
            StepAdvance::Moved { .. } => Ok(AssessmentOutcome::Continue),
            StepAdvance::Finalized(_) => Ok(AssessmentOutcome::Completed {
                assessment_id: self.session.assessment_id(),
            }),
        }
    }

    /// # Errors
    ///
    /// `ViewError::SaveFailed` when persistence fails.
    pub async fn jump(
        &mut self,
        assessment_loop: &AssessmentLoopService,
        target: usize,
    ) -> Result<(), ViewError> {
        assessment_loop
            .jump(&mut self.session, target)
            .await
            .map_err(map_error)
    }
}

fn map_error(err: AssessmentError) -> ViewError {
    match err {
        AssessmentError::PersistenceFailure(_) => ViewError::SaveFailed,
        AssessmentError::CatalogUnavailable(_) => ViewError::CatalogUnavailable,
        _ => ViewError::Unknown,
    }
}

/// # Errors
///
/// `ViewError::CatalogUnavailable` when the questions cannot be loaded.
/// Returns `ViewError::Unknown` for other failures.
pub async fn start_assessment(
    assessment_loop: &AssessmentLoopService,
    user_id: UserId,
) -> Result<AssessmentVm, ViewError> {
    let session = assessment_loop
        .start_assessment(user_id)
        .await
        .map_err(map_error)?;
    Ok(AssessmentVm::new(session))
}
