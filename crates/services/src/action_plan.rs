use std::sync::Arc;

use chrono::NaiveDate;
use storage::repository::{ActionPlanRepository, AssessmentRepository, StorageError};
use tracing::{debug, info, warn};
use wheel_core::model::{
    ActionItem, ActionPlan, ActionPlanDraft, AllocationError, AssessmentId, AssessmentResults,
    ContributionAllocation, LifeAreaId,
};

use crate::Clock;
use crate::error::ActionPlanError;

/// Number of action rows offered by the plan form.
pub const ACTION_SLOTS: usize = 3;

/// Raw contents of one action row. Rows with a blank action are ignored on submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionInput {
    pub action_text: String,
    pub strategy_text: String,
    pub target_date: Option<NaiveDate>,
}

impl ActionInput {
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.action_text.trim().is_empty()
    }
}

/// Editable state of the action-plan page for one completed assessment.
///
/// Once a plan is stored the editor turns read-only and every mutation
/// returns `ActionPlanError::ReadOnly`.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionPlanEditor {
    assessment_id: AssessmentId,
    results: AssessmentResults,
    focus_area: Option<LifeAreaId>,
    allocation: ContributionAllocation,
    actions: Vec<ActionInput>,
    stored: Option<ActionPlan>,
}

impl ActionPlanEditor {
    /// Blank editor with every area of `results` at zero points.
    #[must_use]
    pub fn new(assessment_id: AssessmentId, results: AssessmentResults) -> Self {
        let allocation = ContributionAllocation::for_areas(results.area_results.iter().map(|r| r.id));
        Self {
            assessment_id,
            results,
            focus_area: None,
            allocation,
            actions: vec![ActionInput::default(); ACTION_SLOTS],
            stored: None,
        }
    }

    /// Read-only editor presenting a stored plan.
    #[must_use]
    pub fn read_only(results: AssessmentResults, plan: ActionPlan) -> Self {
        let mut editor = Self::new(plan.assessment_id, results);
        editor.show_stored(plan);
        editor
    }

    fn show_stored(&mut self, plan: ActionPlan) {
        self.focus_area = Some(plan.focus_area_id);
        self.allocation = plan.allocation.clone();
        self.actions = plan
            .actions
            .iter()
            .map(|item| ActionInput {
                action_text: item.action_text().to_string(),
                strategy_text: item.strategy_text().to_string(),
                target_date: item.target_date(),
            })
            .collect();
        self.stored = Some(plan);
    }

    fn ensure_editable(&self) -> Result<(), ActionPlanError> {
        if self.stored.is_some() {
            return Err(ActionPlanError::ReadOnly);
        }
        Ok(())
    }

    #[must_use]
    pub fn assessment_id(&self) -> AssessmentId {
        self.assessment_id
    }

    #[must_use]
    pub fn results(&self) -> &AssessmentResults {
        &self.results
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.stored.is_some()
    }

    #[must_use]
    pub fn stored_plan(&self) -> Option<&ActionPlan> {
        self.stored.as_ref()
    }

    #[must_use]
    pub fn focus_area(&self) -> Option<LifeAreaId> {
        self.focus_area
    }

    #[must_use]
    pub fn allocation(&self) -> &ContributionAllocation {
        &self.allocation
    }

    #[must_use]
    pub fn actions(&self) -> &[ActionInput] {
        &self.actions
    }

    #[must_use]
    pub fn remaining(&self) -> i64 {
        self.allocation.remaining()
    }

    /// Whether submit would pass the local checks.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.is_read_only() && self.focus_area.is_some() && self.allocation.is_valid()
    }

    /// # Errors
    ///
    /// `ReadOnly`, or `UnknownFocusArea` if the area is not in the results.
    pub fn set_focus_area(&mut self, area: LifeAreaId) -> Result<(), ActionPlanError> {
        self.ensure_editable()?;
        if self.results.area(area).is_none() {
            return Err(ActionPlanError::UnknownFocusArea(area));
        }
        self.focus_area = Some(area);
        Ok(())
    }

    /// # Errors
    ///
    /// `ReadOnly` or the allocation's range check; the previous value is kept.
    pub fn set_points(&mut self, area: LifeAreaId, value: i64) -> Result<(), ActionPlanError> {
        self.ensure_editable()?;
        Ok(self.allocation.set_points(area, value)?)
    }

    /// Applies raw field input, blank meaning zero.
    ///
    /// # Errors
    ///
    /// `ReadOnly` or the allocation's parse and range checks.
    pub fn set_points_from_input(
        &mut self,
        area: LifeAreaId,
        raw: &str,
    ) -> Result<(), ActionPlanError> {
        self.ensure_editable()?;
        Ok(self.allocation.set_points_from_input(area, raw)?)
    }

    /// Replaces one action row. Indexes past the last slot are ignored.
    ///
    /// # Errors
    ///
    /// `ReadOnly`.
    pub fn set_action(&mut self, index: usize, input: ActionInput) -> Result<(), ActionPlanError> {
        self.ensure_editable()?;
        if let Some(slot) = self.actions.get_mut(index) {
            *slot = input;
        }
        Ok(())
    }

    /// Validates the form into a draft ready for storage.
    ///
    /// # Errors
    ///
    /// `ReadOnly`, `MissingFocusArea`, `AllocationInvalid` when the points do
    /// not sum to 100, `InvalidAction` for a malformed row.
    pub fn draft(&self) -> Result<ActionPlanDraft, ActionPlanError> {
        self.ensure_editable()?;
        let focus_area_id = self.focus_area.ok_or(ActionPlanError::MissingFocusArea)?;
        self.allocation.validate().map_err(|err| match err {
            AllocationError::InvalidTotal { total } => ActionPlanError::AllocationInvalid { total },
            other => ActionPlanError::Allocation(other),
        })?;

        let mut actions = Vec::new();
        for (index, input) in self.actions.iter().enumerate() {
            if input.is_blank() {
                continue;
            }
            let item = ActionItem::new(
                input.action_text.clone(),
                input.strategy_text.clone(),
                input.target_date,
            )
            .map_err(|source| ActionPlanError::InvalidAction { index, source })?;
            actions.push(item);
        }

        Ok(ActionPlanDraft {
            focus_area_id,
            allocation: self.allocation.clone(),
            actions,
        })
    }
}

/// Loads and submits action plans for completed assessments.
#[derive(Clone)]
pub struct ActionPlanService {
    clock: Clock,
    assessments: Arc<dyn AssessmentRepository>,
    plans: Arc<dyn ActionPlanRepository>,
}

impl ActionPlanService {
    #[must_use]
    pub fn new(
        clock: Clock,
        assessments: Arc<dyn AssessmentRepository>,
        plans: Arc<dyn ActionPlanRepository>,
    ) -> Self {
        Self {
            clock,
            assessments,
            plans,
        }
    }

    /// Opens the plan page. An assessment that already has a plan opens read-only.
    ///
    /// # Errors
    ///
    /// `AssessmentNotCompleted` for an in-progress assessment, `Persistence`
    /// on storage errors.
    pub async fn open_editor(
        &self,
        assessment_id: AssessmentId,
    ) -> Result<ActionPlanEditor, ActionPlanError> {
        let record = self.assessments.get_assessment(assessment_id).await?;
        if !record.is_completed() {
            return Err(ActionPlanError::AssessmentNotCompleted);
        }
        let results = self.assessments.get_results(assessment_id).await?;

        match self.plans.get_action_plan(assessment_id).await? {
            Some(plan) => {
                debug!(assessment = %assessment_id, "existing plan opened read-only");
                Ok(ActionPlanEditor::read_only(results, plan))
            }
            None => Ok(ActionPlanEditor::new(assessment_id, results)),
        }
    }

    /// Submits the editor's draft.
    ///
    /// When storage reports an existing plan, the editor switches to showing
    /// that plan and `PlanAlreadyExists` is returned.
    ///
    /// # Errors
    ///
    /// Local validation errors from [`ActionPlanEditor::draft`],
    /// `PlanAlreadyExists`, or `Persistence`.
    pub async fn submit(&self, editor: &mut ActionPlanEditor) -> Result<ActionPlan, ActionPlanError> {
        let draft = editor.draft()?;
        let assessment_id = editor.assessment_id();

        match self
            .plans
            .submit_contribution_plan(assessment_id, &draft, self.clock.now())
            .await
        {
            Ok(plan) => {
                info!(assessment = %assessment_id, focus = %plan.focus_area_id, "action plan submitted");
                editor.show_stored(plan.clone());
                Ok(plan)
            }
            Err(StorageError::Conflict) => {
                warn!(assessment = %assessment_id, "action plan already exists");
                if let Some(existing) = self.plans.get_action_plan(assessment_id).await? {
                    editor.show_stored(existing);
                }
                Err(ActionPlanError::PlanAlreadyExists)
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wheel_core::model::ScoreResult;

    fn results() -> AssessmentResults {
        AssessmentResults {
            area_results: (1..=4)
                .map(|id| ScoreResult {
                    id: LifeAreaId::new(id),
                    name: format!("Area {id}"),
                    color: "#FF6B6B".into(),
                    average_score: 5.0,
                    percentage: 50,
                })
                .collect(),
            subcategory_results: Vec::new(),
        }
    }

    #[test]
    fn draft_requires_focus_and_full_budget() {
        let mut editor = ActionPlanEditor::new(AssessmentId::new(1), results());
        assert!(matches!(
            editor.draft(),
            Err(ActionPlanError::MissingFocusArea)
        ));

        editor.set_focus_area(LifeAreaId::new(2)).unwrap();
        editor.set_points(LifeAreaId::new(1), 60).unwrap();
        editor.set_points_from_input(LifeAreaId::new(2), " 30 ").unwrap();
        assert!(matches!(
            editor.draft(),
            Err(ActionPlanError::AllocationInvalid { total: 90 })
        ));
        assert_eq!(editor.remaining(), 10);

        editor.set_points_from_input(LifeAreaId::new(3), "10").unwrap();
        assert!(editor.can_submit());
        let draft = editor.draft().unwrap();
        assert_eq!(draft.focus_area_id, LifeAreaId::new(2));
        assert!(draft.actions.is_empty());
    }

    #[test]
    fn out_of_range_points_keep_previous_value() {
        let mut editor = ActionPlanEditor::new(AssessmentId::new(1), results());
        editor.set_points(LifeAreaId::new(1), 40).unwrap();
        assert!(editor.set_points(LifeAreaId::new(1), 101).is_err());
        assert!(editor.set_points_from_input(LifeAreaId::new(1), "abc").is_err());
        assert_eq!(editor.allocation().points(LifeAreaId::new(1)), Some(40));
    }

    #[test]
    fn unknown_focus_area_is_rejected() {
        let mut editor = ActionPlanEditor::new(AssessmentId::new(1), results());
        assert!(matches!(
            editor.set_focus_area(LifeAreaId::new(9)),
            Err(ActionPlanError::UnknownFocusArea(_))
        ));
        assert_eq!(editor.focus_area(), None);
    }

    #[test]
    fn blank_rows_are_skipped_in_draft() {
        let mut editor = ActionPlanEditor::new(AssessmentId::new(1), results());
        editor.set_focus_area(LifeAreaId::new(1)).unwrap();
        editor.set_points(LifeAreaId::new(4), 100).unwrap();
        editor
            .set_action(
                1,
                ActionInput {
                    action_text: "  Walk after lunch ".into(),
                    strategy_text: "Calendar reminder".into(),
                    target_date: NaiveDate::from_ymd_opt(2024, 5, 1),
                },
            )
            .unwrap();
        editor
            .set_action(
                2,
                ActionInput {
                    action_text: "   ".into(),
                    strategy_text: "ignored".into(),
                    target_date: None,
                },
            )
            .unwrap();

        let draft = editor.draft().unwrap();
        assert_eq!(draft.actions.len(), 1);
        assert_eq!(draft.actions[0].action_text(), "Walk after lunch");
    }
}
