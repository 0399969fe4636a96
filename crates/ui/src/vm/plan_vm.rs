use chrono::NaiveDate;
use services::{ActionPlanEditor, ActionPlanError, ActionPlanService, StorageError};
use wheel_core::model::{AssessmentId, LifeAreaId};

use crate::views::ViewError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlanIntent {
    Focus(LifeAreaId),
    Points { area: LifeAreaId, raw: String },
    ActionText { index: usize, value: String },
    StrategyText { index: usize, value: String },
    TargetDate { index: usize, raw: String },
    Submit,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllocationRowVm {
    pub area_id: LifeAreaId,
    pub name: String,
    pub color: String,
    pub result_percentage: u8,
    pub points: u32,
    pub is_focus: bool,
}

#[must_use]
pub fn map_allocation_rows(editor: &ActionPlanEditor) -> Vec<AllocationRowVm> {
    editor
        .results()
        .area_results
        .iter()
        .map(|area| AllocationRowVm {
            area_id: area.id,
            name: area.name.clone(),
            color: area.color.clone(),
            result_percentage: area.percentage,
            points: editor.allocation().points(area.id).unwrap_or(0),
            is_focus: editor.focus_area() == Some(area.id),
        })
        .collect()
}

/// `"Remaining: 10"` while under budget, `"Over by 5"` past it.
#[must_use]
pub fn remaining_label(remaining: i64) -> String {
    if remaining >= 0 {
        format!("Remaining: {remaining}")
    } else {
        format!("Over by {}", -remaining)
    }
}

/// User-facing text for a rejected edit or submit.
#[must_use]
pub fn plan_error_message(err: &ActionPlanError) -> String {
    match err {
        ActionPlanError::AllocationInvalid { total } => {
            format!("Contribution points must add up to 100 (currently {total}).")
        }
        ActionPlanError::Allocation(_) => "Points must be whole numbers from 0 to 100.".to_string(),
        ActionPlanError::MissingFocusArea => "Choose a focus area.".to_string(),
        ActionPlanError::PlanAlreadyExists => {
            "A plan already exists for this assessment.".to_string()
        }
        ActionPlanError::Persistence(_) => "The plan could not be saved. Please try again.".to_string(),
        other => other.to_string(),
    }
}

/// Blank clears the date; anything else must be `YYYY-MM-DD`.
#[must_use]
pub fn parse_target_date(raw: &str) -> Option<Option<NaiveDate>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(None);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok().map(Some)
}

/// Applies one synchronous edit to the editor.
///
/// # Errors
///
/// Returns the editor's validation error.
pub fn apply_edit(editor: &mut ActionPlanEditor, intent: PlanIntent) -> Result<(), ActionPlanError> {
    match intent {
        PlanIntent::Focus(area) => editor.set_focus_area(area),
        PlanIntent::Points { area, raw } => editor.set_points_from_input(area, &raw),
        PlanIntent::ActionText { index, value } => {
            let mut input = editor.actions().get(index).cloned().unwrap_or_default();
            input.action_text = value;
            editor.set_action(index, input)
        }
        PlanIntent::StrategyText { index, value } => {
            let mut input = editor.actions().get(index).cloned().unwrap_or_default();
            input.strategy_text = value;
            editor.set_action(index, input)
        }
        PlanIntent::TargetDate { index, raw } => {
            let mut input = editor.actions().get(index).cloned().unwrap_or_default();
            // unparsable partial input keeps the previous date
            if let Some(date) = parse_target_date(&raw) {
                input.target_date = date;
            }
            editor.set_action(index, input)
        }
        PlanIntent::Submit => Ok(()),
    }
}

/// # Errors
///
/// `ViewError::NotFound` for unknown or unfinished assessments,
/// `ViewError::Unknown` otherwise.
pub async fn open_plan(
    plans: &ActionPlanService,
    assessment_id: AssessmentId,
) -> Result<ActionPlanEditor, ViewError> {
    plans.open_editor(assessment_id).await.map_err(|err| match err {
        ActionPlanError::AssessmentNotCompleted
        | ActionPlanError::Persistence(StorageError::NotFound) => ViewError::NotFound,
        _ => ViewError::Unknown,
    })
}
