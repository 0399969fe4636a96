mod assessment_vm;
mod plan_vm;
mod results_vm;
mod time_fmt;

pub use assessment_vm::{
    AssessmentIntent, AssessmentOutcome, AssessmentVm, QuestionGroupVm, QuestionVm, StepTabVm,
    start_assessment,
};
pub use plan_vm::{
    AllocationRowVm, PlanIntent, apply_edit, map_allocation_rows, open_plan, parse_target_date,
    plan_error_message, remaining_label,
};
pub use results_vm::{
    AreaRowVm, ComparisonVm, DeltaRowVm, HistoryItemVm, ResultsVm, SubcategoryRowVm,
    map_comparison, map_history_items, map_results,
};
pub use time_fmt::{format_datetime, format_delta, format_score};
