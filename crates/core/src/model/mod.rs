mod action_plan;
mod allocation;
mod assessment;
mod catalog;
mod ids;
mod response;
mod results;

pub use action_plan::{ActionItem, ActionItemError, ActionPlan, ActionPlanDraft, ActionStatus};
pub use allocation::{AllocationError, ContributionAllocation, POINT_BUDGET};
pub use assessment::{AssessmentRecord, AssessmentRecordError, AssessmentStatus};
pub use catalog::{Catalog, CatalogError, LifeArea, Question, Subcategory};
pub use ids::{
    ActionPlanId, AssessmentId, LifeAreaId, ParseIdError, QuestionId, SubcategoryId, UserId,
};
pub use response::{Response, ResponseOrigin, Responses, Score, ScoreError};
pub use results::{AssessmentResults, ScoreResult, SubcategoryResult};
