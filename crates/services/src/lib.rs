#![forbid(unsafe_code)]

pub mod action_plan;
pub mod app_services;
pub mod assessment;
pub mod error;
pub mod history;

pub use wheel_core::Clock;

pub use action_plan::{ACTION_SLOTS, ActionInput, ActionPlanEditor, ActionPlanService};
pub use app_services::AppServices;
pub use assessment::{AssessmentLoopService, AssessmentSession, StepAdvance};
pub use error::{ActionPlanError, AppServicesError, AssessmentError};
pub use history::{Comparison, CompletedAssessment, HistoryService};
pub use storage::repository::StorageError;
