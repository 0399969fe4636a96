mod action_plan;
mod assessment;
mod history;
mod home;
mod results;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use action_plan::ActionPlanView;
pub use assessment::AssessmentView;
pub use history::HistoryView;
pub use home::HomeView;
pub use results::ResultsView;
pub use state::{ViewError, ViewState, view_state_from_resource};
