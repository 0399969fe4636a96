use std::sync::Arc;

use services::{ActionPlanService, AssessmentLoopService, HistoryService};
use wheel_core::model::UserId;

pub trait UiApp: Send + Sync {
    fn current_user_id(&self) -> UserId;

    fn assessment_loop(&self) -> Arc<AssessmentLoopService>;
    fn action_plans(&self) -> Arc<ActionPlanService>;
    fn history(&self) -> Arc<HistoryService>;
}

#[derive(Clone)]
pub struct AppContext {
    current_user_id: UserId,

    assessment_loop: Arc<AssessmentLoopService>,
    action_plans: Arc<ActionPlanService>,
    history: Arc<HistoryService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            current_user_id: app.current_user_id(),
            assessment_loop: app.assessment_loop(),
            action_plans: app.action_plans(),
            history: app.history(),
        }
    }

    #[must_use]
    pub fn current_user_id(&self) -> UserId {
        self.current_user_id
    }

    #[must_use]
    pub fn assessment_loop(&self) -> Arc<AssessmentLoopService> {
        Arc::clone(&self.assessment_loop)
    }

    #[must_use]
    pub fn action_plans(&self) -> Arc<ActionPlanService> {
        Arc::clone(&self.action_plans)
    }

    #[must_use]
    pub fn history(&self) -> Arc<HistoryService> {
        Arc::clone(&self.history)
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
