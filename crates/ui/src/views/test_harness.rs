use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use services::{
    ActionPlanService, AppServices, AssessmentLoopService, AssessmentSession, Clock,
    HistoryService,
};
use storage::repository::Storage;
use wheel_core::model::{AssessmentId, QuestionId, UserId};
use wheel_core::time::fixed_now;

use crate::context::{UiApp, build_app_context};
use crate::views::action_plan::PlanTestHandles;
use crate::views::assessment::AssessmentTestHandles;
use crate::views::{ActionPlanView, AssessmentView, HistoryView, HomeView, ResultsView};
use crate::vm::{AssessmentIntent, PlanIntent};

#[derive(Clone)]
struct TestApp {
    services: AppServices,
}

impl UiApp for TestApp {
    fn current_user_id(&self) -> UserId {
        self.services.user_id()
    }

    fn assessment_loop(&self) -> Arc<AssessmentLoopService> {
        self.services.assessment_loop()
    }

    fn action_plans(&self) -> Arc<ActionPlanService> {
        self.services.action_plans()
    }

    fn history(&self) -> Arc<HistoryService> {
        self.services.history()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Assessment,
    Results(u64),
    Plan(u64),
    History,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
    assessment_handles: Option<AssessmentTestHandles>,
    plan_handles: Option<PlanTestHandles>,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    if let Some(handles) = props.assessment_handles.clone() {
        use_context_provider(|| handles);
    }
    if let Some(handles) = props.plan_handles.clone() {
        use_context_provider(|| handles);
    }
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::Assessment => rsx! { AssessmentView {} },
        ViewKind::Results(assessment_id) => rsx! { ResultsView { assessment_id } },
        ViewKind::Plan(assessment_id) => rsx! { ActionPlanView { assessment_id } },
        ViewKind::History => rsx! { HistoryView {} },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub services: AppServices,
    assessment_handles: Option<AssessmentTestHandles>,
    plan_handles: Option<PlanTestHandles>,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Lets resources and spawned tasks run to completion.
    pub async fn settle(&mut self) {
        for _ in 0..4 {
            self.drive_async().await;
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }

    pub fn dispatch_assessment(&mut self, intent: AssessmentIntent) {
        let handles = self
            .assessment_handles
            .clone()
            .expect("assessment view handles");
        self.dom.in_runtime(|| handles.dispatch().call(intent));
        drive_dom(&mut self.dom);
    }

    pub fn dispatch_plan(&mut self, intent: PlanIntent) {
        let handles = self.plan_handles.clone().expect("plan view handles");
        self.dom.in_runtime(|| handles.dispatch().call(intent));
        drive_dom(&mut self.dom);
    }

    /// Question ids of the step currently on screen.
    pub fn current_questions(&self) -> Vec<QuestionId> {
        let handles = self
            .assessment_handles
            .clone()
            .expect("assessment view handles");
        self.dom.in_runtime(|| {
            handles
                .vm()
                .read()
                .as_ref()
                .and_then(|vm| vm.session().current_area())
                .map(|area| area.questions().map(|q| q.id).collect())
                .unwrap_or_default()
        })
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn in_memory_services() -> AppServices {
    AppServices::new_in_memory(Clock::fixed(fixed_now()), UserId::new(1))
        .expect("built-in catalog")
}

pub fn setup_view_harness(view: ViewKind) -> ViewHarness {
    setup_view_harness_with_services(view, in_memory_services())
}

/// Services over storage that holds no question catalog.
pub fn services_without_catalog() -> AppServices {
    AppServices::from_storage(
        &Storage::in_memory(),
        Clock::fixed(fixed_now()),
        UserId::new(1),
    )
}

pub fn setup_view_harness_with_services(view: ViewKind, services: AppServices) -> ViewHarness {
    let assessment_handles = match view {
        ViewKind::Assessment => Some(AssessmentTestHandles::default()),
        _ => None,
    };
    let plan_handles = match view {
        ViewKind::Plan(_) => Some(PlanTestHandles::default()),
        _ => None,
    };

    let app = Arc::new(TestApp {
        services: services.clone(),
    });

    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app,
            view,
            assessment_handles: assessment_handles.clone(),
            plan_handles: plan_handles.clone(),
        },
    );

    ViewHarness {
        dom,
        services,
        assessment_handles,
        plan_handles,
    }
}

fn answer_current_step(session: &mut AssessmentSession, value: i64) {
    let ids: Vec<QuestionId> = session
        .current_area()
        .expect("current area")
        .questions()
        .map(|q| q.id)
        .collect();
    for id in ids {
        session.answer_question(id, value).expect("answer");
    }
}

/// Runs a full assessment through the services, answering every question with `value`.
pub async fn complete_assessment(services: &AppServices, value: i64) -> AssessmentId {
    let assessment_loop = services.assessment_loop();
    let mut session = assessment_loop
        .start_assessment(services.user_id())
        .await
        .expect("start assessment");
    for _ in 0..session.step_count() {
        answer_current_step(&mut session, value);
        assessment_loop.advance(&mut session).await.expect("advance");
    }
    session.assessment_id()
}
