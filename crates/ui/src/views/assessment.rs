use dioxus::prelude::*;
use dioxus_router::use_navigator;
use wheel_core::StepStatus;
use wheel_core::model::QuestionId;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{
    AssessmentIntent, AssessmentOutcome, AssessmentVm, QuestionGroupVm, StepTabVm,
    start_assessment,
};
use crate::wheel::{Granularity, WheelConfig, WheelDiagram};

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

const SCORE_CHOICES: [u8; 11] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10];

fn step_class(tab: &StepTabVm) -> &'static str {
    match (tab.is_current, tab.status) {
        (true, _) => "step-tab current",
        (false, StepStatus::Complete) => "step-tab complete",
        (false, _) if tab.reachable => "step-tab",
        _ => "step-tab locked",
    }
}

#[component]
pub fn AssessmentView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let assessment_loop = ctx.assessment_loop();
    let user_id = ctx.current_user_id();

    let error = use_signal(|| None::<ViewError>);
    let vm = use_signal(|| None::<AssessmentVm>);
    let busy = use_signal(|| false);
    let mut granularity = use_signal(Granularity::default);

    let loop_for_resource = assessment_loop.clone();
    let resource = use_resource(move || {
        let assessment_loop = loop_for_resource.clone();
        let mut vm = vm;
        let mut error = error;
        async move {
            let started = start_assessment(&assessment_loop, user_id).await?;
            vm.set(Some(started));
            error.set(None);
            Ok::<_, ViewError>(())
        }
    });
    let state = view_state_from_resource(&resource);

    let dispatch_intent = {
        let assessment_loop = assessment_loop.clone();
        use_callback(move |intent: AssessmentIntent| {
            let mut error = error;
            let mut vm = vm;
            let mut busy = busy;

            match intent {
                AssessmentIntent::Answer { question, value } => {
                    if let Some(vm) = vm.write().as_mut() {
                        if vm.answer(question, value).is_err() {
                            error.set(Some(ViewError::Unknown));
                        }
                    }
                }
                AssessmentIntent::ClearPrefill => {
                    if let Some(vm) = vm.write().as_mut() {
                        vm.clear_prefill();
                    }
                }
                AssessmentIntent::Next | AssessmentIntent::JumpTo(_) => {
                    if busy() {
                        return;
                    }
                    let assessment_loop = assessment_loop.clone();
                    spawn(async move {
                        busy.set(true);
                        let Some(mut vm_value) = vm.write().take() else {
                            busy.set(false);
                            error.set(Some(ViewError::Unknown));
                            return;
                        };

                        let result = match intent {
                            AssessmentIntent::JumpTo(target) => vm_value
                                .jump(&assessment_loop, target)
                                .await
                                .map(|()| AssessmentOutcome::Continue),
                            _ => vm_value.next(&assessment_loop).await,
                        };

                        // The session goes back even on error so answers stay on screen.
                        *vm.write() = Some(vm_value);
                        busy.set(false);

                        match result {
                            Ok(AssessmentOutcome::Continue) => error.set(None),
                            Ok(AssessmentOutcome::Completed { assessment_id }) => {
                                error.set(None);
                                let _ = navigator.push(Route::Results {
                                    assessment_id: assessment_id.value(),
                                });
                            }
                            Err(err) => error.set(Some(err)),
                        }
                    });
                }
            }
        })
    };

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<AssessmentTestHandles>() {
                handles.register(dispatch_intent, vm);
            }
        }
    }

    rsx! {
        div { class: "page assessment",
            h2 { "Life Wheel Assessment" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "error", "{err.message()}" }
                },
                ViewState::Ready(()) => {
                    let guard = vm.read();
                    match guard.as_ref() {
                        None => rsx! { p { "Loading..." } },
                        Some(current) => {
                            let tabs = current.step_tabs();
                            let groups = current.current_groups();
                            let segments = current.segments(granularity());
                            let title = current.current_title();
                            let description = current.current_description();
                            let step_label = current.step_label();
                            let prefilled = current.prefilled_count();
                            let can_advance = current.can_advance() && !busy();
                            let next_label = if current.is_last_step() { "Finish" } else { "Next" };

                            rsx! {
                                nav { class: "step-bar",
                                    for tab in tabs {
                                        button {
                                            key: "{tab.index}",
                                            class: step_class(&tab),
                                            style: "border-color: {tab.color};",
                                            disabled: !tab.reachable || busy(),
                                            onclick: move |_| dispatch_intent.call(AssessmentIntent::JumpTo(tab.index)),
                                            "{tab.name}"
                                        }
                                    }
                                }

                                div { class: "assessment-body",
                                    section { class: "questions",
                                        h3 { "{title}" }
                                        p { class: "step-label", "{step_label}" }
                                        if let Some(description) = description {
                                            p { class: "area-description", "{description}" }
                                        }
                                        if prefilled > 0 {
                                            div { class: "prefill-banner",
                                                span { "{prefilled} answers were carried over from your last assessment." }
                                                button {
                                                    class: "link",
                                                    onclick: move |_| dispatch_intent.call(AssessmentIntent::ClearPrefill),
                                                    "Clear carried-over answers"
                                                }
                                            }
                                        }
                                        for group in groups {
                                            QuestionGroup { group, on_answer: dispatch_intent }
                                        }
                                    }

                                    aside { class: "live-wheel",
                                        div { class: "granularity",
                                            for option in [Granularity::Areas, Granularity::Subcategories] {
                                                button {
                                                    class: if granularity() == option { "toggle active" } else { "toggle" },
                                                    onclick: move |_| granularity.set(option),
                                                    "{option.label()}"
                                                }
                                            }
                                        }
                                        WheelDiagram {
                                            segments,
                                            config: WheelConfig::default().with_size(320.0),
                                        }
                                    }
                                }

                                if let Some(err) = error() {
                                    p { class: "error", "{err.message()}" }
                                }

                                div { class: "actions",
                                    button {
                                        id: "assessment-next",
                                        class: "primary",
                                        disabled: !can_advance,
                                        onclick: move |_| dispatch_intent.call(AssessmentIntent::Next),
                                        "{next_label}"
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn QuestionGroup(group: QuestionGroupVm, on_answer: Callback<AssessmentIntent>) -> Element {
    rsx! {
        fieldset { class: "question-group",
            legend { "{group.name}" }
            for question in group.questions {
                div {
                    key: "{question.id}",
                    class: if question.prefilled { "question prefilled" } else { "question" },
                    label { "{question.text}" }
                    ScoreScale {
                        question: question.id,
                        value: question.value,
                        on_answer,
                    }
                }
            }
        }
    }
}

#[component]
fn ScoreScale(question: QuestionId, value: Option<u8>, on_answer: Callback<AssessmentIntent>) -> Element {
    rsx! {
        div { class: "score-scale",
            for choice in SCORE_CHOICES {
                button {
                    class: if value == Some(choice) { "score selected" } else { "score" },
                    onclick: move |_| on_answer.call(AssessmentIntent::Answer { question, value: choice }),
                    "{choice}"
                }
            }
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct AssessmentTestHandles {
    dispatch: Rc<RefCell<Option<Callback<AssessmentIntent>>>>,
    vm: Rc<RefCell<Option<Signal<Option<AssessmentVm>>>>>,
}

#[cfg(test)]
impl AssessmentTestHandles {
    pub(crate) fn register(
        &self,
        dispatch: Callback<AssessmentIntent>,
        vm: Signal<Option<AssessmentVm>>,
    ) {
        *self.dispatch.borrow_mut() = Some(dispatch);
        *self.vm.borrow_mut() = Some(vm);
    }

    pub(crate) fn dispatch(&self) -> Callback<AssessmentIntent> {
        (*self.dispatch.borrow()).expect("assessment dispatch registered")
    }

    pub(crate) fn vm(&self) -> Signal<Option<AssessmentVm>> {
        (*self.vm.borrow()).expect("assessment vm registered")
    }
}
