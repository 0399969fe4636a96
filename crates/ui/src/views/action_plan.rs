use dioxus::prelude::*;
use dioxus_router::Link;
use services::{ActionInput, ActionPlanEditor};
use wheel_core::model::{AssessmentId, LifeAreaId};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{
    AllocationRowVm, PlanIntent, apply_edit, map_allocation_rows, open_plan, plan_error_message,
    remaining_label,
};

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

#[component]
pub fn ActionPlanView(assessment_id: u64) -> Element {
    let ctx = use_context::<AppContext>();
    let plans = ctx.action_plans();

    let editor = use_signal(|| None::<ActionPlanEditor>);
    let message = use_signal(|| None::<String>);
    let busy = use_signal(|| false);

    let plans_for_resource = plans.clone();
    let resource = use_resource(move || {
        let plans = plans_for_resource.clone();
        let mut editor = editor;
        async move {
            let opened = open_plan(&plans, AssessmentId::new(assessment_id)).await?;
            editor.set(Some(opened));
            Ok::<_, ViewError>(())
        }
    });
    let state = view_state_from_resource(&resource);

    let dispatch_intent = {
        let plans = plans.clone();
        use_callback(move |intent: PlanIntent| {
            let mut editor = editor;
            let mut message = message;
            let mut busy = busy;

            if intent != PlanIntent::Submit {
                if let Some(current) = editor.write().as_mut() {
                    match apply_edit(current, intent) {
                        Ok(()) => message.set(None),
                        Err(err) => message.set(Some(plan_error_message(&err))),
                    }
                }
                return;
            }

            if busy() {
                return;
            }
            let plans = plans.clone();
            spawn(async move {
                busy.set(true);
                let Some(mut current) = editor.write().take() else {
                    busy.set(false);
                    return;
                };
                let result = plans.submit(&mut current).await;
                *editor.write() = Some(current);
                busy.set(false);
                match result {
                    Ok(_) => message.set(Some("Your action plan was saved.".to_string())),
                    Err(err) => message.set(Some(plan_error_message(&err))),
                }
            });
        })
    };

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<PlanTestHandles>() {
                handles.register(dispatch_intent);
            }
        }
    }

    rsx! {
        div { class: "page plan",
            h2 { "Action Plan" }

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
                    let guard = editor.read();
                    match guard.as_ref() {
                        None => rsx! { p { "Loading..." } },
                        Some(current) => {
                            let rows = map_allocation_rows(current);
                            let actions = current.actions().to_vec();
                            let read_only = current.is_read_only();
                            let remaining = remaining_label(current.remaining());
                            let over = current.remaining() < 0;
                            let can_submit = current.can_submit() && !busy();
                            let focus = current.focus_area();

                            rsx! {
                                if read_only {
                                    p { class: "notice", "This plan has been submitted and can no longer be changed." }
                                }

                                section { class: "focus",
                                    h3 { "Focus area" }
                                    FocusPicker {
                                        rows: rows.clone(),
                                        focus,
                                        read_only,
                                        on_intent: dispatch_intent,
                                    }
                                }

                                section { class: "allocation",
                                    h3 { "Contribution points" }
                                    p { class: "hint", "Distribute 100 points across the areas that will help your focus area." }
                                    AllocationTable { rows, read_only, on_intent: dispatch_intent }
                                    p {
                                        id: "plan-remaining",
                                        class: if over { "remaining over" } else { "remaining" },
                                        "{remaining}"
                                    }
                                }

                                section { class: "actions-list",
                                    h3 { "Actions" }
                                    for (index, action) in actions.into_iter().enumerate() {
                                        ActionRow {
                                            key: "{index}",
                                            index,
                                            action,
                                            read_only,
                                            on_intent: dispatch_intent,
                                        }
                                    }
                                }

                                if let Some(text) = message() {
                                    p { class: "message", "{text}" }
                                }

                                div { class: "actions",
                                    if !read_only {
                                        button {
                                            id: "plan-submit",
                                            class: "primary",
                                            disabled: !can_submit,
                                            onclick: move |_| dispatch_intent.call(PlanIntent::Submit),
                                            "Save plan"
                                        }
                                    }
                                    Link {
                                        to: Route::Results { assessment_id },
                                        "Back to results"
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
fn FocusPicker(
    rows: Vec<AllocationRowVm>,
    focus: Option<LifeAreaId>,
    read_only: bool,
    on_intent: Callback<PlanIntent>,
) -> Element {
    let selected = focus.map(|id| id.value().to_string()).unwrap_or_default();
    rsx! {
        select {
            id: "plan-focus",
            disabled: read_only,
            value: "{selected}",
            onchange: move |evt: FormEvent| {
                if let Ok(raw) = evt.value().parse::<u64>() {
                    on_intent.call(PlanIntent::Focus(LifeAreaId::new(raw)));
                }
            },
            option { value: "", disabled: true, selected: focus.is_none(), "Choose an area" }
            for row in rows {
                option {
                    key: "{row.area_id}",
                    value: "{row.area_id.value()}",
                    selected: row.is_focus,
                    "{row.name} ({row.result_percentage}%)"
                }
            }
        }
    }
}

#[component]
fn AllocationTable(
    rows: Vec<AllocationRowVm>,
    read_only: bool,
    on_intent: Callback<PlanIntent>,
) -> Element {
    rsx! {
        table { class: "allocation-table",
            tbody {
                for row in rows {
                    tr {
                        key: "{row.area_id}",
                        class: if row.is_focus { "focus" } else { "" },
                        td {
                            span { class: "swatch", style: "background: {row.color};" }
                            "{row.name}"
                        }
                        td {
                            input {
                                r#type: "number",
                                min: "0",
                                max: "100",
                                value: "{row.points}",
                                disabled: read_only,
                                oninput: move |evt: FormEvent| {
                                    on_intent.call(PlanIntent::Points { area: row.area_id, raw: evt.value() });
                                },
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn ActionRow(
    index: usize,
    action: ActionInput,
    read_only: bool,
    on_intent: Callback<PlanIntent>,
) -> Element {
    let date = action
        .target_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    let number = index + 1;
    rsx! {
        div { class: "action-row",
            span { class: "action-index", "{number}." }
            input {
                placeholder: "Action",
                value: "{action.action_text}",
                disabled: read_only,
                oninput: move |evt: FormEvent| {
                    on_intent.call(PlanIntent::ActionText { index, value: evt.value() });
                },
            }
            input {
                placeholder: "Strategy",
                value: "{action.strategy_text}",
                disabled: read_only,
                oninput: move |evt: FormEvent| {
                    on_intent.call(PlanIntent::StrategyText { index, value: evt.value() });
                },
            }
            input {
                r#type: "date",
                value: "{date}",
                disabled: read_only,
                onchange: move |evt: FormEvent| {
                    on_intent.call(PlanIntent::TargetDate { index, raw: evt.value() });
                },
            }
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct PlanTestHandles {
    dispatch: Rc<RefCell<Option<Callback<PlanIntent>>>>,
}

#[cfg(test)]
impl PlanTestHandles {
    pub(crate) fn register(&self, dispatch: Callback<PlanIntent>) {
        *self.dispatch.borrow_mut() = Some(dispatch);
    }

    pub(crate) fn dispatch(&self) -> Callback<PlanIntent> {
        (*self.dispatch.borrow()).expect("plan dispatch registered")
    }
}
