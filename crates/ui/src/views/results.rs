use dioxus::prelude::*;
use dioxus_router::Link;
use services::StorageError;
use wheel_core::model::AssessmentId;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{AreaRowVm, ResultsVm, map_results};
use crate::wheel::{Granularity, WheelConfig, WheelDiagram, segments};

#[component]
pub fn ResultsView(assessment_id: u64) -> Element {
    let ctx = use_context::<AppContext>();
    let history = ctx.history();
    let mut granularity = use_signal(Granularity::default);

    let resource = use_resource(move || {
        let history = history.clone();
        async move {
            let done = history
                .completed(AssessmentId::new(assessment_id))
                .await
                .map_err(|err| match err {
                    StorageError::NotFound => ViewError::NotFound,
                    _ => ViewError::Unknown,
                })?;
            Ok::<_, ViewError>(map_results(&done))
        }
    });
    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page results",
            h2 { "Your Life Wheel" }

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
                ViewState::Ready(vm) => {
                    let wheel = segments(&vm.results, granularity());
                    rsx! {
                        p { class: "results-meta",
                            "Completed {vm.completed_at_str} | Overall: {vm.overall_percentage}%"
                        }
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
                            segments: wheel,
                            config: WheelConfig::default().with_size(480.0).with_labels(true),
                        }
                        ResultsTable { vm: vm.clone() }
                        div { class: "actions",
                            Link {
                                class: "primary",
                                to: Route::Plan { assessment_id: vm.assessment_id.value() },
                                "Create action plan"
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn ResultsTable(vm: ResultsVm) -> Element {
    rsx! {
        table { class: "results-table",
            thead {
                tr {
                    th { "Area" }
                    th { "Score" }
                    th { "%" }
                }
            }
            tbody {
                for area in vm.areas {
                    AreaRows { area }
                }
            }
        }
    }
}

#[component]
fn AreaRows(area: AreaRowVm) -> Element {
    rsx! {
        tr { class: "area-row",
            td {
                span { class: "swatch", style: "background: {area.color};" }
                "{area.name}"
            }
            td { "{area.score}" }
            td { "{area.percentage}%" }
        }
        for sub in area.subcategories {
            tr { class: "subcategory-row",
                td { "{sub.name}" }
                td { "{sub.score}" }
                td { "{sub.percentage}%" }
            }
        }
    }
}
