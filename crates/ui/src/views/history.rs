use dioxus::prelude::*;
use dioxus_router::Link;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{ComparisonVm, HistoryItemVm, map_comparison, map_history_items};

const HISTORY_LIMIT: u32 = 20;

#[derive(Clone, Debug, PartialEq)]
struct HistoryData {
    items: Vec<HistoryItemVm>,
    comparison: Option<ComparisonVm>,
}

#[component]
pub fn HistoryView() -> Element {
    let ctx = use_context::<AppContext>();
    let history = ctx.history();
    let user_id = ctx.current_user_id();

    let resource = use_resource(move || {
        let history = history.clone();
        async move {
            let records = history
                .list_completed(user_id, HISTORY_LIMIT)
                .await
                .map_err(|_| ViewError::Unknown)?;
            let comparison = history
                .latest_comparison(user_id)
                .await
                .map_err(|_| ViewError::Unknown)?;
            Ok(HistoryData {
                items: map_history_items(&records),
                comparison: comparison.as_ref().map(map_comparison),
            })
        }
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page",
            h2 { "History" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(data) => rsx! {
                    if data.items.is_empty() {
                        p { "No completed assessments yet." }
                    } else {
                        ul { class: "history-list",
                            for item in data.items {
                                HistoryItem { item }
                            }
                        }
                    }
                    if let Some(comparison) = data.comparison {
                        ComparisonTable { comparison }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                },
            }
        }
    }
}

#[component]
fn HistoryItem(item: HistoryItemVm) -> Element {
    rsx! {
        li {
            Link { class: "history-link", to: Route::Results { assessment_id: item.id.value() },
                span { class: "history-date", "{item.completed_at_str}" }
                span { class: "history-cta", "View" }
            }
        }
    }
}

#[component]
fn ComparisonTable(comparison: ComparisonVm) -> Element {
    rsx! {
        section { class: "comparison",
            h3 { "Latest change" }
            p { class: "comparison-dates", "{comparison.older_date} → {comparison.newer_date}" }
            table {
                thead {
                    tr {
                        th { "Area" }
                        th { "Before" }
                        th { "After" }
                        th { "Change" }
                    }
                }
                tbody {
                    for row in comparison.rows {
                        tr {
                            td {
                                span { class: "swatch", style: "background: {row.color};" }
                                "{row.name}"
                            }
                            td { "{row.older}" }
                            td { "{row.newer}" }
                            td { class: if row.improved { "delta up" } else { "delta" }, "{row.delta}" }
                        }
                    }
                }
            }
        }
    }
}
