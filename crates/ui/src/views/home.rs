use dioxus::prelude::*;
use dioxus_router::Link;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{HistoryItemVm, map_history_items};

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let history = ctx.history();
    let user_id = ctx.current_user_id();

    let resource = use_resource(move || {
        let history = history.clone();
        async move {
            let latest = history
                .list_completed(user_id, 1)
                .await
                .map_err(|_| ViewError::Unknown)?;
            Ok(map_history_items(&latest).into_iter().next())
        }
    });
    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page",
            h2 { "Life Wheel" }
            p { "Rate each area of your life from 0 to 10 and see where your attention is needed." }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(latest) => rsx! {
                    LatestResult { latest }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                },
            }

            div { class: "actions",
                Link { class: "primary", to: Route::Assessment {}, "Start assessment" }
            }
        }
    }
}

#[component]
fn LatestResult(latest: Option<HistoryItemVm>) -> Element {
    match latest {
        None => rsx! {
            p { "No completed assessments yet." }
        },
        Some(item) => rsx! {
            p {
                "Last completed: {item.completed_at_str} "
                Link { to: Route::Results { assessment_id: item.id.value() }, "View results" }
            }
        },
    }
}
