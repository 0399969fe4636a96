use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::views::{ActionPlanView, AssessmentView, HistoryView, HomeView, ResultsView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/assessment", AssessmentView)] Assessment {},
        #[route("/results/:assessment_id", ResultsView)] Results { assessment_id: u64 },
        #[route("/plan/:assessment_id", ActionPlanView)] Plan { assessment_id: u64 },
        #[route("/history", HistoryView)] History {},
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    rsx! {
        nav { class: "sidebar",
            h1 { "Life Wheel" }
            ul {
                li { Link { to: Route::Home {}, "Home" } }
                li { Link { to: Route::Assessment {}, "Assessment" } }
                li { Link { to: Route::History {}, "History" } }
            }
        }
    }
}
