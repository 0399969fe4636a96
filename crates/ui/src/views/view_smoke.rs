use wheel_core::model::LifeAreaId;

use super::test_harness::{
    ViewKind, complete_assessment, in_memory_services, services_without_catalog,
    setup_view_harness, setup_view_harness_with_services,
};
use crate::vm::{AssessmentIntent, PlanIntent};

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_offers_first_assessment() {
    let mut harness = setup_view_harness(ViewKind::Home);
    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(
        html.contains("No completed assessments yet."),
        "missing empty state in {html}"
    );
    assert!(html.contains("Start assessment"), "missing cta in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn assessment_view_smoke_renders_first_step() {
    let mut harness = setup_view_harness(ViewKind::Assessment);
    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Step 1 of 4"), "missing step label in {html}");
    assert!(html.contains("Pessoal"), "missing area title in {html}");
    assert!(html.contains("<svg"), "missing live wheel in {html}");
    assert!(html.contains("Next"), "missing next button in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn assessment_view_advances_after_answering_step() {
    let mut harness = setup_view_harness(ViewKind::Assessment);
    harness.rebuild();
    harness.settle().await;

    for question in harness.current_questions() {
        harness.dispatch_assessment(AssessmentIntent::Answer { question, value: 7 });
    }
    harness.dispatch_assessment(AssessmentIntent::Next);
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Step 2 of 4"), "did not advance in {html}");
    assert!(html.contains("Qualidade de Vida"), "missing next area in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn assessment_view_ignores_next_on_incomplete_step() {
    let mut harness = setup_view_harness(ViewKind::Assessment);
    harness.rebuild();
    harness.settle().await;

    let first = harness.current_questions()[0];
    harness.dispatch_assessment(AssessmentIntent::Answer {
        question: first,
        value: 5,
    });
    harness.dispatch_assessment(AssessmentIntent::Next);
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Step 1 of 4"), "moved past incomplete step in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn assessment_view_offers_to_clear_carried_over_answers() {
    let services = in_memory_services();
    complete_assessment(&services, 6).await;

    let mut harness = setup_view_harness_with_services(ViewKind::Assessment, services);
    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("were carried over"), "missing prefill banner in {html}");

    harness.dispatch_assessment(AssessmentIntent::ClearPrefill);
    let html = harness.render();
    assert!(!html.contains("were carried over"), "banner still shown in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn assessment_view_reports_missing_catalog() {
    let mut harness =
        setup_view_harness_with_services(ViewKind::Assessment, services_without_catalog());
    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(
        html.contains("The questions could not be loaded"),
        "missing error in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn results_view_smoke_renders_wheel_and_table() {
    let services = in_memory_services();
    let id = complete_assessment(&services, 6).await;

    let mut harness = setup_view_harness_with_services(ViewKind::Results(id.value()), services);
    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Your Life Wheel"), "missing title in {html}");
    assert!(html.contains("<svg"), "missing wheel in {html}");
    assert!(html.contains("Pessoal"), "missing area row in {html}");
    assert!(html.contains("6.0"), "missing score in {html}");
    assert!(html.contains("60%"), "missing percentage in {html}");
    assert!(html.contains("Create action plan"), "missing plan link in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn results_view_reports_unknown_assessment() {
    let mut harness = setup_view_harness(ViewKind::Results(999));
    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(
        html.contains("This assessment could not be found."),
        "missing not-found message in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn plan_view_submits_balanced_allocation() {
    let services = in_memory_services();
    let id = complete_assessment(&services, 5).await;

    let mut harness = setup_view_harness_with_services(ViewKind::Plan(id.value()), services);
    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Remaining: 100"), "missing budget in {html}");

    harness.dispatch_plan(PlanIntent::Focus(LifeAreaId::new(1)));
    for (area, raw) in [(1, "40"), (2, "30"), (3, "20")] {
        harness.dispatch_plan(PlanIntent::Points {
            area: LifeAreaId::new(area),
            raw: raw.to_string(),
        });
    }
    let html = harness.render();
    assert!(html.contains(">Remaining: 10<"), "missing remaining in {html}");

    harness.dispatch_plan(PlanIntent::Points {
        area: LifeAreaId::new(4),
        raw: "10".to_string(),
    });
    harness.dispatch_plan(PlanIntent::ActionText {
        index: 0,
        value: "Walk every morning".to_string(),
    });
    harness.dispatch_plan(PlanIntent::Submit);
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Your action plan was saved."), "missing confirmation in {html}");
    assert!(html.contains("can no longer be changed"), "not read-only in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn plan_view_flags_overspent_points() {
    let services = in_memory_services();
    let id = complete_assessment(&services, 5).await;

    let mut harness = setup_view_harness_with_services(ViewKind::Plan(id.value()), services);
    harness.rebuild();
    harness.settle().await;

    harness.dispatch_plan(PlanIntent::Points {
        area: LifeAreaId::new(1),
        raw: "80".to_string(),
    });
    harness.dispatch_plan(PlanIntent::Points {
        area: LifeAreaId::new(2),
        raw: "30".to_string(),
    });
    let html = harness.render();
    assert!(html.contains("Over by 10"), "missing overflow in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn history_view_smoke_compares_latest_two() {
    let services = in_memory_services();
    complete_assessment(&services, 4).await;
    complete_assessment(&services, 6).await;

    let mut harness = setup_view_harness_with_services(ViewKind::History, services);
    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("View"), "missing history link in {html}");
    assert!(html.contains("Latest change"), "missing comparison in {html}");
    assert!(html.contains("+2.0"), "missing delta in {html}");
}
