use chrono::{Duration, NaiveDate};
use storage::repository::{
    ActionPlanRepository, AssessmentRepository, CatalogRepository, ResponseRecord, StorageError,
};
use storage::default_catalog;
use storage::sqlite::SqliteRepository;
use wheel_core::model::{
    ActionItem, ActionPlanDraft, ActionStatus, Catalog, ContributionAllocation, LifeAreaId,
    QuestionId, Score, UserId,
};
use wheel_core::time::fixed_now;

async fn connect(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn answers(catalog: &Catalog, value: u8) -> Vec<ResponseRecord> {
    catalog
        .areas()
        .iter()
        .flat_map(|a| a.questions())
        .map(|q| ResponseRecord::new(q.id, Score::new(value).unwrap()))
        .collect()
}

#[tokio::test]
async fn sqlite_catalog_round_trips_in_display_order() {
    let repo = connect("memdb_catalog").await;
    assert_eq!(repo.fetch_catalog().await.unwrap_err(), StorageError::NotFound);

    let catalog = default_catalog().unwrap();
    repo.upsert_catalog(&catalog).await.unwrap();
    // upsert twice to exercise the conflict path
    repo.upsert_catalog(&catalog).await.unwrap();

    let fetched = repo.fetch_catalog().await.unwrap();
    assert_eq!(fetched, catalog);
}

#[tokio::test]
async fn sqlite_assessment_lifecycle() {
    let repo = connect("memdb_lifecycle").await;
    let catalog = default_catalog().unwrap();
    repo.upsert_catalog(&catalog).await.unwrap();
    let user = UserId::new(3);

    let record = repo.start_or_resume(user, fixed_now()).await.unwrap();
    assert_eq!(record.current_step(), 0);
    assert!(repo.fetch_prior_responses(user).await.unwrap().is_none());

    let mut all = answers(&catalog, 8);
    all[0].score = Score::new(6).unwrap();
    repo.save_responses(record.id(), &all[..3]).await.unwrap();
    repo.set_current_step(record.id(), 1).await.unwrap();

    let resumed = repo.start_or_resume(user, fixed_now()).await.unwrap();
    assert_eq!(resumed.id(), record.id());
    assert_eq!(resumed.current_step(), 1);
    assert_eq!(repo.fetch_responses(record.id()).await.unwrap().len(), 3);

    repo.save_responses(record.id(), &all).await.unwrap();
    let done_at = fixed_now() + Duration::minutes(20);
    let results = repo.finalize_assessment(record.id(), done_at).await.unwrap();

    assert_eq!(results.area_results[0].average_score, 7.8);
    assert_eq!(results.area_results[0].percentage, 78);
    assert_eq!(results.subcategory_results[0].result.average_score, 7.3);
    assert_eq!(results.area_results[1].average_score, 8.0);

    let stored = repo.get_results(record.id()).await.unwrap();
    assert_eq!(stored, results);
    assert_eq!(
        repo.finalize_assessment(record.id(), done_at).await.unwrap(),
        results
    );

    assert_eq!(
        repo.set_current_step(record.id(), 2).await.unwrap_err(),
        StorageError::Conflict
    );

    let prior = repo.fetch_prior_responses(user).await.unwrap().unwrap();
    assert_eq!(prior.len(), 36);
    assert_eq!(prior[&QuestionId::new(10101)].value(), 6);

    let completed = repo.list_completed(user, 5).await.unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].completed_at(), Some(done_at));
}

#[tokio::test]
async fn sqlite_plan_is_unique_per_assessment() {
    let repo = connect("memdb_plans").await;
    let catalog = default_catalog().unwrap();
    repo.upsert_catalog(&catalog).await.unwrap();
    let record = repo.start_or_resume(UserId::new(1), fixed_now()).await.unwrap();
    repo.save_responses(record.id(), &answers(&catalog, 5))
        .await
        .unwrap();
    repo.finalize_assessment(record.id(), fixed_now()).await.unwrap();

    let mut allocation = ContributionAllocation::for_areas(catalog.area_ids());
    allocation.set_points(LifeAreaId::new(1), 40).unwrap();
    allocation.set_points(LifeAreaId::new(2), 30).unwrap();
    allocation.set_points(LifeAreaId::new(3), 20).unwrap();
    allocation.set_points(LifeAreaId::new(4), 10).unwrap();

    let draft = ActionPlanDraft {
        focus_area_id: LifeAreaId::new(3),
        allocation,
        actions: vec![
            ActionItem::new(
                "Update my CV",
                "One section per evening",
                NaiveDate::from_ymd_opt(2024, 4, 1),
            )
            .unwrap(),
            ActionItem::new("Talk to a mentor", "", None)
                .unwrap()
                .with_status(ActionStatus::InProgress),
        ],
    };

    let stored = repo
        .submit_contribution_plan(record.id(), &draft, fixed_now())
        .await
        .unwrap();
    assert_eq!(
        repo.submit_contribution_plan(record.id(), &draft, fixed_now())
            .await
            .unwrap_err(),
        StorageError::Conflict
    );

    let fetched = repo.get_action_plan(record.id()).await.unwrap().unwrap();
    assert_eq!(fetched, stored);
    assert_eq!(fetched.allocation.total(), 100);
    assert_eq!(fetched.actions[1].status(), ActionStatus::InProgress);
}
