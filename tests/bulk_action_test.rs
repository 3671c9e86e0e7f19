use rentdesk::db;
use rentdesk::domain::DomainError;
use rentdesk::models::application::{self, Entity as Application};
use rentdesk::models::bulk_action::Entity as BulkAction;
use rentdesk::services::audit_service;
use rentdesk::services::bulk_service::{self, BulkActionType, MAX_BULK_IDS};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};

async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:").await.expect("Failed to init DB")
}

async fn create_test_application(db: &DatabaseConnection, name: &str, status: &str) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let app = application::ActiveModel {
        site_id: Set("default".to_string()),
        applicant_name: Set(name.to_string()),
        email: Set(Some(format!("{}@example.com", name.to_lowercase().replace(' ', ".")))),
        status: Set(status.to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    app.insert(db).await.expect("Failed to create application").id
}

#[tokio::test]
async fn test_bulk_prevalidation_rejects_bad_requests() {
    // Empty selection
    assert!(matches!(
        bulk_service::validate_request(&[], "approve"),
        Err(DomainError::Validation(_))
    ));

    // Over the cap
    let too_many: Vec<i32> = (1..=(MAX_BULK_IDS as i32 + 1)).collect();
    assert!(matches!(
        bulk_service::validate_request(&too_many, "approve"),
        Err(DomainError::Validation(_))
    ));

    // Unknown action
    assert!(matches!(
        bulk_service::validate_request(&[1, 2], "frobnicate"),
        Err(DomainError::Validation(_))
    ));

    // All valid actions parse
    for action in [
        "approve",
        "reject",
        "request_documents",
        "send_email",
        "generate_document",
        "export",
    ] {
        assert!(bulk_service::validate_request(&[1], action).is_ok());
    }
}

#[tokio::test]
async fn test_bulk_prevalidation_failure_creates_no_record() {
    let db = setup_test_db().await;

    assert!(bulk_service::validate_request(&[], "approve").is_err());

    let count = BulkAction::find().count(&db).await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_bulk_reject_isolates_per_item_failures() {
    let db = setup_test_db().await;

    // Two applications that can be rejected, one that cannot
    // (converted is absorbing), and one id that does not exist.
    let a = create_test_application(&db, "Anna Able", "under_review").await;
    let b = create_test_application(&db, "Bert Baker", "converted").await;
    let c = create_test_application(&db, "Cara Cole", "new").await;
    let missing = 99_999;

    let ids = vec![a, b, c, missing];
    let outcome = bulk_service::run_bulk(
        &db,
        ids.clone(),
        BulkActionType::Reject,
        None,
        "manager",
    )
    .await
    .expect("Bulk run failed");

    // One entry per requested id, counts add up
    assert_eq!(outcome.results.len(), 4);
    assert_eq!(outcome.success_count + outcome.failure_count, 4);
    assert_eq!(outcome.success_count, 2);
    assert_eq!(outcome.failure_count, 2);

    for (id, expected) in [(a, "success"), (b, "failed"), (c, "success"), (missing, "failed")] {
        let entry = outcome.results.iter().find(|r| r.id == id).unwrap();
        assert_eq!(entry.status, expected, "id {}", id);
        if expected == "failed" {
            assert!(entry.error.as_deref().is_some_and(|e| !e.is_empty()));
        }
    }

    // Mutations landed only where they should
    let a_row = Application::find_by_id(a).one(&db).await.unwrap().unwrap();
    assert_eq!(a_row.status, "rejected");
    let b_row = Application::find_by_id(b).one(&db).await.unwrap().unwrap();
    assert_eq!(b_row.status, "converted");

    // The BulkAction record was finalized exactly once with the tally
    let record = BulkAction::find_by_id(outcome.bulk_action_id.clone())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.application_count, 4);
    assert_eq!(record.success_count, 2);
    assert_eq!(record.failure_count, 2);
    assert_eq!(record.action_type, "reject");

    // One audit entry per id, success or failure, linked to the batch
    let entries = audit_service::audit_entries(&db, None, None, Some(&outcome.bulk_action_id))
        .await
        .unwrap();
    assert_eq!(entries.len(), 4);
    assert!(entries.iter().all(|e| e.bulk_action_id.as_deref()
        == Some(outcome.bulk_action_id.as_str())));
}

#[tokio::test]
async fn test_bulk_stub_actions_report_every_item_failed() {
    let db = setup_test_db().await;

    let a = create_test_application(&db, "Dana Dorn", "new").await;
    let b = create_test_application(&db, "Eli Epps", "new").await;

    let outcome = bulk_service::run_bulk(
        &db,
        vec![a, b],
        BulkActionType::SendEmail,
        Some(serde_json::json!({ "template": "welcome" })),
        "manager",
    )
    .await
    .expect("Bulk run failed");

    assert_eq!(outcome.success_count, 0);
    assert_eq!(outcome.failure_count, 2);
    assert!(outcome
        .results
        .iter()
        .all(|r| r.status == "failed" && r.error.is_some()));

    // The attempts are still audited under the batch
    let entries = audit_service::audit_entries(&db, None, None, Some(&outcome.bulk_action_id))
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn test_bulk_export_takes_the_artifact_path() {
    let db = setup_test_db().await;

    let a = create_test_application(&db, "Fay Fox", "approved").await;
    let b = create_test_application(&db, "Gus Gray", "new").await;

    let (bulk_id, bytes) = bulk_service::export_applications(&db, vec![a, b], "manager")
        .await
        .expect("Export failed");

    // CSV artifact with a header row and one row per application
    let text = String::from_utf8(bytes).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("id,applicantName"));
    assert_eq!(lines.count(), 2);
    assert!(text.contains("Fay Fox"));
    assert!(text.contains("Gus Gray"));

    // No mutation happened
    let a_row = Application::find_by_id(a).one(&db).await.unwrap().unwrap();
    assert_eq!(a_row.status, "approved");

    // Immediately finalized as fully successful
    let record = BulkAction::find_by_id(bulk_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.action_type, "export");
    assert_eq!(record.success_count, 2);
    assert_eq!(record.failure_count, 0);
}

#[tokio::test]
async fn test_bulk_approve_only_moves_reviewable_applications() {
    let db = setup_test_db().await;

    let reviewable = create_test_application(&db, "Hal Hart", "under_review").await;
    let too_early = create_test_application(&db, "Ida Ines", "new").await;

    let outcome = bulk_service::run_bulk(
        &db,
        vec![reviewable, too_early],
        BulkActionType::Approve,
        None,
        "manager",
    )
    .await
    .unwrap();

    assert_eq!(outcome.success_count, 1);
    assert_eq!(outcome.failure_count, 1);

    // new -> approved is outside the adjacency table, so the failure
    // message carries the legal next states
    let failed = outcome
        .results
        .iter()
        .find(|r| r.id == too_early)
        .unwrap();
    assert!(failed.error.as_deref().unwrap().contains("Allowed"));

    let row = Application::find_by_id(too_early).one(&db).await.unwrap().unwrap();
    assert_eq!(row.status, "new");
}

#[tokio::test]
async fn test_duplicate_ids_are_last_write_wins() {
    let db = setup_test_db().await;

    let app = create_test_application(&db, "Jo Jung", "under_review").await;

    // Same id twice: first moves under_review -> approved, second is a
    // same-state no-op and also succeeds.
    let outcome = bulk_service::run_bulk(
        &db,
        vec![app, app],
        BulkActionType::Approve,
        None,
        "manager",
    )
    .await
    .unwrap();

    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.success_count, 2);

    let row = Application::find_by_id(app).one(&db).await.unwrap().unwrap();
    assert_eq!(row.status, "approved");

    let stats = audit_service::transition_stats(&db, "application", app)
        .await
        .unwrap();
    assert_eq!(stats.total, 2);
}
