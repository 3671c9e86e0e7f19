use rentdesk::db;
use rentdesk::domain::DomainError;
use rentdesk::models::application;
use rentdesk::services::application_service;
use rentdesk::services::screening::ScreeningClient;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:").await.expect("Failed to init DB")
}

async fn create_test_application(db: &DatabaseConnection, name: &str) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let app = application::ActiveModel {
        site_id: Set("default".to_string()),
        applicant_name: Set(name.to_string()),
        email: Set(Some("applicant@example.com".to_string())),
        status: Set("under_review".to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    app.insert(db).await.expect("Failed to create application").id
}

#[tokio::test]
async fn test_screening_outcome_is_persisted() {
    let db = setup_test_db().await;
    let app_id = create_test_application(&db, "Sam Screen").await;

    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/screenings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "score": 82,
            "label": "low_risk",
            "flags": ["income_verified", "prior_eviction_none"]
        })))
        .mount(&mock_server)
        .await;

    let client = ScreeningClient::new(Some(mock_server.uri()));

    let (updated, outcome) =
        application_service::evaluate_application(&db, &client, app_id, "tester")
            .await
            .expect("Evaluation failed");

    assert_eq!(outcome.score, 82);
    assert_eq!(outcome.label, "low_risk");
    assert_eq!(outcome.flags.len(), 2);

    assert_eq!(updated.screening_score, Some(82));
    assert_eq!(updated.screening_label.as_deref(), Some("low_risk"));
    let flags: Vec<String> =
        serde_json::from_str(updated.screening_flags.as_deref().unwrap()).unwrap();
    assert_eq!(flags, vec!["income_verified", "prior_eviction_none"]);

    // Round-trip through the store too
    let row = application::Entity::find_by_id(app_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.screening_score, Some(82));
}

#[tokio::test]
async fn test_screening_missing_flags_default_to_empty() {
    let db = setup_test_db().await;
    let app_id = create_test_application(&db, "Flagless Fred").await;

    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/screenings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "score": 55,
            "label": "medium_risk"
        })))
        .mount(&mock_server)
        .await;

    let client = ScreeningClient::new(Some(mock_server.uri()));
    let (_, outcome) = application_service::evaluate_application(&db, &client, app_id, "tester")
        .await
        .unwrap();

    assert!(outcome.flags.is_empty());
}

#[tokio::test]
async fn test_screening_server_error_surfaces_as_external() {
    let db = setup_test_db().await;
    let app_id = create_test_application(&db, "Erin Error").await;

    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/screenings"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = ScreeningClient::new(Some(mock_server.uri()));
    let result = application_service::evaluate_application(&db, &client, app_id, "tester").await;

    assert!(matches!(result, Err(DomainError::External(_))));

    // A failed call must not leave partial screening data behind
    let row = application::Entity::find_by_id(app_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert!(row.screening_score.is_none());
}

#[tokio::test]
async fn test_unconfigured_screening_is_external_error() {
    let db = setup_test_db().await;
    let app_id = create_test_application(&db, "No Config").await;

    let client = ScreeningClient::new(None);
    let result = application_service::evaluate_application(&db, &client, app_id, "tester").await;

    assert!(matches!(result, Err(DomainError::External(_))));
}

#[tokio::test]
async fn test_screening_missing_application_is_not_found() {
    let db = setup_test_db().await;
    let client = ScreeningClient::new(None);

    let result = application_service::evaluate_application(&db, &client, 4242, "tester").await;
    assert!(matches!(result, Err(DomainError::NotFound(_))));
}
