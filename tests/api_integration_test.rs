use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use rentdesk::config::{AuthMode, Config};
use rentdesk::db::{self, AppState};
use rentdesk::services::blob::{BlobStore, FsBlobStore};
use rentdesk::services::screening::ScreeningClient;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tower::ServiceExt; // for oneshot

async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:").await.expect("Failed to init DB")
}

fn test_config(auth_mode: AuthMode, internal_api_key: Option<String>) -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        port: 0,
        cors_allowed_origins: Vec::new(),
        profile: "test".to_string(),
        auth_mode,
        internal_api_key,
        blob_root: "unused".to_string(),
        screening_url: None,
        download_secret: b"test-download-secret".to_vec(),
    }
}

async fn build_state(db: DatabaseConnection, config: Config) -> AppState {
    let blob_root = std::env::temp_dir().join(format!("rentdesk-test-{}", uuid::Uuid::new_v4()));
    let blob = FsBlobStore::open(blob_root)
        .await
        .expect("Failed to open blob store");
    AppState {
        db,
        config,
        blob: Arc::new(blob),
        screening: ScreeningClient::new(None),
    }
}

async fn setup_lease(db: &DatabaseConnection) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();

    let property = rentdesk::models::property::ActiveModel {
        site_id: Set("default".to_string()),
        name: Set("Router Test Property".to_string()),
        address: Set("2 Router Road".to_string()),
        city: Set("Testville".to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    let unit = rentdesk::models::unit::ActiveModel {
        property_id: Set(property.id),
        unit_number: Set("301".to_string()),
        bedrooms: Set(1),
        bathrooms: Set(1.0),
        rent_amount: Set(900.0),
        status: Set("vacant".to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    let tenant = rentdesk::models::tenant::ActiveModel {
        site_id: Set("default".to_string()),
        name: Set("Router Tester".to_string()),
        is_active: Set(true),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    rentdesk::models::lease::ActiveModel {
        site_id: Set("default".to_string()),
        unit_id: Set(unit.id),
        tenant_id: Set(tenant.id),
        start_date: Set("2026-09-01".to_string()),
        end_date: Set("2027-08-31".to_string()),
        rent_amount: Set(900.0),
        deposit_amount: Set(900.0),
        status: Set("draft".to_string()),
        onboarding_pending: Set(false),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let db = setup_test_db().await;
    let state = build_state(db, test_config(AuthMode::Trust, None)).await;
    let app = rentdesk::server::build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "rentdesk");
}

#[tokio::test]
async fn test_property_create_and_get_roundtrip() {
    let db = setup_test_db().await;
    let state = build_state(db, test_config(AuthMode::Trust, None)).await;
    let app = rentdesk::server::build_router(state);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/properties")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "name": "Oak Row",
                        "address": "5 Oak Row",
                        "city": "Springfield",
                        "postalCode": "62704"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let id = json["property"]["id"].as_i64().unwrap();
    assert_eq!(json["property"]["postalCode"], "62704");

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/properties/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["property"]["name"], "Oak Row");
}

#[tokio::test]
async fn test_transition_endpoint_rejects_illegal_with_allowed_list() {
    let db = setup_test_db().await;
    let lease_id = setup_lease(&db).await;
    let state = build_state(db, test_config(AuthMode::Trust, None)).await;
    let app = rentdesk::server::build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/leases/{}/transition", lease_id))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "toStatus": "active" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"], "illegal_transition");
    assert_eq!(
        json["allowedTransitions"],
        serde_json::json!(["pending_signature", "terminated"])
    );
}

#[tokio::test]
async fn test_transition_endpoint_applies_legal_transition() {
    let db = setup_test_db().await;
    let lease_id = setup_lease(&db).await;
    let state = build_state(db, test_config(AuthMode::Trust, None)).await;
    let app = rentdesk::server::build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/leases/{}/transition", lease_id))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "toStatus": "pending_signature" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["lease"]["status"], "pending_signature");
    assert_eq!(json["transition"]["fromStage"], "draft");
    assert_eq!(json["transition"]["performedBy"], "internal");
}

#[tokio::test]
async fn test_shared_key_auth_gates_requests() {
    let db = setup_test_db().await;
    let state = build_state(
        db,
        test_config(AuthMode::SharedKey, Some("sekrit".to_string())),
    )
    .await;
    let app = rentdesk::server::build_router(state);

    // No key: rejected
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Wrong key: rejected
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header("x-internal-key", "wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Correct key: accepted
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header("x-internal-key", "sekrit")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_forwarded_context_sets_the_audit_actor() {
    let db = setup_test_db().await;
    let lease_id = setup_lease(&db).await;
    let state = build_state(db.clone(), test_config(AuthMode::ForwardedContext, None)).await;
    let app = rentdesk::server::build_router(state);

    // Without the forwarded identity the request is rejected
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/leases/{}/transition", lease_id))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "toStatus": "pending_signature" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // With it, the identity lands on the transition record
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/leases/{}/transition", lease_id))
                .header("content-type", "application/json")
                .header("x-forwarded-user", "jane.doe")
                .body(Body::from(
                    serde_json::json!({ "toStatus": "pending_signature" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let latest = rentdesk::services::audit_service::latest_transition(&db, "lease", lease_id)
        .await
        .unwrap()
        .expect("Expected a transition record");
    assert_eq!(latest.performed_by, "jane.doe");
}

#[tokio::test]
async fn test_signed_document_url_round_trip() {
    let db = setup_test_db().await;
    let state = build_state(db.clone(), test_config(AuthMode::Trust, None)).await;

    // Store a document by hand: metadata row plus blob bytes
    let doc_id = uuid::Uuid::new_v4().to_string();
    let blob_key = uuid::Uuid::new_v4().to_string();
    state
        .blob
        .put(&blob_key, b"lease terms pdf bytes", "application/pdf")
        .await
        .unwrap();
    rentdesk::models::document::ActiveModel {
        id: Set(doc_id.clone()),
        site_id: Set("default".to_string()),
        entity_type: Set("lease".to_string()),
        entity_id: Set(1),
        filename: Set("lease.pdf".to_string()),
        content_type: Set("application/pdf".to_string()),
        size: Set(21),
        blob_key: Set(blob_key),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
    }
    .insert(&db)
    .await
    .unwrap();

    let app = rentdesk::server::build_router(state);

    // Ask for a signed URL
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/documents/{}/url", doc_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let url = json["url"].as_str().unwrap().to_string();
    assert!(url.starts_with(&format!("/api/documents/signed/{}", doc_id)));

    // The signed URL serves the bytes
    let response = app
        .clone()
        .oneshot(Request::builder().uri(&url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"lease terms pdf bytes");

    // A tampered signature does not
    let tampered = format!(
        "/api/documents/signed/{}?expires=9999999999&sig={}",
        doc_id,
        "00".repeat(32)
    );
    let response = app
        .oneshot(Request::builder().uri(&tampered).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_expired_signed_url_is_rejected() {
    let db = setup_test_db().await;
    let state = build_state(db.clone(), test_config(AuthMode::Trust, None)).await;
    let secret = state.config.download_secret.clone();

    let doc_id = uuid::Uuid::new_v4().to_string();
    let blob_key = uuid::Uuid::new_v4().to_string();
    state
        .blob
        .put(&blob_key, b"stale bytes", "text/plain")
        .await
        .unwrap();
    rentdesk::models::document::ActiveModel {
        id: Set(doc_id.clone()),
        site_id: Set("default".to_string()),
        entity_type: Set("lease".to_string()),
        entity_id: Set(1),
        filename: Set("old.txt".to_string()),
        content_type: Set("text/plain".to_string()),
        size: Set(11),
        blob_key: Set(blob_key),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
    }
    .insert(&db)
    .await
    .unwrap();

    let app = rentdesk::server::build_router(state);

    // Correctly signed, but already expired
    let expired_at = chrono::Utc::now().timestamp() - 60;
    let sig = rentdesk::services::blob::sign_download(&secret, &doc_id, expired_at);
    let url = format!(
        "/api/documents/signed/{}?expires={}&sig={}",
        doc_id, expired_at, sig
    );

    let response = app
        .oneshot(Request::builder().uri(&url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_transition_entity_type_is_rejected() {
    let db = setup_test_db().await;
    let state = build_state(db, test_config(AuthMode::Trust, None)).await;
    let app = rentdesk::server::build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/transitions/widget/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "validation_error");
}
