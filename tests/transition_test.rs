use rentdesk::db;
use rentdesk::domain::DomainError;
use rentdesk::services::audit_service;
use rentdesk::services::lease_service::{self, TransitionRequest};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:").await.expect("Failed to init DB")
}

async fn setup_lease(db: &DatabaseConnection, status: &str) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();

    let property = rentdesk::models::property::ActiveModel {
        site_id: Set("default".to_string()),
        name: Set("Test Property".to_string()),
        address: Set("1 Test Street".to_string()),
        city: Set("Testville".to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create property");

    let unit = rentdesk::models::unit::ActiveModel {
        property_id: Set(property.id),
        unit_number: Set("101".to_string()),
        bedrooms: Set(1),
        bathrooms: Set(1.0),
        rent_amount: Set(995.0),
        status: Set("vacant".to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create unit");

    let tenant = rentdesk::models::tenant::ActiveModel {
        site_id: Set("default".to_string()),
        name: Set("Bob Tester".to_string()),
        is_active: Set(true),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create tenant");

    rentdesk::models::lease::ActiveModel {
        site_id: Set("default".to_string()),
        unit_id: Set(unit.id),
        tenant_id: Set(tenant.id),
        start_date: Set("2026-09-01".to_string()),
        end_date: Set("2027-08-31".to_string()),
        rent_amount: Set(995.0),
        deposit_amount: Set(995.0),
        status: Set(status.to_string()),
        onboarding_pending: Set(false),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create lease")
    .id
}

fn to(status: &str) -> TransitionRequest {
    TransitionRequest {
        to: status.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_legal_transition_updates_status_and_records() {
    let db = setup_test_db().await;
    let lease_id = setup_lease(&db, "draft").await;

    let (lease, record) =
        lease_service::transition_lease(&db, lease_id, to("pending_signature"), "tester", None)
            .await
            .expect("Transition failed");

    assert_eq!(lease.status, "pending_signature");
    assert_eq!(record.from_stage, "draft");
    assert_eq!(record.to_stage, "pending_signature");
    assert_eq!(record.transition_type, "manual");
    assert!(record.bypass_reason.is_none());

    let latest = audit_service::latest_transition(&db, "lease", lease_id)
        .await
        .unwrap()
        .expect("Expected a transition record");
    assert_eq!(latest.id, record.id);
}

#[tokio::test]
async fn test_illegal_transition_lists_allowed_states() {
    let db = setup_test_db().await;
    let lease_id = setup_lease(&db, "draft").await;

    let result = lease_service::transition_lease(&db, lease_id, to("active"), "tester", None).await;

    match result {
        Err(DomainError::IllegalTransition { from, to, allowed }) => {
            assert_eq!(from, "draft");
            assert_eq!(to, "active");
            assert_eq!(allowed, vec!["pending_signature", "terminated"]);
        }
        other => panic!("Expected IllegalTransition, got {:?}", other),
    }

    // Rejected transitions change nothing and record nothing
    let lease = rentdesk::models::lease::Entity::find_by_id(lease_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(lease.status, "draft");

    let transitions = audit_service::transitions_for_entity(&db, "lease", lease_id)
        .await
        .unwrap();
    assert!(transitions.is_empty());
}

#[tokio::test]
async fn test_same_state_transition_is_a_legal_noop() {
    let db = setup_test_db().await;
    let lease_id = setup_lease(&db, "terminated").await;

    // Terminal state, but a same-state request still goes through
    let (lease, record) =
        lease_service::transition_lease(&db, lease_id, to("terminated"), "tester", None)
            .await
            .expect("Same-state transition failed");

    assert_eq!(lease.status, "terminated");
    assert_eq!(record.from_stage, record.to_stage);
}

#[tokio::test]
async fn test_unknown_status_is_a_validation_error() {
    let db = setup_test_db().await;
    let lease_id = setup_lease(&db, "draft").await;

    let result = lease_service::transition_lease(&db, lease_id, to("bogus"), "tester", None).await;
    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn test_missing_lease_is_not_found() {
    let db = setup_test_db().await;

    let result =
        lease_service::transition_lease(&db, 9999, to("pending_signature"), "tester", None).await;
    assert!(matches!(result, Err(DomainError::NotFound(_))));
}

#[tokio::test]
async fn test_bypass_forces_illegal_transition_and_is_auditable() {
    let db = setup_test_db().await;
    let lease_id = setup_lease(&db, "draft").await;

    // draft -> signed is outside the table, forced with a justification
    let (lease, record) = lease_service::transition_lease(
        &db,
        lease_id,
        TransitionRequest {
            to: "signed".to_string(),
            bypass_reason: Some("Signed paper copy received by mail".to_string()),
            bypass_category: Some("manual_paperwork".to_string()),
            confirmation_acknowledged: true,
        },
        "manager",
        None,
    )
    .await
    .expect("Bypass transition failed");

    assert_eq!(lease.status, "signed");
    assert_eq!(
        record.bypass_reason.as_deref(),
        Some("Signed paper copy received by mail")
    );
    assert_eq!(record.bypass_category.as_deref(), Some("manual_paperwork"));

    // The bypassed-only projection returns it
    let bypassed = audit_service::bypassed_transitions(&db, "lease", lease_id)
        .await
        .unwrap();
    assert_eq!(bypassed.len(), 1);
    assert_eq!(bypassed[0].id, record.id);

    // And the stats count it
    let stats = audit_service::transition_stats(&db, "lease", lease_id)
        .await
        .unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.manual, 1);
    assert_eq!(stats.automatic, 0);
    assert_eq!(stats.bypassed, 1);
}

#[tokio::test]
async fn test_empty_bypass_reason_is_rejected() {
    let db = setup_test_db().await;
    let lease_id = setup_lease(&db, "draft").await;

    let result = lease_service::transition_lease(
        &db,
        lease_id,
        TransitionRequest {
            to: "signed".to_string(),
            bypass_reason: Some("   ".to_string()),
            ..Default::default()
        },
        "manager",
        None,
    )
    .await;

    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn test_transition_history_is_reverse_chronological() {
    let db = setup_test_db().await;
    let lease_id = setup_lease(&db, "draft").await;

    lease_service::transition_lease(&db, lease_id, to("pending_signature"), "tester", None)
        .await
        .unwrap();
    lease_service::transition_lease(&db, lease_id, to("signed"), "tester", None)
        .await
        .unwrap();
    lease_service::transition_lease(&db, lease_id, to("active"), "tester", None)
        .await
        .unwrap();

    let transitions = audit_service::transitions_for_entity(&db, "lease", lease_id)
        .await
        .unwrap();
    assert_eq!(transitions.len(), 3);
    assert_eq!(transitions[0].to_stage, "active");
    assert_eq!(transitions[2].to_stage, "pending_signature");
}

#[tokio::test]
async fn test_concurrent_transitions_never_lose_a_write() {
    use rentdesk::services::application_service;

    let db = setup_test_db().await;
    let now = chrono::Utc::now().to_rfc3339();
    let app_id = rentdesk::models::application::ActiveModel {
        site_id: Set("default".to_string()),
        applicant_name: Set("Race Tester".to_string()),
        status: Set("approved".to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await
    .expect("Failed to create application")
    .id;

    // 'converted' and 'rejected' are both absorbing, so whatever the
    // interleaving, exactly one of these can win: if both read 'approved'
    // the compare-and-swap fails the second write, and if they serialize
    // the second request is an illegal transition out of a terminal state.
    let (a, b) = tokio::join!(
        application_service::transition_application(&db, app_id, to("converted"), "tester-a", None),
        application_service::transition_application(&db, app_id, to("rejected"), "tester-b", None),
    );

    let winners = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(winners, 1, "Exactly one transition must win");

    for loser in [&a, &b] {
        if let Err(e) = loser {
            assert!(
                matches!(
                    e,
                    DomainError::Conflict(_) | DomainError::IllegalTransition { .. }
                ),
                "Loser must conflict or be illegal, got {:?}",
                e
            );
        }
    }

    let app = rentdesk::models::application::Entity::find_by_id(app_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let expected = if a.is_ok() { "converted" } else { "rejected" };
    assert_eq!(app.status, expected);
}
