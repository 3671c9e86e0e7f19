//! Application Service - lead pipeline transitions, screening, duplicates.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::*;

use crate::domain::transitions::{is_valid_transition, ApplicationStatus};
use crate::domain::{DomainError, StatusDomain};
use crate::models::application::{self, Entity as Application};
use crate::models::stage_transition;
use crate::services::audit_service::{self, NewTransition, TransitionType};
use crate::services::lease_service::resolve_bypass;
use crate::services::screening::{ScreeningClient, ScreeningOutcome};

pub use crate::services::lease_service::TransitionRequest;

/// Validate and apply one application stage transition. Same CAS shape
/// as the lease path; see `lease_service::transition_lease`.
pub async fn transition_application(
    db: &DatabaseConnection,
    application_id: i32,
    req: TransitionRequest,
    actor: &str,
    bulk_action_id: Option<&str>,
) -> Result<(application::Model, stage_transition::Model), DomainError> {
    if ApplicationStatus::parse(&req.to).is_none() {
        return Err(DomainError::Validation(format!(
            "Unknown application status '{}'",
            req.to
        )));
    }

    let current = Application::find_by_id(application_id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::NotFound("Application".to_string()))?;

    let from = current.status.clone();
    let legal = is_valid_transition(StatusDomain::Application, &from, &req.to);

    let bypass = resolve_bypass(
        legal,
        StatusDomain::Application,
        &from,
        &req.to,
        req.bypass_reason,
        req.bypass_category,
    )?;

    let result = Application::update_many()
        .col_expr(
            application::Column::Status,
            sea_orm::sea_query::Expr::value(req.to.clone()),
        )
        .col_expr(
            application::Column::UpdatedAt,
            sea_orm::sea_query::Expr::value(Utc::now().to_rfc3339()),
        )
        .filter(application::Column::Id.eq(application_id))
        .filter(application::Column::Status.eq(from.clone()))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(DomainError::Conflict(format!(
            "Application {} was modified concurrently, re-read and retry",
            application_id
        )));
    }

    let record = audit_service::record_transition(
        db,
        NewTransition {
            entity_type: "application",
            entity_id: application_id,
            from_stage: &from,
            to_stage: &req.to,
            transition_type: TransitionType::Manual,
            confirmation_acknowledged: req.confirmation_acknowledged,
            bypass,
            checklist_snapshot: None,
            performed_by: actor,
        },
    )
    .await?;

    audit_service::log_audit(
        db,
        "application",
        application_id,
        "status_transition",
        actor,
        bulk_action_id,
        Some(serde_json::json!({ "from": from.clone(), "to": req.to.clone() })),
    )
    .await;

    let updated = Application::find_by_id(application_id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::NotFound("Application".to_string()))?;

    tracing::info!(
        "Application {} transitioned {} -> {}",
        application_id,
        from,
        req.to
    );

    Ok((updated, record))
}

/// Run the external screening call and persist its outcome on the
/// application row. Scoring internals are the external service's problem.
pub async fn evaluate_application(
    db: &DatabaseConnection,
    client: &ScreeningClient,
    application_id: i32,
    actor: &str,
) -> Result<(application::Model, ScreeningOutcome), DomainError> {
    let app = Application::find_by_id(application_id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::NotFound("Application".to_string()))?;

    let outcome = client.evaluate(&app).await?;

    let mut active: application::ActiveModel = app.into();
    active.screening_score = Set(Some(outcome.score));
    active.screening_label = Set(Some(outcome.label.clone()));
    active.screening_flags = Set(Some(serde_json::to_string(&outcome.flags)?));
    active.updated_at = Set(Utc::now().to_rfc3339());
    let updated = active.update(db).await?;

    audit_service::log_audit(
        db,
        "application",
        application_id,
        "screening_evaluated",
        actor,
        None,
        Some(serde_json::json!({
            "score": outcome.score,
            "label": outcome.label.clone(),
        })),
    )
    .await;

    Ok((updated, outcome))
}

/// Names at or above this similarity are treated as the same applicant.
const NAME_SIMILARITY_THRESHOLD: f64 = 0.93;

/// Group likely-duplicate applications: exact email matches first, then a
/// fuzzy pass over applicant names for rows without a shared email.
pub async fn find_duplicates(
    db: &DatabaseConnection,
    site_id: Option<&str>,
) -> Result<Vec<serde_json::Value>, DomainError> {
    let mut query = Application::find();
    if let Some(site_id) = site_id {
        query = query.filter(application::Column::SiteId.eq(site_id));
    }
    let apps = query.all(db).await?;

    let mut email_map: HashMap<String, Vec<&application::Model>> = HashMap::new();
    for app in &apps {
        if let Some(email) = &app.email {
            let email = email.trim().to_lowercase();
            if !email.is_empty() {
                email_map.entry(email).or_default().push(app);
            }
        }
    }

    let mut groups: Vec<serde_json::Value> = email_map
        .iter()
        .filter(|(_, group)| group.len() > 1)
        .map(|(email, group)| {
            serde_json::json!({
                "reason": "email",
                "email": email,
                "count": group.len(),
                "applications": group
                    .iter()
                    .map(|a| serde_json::Value::from((*a).clone()))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();

    // Fuzzy name pass for applicants that did not share an email
    for (i, a) in apps.iter().enumerate() {
        for b in apps.iter().skip(i + 1) {
            let same_email = match (&a.email, &b.email) {
                (Some(x), Some(y)) => x.trim().eq_ignore_ascii_case(y.trim()),
                _ => false,
            };
            if same_email {
                continue;
            }
            let similarity = strsim::jaro_winkler(
                &a.applicant_name.to_lowercase(),
                &b.applicant_name.to_lowercase(),
            );
            if similarity >= NAME_SIMILARITY_THRESHOLD {
                groups.push(serde_json::json!({
                    "reason": "name",
                    "similarity": similarity,
                    "count": 2,
                    "applications": [
                        serde_json::Value::from(a.clone()),
                        serde_json::Value::from(b.clone()),
                    ],
                }));
            }
        }
    }

    Ok(groups)
}

/// Count applications in a given status
pub async fn count_by_status(
    db: &DatabaseConnection,
    status: &str,
) -> Result<i64, DomainError> {
    let count = Application::find()
        .filter(application::Column::Status.eq(status))
        .count(db)
        .await?;
    Ok(count as i64)
}
