//! Lease Service - status transitions and onboarding checklist logic.

use chrono::Utc;
use sea_orm::*;

use crate::domain::checklist::{
    completed_count, missing_required_count, ChecklistStep, DEFAULT_CHECKLIST_STEPS,
};
use crate::domain::transitions::{allowed_transitions, is_valid_transition, LeaseStatus};
use crate::domain::{DomainError, StatusDomain};
use crate::models::lease::{self, Entity as Lease};
use crate::models::lease_checklist::{self, Entity as LeaseChecklist};
use crate::models::stage_transition;
use crate::services::audit_service::{self, Bypass, NewTransition, TransitionType};

/// Caller's intent for a single status transition.
#[derive(Debug, Default, Clone)]
pub struct TransitionRequest {
    pub to: String,
    pub bypass_reason: Option<String>,
    pub bypass_category: Option<String>,
    pub confirmation_acknowledged: bool,
}

/// Validate and apply one lease status transition.
///
/// The status write is an optimistic compare-and-swap: the UPDATE is
/// filtered on the status we read, so a concurrent transition on the same
/// lease surfaces as a conflict instead of a silent lost update.
pub async fn transition_lease(
    db: &DatabaseConnection,
    lease_id: i32,
    req: TransitionRequest,
    actor: &str,
    bulk_action_id: Option<&str>,
) -> Result<(lease::Model, stage_transition::Model), DomainError> {
    if LeaseStatus::parse(&req.to).is_none() {
        return Err(DomainError::Validation(format!(
            "Unknown lease status '{}'",
            req.to
        )));
    }

    let current = Lease::find_by_id(lease_id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::NotFound("Lease".to_string()))?;

    let from = current.status.clone();
    let legal = is_valid_transition(StatusDomain::Lease, &from, &req.to);

    let bypass = resolve_bypass(
        legal,
        StatusDomain::Lease,
        &from,
        &req.to,
        req.bypass_reason,
        req.bypass_category,
    )?;

    // Compare-and-swap on the status column
    let result = Lease::update_many()
        .col_expr(lease::Column::Status, sea_orm::sea_query::Expr::value(req.to.clone()))
        .col_expr(
            lease::Column::UpdatedAt,
            sea_orm::sea_query::Expr::value(Utc::now().to_rfc3339()),
        )
        .filter(lease::Column::Id.eq(lease_id))
        .filter(lease::Column::Status.eq(from.clone()))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(DomainError::Conflict(format!(
            "Lease {} was modified concurrently, re-read and retry",
            lease_id
        )));
    }

    let record = audit_service::record_transition(
        db,
        NewTransition {
            entity_type: "lease",
            entity_id: lease_id,
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
        "lease",
        lease_id,
        "status_transition",
        actor,
        bulk_action_id,
        Some(serde_json::json!({ "from": from.clone(), "to": req.to.clone() })),
    )
    .await;

    let updated = Lease::find_by_id(lease_id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::NotFound("Lease".to_string()))?;

    tracing::info!("Lease {} transitioned {} -> {}", lease_id, from, req.to);

    Ok((updated, record))
}

/// Shared bypass policy for both status domains: an illegal transition
/// without a justification is rejected with the legal next states; a
/// non-empty reason turns it into a recorded bypass.
pub(crate) fn resolve_bypass(
    legal: bool,
    domain: StatusDomain,
    from: &str,
    to: &str,
    bypass_reason: Option<String>,
    bypass_category: Option<String>,
) -> Result<Option<Bypass>, DomainError> {
    if legal {
        return Ok(None);
    }
    match bypass_reason {
        Some(reason) if !reason.trim().is_empty() => Ok(Some(Bypass {
            reason,
            category: bypass_category,
        })),
        Some(_) => Err(DomainError::Validation(
            "Bypass reason must not be empty".to_string(),
        )),
        None => Err(DomainError::IllegalTransition {
            from: from.to_string(),
            to: to.to_string(),
            allowed: allowed_transitions(domain, from),
        }),
    }
}

/// Seed an onboarding checklist for a lease. Defaults to the 7-step
/// template; a caller-supplied step list overrides it.
pub async fn create_checklist(
    db: &DatabaseConnection,
    lease_id: i32,
    steps: Option<Vec<ChecklistStep>>,
) -> Result<lease_checklist::Model, DomainError> {
    let lease = Lease::find_by_id(lease_id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::NotFound("Lease".to_string()))?;

    let existing = LeaseChecklist::find()
        .filter(lease_checklist::Column::LeaseId.eq(lease_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(DomainError::Validation(format!(
            "Lease {} already has an onboarding checklist",
            lease_id
        )));
    }

    let steps = steps.unwrap_or_else(|| DEFAULT_CHECKLIST_STEPS.clone());
    let total = steps.len() as i32;
    let completed = completed_count(&steps);
    let now = Utc::now().to_rfc3339();

    let checklist = lease_checklist::ActiveModel {
        lease_id: Set(lease_id),
        steps: Set(serde_json::to_string(&steps)?),
        total_steps: Set(total),
        completed_steps: Set(completed),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    };
    let saved = checklist.insert(db).await?;

    // The lease is now onboarding until every required step is done
    let mut lease_active: lease::ActiveModel = lease.into();
    lease_active.onboarding_pending = Set(true);
    lease_active.updated_at = Set(now);
    lease_active.update(db).await?;

    Ok(saved)
}

pub async fn get_checklist(
    db: &DatabaseConnection,
    lease_id: i32,
) -> Result<lease_checklist::Model, DomainError> {
    LeaseChecklist::find()
        .filter(lease_checklist::Column::LeaseId.eq(lease_id))
        .one(db)
        .await?
        .ok_or_else(|| DomainError::NotFound("Checklist".to_string()))
}

/// Toggle exactly one step. The full step array and the denormalized
/// count are persisted in a single UPDATE so they can never drift apart.
pub async fn update_step(
    db: &DatabaseConnection,
    lease_id: i32,
    step_id: &str,
    completed: bool,
    notes: Option<String>,
) -> Result<lease_checklist::Model, DomainError> {
    let checklist = get_checklist(db, lease_id).await?;
    let mut steps = checklist.parsed_steps()?;

    let step = steps
        .iter_mut()
        .find(|s| s.id == step_id)
        .ok_or_else(|| DomainError::NotFound("Checklist step".to_string()))?;

    step.completed = completed;
    step.completed_at = if completed {
        Some(Utc::now().to_rfc3339())
    } else {
        None
    };
    if let Some(notes) = notes {
        step.notes = Some(notes);
    }

    let completed_steps = completed_count(&steps);

    let mut active: lease_checklist::ActiveModel = checklist.into();
    active.steps = Set(serde_json::to_string(&steps)?);
    active.completed_steps = Set(completed_steps);
    active.updated_at = Set(Utc::now().to_rfc3339());

    Ok(active.update(db).await?)
}

/// Finish onboarding. Fails while any required step is open; on success
/// clears the lease onboarding flag and, when `set_active`, forces the
/// lease status to `active`.
///
/// This is the one place status is written without the transition
/// validator: `signed -> active` is already legal, but a lease whose
/// checklist is complete may also be activated straight from any earlier
/// pre-active state.
pub async fn complete_onboarding(
    db: &DatabaseConnection,
    lease_id: i32,
    set_active: bool,
    actor: &str,
) -> Result<lease::Model, DomainError> {
    let checklist = get_checklist(db, lease_id).await?;
    let steps = checklist.parsed_steps()?;

    let missing = missing_required_count(&steps);
    if missing > 0 {
        return Err(DomainError::IncompleteChecklist { missing });
    }

    let lease = Lease::find_by_id(lease_id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::NotFound("Lease".to_string()))?;

    let from = lease.status.clone();
    let now = Utc::now().to_rfc3339();

    let mut active: lease::ActiveModel = lease.into();
    active.onboarding_pending = Set(false);
    if set_active {
        active.status = Set(LeaseStatus::Active.as_str().to_owned());
    }
    active.updated_at = Set(now);
    let updated = active.update(db).await?;

    if set_active && from != LeaseStatus::Active.as_str() {
        let completed = completed_count(&steps);
        let snapshot = serde_json::json!({
            "steps": steps,
            "totalSteps": checklist.total_steps,
            "completedSteps": completed,
        });
        audit_service::record_transition(
            db,
            NewTransition {
                entity_type: "lease",
                entity_id: lease_id,
                from_stage: &from,
                to_stage: LeaseStatus::Active.as_str(),
                transition_type: TransitionType::Automatic,
                confirmation_acknowledged: true,
                bypass: None,
                checklist_snapshot: Some(snapshot),
                performed_by: actor,
            },
        )
        .await?;
    }

    audit_service::log_audit(
        db,
        "lease",
        lease_id,
        "onboarding_completed",
        actor,
        None,
        Some(serde_json::json!({ "setActiveStatus": set_active })),
    )
    .await;

    tracing::info!("Lease {} onboarding completed", lease_id);

    Ok(updated)
}

/// Count leases in a given status
pub async fn count_by_status(
    db: &DatabaseConnection,
    status: &str,
) -> Result<i64, DomainError> {
    let count = Lease::find()
        .filter(lease::Column::Status.eq(status))
        .count(db)
        .await?;
    Ok(count as i64)
}
