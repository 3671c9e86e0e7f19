//! Transition and audit recording - append-only history plus read-side
//! projections for compliance review.

use chrono::Utc;
use sea_orm::*;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::DomainError;
use crate::models::{audit_log, stage_transition};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransitionType {
    Manual,
    Automatic,
}

impl TransitionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionType::Manual => "manual",
            TransitionType::Automatic => "automatic",
        }
    }
}

/// Justification attached to a transition that violates the adjacency
/// table but is forced through anyway.
#[derive(Clone, Debug)]
pub struct Bypass {
    pub reason: String,
    pub category: Option<String>,
}

pub struct NewTransition<'a> {
    pub entity_type: &'a str,
    pub entity_id: i32,
    pub from_stage: &'a str,
    pub to_stage: &'a str,
    pub transition_type: TransitionType,
    pub confirmation_acknowledged: bool,
    pub bypass: Option<Bypass>,
    pub checklist_snapshot: Option<Value>,
    pub performed_by: &'a str,
}

/// Insert one immutable transition record.
///
/// Deliberately does NOT consult the transition validator: callers either
/// validate first or record an explicit bypass with a reason. That split is
/// what keeps a manually-justified illegal transition auditable.
pub async fn record_transition(
    db: &DatabaseConnection,
    t: NewTransition<'_>,
) -> Result<stage_transition::Model, DomainError> {
    let (bypass_reason, bypass_category) = match t.bypass {
        Some(b) => (Some(b.reason), b.category),
        None => (None, None),
    };

    let record = stage_transition::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        entity_type: Set(t.entity_type.to_owned()),
        entity_id: Set(t.entity_id),
        from_stage: Set(t.from_stage.to_owned()),
        to_stage: Set(t.to_stage.to_owned()),
        transition_type: Set(t.transition_type.as_str().to_owned()),
        confirmation_acknowledged: Set(t.confirmation_acknowledged),
        bypass_reason: Set(bypass_reason),
        bypass_category: Set(bypass_category),
        checklist_snapshot: Set(t
            .checklist_snapshot
            .map(|s| s.to_string())),
        performed_by: Set(t.performed_by.to_owned()),
        created_at: Set(Utc::now().to_rfc3339()),
    };

    Ok(record.insert(db).await?)
}

/// Best-effort audit append. A failed audit write must never abort the
/// business mutation it describes, so failures are logged and swallowed.
pub async fn log_audit(
    db: &DatabaseConnection,
    entity_type: &str,
    entity_id: i32,
    action: &str,
    performed_by: &str,
    bulk_action_id: Option<&str>,
    changes: Option<Value>,
) {
    let entry = audit_log::ActiveModel {
        entity_type: Set(entity_type.to_owned()),
        entity_id: Set(entity_id),
        action: Set(action.to_owned()),
        performed_by: Set(performed_by.to_owned()),
        bulk_action_id: Set(bulk_action_id.map(|s| s.to_owned())),
        changes: Set(changes.map(|c| c.to_string())),
        created_at: Set(Utc::now().to_rfc3339()),
        ..Default::default()
    };

    if let Err(e) = entry.insert(db).await {
        tracing::error!(
            "Audit log write failed for {} {} ({}): {}",
            entity_type,
            entity_id,
            action,
            e
        );
    }
}

/// Full transition history for an entity, newest first.
pub async fn transitions_for_entity(
    db: &DatabaseConnection,
    entity_type: &str,
    entity_id: i32,
) -> Result<Vec<stage_transition::Model>, DomainError> {
    Ok(stage_transition::Entity::find()
        .filter(stage_transition::Column::EntityType.eq(entity_type))
        .filter(stage_transition::Column::EntityId.eq(entity_id))
        .order_by_desc(stage_transition::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn latest_transition(
    db: &DatabaseConnection,
    entity_type: &str,
    entity_id: i32,
) -> Result<Option<stage_transition::Model>, DomainError> {
    Ok(stage_transition::Entity::find()
        .filter(stage_transition::Column::EntityType.eq(entity_type))
        .filter(stage_transition::Column::EntityId.eq(entity_id))
        .order_by_desc(stage_transition::Column::CreatedAt)
        .one(db)
        .await?)
}

/// Only the transitions that were forced past the adjacency table.
pub async fn bypassed_transitions(
    db: &DatabaseConnection,
    entity_type: &str,
    entity_id: i32,
) -> Result<Vec<stage_transition::Model>, DomainError> {
    Ok(stage_transition::Entity::find()
        .filter(stage_transition::Column::EntityType.eq(entity_type))
        .filter(stage_transition::Column::EntityId.eq(entity_id))
        .filter(stage_transition::Column::BypassReason.is_not_null())
        .order_by_desc(stage_transition::Column::CreatedAt)
        .all(db)
        .await?)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionStats {
    pub total: u64,
    pub manual: u64,
    pub automatic: u64,
    pub bypassed: u64,
}

pub async fn transition_stats(
    db: &DatabaseConnection,
    entity_type: &str,
    entity_id: i32,
) -> Result<TransitionStats, DomainError> {
    let base = stage_transition::Entity::find()
        .filter(stage_transition::Column::EntityType.eq(entity_type))
        .filter(stage_transition::Column::EntityId.eq(entity_id));

    let total = base.clone().count(db).await?;
    let manual = base
        .clone()
        .filter(stage_transition::Column::TransitionType.eq("manual"))
        .count(db)
        .await?;
    let automatic = base
        .clone()
        .filter(stage_transition::Column::TransitionType.eq("automatic"))
        .count(db)
        .await?;
    let bypassed = base
        .filter(stage_transition::Column::BypassReason.is_not_null())
        .count(db)
        .await?;

    Ok(TransitionStats {
        total,
        manual,
        automatic,
        bypassed,
    })
}

/// Audit entries for display, newest first. Either filter may be omitted.
pub async fn audit_entries(
    db: &DatabaseConnection,
    entity_type: Option<&str>,
    entity_id: Option<i32>,
    bulk_action_id: Option<&str>,
) -> Result<Vec<audit_log::Model>, DomainError> {
    let mut query = audit_log::Entity::find();

    if let Some(entity_type) = entity_type {
        query = query.filter(audit_log::Column::EntityType.eq(entity_type));
    }
    if let Some(entity_id) = entity_id {
        query = query.filter(audit_log::Column::EntityId.eq(entity_id));
    }
    if let Some(bulk_action_id) = bulk_action_id {
        query = query.filter(audit_log::Column::BulkActionId.eq(bulk_action_id));
    }

    Ok(query
        .order_by_desc(audit_log::Column::CreatedAt)
        .all(db)
        .await?)
}
