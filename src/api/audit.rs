//! Read-side projections over the append-only transition and audit logs.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::DomainError;
use crate::services::audit_service;

fn validate_entity_type(entity_type: &str) -> Result<(), DomainError> {
    match entity_type {
        "lease" | "application" => Ok(()),
        other => Err(DomainError::Validation(format!(
            "Unknown entity type '{}', expected 'lease' or 'application'",
            other
        ))),
    }
}

pub async fn list_transitions(
    State(db): State<DatabaseConnection>,
    Path((entity_type, id)): Path<(String, i32)>,
) -> Result<Json<Value>, DomainError> {
    validate_entity_type(&entity_type)?;
    let transitions = audit_service::transitions_for_entity(&db, &entity_type, id).await?;
    let result: Vec<Value> = transitions.into_iter().map(Value::from).collect();
    Ok(Json(json!({ "transitions": result, "total": result.len() })))
}

pub async fn latest_transition(
    State(db): State<DatabaseConnection>,
    Path((entity_type, id)): Path<(String, i32)>,
) -> Result<Json<Value>, DomainError> {
    validate_entity_type(&entity_type)?;
    let latest = audit_service::latest_transition(&db, &entity_type, id).await?;
    Ok(Json(json!({ "transition": latest.map(Value::from) })))
}

pub async fn bypassed_transitions(
    State(db): State<DatabaseConnection>,
    Path((entity_type, id)): Path<(String, i32)>,
) -> Result<Json<Value>, DomainError> {
    validate_entity_type(&entity_type)?;
    let transitions = audit_service::bypassed_transitions(&db, &entity_type, id).await?;
    let result: Vec<Value> = transitions.into_iter().map(Value::from).collect();
    Ok(Json(json!({ "transitions": result, "total": result.len() })))
}

pub async fn transition_stats(
    State(db): State<DatabaseConnection>,
    Path((entity_type, id)): Path<(String, i32)>,
) -> Result<Json<Value>, DomainError> {
    validate_entity_type(&entity_type)?;
    let stats = audit_service::transition_stats(&db, &entity_type, id).await?;
    Ok(Json(json!({ "stats": stats })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuery {
    pub entity_type: Option<String>,
    pub entity_id: Option<i32>,
    pub bulk_action_id: Option<String>,
}

pub async fn list_audit_entries(
    State(db): State<DatabaseConnection>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Value>, DomainError> {
    let entries = audit_service::audit_entries(
        &db,
        query.entity_type.as_deref(),
        query.entity_id,
        query.bulk_action_id.as_deref(),
    )
    .await?;
    let result: Vec<Value> = entries.into_iter().map(Value::from).collect();
    Ok(Json(json!({ "entries": result, "total": result.len() })))
}
