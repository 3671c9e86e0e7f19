use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use sea_orm::*;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::Actor;
use crate::db::AppState;
use crate::domain::DomainError;
use crate::models::bulk_action::{self, Entity as BulkAction};
use crate::services::audit_service;
use crate::services::bulk_service::{self, BulkActionType};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRequest {
    pub application_ids: Vec<i32>,
    pub action: String,
    pub params: Option<Value>,
}

/// One action across many applications. Mutating actions return a JSON
/// per-item report; `export` streams a CSV artifact instead.
pub async fn run_bulk_action(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<BulkRequest>,
) -> Result<Response, DomainError> {
    let action = bulk_service::validate_request(&req.application_ids, &req.action)?;

    if action == BulkActionType::Export {
        let (bulk_id, bytes) =
            bulk_service::export_applications(&state.db, req.application_ids, &actor.0).await?;

        let filename = format!(
            "applications_export_{}.csv",
            chrono::Utc::now().format("%Y-%m-%d")
        );

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, "text/csv".parse().unwrap());
        headers.insert(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename)
                .parse()
                .map_err(|_| DomainError::Internal("Invalid filename header".to_string()))?,
        );
        headers.insert(
            "x-bulk-action-id",
            bulk_id
                .parse()
                .map_err(|_| DomainError::Internal("Invalid bulk action id".to_string()))?,
        );

        return Ok((StatusCode::OK, headers, bytes).into_response());
    }

    let outcome = bulk_service::run_bulk(
        &state.db,
        req.application_ids,
        action,
        req.params,
        &actor.0,
    )
    .await?;

    Ok(Json(serde_json::to_value(outcome)?).into_response())
}

pub async fn list_bulk_actions(
    State(db): State<DatabaseConnection>,
) -> Result<Json<Value>, DomainError> {
    let actions = BulkAction::find()
        .order_by_desc(bulk_action::Column::CreatedAt)
        .all(&db)
        .await?;

    let result: Vec<Value> = actions.into_iter().map(Value::from).collect();

    Ok(Json(json!({ "bulkActions": result, "total": result.len() })))
}

/// One bulk action plus the audit entries it grouped.
pub async fn get_bulk_action(
    State(db): State<DatabaseConnection>,
    Path(id): Path<String>,
) -> Result<Json<Value>, DomainError> {
    let action = BulkAction::find_by_id(id.clone())
        .one(&db)
        .await?
        .ok_or_else(|| DomainError::NotFound("Bulk action".to_string()))?;

    let entries = audit_service::audit_entries(&db, None, None, Some(&id)).await?;
    let entries: Vec<Value> = entries.into_iter().map(Value::from).collect();

    Ok(Json(json!({
        "bulkAction": Value::from(action),
        "auditEntries": entries,
    })))
}
