use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use sea_orm::*;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::Actor;
use crate::db::AppState;
use crate::domain::DomainError;
use crate::models::application::{self, ApplicationDto, Entity as Application};
use crate::services::application_service::{self, TransitionRequest};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListApplicationsQuery {
    pub site_id: Option<String>,
    pub status: Option<String>,
    pub unit_id: Option<i32>,
}

pub async fn list_applications(
    State(db): State<DatabaseConnection>,
    Query(query): Query<ListApplicationsQuery>,
) -> Result<Json<Value>, DomainError> {
    let mut condition = Condition::all();

    if let Some(site_id) = query.site_id {
        condition = condition.add(application::Column::SiteId.eq(site_id));
    }

    if let Some(status) = query.status {
        condition = condition.add(application::Column::Status.eq(status));
    }

    if let Some(unit_id) = query.unit_id {
        condition = condition.add(application::Column::UnitId.eq(unit_id));
    }

    let applications = Application::find()
        .filter(condition)
        .order_by_desc(application::Column::CreatedAt)
        .all(&db)
        .await?;

    let result: Vec<Value> = applications.into_iter().map(Value::from).collect();

    Ok(Json(json!({ "applications": result, "total": result.len() })))
}

pub async fn get_application(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    let model = Application::find_by_id(id)
        .one(&db)
        .await?
        .ok_or_else(|| DomainError::NotFound("Application".to_string()))?;

    Ok(Json(json!({ "application": Value::from(model) })))
}

pub async fn create_application(
    State(db): State<DatabaseConnection>,
    Extension(actor): Extension<Actor>,
    Json(dto): Json<ApplicationDto>,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    if dto.applicant_name.trim().is_empty() {
        return Err(DomainError::Validation(
            "applicantName must not be empty".to_string(),
        ));
    }

    let now = Utc::now().to_rfc3339();

    let new_application = application::ActiveModel {
        site_id: Set(dto.site_id.unwrap_or_else(|| "default".to_string())),
        unit_id: Set(dto.unit_id),
        applicant_name: Set(dto.applicant_name),
        email: Set(dto.email),
        phone: Set(dto.phone),
        status: Set("new".to_owned()),
        notes: Set(dto.notes),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    let saved = new_application.insert(&db).await?;

    crate::services::audit_service::log_audit(
        &db,
        "application",
        saved.id,
        "created",
        &actor.0,
        None,
        None,
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "application": Value::from(saved),
            "message": "Application created successfully"
        })),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApplicationDto {
    pub unit_id: Option<i32>,
    pub applicant_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

// Contact details only. Status moves through the transition endpoint,
// screening fields are written by the evaluate endpoint.
pub async fn update_application(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(dto): Json<UpdateApplicationDto>,
) -> Result<Json<Value>, DomainError> {
    let model = Application::find_by_id(id)
        .one(&db)
        .await?
        .ok_or_else(|| DomainError::NotFound("Application".to_string()))?;

    let mut active: application::ActiveModel = model.into();

    if dto.unit_id.is_some() {
        active.unit_id = Set(dto.unit_id);
    }
    if let Some(applicant_name) = dto.applicant_name {
        active.applicant_name = Set(applicant_name);
    }
    if dto.email.is_some() {
        active.email = Set(dto.email);
    }
    if dto.phone.is_some() {
        active.phone = Set(dto.phone);
    }
    if dto.notes.is_some() {
        active.notes = Set(dto.notes);
    }
    active.updated_at = Set(Utc::now().to_rfc3339());

    let updated = active.update(&db).await?;

    Ok(Json(json!({
        "application": Value::from(updated),
        "message": "Application updated successfully"
    })))
}

pub async fn delete_application(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    let res = Application::delete_by_id(id).exec(&db).await?;
    if res.rows_affected == 0 {
        return Err(DomainError::NotFound("Application".to_string()));
    }
    Ok(Json(json!({ "message": "Application deleted successfully" })))
}

pub async fn transition_application(
    State(db): State<DatabaseConnection>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
    Json(dto): Json<super::lease::TransitionDto>,
) -> Result<Json<Value>, DomainError> {
    let (updated, record) = application_service::transition_application(
        &db,
        id,
        TransitionRequest {
            to: dto.to_status,
            bypass_reason: dto.bypass_reason,
            bypass_category: dto.bypass_category,
            confirmation_acknowledged: dto.confirmation_acknowledged,
        },
        &actor.0,
        None,
    )
    .await?;

    Ok(Json(json!({
        "application": Value::from(updated),
        "transition": Value::from(record),
        "message": "Application status updated"
    })))
}

pub async fn evaluate_application(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    let (updated, outcome) =
        application_service::evaluate_application(&state.db, &state.screening, id, &actor.0)
            .await?;

    Ok(Json(json!({
        "application": Value::from(updated),
        "screening": outcome,
        "message": "Screening completed"
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicatesQuery {
    pub site_id: Option<String>,
}

pub async fn find_duplicates(
    State(db): State<DatabaseConnection>,
    Query(query): Query<DuplicatesQuery>,
) -> Result<Json<Value>, DomainError> {
    let groups = application_service::find_duplicates(&db, query.site_id.as_deref()).await?;
    Ok(Json(json!({ "duplicates": groups })))
}
