use crate::models::tenant::{self, Entity as Tenant, TenantDto};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantsQuery {
    pub site_id: Option<String>,
    pub include_inactive: Option<bool>,
}

pub async fn list_tenants(
    State(db): State<DatabaseConnection>,
    Query(params): Query<TenantsQuery>,
) -> impl IntoResponse {
    let mut query = Tenant::find();

    if !params.include_inactive.unwrap_or(false) {
        query = query.filter(tenant::Column::IsActive.eq(true));
    }

    if let Some(site_id) = params.site_id {
        query = query.filter(tenant::Column::SiteId.eq(site_id));
    }

    match query.all(&db).await {
        Ok(tenants) => {
            let dtos: Vec<TenantDto> = tenants.into_iter().map(TenantDto::from).collect();
            Json(serde_json::json!({ "tenants": dtos, "total": dtos.len() })).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Database error: {}", e)})),
        )
            .into_response(),
    }
}

pub async fn get_tenant(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match Tenant::find_by_id(id).one(&db).await {
        Ok(Some(model)) => {
            Json(serde_json::json!({"tenant": TenantDto::from(model)})).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Tenant not found"})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Database error: {}", e)})),
        )
            .into_response(),
    }
}

pub async fn create_tenant(
    State(db): State<DatabaseConnection>,
    Json(dto): Json<TenantDto>,
) -> impl IntoResponse {
    let now = chrono::Utc::now().to_rfc3339();

    let new_tenant = tenant::ActiveModel {
        site_id: Set(dto.site_id.unwrap_or_else(|| "default".to_string())),
        name: Set(dto.name),
        first_name: Set(dto.first_name),
        email: Set(dto.email),
        phone: Set(dto.phone),
        emergency_contact: Set(dto.emergency_contact),
        notes: Set(dto.notes),
        is_active: Set(dto.is_active),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    match new_tenant.insert(&db).await {
        Ok(model) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "tenant": TenantDto::from(model),
                "message": "Tenant created successfully"
            })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Failed to create tenant: {}", e)})),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTenantDto {
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub emergency_contact: Option<String>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn update_tenant(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(dto): Json<UpdateTenantDto>,
) -> impl IntoResponse {
    let model = Tenant::find_by_id(id).one(&db).await.unwrap_or(None);

    if let Some(model) = model {
        let mut active: tenant::ActiveModel = model.into();

        if let Some(name) = dto.name {
            active.name = Set(name);
        }
        if dto.first_name.is_some() {
            active.first_name = Set(dto.first_name);
        }
        if dto.email.is_some() {
            active.email = Set(dto.email);
        }
        if dto.phone.is_some() {
            active.phone = Set(dto.phone);
        }
        if dto.emergency_contact.is_some() {
            active.emergency_contact = Set(dto.emergency_contact);
        }
        if dto.notes.is_some() {
            active.notes = Set(dto.notes);
        }
        if let Some(is_active) = dto.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        match active.update(&db).await {
            Ok(model) => (
                StatusCode::OK,
                Json(serde_json::json!({
                    "tenant": TenantDto::from(model),
                    "message": "Tenant updated successfully"
                })),
            )
                .into_response(),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": format!("Failed to update tenant: {}", e)})),
            )
                .into_response(),
        }
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Tenant not found"})),
        )
            .into_response()
    }
}

// Soft delete - tenants keep their lease history
pub async fn delete_tenant(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let model = Tenant::find_by_id(id).one(&db).await.unwrap_or(None);

    if let Some(model) = model {
        let mut active: tenant::ActiveModel = model.into();
        active.is_active = Set(false);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        match active.update(&db).await {
            Ok(_) => (
                StatusCode::OK,
                Json(serde_json::json!({"message": "Tenant deleted successfully"})),
            )
                .into_response(),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": format!("Failed to delete tenant: {}", e)})),
            )
                .into_response(),
        }
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Tenant not found"})),
        )
            .into_response()
    }
}
