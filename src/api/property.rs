use crate::models::property::{self, Entity as Property, PropertyDto};
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
pub struct PropertiesQuery {
    pub site_id: Option<String>,
    pub city: Option<String>,
}

// List properties with optional filters
pub async fn list_properties(
    State(db): State<DatabaseConnection>,
    Query(params): Query<PropertiesQuery>,
) -> impl IntoResponse {
    let mut query = Property::find();

    if let Some(site_id) = params.site_id {
        query = query.filter(property::Column::SiteId.eq(site_id));
    }

    if let Some(city) = params.city {
        query = query.filter(property::Column::City.eq(city));
    }

    match query.all(&db).await {
        Ok(properties) => {
            let dtos: Vec<PropertyDto> = properties.into_iter().map(PropertyDto::from).collect();
            Json(serde_json::json!({
                "properties": dtos,
                "total": dtos.len()
            }))
            .into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Database error: {}", e)})),
        )
            .into_response(),
    }
}

pub async fn get_property(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match Property::find_by_id(id).one(&db).await {
        Ok(Some(model)) => {
            Json(serde_json::json!({"property": PropertyDto::from(model)})).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Property not found"})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Database error: {}", e)})),
        )
            .into_response(),
    }
}

pub async fn create_property(
    State(db): State<DatabaseConnection>,
    Json(dto): Json<PropertyDto>,
) -> impl IntoResponse {
    let now = chrono::Utc::now().to_rfc3339();

    let new_property = property::ActiveModel {
        site_id: Set(dto.site_id.unwrap_or_else(|| "default".to_string())),
        name: Set(dto.name),
        address: Set(dto.address),
        city: Set(dto.city),
        state: Set(dto.state),
        postal_code: Set(dto.postal_code),
        notes: Set(dto.notes),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    match new_property.insert(&db).await {
        Ok(model) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "property": PropertyDto::from(model),
                "message": "Property created successfully"
            })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Failed to create property: {}", e)})),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePropertyDto {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub notes: Option<String>,
}

// Partial update. Columns come from this explicit field list, never from
// caller-supplied key names.
pub async fn update_property(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(dto): Json<UpdatePropertyDto>,
) -> impl IntoResponse {
    let model = Property::find_by_id(id).one(&db).await.unwrap_or(None);

    if let Some(model) = model {
        let mut active: property::ActiveModel = model.into();

        if let Some(name) = dto.name {
            active.name = Set(name);
        }
        if let Some(address) = dto.address {
            active.address = Set(address);
        }
        if let Some(city) = dto.city {
            active.city = Set(city);
        }
        if dto.state.is_some() {
            active.state = Set(dto.state);
        }
        if dto.postal_code.is_some() {
            active.postal_code = Set(dto.postal_code);
        }
        if dto.notes.is_some() {
            active.notes = Set(dto.notes);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        match active.update(&db).await {
            Ok(model) => (
                StatusCode::OK,
                Json(serde_json::json!({
                    "property": PropertyDto::from(model),
                    "message": "Property updated successfully"
                })),
            )
                .into_response(),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": format!("Failed to update property: {}", e)})),
            )
                .into_response(),
        }
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Property not found"})),
        )
            .into_response()
    }
}

pub async fn delete_property(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match Property::delete_by_id(id).exec(&db).await {
        Ok(res) if res.rows_affected > 0 => (
            StatusCode::OK,
            Json(serde_json::json!({"message": "Property deleted successfully"})),
        )
            .into_response(),
        Ok(_) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Property not found"})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Failed to delete property: {}", e)})),
        )
            .into_response(),
    }
}
