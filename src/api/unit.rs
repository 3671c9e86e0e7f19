use crate::models::unit::{self, Entity as Unit, UnitDto};
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
pub struct UnitsQuery {
    pub property_id: Option<i32>,
    pub status: Option<String>,
}

pub async fn list_units(
    State(db): State<DatabaseConnection>,
    Query(params): Query<UnitsQuery>,
) -> impl IntoResponse {
    let mut query = Unit::find();

    if let Some(property_id) = params.property_id {
        query = query.filter(unit::Column::PropertyId.eq(property_id));
    }

    if let Some(status) = params.status {
        query = query.filter(unit::Column::Status.eq(status));
    }

    match query.all(&db).await {
        Ok(units) => {
            let dtos: Vec<UnitDto> = units.into_iter().map(UnitDto::from).collect();
            Json(serde_json::json!({ "units": dtos, "total": dtos.len() })).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Database error: {}", e)})),
        )
            .into_response(),
    }
}

pub async fn get_property_units(
    State(db): State<DatabaseConnection>,
    Path(property_id): Path<i32>,
) -> impl IntoResponse {
    match Unit::find()
        .filter(unit::Column::PropertyId.eq(property_id))
        .all(&db)
        .await
    {
        Ok(units) => {
            let dtos: Vec<UnitDto> = units.into_iter().map(UnitDto::from).collect();
            Json(serde_json::json!({ "units": dtos, "total": dtos.len() })).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Database error: {}", e)})),
        )
            .into_response(),
    }
}

pub async fn get_unit(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match Unit::find_by_id(id).one(&db).await {
        Ok(Some(model)) => Json(serde_json::json!({"unit": UnitDto::from(model)})).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Unit not found"})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Database error: {}", e)})),
        )
            .into_response(),
    }
}

pub async fn create_unit(
    State(db): State<DatabaseConnection>,
    Json(dto): Json<UnitDto>,
) -> impl IntoResponse {
    let now = chrono::Utc::now().to_rfc3339();

    // The parent property has to exist, units never float free
    let property = crate::models::property::Entity::find_by_id(dto.property_id)
        .one(&db)
        .await
        .unwrap_or(None);
    if property.is_none() {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Property not found"})),
        )
            .into_response();
    }

    let new_unit = unit::ActiveModel {
        property_id: Set(dto.property_id),
        unit_number: Set(dto.unit_number),
        bedrooms: Set(dto.bedrooms),
        bathrooms: Set(dto.bathrooms),
        square_feet: Set(dto.square_feet),
        rent_amount: Set(dto.rent_amount),
        status: Set(dto.status.unwrap_or_else(|| "vacant".to_string())),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    match new_unit.insert(&db).await {
        Ok(model) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "unit": UnitDto::from(model),
                "message": "Unit created successfully"
            })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Failed to create unit: {}", e)})),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUnitDto {
    pub unit_number: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<f64>,
    pub square_feet: Option<i32>,
    pub rent_amount: Option<f64>,
    pub status: Option<String>,
}

pub async fn update_unit(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(dto): Json<UpdateUnitDto>,
) -> impl IntoResponse {
    let model = Unit::find_by_id(id).one(&db).await.unwrap_or(None);

    if let Some(model) = model {
        let mut active: unit::ActiveModel = model.into();

        if let Some(unit_number) = dto.unit_number {
            active.unit_number = Set(unit_number);
        }
        if let Some(bedrooms) = dto.bedrooms {
            active.bedrooms = Set(bedrooms);
        }
        if let Some(bathrooms) = dto.bathrooms {
            active.bathrooms = Set(bathrooms);
        }
        if dto.square_feet.is_some() {
            active.square_feet = Set(dto.square_feet);
        }
        if let Some(rent_amount) = dto.rent_amount {
            active.rent_amount = Set(rent_amount);
        }
        if let Some(status) = dto.status {
            active.status = Set(status);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        match active.update(&db).await {
            Ok(model) => (
                StatusCode::OK,
                Json(serde_json::json!({
                    "unit": UnitDto::from(model),
                    "message": "Unit updated successfully"
                })),
            )
                .into_response(),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": format!("Failed to update unit: {}", e)})),
            )
                .into_response(),
        }
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Unit not found"})),
        )
            .into_response()
    }
}

pub async fn delete_unit(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match Unit::delete_by_id(id).exec(&db).await {
        Ok(res) if res.rows_affected > 0 => (
            StatusCode::OK,
            Json(serde_json::json!({"message": "Unit deleted successfully"})),
        )
            .into_response(),
        Ok(_) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Unit not found"})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Failed to delete unit: {}", e)})),
        )
            .into_response(),
    }
}
