use crate::models::work_order::{self, Entity as WorkOrder, WorkOrderDto};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrdersQuery {
    pub site_id: Option<String>,
    pub unit_id: Option<i32>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

pub async fn list_work_orders(
    State(db): State<DatabaseConnection>,
    Query(params): Query<WorkOrdersQuery>,
) -> impl IntoResponse {
    let mut query = WorkOrder::find().order_by_desc(work_order::Column::CreatedAt);

    if let Some(site_id) = params.site_id {
        query = query.filter(work_order::Column::SiteId.eq(site_id));
    }
    if let Some(unit_id) = params.unit_id {
        query = query.filter(work_order::Column::UnitId.eq(unit_id));
    }
    if let Some(status) = params.status {
        query = query.filter(work_order::Column::Status.eq(status));
    }
    if let Some(priority) = params.priority {
        query = query.filter(work_order::Column::Priority.eq(priority));
    }

    match query.all(&db).await {
        Ok(orders) => {
            let dtos: Vec<WorkOrderDto> = orders.into_iter().map(WorkOrderDto::from).collect();
            Json(serde_json::json!({ "workOrders": dtos, "total": dtos.len() })).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Database error: {}", e)})),
        )
            .into_response(),
    }
}

pub async fn get_work_order(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match WorkOrder::find_by_id(id).one(&db).await {
        Ok(Some(model)) => {
            Json(serde_json::json!({"workOrder": WorkOrderDto::from(model)})).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Work order not found"})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Database error: {}", e)})),
        )
            .into_response(),
    }
}

pub async fn create_work_order(
    State(db): State<DatabaseConnection>,
    Json(dto): Json<WorkOrderDto>,
) -> impl IntoResponse {
    let now = chrono::Utc::now().to_rfc3339();

    let new_order = work_order::ActiveModel {
        site_id: Set(dto.site_id.unwrap_or_else(|| "default".to_string())),
        unit_id: Set(dto.unit_id),
        title: Set(dto.title),
        description: Set(dto.description),
        priority: Set(dto.priority.unwrap_or_else(|| "normal".to_string())),
        status: Set(dto.status.unwrap_or_else(|| "open".to_string())),
        reported_by: Set(dto.reported_by),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    match new_order.insert(&db).await {
        Ok(model) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "workOrder": WorkOrderDto::from(model),
                "message": "Work order created successfully"
            })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Failed to create work order: {}", e)})),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkOrderDto {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub reported_by: Option<String>,
}

pub async fn update_work_order(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(dto): Json<UpdateWorkOrderDto>,
) -> impl IntoResponse {
    let model = WorkOrder::find_by_id(id).one(&db).await.unwrap_or(None);

    if let Some(model) = model {
        let mut active: work_order::ActiveModel = model.into();

        if let Some(title) = dto.title {
            active.title = Set(title);
        }
        if dto.description.is_some() {
            active.description = Set(dto.description);
        }
        if let Some(priority) = dto.priority {
            active.priority = Set(priority);
        }
        if let Some(status) = dto.status {
            active.status = Set(status);
        }
        if dto.reported_by.is_some() {
            active.reported_by = Set(dto.reported_by);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        match active.update(&db).await {
            Ok(model) => (
                StatusCode::OK,
                Json(serde_json::json!({
                    "workOrder": WorkOrderDto::from(model),
                    "message": "Work order updated successfully"
                })),
            )
                .into_response(),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": format!("Failed to update work order: {}", e)})),
            )
                .into_response(),
        }
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Work order not found"})),
        )
            .into_response()
    }
}

pub async fn delete_work_order(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match WorkOrder::delete_by_id(id).exec(&db).await {
        Ok(res) if res.rows_affected > 0 => (
            StatusCode::OK,
            Json(serde_json::json!({"message": "Work order deleted successfully"})),
        )
            .into_response(),
        Ok(_) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Work order not found"})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Failed to delete work order: {}", e)})),
        )
            .into_response(),
    }
}
