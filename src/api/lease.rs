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
use crate::domain::checklist::ChecklistStep;
use crate::domain::DomainError;
use crate::models::lease::{self, Entity as Lease};
use crate::models::tenant::Entity as Tenant;
use crate::models::unit::{self, Entity as Unit};
use crate::services::lease_service::{self, TransitionRequest};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLeasesQuery {
    pub site_id: Option<String>,
    pub status: Option<String>,
    pub unit_id: Option<i32>,
    pub tenant_id: Option<i32>,
}

pub async fn list_leases(
    State(db): State<DatabaseConnection>,
    Query(query): Query<ListLeasesQuery>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let mut condition = Condition::all();

    if let Some(site_id) = query.site_id {
        condition = condition.add(lease::Column::SiteId.eq(site_id));
    }

    if let Some(status) = query.status {
        condition = condition.add(lease::Column::Status.eq(status));
    }

    if let Some(unit_id) = query.unit_id {
        condition = condition.add(lease::Column::UnitId.eq(unit_id));
    }

    if let Some(tenant_id) = query.tenant_id {
        condition = condition.add(lease::Column::TenantId.eq(tenant_id));
    }

    let leases_with_tenants = Lease::find()
        .filter(condition)
        .order_by_desc(lease::Column::StartDate)
        .find_also_related(Tenant)
        .all(&db)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    // Collect unit IDs to label each lease with its unit number
    let unit_ids: Vec<i32> = leases_with_tenants.iter().map(|(l, _)| l.unit_id).collect();

    let mut unit_map = std::collections::HashMap::new();

    if !unit_ids.is_empty() {
        let units = Unit::find()
            .filter(unit::Column::Id.is_in(unit_ids))
            .all(&db)
            .await
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

        for u in units {
            unit_map.insert(u.id, u.unit_number);
        }
    }

    let result: Vec<Value> = leases_with_tenants
        .into_iter()
        .map(|(l, tenant)| {
            let tenant_name = tenant
                .as_ref()
                .map(|t| t.name.clone())
                .unwrap_or_else(|| "Unknown".to_string());
            let unit_number = unit_map
                .get(&l.unit_id)
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string());

            let mut entry = Value::from(l);
            entry["tenantName"] = json!(tenant_name);
            entry["unitNumber"] = json!(unit_number);
            entry
        })
        .collect();

    Ok(Json(json!({ "leases": result })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeaseDto {
    pub site_id: Option<String>,
    pub unit_id: i32,
    pub tenant_id: i32,
    pub start_date: String,
    pub end_date: String,
    pub rent_amount: f64,
    pub deposit_amount: f64,
    pub notes: Option<String>,
    /// Override for the default onboarding checklist template
    pub checklist_steps: Option<Vec<ChecklistStep>>,
}

pub async fn create_lease(
    State(db): State<DatabaseConnection>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CreateLeaseDto>,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    let now = Utc::now().to_rfc3339();

    // 1. Both sides of the lease have to exist
    Unit::find_by_id(payload.unit_id)
        .one(&db)
        .await?
        .ok_or_else(|| DomainError::NotFound("Unit".to_string()))?;

    Tenant::find_by_id(payload.tenant_id)
        .one(&db)
        .await?
        .ok_or_else(|| DomainError::NotFound("Tenant".to_string()))?;

    // 2. Create the lease in draft
    let new_lease = lease::ActiveModel {
        site_id: Set(payload.site_id.unwrap_or_else(|| "default".to_string())),
        unit_id: Set(payload.unit_id),
        tenant_id: Set(payload.tenant_id),
        start_date: Set(payload.start_date),
        end_date: Set(payload.end_date),
        rent_amount: Set(payload.rent_amount),
        deposit_amount: Set(payload.deposit_amount),
        status: Set("draft".to_owned()),
        onboarding_pending: Set(false),
        notes: Set(payload.notes),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    let saved = new_lease.insert(&db).await?;

    // 3. Seed the onboarding checklist (default template unless overridden)
    let checklist =
        lease_service::create_checklist(&db, saved.id, payload.checklist_steps).await?;

    crate::services::audit_service::log_audit(
        &db,
        "lease",
        saved.id,
        "created",
        &actor.0,
        None,
        None,
    )
    .await;

    // Re-read: create_checklist flips onboarding_pending on the lease
    let saved = Lease::find_by_id(saved.id)
        .one(&db)
        .await?
        .ok_or_else(|| DomainError::NotFound("Lease".to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "lease": Value::from(saved),
            "checklist": checklist.to_json()?,
            "message": "Lease created successfully"
        })),
    ))
}

pub async fn get_lease(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    let model = Lease::find_by_id(id)
        .one(&db)
        .await?
        .ok_or_else(|| DomainError::NotFound("Lease".to_string()))?;

    let checklist = match lease_service::get_checklist(&db, id).await {
        Ok(c) => c.to_json()?,
        Err(DomainError::NotFound(_)) => Value::Null,
        Err(e) => return Err(e),
    };

    Ok(Json(json!({
        "lease": Value::from(model),
        "checklist": checklist,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeaseDto {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub rent_amount: Option<f64>,
    pub deposit_amount: Option<f64>,
    pub notes: Option<String>,
}

// Partial update of lease terms. Status is deliberately not writable
// here, it only moves through the transition endpoint.
pub async fn update_lease(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(dto): Json<UpdateLeaseDto>,
) -> Result<Json<Value>, DomainError> {
    let model = Lease::find_by_id(id)
        .one(&db)
        .await?
        .ok_or_else(|| DomainError::NotFound("Lease".to_string()))?;

    let mut active: lease::ActiveModel = model.into();

    if let Some(start_date) = dto.start_date {
        active.start_date = Set(start_date);
    }
    if let Some(end_date) = dto.end_date {
        active.end_date = Set(end_date);
    }
    if let Some(rent_amount) = dto.rent_amount {
        active.rent_amount = Set(rent_amount);
    }
    if let Some(deposit_amount) = dto.deposit_amount {
        active.deposit_amount = Set(deposit_amount);
    }
    if dto.notes.is_some() {
        active.notes = Set(dto.notes);
    }
    active.updated_at = Set(Utc::now().to_rfc3339());

    let updated = active.update(&db).await?;

    Ok(Json(json!({
        "lease": Value::from(updated),
        "message": "Lease updated successfully"
    })))
}

pub async fn delete_lease(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    let res = Lease::delete_by_id(id).exec(&db).await?;
    if res.rows_affected == 0 {
        return Err(DomainError::NotFound("Lease".to_string()));
    }
    Ok(Json(json!({ "message": "Lease deleted successfully" })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionDto {
    pub to_status: String,
    pub bypass_reason: Option<String>,
    pub bypass_category: Option<String>,
    #[serde(default)]
    pub confirmation_acknowledged: bool,
}

pub async fn transition_lease(
    State(db): State<DatabaseConnection>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
    Json(dto): Json<TransitionDto>,
) -> Result<Json<Value>, DomainError> {
    let (updated, record) = lease_service::transition_lease(
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
        "lease": Value::from(updated),
        "transition": Value::from(record),
        "message": "Lease status updated"
    })))
}

pub async fn get_checklist(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    let checklist = lease_service::get_checklist(&db, id).await?;
    Ok(Json(json!({ "checklist": checklist.to_json()? })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStepDto {
    pub completed: bool,
    pub notes: Option<String>,
}

pub async fn update_checklist_step(
    State(db): State<DatabaseConnection>,
    Path((id, step_id)): Path<(i32, String)>,
    Json(dto): Json<UpdateStepDto>,
) -> Result<Json<Value>, DomainError> {
    let checklist =
        lease_service::update_step(&db, id, &step_id, dto.completed, dto.notes).await?;
    Ok(Json(json!({
        "checklist": checklist.to_json()?,
        "message": "Checklist step updated"
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteOnboardingDto {
    pub set_active_status: Option<bool>,
}

pub async fn complete_onboarding(
    State(db): State<DatabaseConnection>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
    payload: Option<Json<CompleteOnboardingDto>>,
) -> Result<Json<Value>, DomainError> {
    let set_active = payload
        .and_then(|Json(p)| p.set_active_status)
        .unwrap_or(true);

    let updated = lease_service::complete_onboarding(&db, id, set_active, &actor.0).await?;

    Ok(Json(json!({
        "lease": Value::from(updated),
        "message": "Onboarding completed"
    })))
}
