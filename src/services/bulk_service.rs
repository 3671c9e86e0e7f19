//! Bulk operation coordinator - one action across N applications, with
//! per-item failure isolation and a single auditable BulkAction record.
//!
//! Items are processed strictly sequentially in input-list order. If the
//! same id appears twice, the later occurrence wins (last-write-wins);
//! a parallel implementation would have to pick and document its own
//! merge policy for that collision.

use chrono::Utc;
use sea_orm::*;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::transitions::ApplicationStatus;
use crate::domain::DomainError;
use crate::models::application::{self, Entity as Application};
use crate::models::bulk_action::{self, Entity as BulkAction};
use crate::services::application_service::{self, TransitionRequest};
use crate::services::audit_service;

pub const MAX_BULK_IDS: usize = 100;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BulkActionType {
    Approve,
    Reject,
    RequestDocuments,
    SendEmail,
    GenerateDocument,
    Export,
}

impl BulkActionType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approve" => Some(BulkActionType::Approve),
            "reject" => Some(BulkActionType::Reject),
            "request_documents" => Some(BulkActionType::RequestDocuments),
            "send_email" => Some(BulkActionType::SendEmail),
            "generate_document" => Some(BulkActionType::GenerateDocument),
            "export" => Some(BulkActionType::Export),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BulkActionType::Approve => "approve",
            BulkActionType::Reject => "reject",
            BulkActionType::RequestDocuments => "request_documents",
            BulkActionType::SendEmail => "send_email",
            BulkActionType::GenerateDocument => "generate_document",
            BulkActionType::Export => "export",
        }
    }

    /// Target status for the status-changing actions
    fn target_status(&self) -> Option<ApplicationStatus> {
        match self {
            BulkActionType::Approve => Some(ApplicationStatus::Approved),
            BulkActionType::Reject => Some(ApplicationStatus::Rejected),
            BulkActionType::RequestDocuments => Some(ApplicationStatus::DocumentsPending),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkItemResult {
    pub id: i32,
    pub status: String, // 'success' | 'failed'
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOutcome {
    pub bulk_action_id: String,
    pub action_type: String,
    pub success_count: i32,
    pub failure_count: i32,
    pub results: Vec<BulkItemResult>,
}

/// Pre-validation gate. Nothing is processed, and no BulkAction row is
/// created, until the whole request passes.
pub fn validate_request(ids: &[i32], action: &str) -> Result<BulkActionType, DomainError> {
    if ids.is_empty() {
        return Err(DomainError::Validation(
            "No application ids provided".to_string(),
        ));
    }
    if ids.len() > MAX_BULK_IDS {
        return Err(DomainError::Validation(format!(
            "Too many applications: {} (maximum {})",
            ids.len(),
            MAX_BULK_IDS
        )));
    }
    BulkActionType::parse(action).ok_or_else(|| {
        DomainError::Validation(format!("Unknown bulk action '{}'", action))
    })
}

async fn create_bulk_record(
    db: &DatabaseConnection,
    action: BulkActionType,
    count: usize,
    params: &Option<Value>,
    actor: &str,
) -> Result<bulk_action::Model, DomainError> {
    let record = bulk_action::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        performed_by: Set(actor.to_owned()),
        action_type: Set(action.as_str().to_owned()),
        application_count: Set(count as i32),
        success_count: Set(0),
        failure_count: Set(0),
        params: Set(params.as_ref().map(|p| p.to_string())),
        created_at: Set(Utc::now().to_rfc3339()),
    };
    Ok(record.insert(db).await?)
}

/// The single finalizing write with the end-of-run tally.
async fn finalize_bulk_record(
    db: &DatabaseConnection,
    bulk_id: &str,
    success: i32,
    failure: i32,
) -> Result<(), DomainError> {
    BulkAction::update_many()
        .col_expr(
            bulk_action::Column::SuccessCount,
            sea_orm::sea_query::Expr::value(success),
        )
        .col_expr(
            bulk_action::Column::FailureCount,
            sea_orm::sea_query::Expr::value(failure),
        )
        .filter(bulk_action::Column::Id.eq(bulk_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Execute one mutating bulk action (everything except `export`).
pub async fn run_bulk(
    db: &DatabaseConnection,
    ids: Vec<i32>,
    action: BulkActionType,
    params: Option<Value>,
    actor: &str,
) -> Result<BulkOutcome, DomainError> {
    let bulk = create_bulk_record(db, action, ids.len(), &params, actor).await?;

    let mut results = Vec::with_capacity(ids.len());
    for id in &ids {
        match apply_one(db, *id, action, actor, &bulk.id).await {
            // Successful status transitions audit themselves inside
            // transition_application, linked via the bulk id.
            Ok(()) => results.push(BulkItemResult {
                id: *id,
                status: "success".to_string(),
                error: None,
            }),
            Err(e) => {
                tracing::warn!("Bulk {} item {} failed: {}", action.as_str(), id, e);
                audit_service::log_audit(
                    db,
                    "application",
                    *id,
                    &format!("bulk_{}_failed", action.as_str()),
                    actor,
                    Some(&bulk.id),
                    Some(serde_json::json!({ "error": e.to_string() })),
                )
                .await;
                results.push(BulkItemResult {
                    id: *id,
                    status: "failed".to_string(),
                    error: Some(e.to_string()),
                });
            }
        }
    }

    let success = results.iter().filter(|r| r.status == "success").count() as i32;
    let failure = results.len() as i32 - success;
    finalize_bulk_record(db, &bulk.id, success, failure).await?;

    tracing::info!(
        "Bulk {} finished: {} ok, {} failed ({})",
        action.as_str(),
        success,
        failure,
        bulk.id
    );

    Ok(BulkOutcome {
        bulk_action_id: bulk.id,
        action_type: action.as_str().to_string(),
        success_count: success,
        failure_count: failure,
        results,
    })
}

async fn apply_one(
    db: &DatabaseConnection,
    id: i32,
    action: BulkActionType,
    actor: &str,
    bulk_id: &str,
) -> Result<(), DomainError> {
    match action.target_status() {
        Some(target) => {
            application_service::transition_application(
                db,
                id,
                TransitionRequest {
                    to: target.as_str().to_string(),
                    ..Default::default()
                },
                actor,
                Some(bulk_id),
            )
            .await?;
            Ok(())
        }
        None => {
            // Stub actions: the capability is not wired up yet, so every
            // item reports as failed (and is audited by the caller).
            Err(DomainError::Validation(format!(
                "'{}' capability is not configured",
                action.as_str()
            )))
        }
    }
}

/// The export path: no entity mutation. A CSV artifact is built from the
/// validated selection and the bulk action is finalized as fully
/// successful in one step.
pub async fn export_applications(
    db: &DatabaseConnection,
    ids: Vec<i32>,
    actor: &str,
) -> Result<(String, Vec<u8>), DomainError> {
    let bulk = create_bulk_record(db, BulkActionType::Export, ids.len(), &None, actor).await?;

    let apps = Application::find()
        .filter(application::Column::Id.is_in(ids.clone()))
        .order_by_asc(application::Column::Id)
        .all(db)
        .await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "id",
            "applicantName",
            "email",
            "phone",
            "status",
            "screeningScore",
            "screeningLabel",
            "createdAt",
        ])
        .map_err(|e| DomainError::Internal(format!("CSV write failed: {}", e)))?;

    for app in &apps {
        writer
            .write_record([
                app.id.to_string(),
                app.applicant_name.clone(),
                app.email.clone().unwrap_or_default(),
                app.phone.clone().unwrap_or_default(),
                app.status.clone(),
                app.screening_score.map(|s| s.to_string()).unwrap_or_default(),
                app.screening_label.clone().unwrap_or_default(),
                app.created_at.clone(),
            ])
            .map_err(|e| DomainError::Internal(format!("CSV write failed: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DomainError::Internal(format!("CSV write failed: {}", e)))?;

    finalize_bulk_record(db, &bulk.id, ids.len() as i32, 0).await?;

    for id in &ids {
        audit_service::log_audit(
            db,
            "application",
            *id,
            "bulk_export",
            actor,
            Some(&bulk.id),
            None,
        )
        .await;
    }

    Ok((bulk.id, bytes))
}
