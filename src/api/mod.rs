pub mod application;
pub mod audit;
pub mod bulk;
pub mod dashboard;
pub mod document;
pub mod export;
pub mod health;
pub mod lease;
pub mod property;
pub mod tenant;
pub mod unit;
pub mod work_order;

use axum::{
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};

use crate::auth;
use crate::db::AppState;
use crate::domain::DomainError;

// HTTP mapping for domain errors. The domain layer stays framework-free;
// this is the only place status codes are assigned.
impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            DomainError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": "validation_error", "message": self.to_string() }),
            ),
            DomainError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "error": "not_found", "message": self.to_string() }),
            ),
            DomainError::IllegalTransition { allowed, .. } => (
                StatusCode::CONFLICT,
                serde_json::json!({
                    "error": "illegal_transition",
                    "message": self.to_string(),
                    "allowedTransitions": allowed,
                }),
            ),
            DomainError::IncompleteChecklist { missing } => (
                StatusCode::CONFLICT,
                serde_json::json!({
                    "error": "incomplete_checklist",
                    "message": self.to_string(),
                    "missingSteps": missing,
                }),
            ),
            DomainError::Conflict(_) => (
                StatusCode::CONFLICT,
                serde_json::json!({ "error": "conflict", "message": self.to_string() }),
            ),
            DomainError::External(_) => (
                StatusCode::BAD_GATEWAY,
                serde_json::json!({ "error": "external_error", "message": self.to_string() }),
            ),
            DomainError::Database(msg) | DomainError::Internal(msg) => {
                tracing::error!("Unexpected error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({
                        "error": "internal_error",
                        "message": "An unexpected error occurred",
                    }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Properties
        .route(
            "/properties",
            get(property::list_properties).post(property::create_property),
        )
        .route(
            "/properties/:id",
            get(property::get_property)
                .put(property::update_property)
                .delete(property::delete_property),
        )
        .route("/properties/:id/units", get(unit::get_property_units))
        // Units
        .route("/units", get(unit::list_units).post(unit::create_unit))
        .route(
            "/units/:id",
            get(unit::get_unit).put(unit::update_unit).delete(unit::delete_unit),
        )
        // Tenants
        .route("/tenants", get(tenant::list_tenants).post(tenant::create_tenant))
        .route(
            "/tenants/:id",
            get(tenant::get_tenant)
                .put(tenant::update_tenant)
                .delete(tenant::delete_tenant),
        )
        // Leases
        .route("/leases", get(lease::list_leases).post(lease::create_lease))
        .route(
            "/leases/:id",
            get(lease::get_lease)
                .put(lease::update_lease)
                .delete(lease::delete_lease),
        )
        .route("/leases/:id/transition", post(lease::transition_lease))
        .route("/leases/:id/checklist", get(lease::get_checklist))
        .route(
            "/leases/:id/checklist/steps/:step_id",
            put(lease::update_checklist_step),
        )
        .route(
            "/leases/:id/complete-onboarding",
            post(lease::complete_onboarding),
        )
        // Applications (lead-to-lease pipeline)
        .route(
            "/applications",
            get(application::list_applications).post(application::create_application),
        )
        .route(
            "/applications/duplicates",
            get(application::find_duplicates),
        )
        .route(
            "/applications/bulk",
            post(bulk::run_bulk_action),
        )
        .route(
            "/applications/:id",
            get(application::get_application)
                .put(application::update_application)
                .delete(application::delete_application),
        )
        .route(
            "/applications/:id/transition",
            post(application::transition_application),
        )
        .route(
            "/applications/:id/evaluate",
            post(application::evaluate_application),
        )
        // Bulk actions (read side)
        .route("/bulk-actions", get(bulk::list_bulk_actions))
        .route("/bulk-actions/:id", get(bulk::get_bulk_action))
        // Work Orders
        .route(
            "/work-orders",
            get(work_order::list_work_orders).post(work_order::create_work_order),
        )
        .route(
            "/work-orders/:id",
            get(work_order::get_work_order)
                .put(work_order::update_work_order)
                .delete(work_order::delete_work_order),
        )
        // Documents
        .route(
            "/documents",
            get(document::list_documents).post(document::upload_document),
        )
        .route("/documents/signed/:id", get(document::download_signed))
        .route(
            "/documents/:id",
            get(document::get_document).delete(document::delete_document),
        )
        .route("/documents/:id/download", get(document::download_document))
        .route("/documents/:id/url", get(document::signed_url))
        // Transition history & audit trail
        .route(
            "/transitions/:entity_type/:id",
            get(audit::list_transitions),
        )
        .route(
            "/transitions/:entity_type/:id/latest",
            get(audit::latest_transition),
        )
        .route(
            "/transitions/:entity_type/:id/bypassed",
            get(audit::bypassed_transitions),
        )
        .route(
            "/transitions/:entity_type/:id/stats",
            get(audit::transition_stats),
        )
        .route("/audit", get(audit::list_audit_entries))
        // Dashboard
        .route("/dashboard/stats", get(dashboard::get_stats))
        // CSV exports
        .route("/export/leases", get(export::export_leases))
        .route("/export/applications", get(export::export_applications))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_internal_auth,
        ))
        .with_state(state)
}
