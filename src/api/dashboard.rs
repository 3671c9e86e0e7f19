use axum::{extract::State, Json};
use futures::future::try_join_all;
use sea_orm::*;
use serde_json::{json, Value};

use crate::domain::DomainError;
use crate::models::application::{self, Entity as Application};
use crate::models::lease::{self, Entity as Lease};
use crate::models::property::Entity as Property;
use crate::models::tenant::{self, Entity as Tenant};
use crate::models::unit::Entity as Unit;
use crate::models::work_order::{self, Entity as WorkOrder};

const APPLICATION_STATUSES: &[&str] = &[
    "new",
    "contacted",
    "tour_scheduled",
    "documents_pending",
    "under_review",
    "approved",
    "rejected",
    "converted",
];

pub async fn get_stats(State(db): State<DatabaseConnection>) -> Result<Json<Value>, DomainError> {
    let (properties, units, tenants, active_leases, onboarding_leases, open_work_orders) =
        futures::try_join!(
            Property::find().count(&db),
            Unit::find().count(&db),
            Tenant::find()
                .filter(tenant::Column::IsActive.eq(true))
                .count(&db),
            Lease::find()
                .filter(lease::Column::Status.eq("active"))
                .count(&db),
            Lease::find()
                .filter(lease::Column::OnboardingPending.eq(true))
                .count(&db),
            WorkOrder::find()
                .filter(work_order::Column::Status.eq("open"))
                .count(&db),
        )?;

    let pipeline_counts = try_join_all(APPLICATION_STATUSES.iter().map(|status| {
        Application::find()
            .filter(application::Column::Status.eq(*status))
            .count(&db)
    }))
    .await?;

    let mut pipeline = serde_json::Map::new();
    for (status, count) in APPLICATION_STATUSES.iter().zip(pipeline_counts) {
        pipeline.insert(status.to_string(), json!(count));
    }

    Ok(Json(json!({
        "properties": properties,
        "units": units,
        "activeTenants": tenants,
        "activeLeases": active_leases,
        "onboardingLeases": onboarding_leases,
        "openWorkOrders": open_work_orders,
        "applicationPipeline": pipeline,
    })))
}
