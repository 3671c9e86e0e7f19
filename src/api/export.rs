use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
};
use sea_orm::*;

use crate::domain::DomainError;
use crate::models::application::{self, Entity as Application};
use crate::models::lease::{self, Entity as Lease};

fn csv_error(e: impl std::fmt::Display) -> DomainError {
    DomainError::Internal(format!("CSV write failed: {}", e))
}

fn attachment_headers(prefix: &str) -> Result<HeaderMap, DomainError> {
    let filename = format!("{}_{}.csv", prefix, chrono::Utc::now().format("%Y-%m-%d"));
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, "text/csv".parse().unwrap());
    headers.insert(
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{}\"", filename)
            .parse()
            .map_err(|_| DomainError::Internal("Invalid filename header".to_string()))?,
    );
    Ok(headers)
}

pub async fn export_leases(
    State(db): State<DatabaseConnection>,
) -> Result<impl IntoResponse, DomainError> {
    let leases = Lease::find()
        .order_by_asc(lease::Column::Id)
        .all(&db)
        .await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "id",
            "siteId",
            "unitId",
            "tenantId",
            "startDate",
            "endDate",
            "rentAmount",
            "depositAmount",
            "status",
            "onboardingPending",
            "createdAt",
        ])
        .map_err(csv_error)?;

    for l in &leases {
        writer
            .write_record([
                l.id.to_string(),
                l.site_id.clone(),
                l.unit_id.to_string(),
                l.tenant_id.to_string(),
                l.start_date.clone(),
                l.end_date.clone(),
                l.rent_amount.to_string(),
                l.deposit_amount.to_string(),
                l.status.clone(),
                l.onboarding_pending.to_string(),
                l.created_at.clone(),
            ])
            .map_err(csv_error)?;
    }

    let bytes = writer.into_inner().map_err(csv_error)?;
    Ok((StatusCode::OK, attachment_headers("leases")?, bytes))
}

pub async fn export_applications(
    State(db): State<DatabaseConnection>,
) -> Result<impl IntoResponse, DomainError> {
    let apps = Application::find()
        .order_by_asc(application::Column::Id)
        .all(&db)
        .await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "id",
            "siteId",
            "unitId",
            "applicantName",
            "email",
            "phone",
            "status",
            "screeningScore",
            "screeningLabel",
            "createdAt",
        ])
        .map_err(csv_error)?;

    for a in &apps {
        writer
            .write_record([
                a.id.to_string(),
                a.site_id.clone(),
                a.unit_id.map(|u| u.to_string()).unwrap_or_default(),
                a.applicant_name.clone(),
                a.email.clone().unwrap_or_default(),
                a.phone.clone().unwrap_or_default(),
                a.status.clone(),
                a.screening_score.map(|s| s.to_string()).unwrap_or_default(),
                a.screening_label.clone().unwrap_or_default(),
                a.created_at.clone(),
            ])
            .map_err(csv_error)?;
    }

    let bytes = writer.into_inner().map_err(csv_error)?;
    Ok((StatusCode::OK, attachment_headers("applications")?, bytes))
}
