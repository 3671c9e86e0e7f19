//! Thin proxy client for the external applicant-screening service.
//! The service returns an opaque score/label/flags verdict; how it
//! scores is not this system's business.

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::models::application;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningOutcome {
    pub score: i32,
    pub label: String,
    #[serde(default)]
    pub flags: Vec<String>,
}

#[derive(Clone)]
pub struct ScreeningClient {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl ScreeningClient {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub async fn evaluate(
        &self,
        app: &application::Model,
    ) -> Result<ScreeningOutcome, DomainError> {
        let base = self.base_url.as_deref().ok_or_else(|| {
            DomainError::External("Screening service is not configured".to_string())
        })?;

        let url = format!("{}/v1/screenings", base.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "applicantName": app.applicant_name,
                "email": app.email,
                "phone": app.phone,
                "unitId": app.unit_id,
            }))
            .send()
            .await
            .map_err(|e| DomainError::External(format!("Screening request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(DomainError::External(format!(
                "Screening service returned {}",
                response.status()
            )));
        }

        response
            .json::<ScreeningOutcome>()
            .await
            .map_err(|e| DomainError::External(format!("Screening response invalid: {}", e)))
    }
}
