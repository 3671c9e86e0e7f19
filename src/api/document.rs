use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use sea_orm::*;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db::AppState;
use crate::domain::DomainError;
use crate::models::document::{self, Entity as Document};
use crate::services::blob::{self, BlobStore};

const DEFAULT_URL_TTL_SECS: i64 = 300;
const MAX_URL_TTL_SECS: i64 = 86_400;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsQuery {
    pub entity_type: Option<String>,
    pub entity_id: Option<i32>,
    pub site_id: Option<String>,
}

pub async fn list_documents(
    State(state): State<AppState>,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<Json<Value>, DomainError> {
    let mut q = Document::find().order_by_desc(document::Column::CreatedAt);

    if let Some(entity_type) = query.entity_type {
        q = q.filter(document::Column::EntityType.eq(entity_type));
    }
    if let Some(entity_id) = query.entity_id {
        q = q.filter(document::Column::EntityId.eq(entity_id));
    }
    if let Some(site_id) = query.site_id {
        q = q.filter(document::Column::SiteId.eq(site_id));
    }

    let documents = q.all(&state.db).await?;
    let result: Vec<Value> = documents.into_iter().map(Value::from).collect();

    Ok(Json(json!({ "documents": result, "total": result.len() })))
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, DomainError> {
    let model = Document::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| DomainError::NotFound("Document".to_string()))?;

    Ok(Json(json!({ "document": Value::from(model) })))
}

/// Multipart upload: text fields describe the owning entity, the `file`
/// part carries the bytes. The metadata row is written first and rolled
/// back if the blob write fails, so a row never points at nothing.
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    let mut entity_type: Option<String> = None;
    let mut entity_id: Option<i32> = None;
    let mut site_id: Option<String> = None;
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DomainError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("entityType") => {
                entity_type = Some(field.text().await.map_err(|e| {
                    DomainError::Validation(format!("Invalid entityType field: {}", e))
                })?);
            }
            Some("entityId") => {
                let text = field.text().await.map_err(|e| {
                    DomainError::Validation(format!("Invalid entityId field: {}", e))
                })?;
                entity_id = Some(text.parse().map_err(|_| {
                    DomainError::Validation(format!("entityId must be an integer, got '{}'", text))
                })?);
            }
            Some("siteId") => {
                site_id = Some(field.text().await.map_err(|e| {
                    DomainError::Validation(format!("Invalid siteId field: {}", e))
                })?);
            }
            Some("file") => {
                let filename = field
                    .file_name()
                    .unwrap_or("upload.bin")
                    .to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    DomainError::Validation(format!("Failed to read file: {}", e))
                })?;
                file = Some((filename, content_type, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let entity_type = entity_type
        .ok_or_else(|| DomainError::Validation("entityType is required".to_string()))?;
    let entity_id =
        entity_id.ok_or_else(|| DomainError::Validation("entityId is required".to_string()))?;
    let (filename, content_type, bytes) =
        file.ok_or_else(|| DomainError::Validation("file is required".to_string()))?;

    let id = Uuid::new_v4().to_string();
    let blob_key = Uuid::new_v4().to_string();

    let record = document::ActiveModel {
        id: Set(id.clone()),
        site_id: Set(site_id.unwrap_or_else(|| "default".to_string())),
        entity_type: Set(entity_type),
        entity_id: Set(entity_id),
        filename: Set(filename),
        content_type: Set(content_type.clone()),
        size: Set(bytes.len() as i64),
        blob_key: Set(blob_key.clone()),
        created_at: Set(Utc::now().to_rfc3339()),
    };
    let saved = record.insert(&state.db).await?;

    if let Err(e) = state.blob.put(&blob_key, &bytes, &content_type).await {
        // Metadata must not outlive a failed blob write
        let _ = Document::delete_by_id(id.clone()).exec(&state.db).await;
        return Err(e);
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "document": Value::from(saved),
            "message": "Document uploaded successfully"
        })),
    ))
}

pub async fn download_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, DomainError> {
    let model = Document::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| DomainError::NotFound("Document".to_string()))?;

    let bytes = state.blob.get(&model.blob_key).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        model
            .content_type
            .parse()
            .unwrap_or_else(|_| "application/octet-stream".parse().unwrap()),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{}\"", model.filename)
            .parse()
            .map_err(|_| DomainError::Internal("Invalid filename header".to_string()))?,
    );

    Ok((StatusCode::OK, headers, bytes))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlQuery {
    pub ttl_seconds: Option<i64>,
}

/// Presigned-URL stand-in: a relative URL carrying an HMAC token instead
/// of a storage provider's signature.
pub async fn signed_url(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<SignedUrlQuery>,
) -> Result<Json<Value>, DomainError> {
    let model = Document::find_by_id(id.clone())
        .one(&state.db)
        .await?
        .ok_or_else(|| DomainError::NotFound("Document".to_string()))?;

    let ttl = query
        .ttl_seconds
        .unwrap_or(DEFAULT_URL_TTL_SECS)
        .clamp(1, MAX_URL_TTL_SECS);
    let expires_at = Utc::now().timestamp() + ttl;
    let sig = blob::sign_download(&state.config.download_secret, &model.id, expires_at);

    Ok(Json(json!({
        "url": format!(
            "/api/documents/signed/{}?expires={}&sig={}",
            model.id, expires_at, sig
        ),
        "expiresAt": expires_at,
    })))
}

#[derive(Debug, Deserialize)]
pub struct SignedDownloadQuery {
    pub expires: i64,
    pub sig: String,
}

pub async fn download_signed(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<SignedDownloadQuery>,
) -> Result<impl IntoResponse, DomainError> {
    if !blob::verify_download(&state.config.download_secret, &id, query.expires, &query.sig) {
        return Err(DomainError::Validation(
            "Invalid download signature".to_string(),
        ));
    }
    if Utc::now().timestamp() > query.expires {
        return Err(DomainError::Validation(
            "Download link has expired".to_string(),
        ));
    }

    let model = Document::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| DomainError::NotFound("Document".to_string()))?;

    let bytes = state.blob.get(&model.blob_key).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        model
            .content_type
            .parse()
            .unwrap_or_else(|_| "application/octet-stream".parse().unwrap()),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{}\"", model.filename)
            .parse()
            .map_err(|_| DomainError::Internal("Invalid filename header".to_string()))?,
    );

    Ok((StatusCode::OK, headers, bytes))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, DomainError> {
    let model = Document::find_by_id(id.clone())
        .one(&state.db)
        .await?
        .ok_or_else(|| DomainError::NotFound("Document".to_string()))?;

    state.blob.delete(&model.blob_key).await?;
    Document::delete_by_id(id).exec(&state.db).await?;

    Ok(Json(json!({ "message": "Document deleted successfully" })))
}
