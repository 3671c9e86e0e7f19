//! Blob store collaborator - document/image bytes live here, metadata
//! rows stay in the database. Includes the signed-URL stand-in used for
//! direct download links.

use std::path::PathBuf;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::domain::DomainError;

type HmacSha256 = Hmac<Sha256>;

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str)
        -> Result<(), DomainError>;
    async fn get(&self, key: &str) -> Result<Vec<u8>, DomainError>;
    async fn delete(&self, key: &str) -> Result<(), DomainError>;
}

/// Filesystem-backed store. Keys are generated uuids, but the traversal
/// guard stays: a key must never escape the root directory.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| DomainError::Internal(format!("Blob root unavailable: {}", e)))?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, DomainError> {
        if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
            return Err(DomainError::Validation(format!("Invalid blob key '{}'", key)));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        _content_type: &str,
    ) -> Result<(), DomainError> {
        let path = self.path_for(key)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| DomainError::Internal(format!("Blob write failed: {}", e)))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, DomainError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DomainError::NotFound("Blob".to_string()))
            }
            Err(e) => Err(DomainError::Internal(format!("Blob read failed: {}", e))),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), DomainError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::Internal(format!("Blob delete failed: {}", e))),
        }
    }
}

/// MAC over `"{document_id}:{expires_at}"`, hex-encoded. Stands in for a
/// storage provider's presigned URL.
pub fn sign_download(secret: &[u8], document_id: &str, expires_at: i64) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(format!("{}:{}", document_id, expires_at).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time verification of a download token. Expiry is checked by
/// the caller against the clock; this only answers "was it us".
pub fn verify_download(secret: &[u8], document_id: &str, expires_at: i64, sig: &str) -> bool {
    let Ok(raw) = hex::decode(sig) else {
        return false;
    };
    let mut mac =
        HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(format!("{}:{}", document_id, expires_at).as_bytes());
    mac.verify_slice(&raw).is_ok()
}
