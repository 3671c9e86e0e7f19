//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.
//! The HTTP mapping lives in the API layer.

use std::fmt;

#[derive(Debug)]
pub enum DomainError {
    /// Missing or malformed input - caller's fault, not retried
    Validation(String),
    /// Entity, checklist or transition absent
    NotFound(String),
    /// Proposed transition is outside the adjacency table.
    /// Carries the legal next states so the caller can self-correct.
    IllegalTransition {
        from: String,
        to: String,
        allowed: Vec<String>,
    },
    /// Onboarding completion attempted with required steps outstanding
    IncompleteChecklist { missing: usize },
    /// Optimistic concurrency check failed - the entity moved underneath us
    Conflict(String),
    /// Database/persistence error
    Database(String),
    /// External service error
    External(String),
    /// Generic internal error
    Internal(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::Validation(msg) => write!(f, "Validation error: {}", msg),
            DomainError::NotFound(what) => write!(f, "{} not found", what),
            DomainError::IllegalTransition { from, to, allowed } => write!(
                f,
                "Illegal transition from '{}' to '{}'. Allowed: [{}]",
                from,
                to,
                allowed.join(", ")
            ),
            DomainError::IncompleteChecklist { missing } => write!(
                f,
                "Cannot complete onboarding: {} required step(s) incomplete",
                missing
            ),
            DomainError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            DomainError::Database(msg) => write!(f, "Database error: {}", msg),
            DomainError::External(msg) => write!(f, "External service error: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

// Conversion from SeaORM errors (used in the service layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Database(e.to_string())
    }
}

// JSON columns (checklist steps, bulk params, audit diffs)
impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::Internal(format!("JSON column decode failed: {}", e))
    }
}
