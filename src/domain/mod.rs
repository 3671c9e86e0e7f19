//! Domain layer - Pure business abstractions
//!
//! This layer contains NO framework dependencies (no SeaORM, no Axum).
//! Transition tables, checklist math and domain error types only.

pub mod checklist;
pub mod errors;
pub mod transitions;

pub use errors::DomainError;
pub use transitions::StatusDomain;
