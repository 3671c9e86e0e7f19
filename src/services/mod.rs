pub mod application_service;
pub mod audit_service;
pub mod blob;
pub mod bulk_service;
pub mod lease_service;
pub mod screening;
