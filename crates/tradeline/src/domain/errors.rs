//! Domain Errors
//!
//! Error types for domain operations.

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Repository error: {0}")]
    Repository(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    /// The read surface was asked to aggregate over an empty store
    #[error("No calls found")]
    NoCalls,
}

impl DomainError {
    /// Whether this error comes from persistence and must fail the request
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::Repository(_))
    }
}
