use thiserror::Error;

use crate::application::repos::RepoError;
use crate::domain::error::DomainError;

/// Failures surfaced by the application services; the HTTP layer maps these
/// onto status codes and the JSON error envelope.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::Domain(DomainError::not_found(entity))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Domain(DomainError::validation(message))
    }
}
