use thiserror::Error;

use assetdesk_core::{DomainError, ValidationError};

/// Document store failure.
///
/// These are **infrastructure errors** (connectivity, encoding) as opposed to domain
/// errors (validation, integrity, lifecycle rules).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store query failed: {0}")]
    Query(String),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("stored document could not be decoded: {0}")]
    Decode(String),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Error returned by the orchestration services and repositories.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        ServiceError::Domain(value.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
