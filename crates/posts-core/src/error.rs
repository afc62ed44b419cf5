//! Domain-level error types.

use thiserror::Error;

use crate::marshal::MarshalError;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DomainError {
    pub fn post_not_found(id: impl Into<String>) -> Self {
        DomainError::NotFound {
            entity_type: "post",
            id: id.into(),
        }
    }
}

/// Store-level errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store write failed: {0}")]
    Write(String),

    #[error("Store read failed: {0}")]
    Read(String),

    #[error("Item marshaling failed: {0}")]
    Marshal(String),
}

impl From<MarshalError> for StoreError {
    fn from(err: MarshalError) -> Self {
        StoreError::Marshal(err.to_string())
    }
}

impl From<MarshalError> for DomainError {
    fn from(err: MarshalError) -> Self {
        DomainError::Store(err.into())
    }
}
