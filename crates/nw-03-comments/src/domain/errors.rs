//! Comment storage errors.

use shared_types::DomainError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The comment cannot be stored as given.
    #[error("invalid comment: {0}")]
    Invalid(String),

    #[error("comment store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Invalid(_) => DomainError::InvalidPayload(err.to_string()),
            StoreError::Unavailable(_) => DomainError::Storage(err.to_string()),
        }
    }
}
