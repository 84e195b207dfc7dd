//! News backend error types.

use shared_types::DomainError;
use thiserror::Error;

/// Storage failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No news item has this id.
    #[error("news item {0} not found")]
    NotFound(i64),

    /// The store could not serve the request.
    #[error("news store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => DomainError::NotFound(err.to_string()),
            StoreError::Unavailable(_) => DomainError::Storage(err.to_string()),
        }
    }
}

/// Feed ingestion failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedError {
    /// The feed could not be downloaded.
    #[error("fetch {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    /// The document is not a readable RSS channel.
    #[error("parse {url} failed: {reason}")]
    Parse { url: String, reason: String },

    /// The feeds configuration is unusable.
    #[error("feeds config: {0}")]
    Config(String),
}
