//! Moderation errors.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModerationError {
    /// The word list could not be loaded.
    #[error("word list: {0}")]
    WordList(String),
}
