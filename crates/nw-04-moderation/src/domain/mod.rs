//! Moderation domain.

pub mod errors;
pub mod verdict;

pub use errors::ModerationError;
pub use verdict::Finding;
