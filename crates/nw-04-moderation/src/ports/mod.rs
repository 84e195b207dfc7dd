//! Ports of the moderation backend.

pub mod outbound;

pub use outbound::ModerationClassifier;
