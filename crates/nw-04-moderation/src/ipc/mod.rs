//! Bus-facing side of the moderation backend.

pub mod handler;

pub use handler::ModerationExchangeHandler;
