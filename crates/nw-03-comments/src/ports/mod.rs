//! Ports of the comments backend.

pub mod outbound;

pub use outbound::CommentStore;
