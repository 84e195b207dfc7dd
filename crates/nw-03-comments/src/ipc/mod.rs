//! Bus-facing side of the comments backend.

pub mod handler;

pub use handler::CommentsExchangeHandler;
