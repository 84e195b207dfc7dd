//! Adapters for the comments backend ports.

pub mod memory;

pub use memory::InMemoryCommentStore;
