#![cfg_attr(test, allow(clippy::unwrap_used))]

//! # NW-03 Comments Backend
//!
//! Lists and stores reader comments for the gateway over the bus.
//!
//! ```text
//! comments.requests ──→ ExchangeLoop ──→ CommentsExchangeHandler ──→ CommentStore
//!                            │
//!                            ├─ list-comments  ──→ comments.list.replies
//!                            └─ submit-comment ──→ comments.submit.replies
//! ```
//!
//! Comments are listed newest first. Moderation happens before a comment
//! reaches this service; nothing here inspects content.

pub mod adapters;
pub mod domain;
pub mod ipc;
pub mod ports;

pub use adapters::InMemoryCommentStore;
pub use domain::StoreError;
pub use ipc::CommentsExchangeHandler;
pub use ports::CommentStore;
