#![cfg_attr(test, allow(clippy::unwrap_used))]

//! # NW-04 Moderation Backend
//!
//! Gatekeeper for new comments. The gateway asks here before it asks the
//! comments service to store anything.
//!
//! ```text
//! moderation.requests ──→ ExchangeLoop ──→ ModerationExchangeHandler
//!                                              │
//!                          ok {allowed:true} ◄─┴─► not-ok (flagged)
//! ```

pub mod adapters;
pub mod domain;
pub mod ipc;
pub mod ports;

pub use adapters::WordListClassifier;
pub use domain::{Finding, ModerationError};
pub use ipc::ModerationExchangeHandler;
pub use ports::ModerationClassifier;
