//! # Shared Bus - Topic Bus for Correlated Exchanges
//!
//! Every service talks to every other service through named topics only.
//! Requests and replies are [`shared_types::Envelope`]s serialized into
//! [`BusMessage`]s.
//!
//! ## Exchange Pattern
//!
//! ```text
//! ┌──────────────┐  publish(request topic)   ┌──────────────────┐
//! │   Gateway    │ ────────────────────────→ │  Exchange Loop   │
//! │ (dispatcher) │                           │  (news/comments/ │
//! │              │ ←──────────────────────── │   moderation)    │
//! └──────────────┘  publish(reply topic)     └──────────────────┘
//! ```
//!
//! ## Delivery Guarantees
//!
//! - Per-topic delivery is reliable and ordered for each subscriber.
//! - Every subscriber of a topic receives every message published after it
//!   subscribed.
//! - Messages published to a topic with no subscribers are dropped.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod message;
pub mod publisher;
pub mod responder;
pub mod subscriber;
pub mod topics;

pub use message::BusMessage;
pub use publisher::{BusError, BusPublisher, InMemoryBus};
pub use responder::{
    decode_request, encode_reply, ExchangeHandler, ExchangeLoop, LoopStats, MessageOutcome,
    MessageStage,
};
pub use subscriber::{BusSubscriber, MessageStream, Subscription};
pub use topics::{ExchangeRoute, ExchangeTopics};

/// Maximum messages to buffer per subscriber before publishers wait.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
