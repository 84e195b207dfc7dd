//! Ports of the news backend.

pub mod outbound;

pub use outbound::{FeedFetcher, NewsStore};
