//! Adapters for the news backend ports.

pub mod http_feed;
pub mod memory;

pub use http_feed::{HttpFeedFetcher, FEED_FETCH_TIMEOUT};
pub use memory::InMemoryNewsStore;
