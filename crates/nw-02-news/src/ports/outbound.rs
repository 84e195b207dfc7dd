//! # Outbound Ports (Driven Ports)
//!
//! Storage and feed access required by the news backend.

use crate::domain::{AppendOutcome, FeedError, FeedSource, StoreError};
use async_trait::async_trait;
use shared_types::{NewsItem, NewsPage, NewsPageQuery};

/// News storage.
///
/// Production wiring and tests both use `InMemoryNewsStore`. Calls are
/// synchronous and must be safe from many exchange handlers at once.
pub trait NewsStore: Send + Sync {
    /// One page of a rubric, newest first.
    fn page(&self, query: &NewsPageQuery) -> Result<NewsPage, StoreError>;

    /// A single item by id. `Ok(None)` when no such item exists.
    fn find(&self, id: i64) -> Result<Option<NewsItem>, StoreError>;

    /// Append items, skipping any whose link is already stored.
    ///
    /// Ids are assigned by the store; incoming ids are ignored.
    fn append(&self, items: Vec<NewsItem>) -> Result<AppendOutcome, StoreError>;
}

/// Downloads and normalizes one feed.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, source: &FeedSource) -> Result<Vec<NewsItem>, FeedError>;
}
