//! HTTP feed fetcher.

use crate::domain::{FeedError, FeedSource};
use crate::ingest::normalize::parse_channel;
use crate::ports::FeedFetcher;
use async_trait::async_trait;
use shared_types::NewsItem;
use std::time::Duration;
use tracing::debug;

/// Deadline for downloading one feed.
pub const FEED_FETCH_TIMEOUT: Duration = Duration::from_secs(3);

/// Fetches RSS over HTTP with a shared, pooled client.
pub struct HttpFeedFetcher {
    client: reqwest::Client,
}

impl HttpFeedFetcher {
    pub fn new() -> Result<Self, FeedError> {
        Self::with_timeout(FEED_FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("newswire/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FeedError::Config(format!("http client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, source: &FeedSource) -> Result<Vec<NewsItem>, FeedError> {
        let fetch_error = |e: reqwest::Error| FeedError::Fetch {
            url: source.url.clone(),
            reason: e.to_string(),
        };

        let body = self
            .client
            .get(&source.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(fetch_error)?
            .bytes()
            .await
            .map_err(fetch_error)?;

        debug!(url = %source.url, bytes = body.len(), "Feed downloaded");
        parse_channel(&body, source)
    }
}
