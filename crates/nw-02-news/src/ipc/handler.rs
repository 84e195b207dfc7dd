//! News exchange handler.
//!
//! | Operation | Request | Reply |
//! |-----------|---------|-------|
//! | `fetch-news-page` | [`NewsPageQuery`] | [`NewsPage`](shared_types::NewsPage) |
//! | `fetch-single-news` | [`SingleNewsQuery`] | [`NewsList`] with one item |

use crate::domain::StoreError;
use crate::ports::NewsStore;
use async_trait::async_trait;
use serde_json::Value;
use shared_bus::{decode_request, encode_reply, ExchangeHandler};
use shared_types::{DomainError, NewsList, NewsPageQuery, Operation, SingleNewsQuery};
use std::sync::Arc;
use tracing::debug;

pub struct NewsExchangeHandler {
    store: Arc<dyn NewsStore>,
}

impl NewsExchangeHandler {
    pub fn new(store: Arc<dyn NewsStore>) -> Self {
        Self { store }
    }

    fn news_page(&self, payload: &Value) -> Result<Value, DomainError> {
        let query: NewsPageQuery = decode_request(payload)?;
        let page = self.store.page(&query)?;
        debug!(
            rubric = %query.rubric,
            items = page.news.len(),
            total = page.paginate.page_count_total,
            "News page served"
        );
        encode_reply(&page)
    }

    fn single_news(&self, payload: &Value) -> Result<Value, DomainError> {
        let SingleNewsQuery { id_news } = decode_request(payload)?;
        let item = self
            .store
            .find(id_news)?
            .ok_or(StoreError::NotFound(id_news))?;
        encode_reply(&NewsList { news: vec![item] })
    }
}

#[async_trait]
impl ExchangeHandler for NewsExchangeHandler {
    async fn handle(&self, operation: &Operation, payload: &Value) -> Result<Value, DomainError> {
        match operation {
            Operation::FetchNewsPage => self.news_page(payload),
            Operation::FetchSingleNews => self.single_news(payload),
            other => Err(DomainError::InvalidPayload(format!(
                "news backend does not serve {other}"
            ))),
        }
    }
}
