//! Comments exchange handler.
//!
//! | Operation | Request | Reply |
//! |-----------|---------|-------|
//! | `list-comments` | [`CommentsQuery`] | [`CommentList`] |
//! | `submit-comment` | [`CommentDraft`] | [`SubmitReceipt`] |

use crate::ports::CommentStore;
use async_trait::async_trait;
use serde_json::Value;
use shared_bus::{decode_request, encode_reply, ExchangeHandler};
use shared_types::{
    CommentDraft, CommentList, CommentsQuery, DomainError, Operation, SubmitReceipt,
};
use std::sync::Arc;
use tracing::info;

pub struct CommentsExchangeHandler {
    store: Arc<dyn CommentStore>,
}

impl CommentsExchangeHandler {
    pub fn new(store: Arc<dyn CommentStore>) -> Self {
        Self { store }
    }

    fn list(&self, payload: &Value) -> Result<Value, DomainError> {
        let CommentsQuery { id_news } = decode_request(payload)?;
        let comments = self.store.by_news(id_news)?;
        encode_reply(&CommentList { comments })
    }

    fn submit(&self, payload: &Value) -> Result<Value, DomainError> {
        let draft: CommentDraft = decode_request(payload)?;
        let news_id = draft.id_news;
        let id = self.store.insert(draft.into_comment(0))?;
        info!(comment_id = id, id_news = news_id, "Comment stored");
        encode_reply(&SubmitReceipt { id })
    }
}

#[async_trait]
impl ExchangeHandler for CommentsExchangeHandler {
    async fn handle(&self, operation: &Operation, payload: &Value) -> Result<Value, DomainError> {
        match operation {
            Operation::ListComments => self.list(payload),
            Operation::SubmitComment => self.submit(payload),
            other => Err(DomainError::InvalidPayload(format!(
                "comments backend does not serve {other}"
            ))),
        }
    }
}
