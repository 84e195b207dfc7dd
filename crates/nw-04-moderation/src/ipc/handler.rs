//! Moderation exchange handler.
//!
//! `moderate-comment` takes a [`CommentDraft`]. An acceptable comment gets an
//! ok reply with `{"allowed": true}`; a flagged one fails with
//! [`DomainError::Rejected`], which the exchange loop turns into a not-ok reply.

use crate::domain::Finding;
use crate::ports::ModerationClassifier;
use async_trait::async_trait;
use serde_json::Value;
use shared_bus::{decode_request, encode_reply, ExchangeHandler};
use shared_types::{CommentDraft, DomainError, ModerationVerdict, Operation};
use std::sync::Arc;
use tracing::info;

pub struct ModerationExchangeHandler {
    classifier: Arc<dyn ModerationClassifier>,
}

impl ModerationExchangeHandler {
    pub fn new(classifier: Arc<dyn ModerationClassifier>) -> Self {
        Self { classifier }
    }

    /// Check the author name, then the body.
    pub fn review(&self, draft: &CommentDraft) -> Option<Finding> {
        [("user_name", &draft.user_name), ("content", &draft.content)]
            .into_iter()
            .find_map(|(field, text)| {
                self.classifier
                    .offending_word(text)
                    .map(|word| Finding { field, word })
            })
    }
}

#[async_trait]
impl ExchangeHandler for ModerationExchangeHandler {
    async fn handle(&self, operation: &Operation, payload: &Value) -> Result<Value, DomainError> {
        if *operation != Operation::ModerateComment {
            return Err(DomainError::InvalidPayload(format!(
                "moderation backend does not serve {operation}"
            )));
        }

        let draft: CommentDraft = decode_request(payload)?;
        match self.review(&draft) {
            Some(finding) => {
                info!(id_news = draft.id_news, field = finding.field, "Comment flagged");
                Err(DomainError::Rejected(format!(
                    "{} contains a disallowed word",
                    finding.field
                )))
            }
            None => encode_reply(&ModerationVerdict { allowed: true }),
        }
    }
}
