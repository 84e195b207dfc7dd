//! Composite Workflow Executor.
//!
//! Turns one HTTP endpoint into one or more dispatcher calls:
//!
//! - **news page**: a single exchange, reply payload returned verbatim
//! - **detailed news**: single news AND its comments, issued concurrently;
//!   succeeds when at least one side does
//! - **submit comment**: moderation THEN persist; a refusal short-circuits and
//!   persist is never issued
//!
//! Each sub-call has its own deadline, so a fan-out is bounded by the slowest
//! sub-call and a gated sequence by the sum of both.

use crate::domain::request_id::RequestId;
use crate::ipc::dispatcher::{CorrelationDispatcher, ExchangeRequest};
use serde::{Deserialize, Serialize};
use shared_types::{
    Comment, CommentDraft, CommentList, CommentsQuery, CorrelationId, Envelope, ExchangeError,
    NewsItem, NewsList, NewsPageQuery, Operation, SingleNewsQuery, SubmitReceipt,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Failure of a whole workflow.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    /// Backend replied with the not-ok sentinel.
    #[error("{0} replied not-ok")]
    NotOk(Operation),

    /// Moderation refused the comment.
    #[error("comment rejected by moderation")]
    Rejected,

    /// Every sub-exchange of a fan-out failed.
    #[error("all sub-exchanges failed")]
    AllFailed,
}

/// Response body of the detailed news endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedNews {
    pub news: Vec<NewsItem>,
    pub comments: Vec<Comment>,
    #[serde(rename = "idNews")]
    pub id_news: i64,
}

pub struct WorkflowExecutor {
    dispatcher: Arc<CorrelationDispatcher>,
}

impl WorkflowExecutor {
    pub fn new(dispatcher: Arc<CorrelationDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Arc<CorrelationDispatcher> {
        &self.dispatcher
    }

    /// Fetch one page of news. The backend payload is returned untouched.
    #[instrument(skip_all, name = "news_page", fields(request_id = %request_id, rubric = %query.rubric))]
    pub async fn news_page(
        &self,
        request_id: &RequestId,
        query: NewsPageQuery,
    ) -> Result<serde_json::Value, WorkflowError> {
        let reply = self.exchange(request_id, Operation::FetchNewsPage, &query).await?;
        ensure_ok(&reply)?;
        Ok(reply.payload)
    }

    /// Fetch a news item and its comments concurrently.
    #[instrument(skip_all, name = "news_detailed", fields(request_id = %request_id, id_news = id_news))]
    pub async fn news_detailed(
        &self,
        request_id: &RequestId,
        id_news: i64,
    ) -> Result<DetailedNews, WorkflowError> {
        let (news, comments) = tokio::join!(
            self.fetch_single_news(request_id, id_news),
            self.fetch_comments(request_id, id_news),
        );

        if let Err(e) = &news {
            warn!(error = %e, "Single news exchange failed");
        }
        if let Err(e) = &comments {
            warn!(error = %e, "Comments exchange failed");
        }

        match (news, comments) {
            (Err(_), Err(_)) => Err(WorkflowError::AllFailed),
            (news, comments) => Ok(DetailedNews {
                news: news.unwrap_or_default(),
                comments: comments.unwrap_or_default(),
                id_news,
            }),
        }
    }

    /// Moderate, then persist, a new comment.
    #[instrument(skip_all, name = "submit_comment", fields(request_id = %request_id, id_news = draft.id_news))]
    pub async fn submit_comment(
        &self,
        request_id: &RequestId,
        draft: CommentDraft,
    ) -> Result<SubmitReceipt, WorkflowError> {
        let verdict = self
            .exchange(request_id, Operation::ModerateComment, &draft)
            .await?;
        if !verdict.status.is_ok() {
            info!("Comment rejected by moderation, not persisting");
            return Err(WorkflowError::Rejected);
        }

        let stored = self.exchange(request_id, Operation::SubmitComment, &draft).await?;
        ensure_ok(&stored)?;
        let receipt: SubmitReceipt = stored.decode_payload()?;
        info!(comment_id = receipt.id, "Comment stored");
        Ok(receipt)
    }

    async fn fetch_single_news(
        &self,
        request_id: &RequestId,
        id_news: i64,
    ) -> Result<Vec<NewsItem>, WorkflowError> {
        let reply = self
            .exchange(request_id, Operation::FetchSingleNews, &SingleNewsQuery { id_news })
            .await?;
        ensure_ok(&reply)?;
        let list: NewsList = reply.decode_payload()?;
        Ok(list.news)
    }

    async fn fetch_comments(
        &self,
        request_id: &RequestId,
        id_news: i64,
    ) -> Result<Vec<Comment>, WorkflowError> {
        let reply = self
            .exchange(request_id, Operation::ListComments, &CommentsQuery { id_news })
            .await?;
        ensure_ok(&reply)?;
        let list: CommentList = reply.decode_payload()?;
        Ok(list.comments)
    }

    async fn exchange<P: Serialize>(
        &self,
        request_id: &RequestId,
        operation: Operation,
        payload: &P,
    ) -> Result<Envelope, WorkflowError> {
        let payload =
            serde_json::to_value(payload).map_err(|e| ExchangeError::Encode(e.to_string()))?;
        let correlation_id = CorrelationId::derive(request_id.as_str(), &operation);
        let request = ExchangeRequest::new(operation, payload).with_correlation_id(correlation_id);
        Ok(self.dispatcher.call(request).await?)
    }
}

fn ensure_ok(reply: &Envelope) -> Result<(), WorkflowError> {
    if reply.status.is_ok() {
        Ok(())
    } else {
        Err(WorkflowError::NotOk(reply.operation.clone()))
    }
}
