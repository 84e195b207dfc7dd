//! # Topic Naming
//!
//! Every request and reply topic is named by environment configuration.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `NW_TOPIC_NEWS_REQUESTS` | `news.requests` |
//! | `NW_TOPIC_NEWS_PAGE_REPLIES` | `news.page.replies` |
//! | `NW_TOPIC_SINGLE_NEWS_REPLIES` | `news.single.replies` |
//! | `NW_TOPIC_COMMENT_REQUESTS` | `comments.requests` |
//! | `NW_TOPIC_COMMENT_LIST_REPLIES` | `comments.list.replies` |
//! | `NW_TOPIC_COMMENT_SUBMIT_REPLIES` | `comments.submit.replies` |
//! | `NW_TOPIC_MODERATION_REQUESTS` | `moderation.requests` |
//! | `NW_TOPIC_MODERATION_REPLIES` | `moderation.replies` |

use serde::{Deserialize, Serialize};
use shared_types::Operation;
use std::collections::HashMap;
use std::env;

/// Where an operation's request goes and where its reply comes back.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExchangeRoute {
    pub request_topic: String,
    pub reply_topic: String,
}

/// The full set of topic names used by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeTopics {
    pub news_requests: String,
    pub news_page_replies: String,
    pub single_news_replies: String,
    pub comment_requests: String,
    pub comment_list_replies: String,
    pub comment_submit_replies: String,
    pub moderation_requests: String,
    pub moderation_replies: String,
}

impl Default for ExchangeTopics {
    fn default() -> Self {
        Self {
            news_requests: "news.requests".to_string(),
            news_page_replies: "news.page.replies".to_string(),
            single_news_replies: "news.single.replies".to_string(),
            comment_requests: "comments.requests".to_string(),
            comment_list_replies: "comments.list.replies".to_string(),
            comment_submit_replies: "comments.submit.replies".to_string(),
            moderation_requests: "moderation.requests".to_string(),
            moderation_replies: "moderation.replies".to_string(),
        }
    }
}

/// Every operation that has a route.
const ROUTED_OPERATIONS: [Operation; 5] = [
    Operation::FetchNewsPage,
    Operation::FetchSingleNews,
    Operation::ListComments,
    Operation::SubmitComment,
    Operation::ModerateComment,
];

impl ExchangeTopics {
    /// Load topic names from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| env::var(name).ok())
    }

    /// Replace every topic whose variable `lookup` resolves.
    pub fn with_overrides(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str, current: String| lookup(name).unwrap_or(current);

        Self {
            news_requests: var("NW_TOPIC_NEWS_REQUESTS", self.news_requests),
            news_page_replies: var("NW_TOPIC_NEWS_PAGE_REPLIES", self.news_page_replies),
            single_news_replies: var("NW_TOPIC_SINGLE_NEWS_REPLIES", self.single_news_replies),
            comment_requests: var("NW_TOPIC_COMMENT_REQUESTS", self.comment_requests),
            comment_list_replies: var("NW_TOPIC_COMMENT_LIST_REPLIES", self.comment_list_replies),
            comment_submit_replies: var(
                "NW_TOPIC_COMMENT_SUBMIT_REPLIES",
                self.comment_submit_replies,
            ),
            moderation_requests: var("NW_TOPIC_MODERATION_REQUESTS", self.moderation_requests),
            moderation_replies: var("NW_TOPIC_MODERATION_REPLIES", self.moderation_replies),
        }
    }

    /// Route for an operation. `None` for unknown operations.
    pub fn route_for(&self, operation: &Operation) -> Option<ExchangeRoute> {
        let (request, reply) = match operation {
            Operation::FetchNewsPage => (&self.news_requests, &self.news_page_replies),
            Operation::FetchSingleNews => (&self.news_requests, &self.single_news_replies),
            Operation::ListComments => (&self.comment_requests, &self.comment_list_replies),
            Operation::SubmitComment => (&self.comment_requests, &self.comment_submit_replies),
            Operation::ModerateComment => (&self.moderation_requests, &self.moderation_replies),
            Operation::Unknown(_) => return None,
        };
        Some(ExchangeRoute {
            request_topic: request.clone(),
            reply_topic: reply.clone(),
        })
    }

    /// Operation → reply topic table for the backend consuming `request_topic`.
    pub fn reply_routes(&self, request_topic: &str) -> HashMap<Operation, String> {
        ROUTED_OPERATIONS
            .iter()
            .filter_map(|op| {
                let route = self.route_for(op)?;
                (route.request_topic == request_topic).then(|| (op.clone(), route.reply_topic))
            })
            .collect()
    }

    /// Distinct reply topics, one Reply Router each.
    pub fn reply_topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = ROUTED_OPERATIONS
            .iter()
            .filter_map(|op| self.route_for(op).map(|r| r.reply_topic))
            .collect();
        topics.sort();
        topics.dedup();
        topics
    }
}
