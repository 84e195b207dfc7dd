//! # Operation Payloads
//!
//! The `payload` field of an [`crate::Envelope`] for each operation.
//!
//! | Operation | Request | Reply |
//! |-----------|---------|-------|
//! | `fetch-news-page` | [`NewsPageQuery`] | [`NewsPage`] |
//! | `fetch-single-news` | [`SingleNewsQuery`] | [`NewsList`] |
//! | `list-comments` | [`CommentsQuery`] | [`CommentList`] |
//! | `submit-comment` | [`CommentDraft`] | [`SubmitReceipt`] |
//! | `moderate-comment` | [`CommentDraft`] | [`ModerationVerdict`] |

use crate::entities::{Comment, NewsItem, Paginate};
use serde::{Deserialize, Serialize};

/// Page size used when a query asks for zero or fewer items.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NewsPageQuery {
    pub rubric: String,
    #[serde(alias = "count_news")]
    pub count: i64,
    /// Case-insensitive title substring. Empty matches everything.
    pub filter: String,
    pub page: i64,
}

impl NewsPageQuery {
    pub fn effective_count(&self) -> i64 {
        if self.count <= 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.count
        }
    }

    pub fn effective_page(&self) -> i64 {
        self.page.max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NewsPage {
    pub news: Vec<NewsItem>,
    pub paginate: Paginate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SingleNewsQuery {
    pub id_news: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NewsList {
    pub news: Vec<NewsItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CommentsQuery {
    pub id_news: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CommentList {
    pub comments: Vec<Comment>,
}

/// A comment that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CommentDraft {
    pub id_news: i64,
    pub comment_time: i64,
    pub user_name: String,
    pub content: String,
}

impl CommentDraft {
    pub fn into_comment(self, id: i64) -> Comment {
        Comment {
            id,
            news_id: self.id_news,
            comment_time: self.comment_time,
            user_name: self.user_name,
            content: self.content,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SubmitReceipt {
    pub id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ModerationVerdict {
    pub allowed: bool,
}
