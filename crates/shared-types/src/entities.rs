//! # Domain Entities
//!
//! News items, comments and the pagination descriptor. These are owned by the
//! backend stores and are immutable once they reach the wire.

use serde::{Deserialize, Serialize};

/// A published news item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NewsItem {
    pub id: i64,
    pub title: String,
    /// Body text (feed description)
    pub content: String,
    /// Unix seconds
    pub public_time: i64,
    pub image_link: String,
    pub rubric: String,
    /// Source link. Unique across the store.
    pub link: String,
    /// Title of the feed the item came from
    pub link_title: String,
}

/// A reader comment attached to a news item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Comment {
    pub id: i64,
    #[serde(rename = "id_news")]
    pub news_id: i64,
    /// Unix seconds, supplied by the client
    pub comment_time: i64,
    pub user_name: String,
    pub content: String,
}

/// Pagination descriptor returned with every news page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Paginate {
    /// Current page, 1-based
    pub page_curr: i64,
    /// Total number of pages
    pub page_count: i64,
    /// Page size
    pub page_count_list: i64,
    /// Total number of matching items
    pub page_count_total: i64,
}

impl Paginate {
    /// Compute the descriptor for `total` items split in pages of `page_size`.
    pub fn compute(page: i64, page_size: i64, total: i64) -> Self {
        let page_count = if page_size > 0 {
            // Rounds up without `total + page_size` overflowing near i64::MAX
            total / page_size + i64::from(total % page_size != 0)
        } else {
            0
        };
        Self {
            page_curr: page,
            page_count,
            page_count_list: page_size,
            page_count_total: total,
        }
    }

    /// Offset of the first item on the current page.
    pub fn offset(&self) -> usize {
        let skipped = (self.page_curr.max(1) - 1).saturating_mul(self.page_count_list);
        usize::try_from(skipped).unwrap_or(usize::MAX)
    }
}
