//! HTTP input parsing and validation.
//!
//! Everything here runs before any exchange is attempted. Failures are
//! [`ApiError::Validation`] and map to 400.

use crate::domain::error::ApiError;
use serde::Deserialize;
use shared_types::{CommentDraft, NewsPageQuery};

/// Filter value some clients send when the field is unset.
const UNDEFINED_FILTER: &str = "undefined";

/// Query string of `GET /news/{rubric}/{count}`.
#[derive(Debug, Default, Deserialize)]
pub struct NewsPageParams {
    pub filter: Option<String>,
    pub page: Option<String>,
}

impl NewsPageParams {
    /// Combine path and query into a backend query.
    pub fn into_query(self, rubric: String, count: &str) -> Result<NewsPageQuery, ApiError> {
        let count = parse_int("count", count)?;

        let page = match self.page.as_deref().map(str::trim) {
            None | Some("") => 1,
            Some(raw) => parse_int("page", raw)?,
        };
        if page < 1 {
            return Err(ApiError::validation("page must be at least 1"));
        }

        let filter = match self.filter {
            Some(f) if f != UNDEFINED_FILTER => f,
            _ => String::new(),
        };

        Ok(NewsPageQuery {
            rubric,
            count,
            filter,
            page,
        })
    }
}

/// Query string carrying a news id (`GET /newsDetailed`, `POST /comments`).
#[derive(Debug, Default, Deserialize)]
pub struct NewsIdParams {
    pub id_news: Option<String>,
}

impl NewsIdParams {
    /// Missing id reads as 0.
    pub fn id_news(&self) -> Result<i64, ApiError> {
        match self.id_news.as_deref().map(str::trim) {
            None | Some("") => Ok(0),
            Some(raw) => parse_int("id_news", raw),
        }
    }
}

/// JSON body of `POST /comments`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CommentBody {
    pub comment_time: i64,
    pub user_name: String,
    pub content: String,
}

impl CommentBody {
    pub fn parse(bytes: &[u8]) -> Result<Self, ApiError> {
        serde_json::from_slice(bytes)
            .map_err(|e| ApiError::validation(format!("malformed comment body: {e}")))
    }

    pub fn into_draft(self, id_news: i64) -> CommentDraft {
        CommentDraft {
            id_news,
            comment_time: self.comment_time,
            user_name: self.user_name,
            content: self.content,
        }
    }
}

fn parse_int(name: &str, raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::validation(format!("{name} must be an integer, got {raw:?}")))
}
