//! # Outbound Ports (Driven Ports)

use crate::domain::StoreError;
use shared_types::Comment;

/// Comment storage.
///
/// Calls are synchronous and must be safe from many exchange handlers at once.
pub trait CommentStore: Send + Sync {
    /// Comments of one news item, newest first.
    fn by_news(&self, news_id: i64) -> Result<Vec<Comment>, StoreError>;

    /// Store a comment and return its assigned id. The incoming id is ignored.
    fn insert(&self, comment: Comment) -> Result<i64, StoreError>;
}
