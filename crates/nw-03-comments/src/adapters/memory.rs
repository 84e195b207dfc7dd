//! In-memory comment store.

use crate::domain::StoreError;
use crate::ports::CommentStore;
use parking_lot::RwLock;
use shared_types::Comment;
use std::collections::HashMap;

#[derive(Default)]
struct CommentTable {
    by_news: HashMap<i64, Vec<Comment>>,
    next_id: i64,
}

#[derive(Default)]
pub struct InMemoryCommentStore {
    table: RwLock<CommentTable>,
}

impl InMemoryCommentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total comments across all news items.
    pub fn len(&self) -> usize {
        self.table.read().by_news.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CommentStore for InMemoryCommentStore {
    fn by_news(&self, news_id: i64) -> Result<Vec<Comment>, StoreError> {
        let mut comments = self
            .table
            .read()
            .by_news
            .get(&news_id)
            .cloned()
            .unwrap_or_default();
        comments.sort_by(|a, b| {
            b.comment_time
                .cmp(&a.comment_time)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(comments)
    }

    fn insert(&self, mut comment: Comment) -> Result<i64, StoreError> {
        if comment.news_id <= 0 {
            return Err(StoreError::Invalid(format!(
                "news id must be positive, got {}",
                comment.news_id
            )));
        }

        let mut table = self.table.write();
        table.next_id += 1;
        comment.id = table.next_id;
        let id = comment.id;
        table.by_news.entry(comment.news_id).or_default().push(comment);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(news_id: i64, comment_time: i64, content: &str) -> Comment {
        Comment {
            news_id,
            comment_time,
            content: content.to_string(),
            ..Comment::default()
        }
    }

    #[test]
    fn test_insert_assigns_increasing_ids() {
        let store = InMemoryCommentStore::new();
        assert_eq!(store.insert(comment(5, 10, "a")).unwrap(), 1);
        assert_eq!(store.insert(comment(6, 10, "b")).unwrap(), 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_listing_newest_first() {
        let store = InMemoryCommentStore::new();
        store.insert(comment(5, 100, "old")).unwrap();
        store.insert(comment(5, 300, "new")).unwrap();
        store.insert(comment(5, 200, "mid")).unwrap();
        store.insert(comment(7, 999, "other news")).unwrap();

        let contents: Vec<_> = store
            .by_news(5)
            .unwrap()
            .into_iter()
            .map(|c| c.content)
            .collect();
        assert_eq!(contents, vec!["new", "mid", "old"]);
        assert!(store.by_news(42).unwrap().is_empty());
    }

    #[test]
    fn test_comment_without_news_rejected() {
        let store = InMemoryCommentStore::new();
        assert!(matches!(
            store.insert(comment(0, 1, "orphan")),
            Err(StoreError::Invalid(_))
        ));
        assert!(store.is_empty());
    }
}
