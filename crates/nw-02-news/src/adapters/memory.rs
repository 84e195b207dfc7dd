//! In-memory news store.
//!
//! Items are unique by `link`. Ids are assigned from 1 in insertion order.

use crate::domain::{AppendOutcome, StoreError};
use crate::ports::NewsStore;
use parking_lot::RwLock;
use shared_types::{NewsItem, NewsPage, NewsPageQuery, Paginate};
use std::collections::HashSet;

#[derive(Default)]
struct NewsTable {
    items: Vec<NewsItem>,
    links: HashSet<String>,
    next_id: i64,
}

#[derive(Default)]
pub struct InMemoryNewsStore {
    table: RwLock<NewsTable>,
}

impl InMemoryNewsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `items`.
    pub fn with_items(items: Vec<NewsItem>) -> Self {
        let store = Self::new();
        // In-memory append cannot fail
        let _ = store.append(items);
        store
    }

    pub fn len(&self) -> usize {
        self.table.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NewsStore for InMemoryNewsStore {
    fn page(&self, query: &NewsPageQuery) -> Result<NewsPage, StoreError> {
        let page_size = query.effective_count();
        let filter = query.filter.to_lowercase();

        let table = self.table.read();
        let mut matching: Vec<&NewsItem> = table
            .items
            .iter()
            .filter(|item| item.rubric == query.rubric)
            .filter(|item| filter.is_empty() || item.title.to_lowercase().contains(&filter))
            .collect();
        matching.sort_by(|a, b| {
            b.public_time
                .cmp(&a.public_time)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = i64::try_from(matching.len()).unwrap_or(i64::MAX);
        let paginate = Paginate::compute(query.effective_page(), page_size, total);
        let take = usize::try_from(page_size).unwrap_or(usize::MAX);
        let news = matching
            .into_iter()
            .skip(paginate.offset())
            .take(take)
            .cloned()
            .collect();

        Ok(NewsPage { news, paginate })
    }

    fn find(&self, id: i64) -> Result<Option<NewsItem>, StoreError> {
        Ok(self
            .table
            .read()
            .items
            .iter()
            .find(|item| item.id == id)
            .cloned())
    }

    fn append(&self, items: Vec<NewsItem>) -> Result<AppendOutcome, StoreError> {
        let mut outcome = AppendOutcome::default();
        let mut table = self.table.write();

        for mut item in items {
            if !table.links.insert(item.link.clone()) {
                outcome.duplicates += 1;
                continue;
            }
            table.next_id += 1;
            item.id = table.next_id;
            table.items.push(item);
            outcome.inserted += 1;
        }

        Ok(outcome)
    }
}
