#![cfg_attr(test, allow(clippy::unwrap_used))]

//! # NW-02 News Backend
//!
//! Serves paged and single news lookups over the bus, and keeps the store
//! filled from RSS feeds.
//!
//! ```text
//! news.requests ──→ ExchangeLoop ──→ NewsExchangeHandler ──→ NewsStore
//!                                                              ▲
//! RSS feeds ──→ IngestionScheduler (1 worker per feed) ──→ sink ┘
//! ```
//!
//! ## Query Semantics
//!
//! | Rule | Behaviour |
//! |------|-----------|
//! | page size | `count <= 0` means 10 |
//! | rubric | exact match |
//! | filter | case-insensitive title substring, empty matches all |
//! | order | publish time, newest first |
//! | page count | `ceil(total / page size)` |
//! | single news | unknown id is a not-ok reply |

pub mod adapters;
pub mod domain;
pub mod ingest;
pub mod ipc;
pub mod ports;

pub use adapters::{HttpFeedFetcher, InMemoryNewsStore};
pub use domain::{AppendOutcome, FeedError, FeedSource, StoreError};
pub use ingest::{FeedsConfig, IngestStats, IngestionHandle, IngestionScheduler};
pub use ipc::NewsExchangeHandler;
pub use ports::{FeedFetcher, NewsStore};
