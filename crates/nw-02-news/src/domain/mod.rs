//! News domain: errors and the feed source model.

pub mod errors;
pub mod feeds;

pub use errors::{FeedError, StoreError};
pub use feeds::{AppendOutcome, FeedSource};
