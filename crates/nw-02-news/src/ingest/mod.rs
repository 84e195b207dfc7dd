//! Feed ingestion: configuration, normalization and the polling scheduler.

pub mod config;
pub mod normalize;
pub mod scheduler;

pub use config::{FeedsConfig, RubricFeeds};
pub use scheduler::{IngestStats, IngestionHandle, IngestionScheduler};
