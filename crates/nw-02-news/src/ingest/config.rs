//! Feeds configuration.
//!
//! ```json
//! {
//!   "rss": {
//!     "sport": { "link": ["https://a.example/rss"], "image": "https://img.example/sport.jpg" }
//!   },
//!   "duration": 5
//! }
//! ```
//!
//! `duration` is the pause between polls of one feed, in minutes.

use crate::domain::{FeedError, FeedSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Poll interval used when `duration` is missing or zero.
pub const DEFAULT_POLL_MINUTES: u64 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RubricFeeds {
    pub link: Vec<String>,
    /// Default image for items of this rubric
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedsConfig {
    pub rss: BTreeMap<String, RubricFeeds>,
    pub duration: u64,
}

impl FeedsConfig {
    pub fn from_json(raw: &str) -> Result<Self, FeedError> {
        serde_json::from_str(raw).map_err(|e| FeedError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, FeedError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| FeedError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    /// Pause between two polls of the same feed.
    pub fn interval(&self) -> Duration {
        let minutes = if self.duration == 0 {
            DEFAULT_POLL_MINUTES
        } else {
            self.duration
        };
        Duration::from_secs(minutes.saturating_mul(60))
    }

    /// One source per (link, rubric) pair.
    pub fn sources(&self) -> Vec<FeedSource> {
        self.rss
            .iter()
            .flat_map(|(rubric, feeds)| {
                feeds
                    .link
                    .iter()
                    .map(move |url| FeedSource::new(url.clone(), rubric.clone(), feeds.image.clone()))
            })
            .collect()
    }
}
