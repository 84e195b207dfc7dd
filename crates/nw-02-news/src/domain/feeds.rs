//! Feed sources and append results.

/// One polled feed: a URL bound to the rubric it fills.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedSource {
    pub url: String,
    pub rubric: String,
    /// Image used when an item carries no usable enclosure
    pub default_image: String,
}

impl FeedSource {
    pub fn new(
        url: impl Into<String>,
        rubric: impl Into<String>,
        default_image: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            rubric: rubric.into(),
            default_image: default_image.into(),
        }
    }
}

/// Result of appending a batch of items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendOutcome {
    pub inserted: usize,
    /// Items skipped because their link is already stored
    pub duplicates: usize,
}
