//! RSS channel → news items.
//!
//! | Item field | Source |
//! |------------|--------|
//! | `title` | item title |
//! | `content` | item description |
//! | `link` | item link |
//! | `link_title` | channel title |
//! | `public_time` | item `pubDate`, 0 when unparseable |
//! | `image_link` | `image/jpeg` or `image/png` enclosure, else the source default |

use crate::domain::{FeedError, FeedSource};
use chrono::{DateTime, NaiveDateTime};
use rss::{Channel, Item};
use shared_types::NewsItem;

const IMAGE_MIME_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// Parse an RSS document fetched from `source`.
pub fn parse_channel(document: &[u8], source: &FeedSource) -> Result<Vec<NewsItem>, FeedError> {
    let channel = Channel::read_from(document).map_err(|e| FeedError::Parse {
        url: source.url.clone(),
        reason: e.to_string(),
    })?;

    Ok(channel
        .items()
        .iter()
        .map(|item| normalize_item(item, channel.title(), source))
        .collect())
}

pub fn normalize_item(item: &Item, feed_title: &str, source: &FeedSource) -> NewsItem {
    let image_link = item
        .enclosure()
        .filter(|enclosure| IMAGE_MIME_TYPES.contains(&enclosure.mime_type()))
        .map(|enclosure| enclosure.url().to_string())
        .unwrap_or_else(|| source.default_image.clone());

    NewsItem {
        id: 0,
        title: item.title().unwrap_or_default().to_string(),
        content: item.description().unwrap_or_default().to_string(),
        public_time: item.pub_date().map(parse_public_time).unwrap_or(0),
        image_link,
        rubric: source.rubric.clone(),
        link: item.link().unwrap_or_default().to_string(),
        link_title: feed_title.to_string(),
    }
}

/// Unix seconds of an RSS date. Feeds in the wild drop the weekday comma
/// and spell UTC as `GMT`; both are accepted. Anything else is 0.
pub fn parse_public_time(raw: &str) -> i64 {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc2822(raw) {
        return t.timestamp();
    }

    let compact = raw.replace(',', "");
    if let Ok(t) = DateTime::parse_from_str(&compact, "%a %d %b %Y %H:%M:%S %z") {
        return t.timestamp();
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(&compact, "%a %d %b %Y %H:%M:%S GMT") {
        return t.and_utc().timestamp();
    }
    0
}
