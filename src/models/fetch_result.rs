use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Quality;

/// A document returned by a remote source before it is processed and stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    pub title: String,
    pub content: String,
    pub url: String,
    pub source: String,
    /// Quality reported by the fetcher. When absent the processor assesses it
    /// from the source name.
    pub quality: Option<Quality>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl FetchResult {
    /// Creates a result stamped with the current time.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
        quality: Option<Quality>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            url: url.into(),
            source: source.into(),
            quality,
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}
