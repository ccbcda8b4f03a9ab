use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{Quality, RecordId};

/// A persisted unit of knowledge: a past query, the cleaned text fetched for it,
/// and provenance metadata.
///
/// Records are created by the store when a fetched result is saved and are never
/// mutated afterwards. The ranking pipeline only ever sees read-only copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    /// Unique identifier from the database.
    pub id: RecordId,
    /// The query that produced this record.
    pub query: String,
    /// The cleaned source text.
    pub original_text: String,
    /// Short summary shown in result lists.
    pub summary: String,
    /// Human readable source name (e.g. "Wikipedia").
    pub source: String,
    /// Link back to the source document.
    pub url: String,
    /// When this record was stored.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Trust tier of the source.
    pub quality: Quality,
}

/// Fields supplied by callers when adding a record to a store.
///
/// The store assigns the ID and the creation timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewRecord {
    pub query: String,
    pub original_text: String,
    pub summary: String,
    pub source: String,
    pub url: String,
    pub quality: Quality,
}

/// Builder for constructing `KnowledgeRecord` instances with optional fields.
///
/// # Examples
///
/// ```
/// use maktaba::models::{KnowledgeRecordBuilder, Quality, RecordId};
///
/// let record = KnowledgeRecordBuilder::new()
///     .id(RecordId::new(1))
///     .query("cairo")
///     .summary("Cairo is the capital of Egypt")
///     .quality(Quality::High)
///     .build();
///
/// assert_eq!(record.id.get(), 1);
/// assert_eq!(record.quality, Quality::High);
/// assert!(record.original_text.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct KnowledgeRecordBuilder {
    id: Option<RecordId>,
    query: Option<String>,
    original_text: Option<String>,
    summary: Option<String>,
    source: Option<String>,
    url: Option<String>,
    timestamp: Option<OffsetDateTime>,
    quality: Option<Quality>,
}

impl KnowledgeRecordBuilder {
    /// Creates a new `KnowledgeRecordBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the record ID.
    pub fn id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the originating query.
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Sets the original text.
    pub fn original_text(mut self, text: impl Into<String>) -> Self {
        self.original_text = Some(text.into());
        self
    }

    /// Sets the summary.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the source name.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the source URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the creation timestamp.
    pub fn timestamp(mut self, timestamp: OffsetDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets the quality tier.
    pub fn quality(mut self, quality: Quality) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Builds the `KnowledgeRecord`, using defaults for optional fields.
    ///
    /// The timestamp defaults to now and the quality to medium.
    ///
    /// # Panics
    ///
    /// Panics if `id` has not been set.
    pub fn build(self) -> KnowledgeRecord {
        KnowledgeRecord {
            id: self.id.expect("id is required"),
            query: self.query.unwrap_or_default(),
            original_text: self.original_text.unwrap_or_default(),
            summary: self.summary.unwrap_or_default(),
            source: self.source.unwrap_or_default(),
            url: self.url.unwrap_or_default(),
            timestamp: self.timestamp.unwrap_or_else(OffsetDateTime::now_utc),
            quality: self.quality.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn builder_applies_defaults() {
        let record = KnowledgeRecordBuilder::new().id(RecordId::new(3)).build();

        assert_eq!(record.id, RecordId::new(3));
        assert!(record.query.is_empty());
        assert_eq!(record.quality, Quality::Medium);
    }

    #[test]
    fn builder_sets_every_field() {
        let at = datetime!(2024-03-01 12:00 UTC);
        let record = KnowledgeRecordBuilder::new()
            .id(RecordId::new(9))
            .query("nile")
            .original_text("The Nile is a major river.")
            .summary("The Nile")
            .source("Wikipedia")
            .url("https://en.wikipedia.org/wiki/Nile")
            .timestamp(at)
            .quality(Quality::High)
            .build();

        assert_eq!(record.query, "nile");
        assert_eq!(record.source, "Wikipedia");
        assert_eq!(record.timestamp, at);
        assert_eq!(record.quality, Quality::High);
    }

    #[test]
    fn record_serialization_roundtrip() {
        let record = KnowledgeRecordBuilder::new()
            .id(RecordId::new(1))
            .query("q")
            .timestamp(datetime!(2024-01-01 0:00 UTC))
            .build();

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"quality\":\"medium\""));

        let back: KnowledgeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
