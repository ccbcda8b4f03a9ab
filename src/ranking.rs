//! Relevance ranking of stored knowledge records against a query.

use time::OffsetDateTime;

use crate::models::{KnowledgeRecord, Quality};

/// Maximum recency bonus, granted to records stored less than a day ago.
const RECENCY_MAX_BONUS: f64 = 10.0;
/// Bonus for records from the high trust tier.
const HIGH_QUALITY_BONUS: f64 = 5.0;
/// Query tokens must be longer than this many characters.
const MIN_TOKEN_CHARS: usize = 2;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Default number of records returned by [`Ranker::rank`].
pub const DEFAULT_RANK_LIMIT: usize = 5;

/// A stored record paired with its relevance score for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub record: KnowledgeRecord,
    pub score: f64,
}

/// Scores knowledge records by term frequency, recency and quality.
#[derive(Debug, Clone)]
pub struct Ranker {
    limit: usize,
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(DEFAULT_RANK_LIMIT)
    }
}

impl Ranker {
    /// Creates a ranker returning at most `limit` records.
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// Ranks `records` against `query` as of the current time.
    pub fn rank(&self, query: &str, records: &[KnowledgeRecord]) -> Vec<ScoredRecord> {
        self.rank_at(query, records, OffsetDateTime::now_utc())
    }

    /// Ranks `records` against `query` as of `now`.
    ///
    /// Only records with a strictly positive score are returned, best first.
    /// Equal scores keep their input order.
    ///
    /// # Examples
    ///
    /// ```
    /// use maktaba::models::{KnowledgeRecordBuilder, RecordId};
    /// use maktaba::ranking::Ranker;
    /// use time::macros::datetime;
    ///
    /// let now = datetime!(2024-03-10 12:00 UTC);
    /// let record = KnowledgeRecordBuilder::new()
    ///     .id(RecordId::new(1))
    ///     .query("nile river")
    ///     .timestamp(datetime!(2023-01-01 0:00 UTC))
    ///     .build();
    ///
    /// let ranked = Ranker::default().rank_at("nile", &[record], now);
    /// assert_eq!(ranked.len(), 1);
    /// assert_eq!(ranked[0].score, 1.0);
    /// ```
    pub fn rank_at(
        &self,
        query: &str,
        records: &[KnowledgeRecord],
        now: OffsetDateTime,
    ) -> Vec<ScoredRecord> {
        let tokens = query_tokens(query);

        let mut scored: Vec<ScoredRecord> = records
            .iter()
            .map(|record| ScoredRecord {
                score: score_record(&tokens, record, now),
                record: record.clone(),
            })
            .filter(|scored| scored.score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(self.limit);
        scored
    }
}

/// Lowercase whitespace-separated words longer than [`MIN_TOKEN_CHARS`].
fn query_tokens(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|token| token.chars().count() > MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}

fn score_record(tokens: &[String], record: &KnowledgeRecord, now: OffsetDateTime) -> f64 {
    let haystack = format!(
        "{} {} {}",
        record.query, record.summary, record.original_text
    )
    .to_lowercase();

    // Literal, non-overlapping substring counts; "art" also counts inside "party"
    let frequency: usize = tokens
        .iter()
        .map(|token| haystack.matches(token.as_str()).count())
        .sum();

    let mut score = frequency as f64 + recency_bonus(record.timestamp, now);
    if record.quality == Quality::High {
        score += HIGH_QUALITY_BONUS;
    }
    score
}

/// `max(0, 10 - age_days)`, with future timestamps treated as age zero.
pub fn recency_bonus(timestamp: OffsetDateTime, now: OffsetDateTime) -> f64 {
    let age_ms = (now - timestamp).whole_milliseconds().max(0) as f64;
    (RECENCY_MAX_BONUS - age_ms / MILLIS_PER_DAY).max(0.0)
}
