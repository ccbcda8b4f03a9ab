//! Persistence of knowledge records and query history.

use std::collections::HashSet;

use anyhow::{Context, Result, anyhow};
use rusqlite::params;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

use crate::db::Database;
use crate::models::{HistoryEntry, KnowledgeRecord, NewRecord, Quality, RecordId};
use crate::utils::{from_unix_millis, now_millis, to_unix_millis};

/// Everything in the store, as written by `maktaba export`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportData {
    pub knowledge: Vec<KnowledgeRecord>,
    pub history: Vec<HistoryEntry>,
    #[serde(with = "time::serde::rfc3339")]
    pub export_date: OffsetDateTime,
}

/// Summary counts over the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub total_knowledge: usize,
    pub total_history: usize,
    #[serde(with = "time::serde::rfc3339::option")]
    pub oldest_entry: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub newest_entry: Option<OffsetDateTime>,
    /// Number of distinct source names.
    pub sources: usize,
}

/// Storage operations used by the knowledge service.
///
/// This trait enables substituting failing or in-memory stores in tests.
pub trait KnowledgeStore {
    /// Returns every stored record in insertion order.
    fn get_all(&self) -> Result<Vec<KnowledgeRecord>>;

    /// Stores a record, assigning its ID and creation timestamp.
    fn add(&self, record: NewRecord) -> Result<RecordId>;

    /// Returns the number of stored records.
    fn count(&self) -> Result<usize>;

    /// Deletes all records and history.
    fn clear(&self) -> Result<()>;

    /// Records one answered query.
    fn save_history(&self, query: &str, results_count: usize) -> Result<i64>;

    /// Returns history entries, newest first, optionally limited.
    fn history(&self, limit: Option<usize>) -> Result<Vec<HistoryEntry>>;

    /// Dumps all records and history.
    fn export(&self) -> Result<ExportData> {
        let mut history = self.history(None)?;
        history.reverse();
        Ok(ExportData {
            knowledge: self.get_all()?,
            history,
            export_date: OffsetDateTime::now_utc(),
        })
    }

    /// Computes summary counts.
    fn stats(&self) -> Result<StoreStats> {
        let knowledge = self.get_all()?;
        let sources: HashSet<&str> = knowledge.iter().map(|r| r.source.as_str()).collect();
        Ok(StoreStats {
            total_knowledge: knowledge.len(),
            total_history: self.history(None)?.len(),
            oldest_entry: knowledge.iter().map(|r| r.timestamp).min(),
            newest_entry: knowledge.iter().map(|r| r.timestamp).max(),
            sources: sources.len(),
        })
    }
}

/// SQLite-backed store.
///
/// # Examples
///
/// ```
/// use maktaba::Database;
/// use maktaba::models::NewRecord;
/// use maktaba::store::{KnowledgeStore, SqliteStore};
///
/// # fn main() -> anyhow::Result<()> {
/// let store = SqliteStore::new(Database::in_memory()?);
/// store.add(NewRecord {
///     query: "nile".to_string(),
///     summary: "The Nile is a river".to_string(),
///     ..Default::default()
/// })?;
/// assert_eq!(store.count()?, 1);
/// # Ok(())
/// # }
/// ```
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Creates a store over an opened database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Returns a reference to the underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

/// Raw column values of a `knowledge` row.
struct KnowledgeRow {
    id: i64,
    query: String,
    original_text: String,
    summary: String,
    source: String,
    url: String,
    timestamp: i64,
    quality: String,
}

impl TryFrom<KnowledgeRow> for KnowledgeRecord {
    type Error = anyhow::Error;

    fn try_from(row: KnowledgeRow) -> Result<Self> {
        let quality = Quality::parse(&row.quality)
            .ok_or_else(|| anyhow!("Invalid quality '{}' for record {}", row.quality, row.id))?;

        Ok(KnowledgeRecord {
            id: RecordId::new(row.id),
            query: row.query,
            original_text: row.original_text,
            summary: row.summary,
            source: row.source,
            url: row.url,
            timestamp: from_unix_millis(row.timestamp)?,
            quality,
        })
    }
}

impl KnowledgeStore for SqliteStore {
    fn get_all(&self) -> Result<Vec<KnowledgeRecord>> {
        let mut stmt = self
            .db
            .connection()
            .prepare(
                "SELECT id, query, original_text, summary, source, url, timestamp, quality
                 FROM knowledge ORDER BY id",
            )
            .context("Failed to prepare knowledge query")?;

        let rows = stmt
            .query_map([], |row| {
                Ok(KnowledgeRow {
                    id: row.get(0)?,
                    query: row.get(1)?,
                    original_text: row.get(2)?,
                    summary: row.get(3)?,
                    source: row.get(4)?,
                    url: row.get(5)?,
                    timestamp: row.get(6)?,
                    quality: row.get(7)?,
                })
            })
            .context("Failed to query knowledge")?;

        let mut records = Vec::new();
        for row in rows {
            let row = row.context("Failed to read knowledge row")?;
            records.push(KnowledgeRecord::try_from(row)?);
        }
        Ok(records)
    }

    fn add(&self, record: NewRecord) -> Result<RecordId> {
        let conn = self.db.connection();
        conn.execute(
            "INSERT INTO knowledge (query, original_text, summary, source, url, timestamp, quality)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.query,
                record.original_text,
                record.summary,
                record.source,
                record.url,
                to_unix_millis(now_millis()),
                record.quality.as_str(),
            ],
        )
        .context("Failed to insert knowledge record")?;

        let id = RecordId::new(conn.last_insert_rowid());
        debug!(id = %id, source = %record.source, "Stored record");
        Ok(id)
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .db
            .connection()
            .query_row("SELECT COUNT(*) FROM knowledge", [], |row| row.get(0))
            .context("Failed to count knowledge")?;
        Ok(usize::try_from(count)?)
    }

    fn clear(&self) -> Result<()> {
        self.db
            .connection()
            .execute_batch(
                "BEGIN;
                 DELETE FROM knowledge;
                 DELETE FROM history;
                 COMMIT;",
            )
            .context("Failed to clear store")?;
        Ok(())
    }

    fn save_history(&self, query: &str, results_count: usize) -> Result<i64> {
        let conn = self.db.connection();
        conn.execute(
            "INSERT INTO history (query, results_count, timestamp) VALUES (?1, ?2, ?3)",
            params![query, i64::try_from(results_count)?, to_unix_millis(now_millis())],
        )
        .context("Failed to insert history entry")?;
        Ok(conn.last_insert_rowid())
    }

    fn history(&self, limit: Option<usize>) -> Result<Vec<HistoryEntry>> {
        // SQLite treats a negative LIMIT as no limit
        let limit = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));

        let mut stmt = self
            .db
            .connection()
            .prepare(
                "SELECT id, query, results_count, timestamp FROM history
                 ORDER BY timestamp DESC, id DESC LIMIT ?1",
            )
            .context("Failed to prepare history query")?;

        let rows = stmt
            .query_map([limit], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })
            .context("Failed to query history")?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, query, results_count, timestamp) =
                row.context("Failed to read history row")?;
            entries.push(HistoryEntry {
                id,
                query,
                results_count: usize::try_from(results_count)?,
                timestamp: from_unix_millis(timestamp)?,
            });
        }
        Ok(entries)
    }

    fn stats(&self) -> Result<StoreStats> {
        let conn = self.db.connection();
        let (total, oldest, newest, sources): (i64, Option<i64>, Option<i64>, i64) = conn
            .query_row(
                "SELECT COUNT(*), MIN(timestamp), MAX(timestamp), COUNT(DISTINCT source)
                 FROM knowledge",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .context("Failed to compute knowledge stats")?;
        let total_history: i64 = conn
            .query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))
            .context("Failed to count history")?;

        Ok(StoreStats {
            total_knowledge: usize::try_from(total)?,
            total_history: usize::try_from(total_history)?,
            oldest_entry: oldest.map(from_unix_millis).transpose()?,
            newest_entry: newest.map(from_unix_millis).transpose()?,
            sources: usize::try_from(sources)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        SqliteStore::new(Database::in_memory().unwrap())
    }

    fn new_record(query: &str, source: &str) -> NewRecord {
        NewRecord {
            query: query.to_string(),
            original_text: format!("Text about {query}"),
            summary: format!("Summary of {query}"),
            source: source.to_string(),
            url: format!("https://example.org/{query}"),
            quality: Quality::High,
        }
    }

    fn set_timestamp(store: &SqliteStore, id: RecordId, millis: i64) {
        store
            .database()
            .connection()
            .execute(
                "UPDATE knowledge SET timestamp = ?1 WHERE id = ?2",
                params![millis, id.get()],
            )
            .unwrap();
    }

    #[test]
    fn add_assigns_ids_and_round_trips_fields() {
        let store = store();
        let first = store.add(new_record("nile", "Wikipedia")).unwrap();
        let second = store.add(new_record("cairo", "DBpedia")).unwrap();
        assert!(second.get() > first.get());

        let all = store.get_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, first);
        assert_eq!(all[0].query, "nile");
        assert_eq!(all[0].original_text, "Text about nile");
        assert_eq!(all[0].summary, "Summary of nile");
        assert_eq!(all[0].source, "Wikipedia");
        assert_eq!(all[0].url, "https://example.org/nile");
        assert_eq!(all[0].quality, Quality::High);
    }

    #[test]
    fn add_stamps_current_time() {
        let store = store();
        let before = OffsetDateTime::now_utc() - time::Duration::seconds(1);
        store.add(new_record("nile", "Wikipedia")).unwrap();
        let after = OffsetDateTime::now_utc() + time::Duration::seconds(1);

        let stamp = store.get_all().unwrap()[0].timestamp;
        assert!(stamp > before && stamp < after);
    }

    #[test]
    fn count_and_clear() {
        let store = store();
        assert_eq!(store.count().unwrap(), 0);

        store.add(new_record("nile", "Wikipedia")).unwrap();
        store.add(new_record("giza", "Wikipedia")).unwrap();
        store.save_history("nile", 2).unwrap();
        assert_eq!(store.count().unwrap(), 2);

        store.clear().unwrap();
        assert_eq!(store.count().unwrap(), 0);
        assert!(store.history(None).unwrap().is_empty());
    }

    #[test]
    fn history_is_newest_first_and_limited() {
        let store = store();
        store.save_history("first", 1).unwrap();
        store.save_history("second", 0).unwrap();
        store.save_history("third", 4).unwrap();

        let entries = store.history(Some(2)).unwrap();
        let queries: Vec<&str> = entries.iter().map(|e| e.query.as_str()).collect();
        assert_eq!(queries, vec!["third", "second"]);
        assert_eq!(entries[0].results_count, 4);

        assert_eq!(store.history(None).unwrap().len(), 3);
    }

    #[test]
    fn invalid_quality_in_database_is_an_error() {
        let store = store();
        store.add(new_record("nile", "Wikipedia")).unwrap();
        // Bypass the CHECK constraint to simulate a corrupt row
        store
            .database()
            .connection()
            .execute_batch(
                "PRAGMA ignore_check_constraints = ON;
                 UPDATE knowledge SET quality = 'great';",
            )
            .unwrap();

        let err = store.get_all().unwrap_err();
        assert!(err.to_string().contains("Invalid quality"));
    }

    #[test]
    fn stats_on_empty_store() {
        let stats = store().stats().unwrap();
        assert_eq!(stats.total_knowledge, 0);
        assert_eq!(stats.total_history, 0);
        assert_eq!(stats.oldest_entry, None);
        assert_eq!(stats.newest_entry, None);
        assert_eq!(stats.sources, 0);
    }

    #[test]
    fn stats_reports_range_and_distinct_sources() {
        let store = store();
        let a = store.add(new_record("nile", "Wikipedia")).unwrap();
        let b = store.add(new_record("giza", "Wikipedia")).unwrap();
        let c = store.add(new_record("cairo", "DBpedia")).unwrap();
        set_timestamp(&store, a, 1_700_000_000_000);
        set_timestamp(&store, b, 1_600_000_000_000);
        set_timestamp(&store, c, 1_650_000_000_000);
        store.save_history("nile", 3).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_knowledge, 3);
        assert_eq!(stats.total_history, 1);
        assert_eq!(stats.sources, 2);
        assert_eq!(stats.oldest_entry, Some(from_unix_millis(1_600_000_000_000).unwrap()));
        assert_eq!(stats.newest_entry, Some(from_unix_millis(1_700_000_000_000).unwrap()));
    }

    #[test]
    fn export_contains_everything_in_insertion_order() {
        let store = store();
        store.add(new_record("nile", "Wikipedia")).unwrap();
        store.save_history("nile", 1).unwrap();
        store.save_history("giza", 0).unwrap();

        let export = store.export().unwrap();
        assert_eq!(export.knowledge.len(), 1);
        let queries: Vec<&str> = export.history.iter().map(|e| e.query.as_str()).collect();
        assert_eq!(queries, vec!["nile", "giza"]);

        let json = serde_json::to_value(&export).unwrap();
        assert!(json["export_date"].is_string());
        assert_eq!(json["knowledge"][0]["quality"], "high");
    }
}
