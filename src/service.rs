use std::sync::Arc;

use anyhow::{Result, bail};
use tracing::{debug, info, warn};

use crate::answerer::{Answer, DegradeReason};
use crate::fetcher::{SourceFetcher, fetch_all};
use crate::merger::merge_information;
use crate::models::{HistoryEntry, NewRecord};
use crate::pipeline::Pipeline;
use crate::processor::ProcessedResult;
use crate::ranking::ScoredRecord;
use crate::store::{ExportData, KnowledgeStore, StoreStats};
use crate::text::truncate_chars;

/// Options for a single [`KnowledgeService::ask`] round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AskOptions {
    /// Query the remote sources in addition to the local store.
    pub online: bool,
    /// Compose an answer from the retrieved text.
    pub summarize: bool,
}

impl Default for AskOptions {
    fn default() -> Self {
        Self {
            online: true,
            summarize: true,
        }
    }
}

/// Everything produced by one question.
#[derive(Debug, Clone)]
pub struct AskOutcome {
    pub query: String,
    /// Freshly fetched results, best quality first.
    pub online: Vec<ProcessedResult>,
    /// Previously stored records ranked against the query.
    pub cached: Vec<ScoredRecord>,
    /// `None` when summarization was not requested.
    pub answer: Option<Answer>,
    /// Sentences merged across all fetched sources, before validation.
    pub merged: Option<String>,
    /// Non-fatal problems met along the way.
    pub errors: Vec<String>,
}

impl AskOutcome {
    /// Total number of results shown to the user.
    pub fn results_count(&self) -> usize {
        self.online.len() + self.cached.len()
    }

    /// Returns true if neither the store nor the remote sources had anything.
    pub fn is_empty(&self) -> bool {
        self.results_count() == 0
    }
}

/// Service layer running the offline-first question flow.
///
/// KnowledgeService owns the store, the remote sources and the text pipeline.
/// It is UI-independent and used by both the CLI and the TUI.
///
/// # Examples
///
/// ```
/// use maktaba::{Database, KnowledgeService, Pipeline};
/// use maktaba::service::AskOptions;
/// use maktaba::store::SqliteStore;
///
/// # fn main() -> anyhow::Result<()> {
/// let store = SqliteStore::new(Database::in_memory()?);
/// let service = KnowledgeService::new(Box::new(store), Pipeline::bundled()?);
///
/// let outcome = service.ask("nile", AskOptions { online: false, summarize: true })?;
/// assert!(outcome.is_empty());
/// # Ok(())
/// # }
/// ```
pub struct KnowledgeService {
    store: Box<dyn KnowledgeStore>,
    fetchers: Vec<Arc<dyn SourceFetcher>>,
    pipeline: Pipeline,
}

impl KnowledgeService {
    /// Creates a service with no remote sources.
    pub fn new(store: Box<dyn KnowledgeStore>, pipeline: Pipeline) -> Self {
        Self {
            store,
            fetchers: Vec::new(),
            pipeline,
        }
    }

    /// Sets the remote sources queried by online asks.
    pub fn with_fetchers(mut self, fetchers: Vec<Arc<dyn SourceFetcher>>) -> Self {
        self.fetchers = fetchers;
        self
    }

    /// Returns the text pipeline.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Answers `query` from the local store and, optionally, remote sources.
    ///
    /// The local ranking snapshot is taken before anything new is stored.
    /// Fetched results that pass processing are saved with a summary of
    /// their first characters. Store and source failures are logged and
    /// collected in [`AskOutcome::errors`]; when the local store cannot be
    /// read the answer degrades to raw context. History is recorded only for
    /// queries that found something.
    ///
    /// # Errors
    ///
    /// Returns an error only if the query is empty.
    pub fn ask(&self, query: &str, options: AskOptions) -> Result<AskOutcome> {
        let query = query.trim();
        if query.is_empty() {
            bail!("Query cannot be empty");
        }

        let mut errors = Vec::new();
        let mut store_failed = false;

        let cached = match self.store.get_all() {
            Ok(records) => self.pipeline.ranker.rank(query, &records),
            Err(e) => {
                warn!(error = %e, "Failed to read local store");
                errors.push(format!("store: {e:#}"));
                store_failed = true;
                Vec::new()
            }
        };

        let mut merged = None;
        let online = if options.online && !self.fetchers.is_empty() {
            let fetched = fetch_all(&self.fetchers, query);
            errors.extend(fetched.errors);
            merged =
                merge_information(&fetched.results, self.pipeline.config.merge_sentence_limit);
            let processed = self.pipeline.processor.process_results(fetched.results);
            for result in &processed {
                if let Err(e) = self.store.add(self.new_record(query, result)) {
                    warn!(error = %e, title = %result.title, "Failed to store result");
                    errors.push(format!("store: {e:#}"));
                }
            }
            processed
        } else {
            Vec::new()
        };

        let answer = options.summarize.then(|| {
            let context = online
                .iter()
                .map(|r| r.content.as_str())
                .chain(cached.iter().map(|r| r.record.summary.as_str()))
                .collect::<Vec<_>>()
                .join("\n\n");

            if store_failed {
                self.pipeline
                    .composer
                    .degrade(DegradeReason::UpstreamFailure, &context)
            } else {
                self.pipeline.composer.generate_answer(query, &context)
            }
        });

        let outcome = AskOutcome {
            query: query.to_string(),
            online,
            cached,
            answer,
            merged,
            errors,
        };

        if outcome.is_empty() {
            debug!(query = %query, "Nothing found, history not recorded");
        } else if let Err(e) = self.store.save_history(query, outcome.results_count()) {
            warn!(error = %e, "Failed to save history");
        }
        info!(
            query = %query,
            online = outcome.online.len(),
            cached = outcome.cached.len(),
            "Answered query"
        );

        Ok(outcome)
    }

    fn new_record(&self, query: &str, result: &ProcessedResult) -> NewRecord {
        NewRecord {
            query: query.to_string(),
            original_text: result.content.clone(),
            summary: truncate_chars(&result.content, self.pipeline.config.stored_summary_chars)
                .to_string(),
            source: result.source.clone(),
            url: result.url.clone(),
            quality: result.quality,
        }
    }

    /// Ranks stored records against `query` without going online.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is empty or the store cannot be read.
    pub fn search_local(&self, query: &str) -> Result<Vec<ScoredRecord>> {
        let query = query.trim();
        if query.is_empty() {
            bail!("Query cannot be empty");
        }
        let records = self.store.get_all()?;
        Ok(self.pipeline.ranker.rank(query, &records))
    }

    /// Returns the number of stored records.
    pub fn count(&self) -> Result<usize> {
        self.store.count()
    }

    /// Returns summary counts over the store.
    pub fn stats(&self) -> Result<StoreStats> {
        self.store.stats()
    }

    /// Returns all records and history.
    pub fn export(&self) -> Result<ExportData> {
        self.store.export()
    }

    /// Returns recent history, newest first.
    pub fn history(&self, limit: Option<usize>) -> Result<Vec<HistoryEntry>> {
        self.store.history(limit)
    }

    /// Deletes all records and history.
    pub fn clear(&self) -> Result<()> {
        self.store.clear()?;
        info!("Cleared local store");
        Ok(())
    }
}
