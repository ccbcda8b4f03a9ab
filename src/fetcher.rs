//! Remote knowledge sources.
//!
//! Each source implements [`SourceFetcher`]; [`fetch_all`] queries every source
//! concurrently and tolerates individual failures.
mod client;
mod dbpedia;
mod wikipedia;

use std::sync::Arc;
use std::thread;

use tracing::{info, warn};

use crate::merger::merge;
use crate::models::FetchResult;

pub use client::{DEFAULT_TIMEOUT_SECS, FetchError, HttpClient, HttpClientBuilder};
pub use dbpedia::{DBpediaFetcher, DEFAULT_LOOKUP_URL};
pub use wikipedia::{
    DEFAULT_LANGUAGES, DEFAULT_SITE_TEMPLATE, WikipediaFetcher, WikipediaFetcherBuilder,
};

/// A remote source of documents.
///
/// This trait enables mocking in unit tests. Implementations make a single
/// attempt per call; retrying is up to the caller.
pub trait SourceFetcher: Send + Sync {
    /// Short display name used in logs and error messages.
    fn name(&self) -> &str;

    /// Fetches documents matching `query`.
    fn fetch(&self, query: &str) -> Result<Vec<FetchResult>, FetchError>;
}

/// Combined results of all sources for one query.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Deduplicated results in source order.
    pub results: Vec<FetchResult>,
    /// One `"<source>: <error>"` message per failed source.
    pub errors: Vec<String>,
}

/// Builds the default source set: Wikipedia followed by DBpedia.
pub fn default_fetchers() -> Result<Vec<Arc<dyn SourceFetcher>>, FetchError> {
    let client = HttpClientBuilder::new().build()?;
    let fetchers: Vec<Arc<dyn SourceFetcher>> = vec![
        Arc::new(WikipediaFetcherBuilder::new().client(client.clone()).build()),
        Arc::new(DBpediaFetcher::new(client)),
    ];
    Ok(fetchers)
}

/// Queries every fetcher on its own thread and merges the results.
///
/// A failing or panicking source contributes no results and one error
/// message; the other sources are unaffected. Results keep the order of
/// `fetchers`, then are deduplicated by title.
pub fn fetch_all(fetchers: &[Arc<dyn SourceFetcher>], query: &str) -> FetchOutcome {
    let joined: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = fetchers
            .iter()
            .map(|fetcher| (fetcher.name(), scope.spawn(move || fetcher.fetch(query))))
            .collect();

        handles
            .into_iter()
            .map(|(name, handle)| (name, handle.join()))
            .collect()
    });

    let mut outcome = FetchOutcome::default();
    let mut sets = Vec::with_capacity(joined.len());
    for (name, result) in joined {
        match result {
            Ok(Ok(results)) => {
                info!(source = name, count = results.len(), "Fetched results");
                sets.push(results);
            }
            Ok(Err(e)) => {
                warn!(source = name, error = %e, "Source failed");
                outcome.errors.push(format!("{name}: {e}"));
            }
            Err(_) => {
                warn!(source = name, "Source panicked");
                outcome.errors.push(format!("{name}: fetcher panicked"));
            }
        }
    }

    outcome.results = merge(sets);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Quality;

    struct StaticFetcher {
        name: &'static str,
        titles: Vec<&'static str>,
    }

    impl SourceFetcher for StaticFetcher {
        fn name(&self) -> &str {
            self.name
        }

        fn fetch(&self, query: &str) -> Result<Vec<FetchResult>, FetchError> {
            Ok(self
                .titles
                .iter()
                .map(|title| {
                    FetchResult::new(*title, format!("{query} from {}", self.name), "", self.name, Some(Quality::High))
                })
                .collect())
        }
    }

    struct FailingFetcher;

    impl SourceFetcher for FailingFetcher {
        fn name(&self) -> &str {
            "Broken"
        }

        fn fetch(&self, _query: &str) -> Result<Vec<FetchResult>, FetchError> {
            Err(FetchError::Http { status: 503 })
        }
    }

    struct PanickingFetcher;

    impl SourceFetcher for PanickingFetcher {
        fn name(&self) -> &str {
            "Panicky"
        }

        fn fetch(&self, _query: &str) -> Result<Vec<FetchResult>, FetchError> {
            panic!("boom");
        }
    }

    #[test]
    fn merges_sources_in_order_and_dedups_titles() {
        let fetchers: Vec<Arc<dyn SourceFetcher>> = vec![
            Arc::new(StaticFetcher { name: "A", titles: vec!["Cairo", "Giza"] }),
            Arc::new(StaticFetcher { name: "B", titles: vec!["cairo", "Luxor"] }),
        ];

        let outcome = fetch_all(&fetchers, "egypt");
        let titles: Vec<&str> = outcome.results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Cairo", "Giza", "Luxor"]);
        assert_eq!(outcome.results[0].content, "egypt from A");
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn failing_source_does_not_affect_siblings() {
        let fetchers: Vec<Arc<dyn SourceFetcher>> = vec![
            Arc::new(FailingFetcher),
            Arc::new(StaticFetcher { name: "A", titles: vec!["Nile"] }),
        ];

        let outcome = fetch_all(&fetchers, "nile");
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.errors, vec!["Broken: HTTP error: status 503"]);
    }

    #[test]
    fn panicking_source_is_reported_as_error() {
        let fetchers: Vec<Arc<dyn SourceFetcher>> = vec![
            Arc::new(PanickingFetcher),
            Arc::new(StaticFetcher { name: "A", titles: vec!["Nile"] }),
        ];

        let outcome = fetch_all(&fetchers, "nile");
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.errors, vec!["Panicky: fetcher panicked"]);
    }

    #[test]
    fn no_fetchers_no_results() {
        let outcome = fetch_all(&[], "anything");
        assert!(outcome.results.is_empty());
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn default_fetchers_are_wikipedia_then_dbpedia() {
        let fetchers = default_fetchers().unwrap();
        let names: Vec<&str> = fetchers.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["Wikipedia", "DBpedia"]);
    }
}
