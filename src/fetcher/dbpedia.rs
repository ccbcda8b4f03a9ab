use reqwest::Url;
use serde::Deserialize;

use crate::models::{FetchResult, Quality};

use super::SourceFetcher;
use super::client::{FetchError, HttpClient, url_with_params};

/// Default DBpedia lookup endpoint.
pub const DEFAULT_LOOKUP_URL: &str = "https://lookup.dbpedia.org/api/search";
const MAX_RESULTS: &str = "3";
/// Comments of this many characters or fewer carry too little to keep.
const MIN_COMMENT_CHARS: usize = 50;
const SOURCE_NAME: &str = "DBpedia";

/// Looks up entity descriptions on DBpedia.
#[derive(Debug, Clone)]
pub struct DBpediaFetcher {
    client: HttpClient,
    lookup_url: String,
}

impl DBpediaFetcher {
    /// Creates a fetcher against the public lookup service.
    pub fn new(client: HttpClient) -> Self {
        Self::with_lookup_url(client, DEFAULT_LOOKUP_URL)
    }

    /// Creates a fetcher against a custom lookup endpoint.
    pub fn with_lookup_url(client: HttpClient, lookup_url: impl Into<String>) -> Self {
        Self {
            client,
            lookup_url: lookup_url.into(),
        }
    }

    /// URL of the lookup request for `query`.
    pub fn lookup_url(&self, query: &str) -> Result<Url, FetchError> {
        url_with_params(
            &self.lookup_url,
            &[
                ("query", query),
                ("format", "json"),
                ("maxResults", MAX_RESULTS),
            ],
        )
    }
}

impl SourceFetcher for DBpediaFetcher {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn fetch(&self, query: &str) -> Result<Vec<FetchResult>, FetchError> {
        let response: LookupResponse = self.client.get_json(self.lookup_url(query)?)?;
        Ok(parse_docs(response))
    }
}

#[derive(Debug, Default, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    docs: Vec<LookupDoc>,
}

#[derive(Debug, Default, Deserialize)]
struct LookupDoc {
    #[serde(default)]
    label: Vec<String>,
    #[serde(default)]
    comment: Vec<String>,
    #[serde(default)]
    resource: Vec<String>,
}

fn parse_docs(response: LookupResponse) -> Vec<FetchResult> {
    response
        .docs
        .into_iter()
        .filter_map(|doc| {
            let comment = strip_highlight(doc.comment.first()?);
            if comment.chars().count() <= MIN_COMMENT_CHARS {
                return None;
            }
            let title = strip_highlight(doc.label.first()?);
            let url = doc.resource.first().cloned().unwrap_or_default();
            Some(FetchResult::new(
                title,
                comment,
                url,
                SOURCE_NAME,
                Some(Quality::High),
            ))
        })
        .collect()
}

/// Removes the `<B>`/`</B>` match highlighting the lookup service adds.
fn strip_highlight(text: &str) -> String {
    text.replace("<B>", "").replace("</B>", "")
}
