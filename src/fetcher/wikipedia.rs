use std::collections::HashMap;

use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::{FetchResult, Quality};

use super::SourceFetcher;
use super::client::{FetchError, HttpClient, url_with_params};

/// Default search languages, tried in order.
pub const DEFAULT_LANGUAGES: &[&str] = &["ar", "en"];
/// Default site root; `{lang}` is replaced by the language code.
pub const DEFAULT_SITE_TEMPLATE: &str = "https://{lang}.wikipedia.org";
const SEARCH_LIMIT: &str = "3";
/// Titles whose introductions are fetched per search.
const DETAIL_TITLES: usize = 2;
const SOURCE_NAME: &str = "Wikipedia";

/// Builder for constructing `WikipediaFetcher` instances.
#[derive(Debug, Default)]
pub struct WikipediaFetcherBuilder {
    client: Option<HttpClient>,
    languages: Option<Vec<String>>,
    site_template: Option<String>,
}

impl WikipediaFetcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP client.
    pub fn client(mut self, client: HttpClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Sets the search languages in fallback order.
    pub fn languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = Some(languages.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the site root template, e.g. `http://localhost:8080/{lang}`.
    pub fn site_template(mut self, template: impl Into<String>) -> Self {
        self.site_template = Some(template.into());
        self
    }

    /// Builds the `WikipediaFetcher`.
    ///
    /// # Environment Variables
    ///
    /// If `languages()` was not called, the comma-separated list in
    /// `MAKTABA_WIKIPEDIA_LANGS` is used, defaulting to `ar,en`.
    ///
    /// # Panics
    ///
    /// Panics if `client()` was not called.
    #[must_use]
    pub fn build(self) -> WikipediaFetcher {
        let languages = self.languages.unwrap_or_else(|| {
            std::env::var("MAKTABA_WIKIPEDIA_LANGS")
                .ok()
                .map(|value| parse_languages(&value))
                .filter(|langs| !langs.is_empty())
                .unwrap_or_else(|| DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect())
        });

        WikipediaFetcher {
            client: self.client.expect("client must be set via client() method"),
            languages,
            site_template: self
                .site_template
                .unwrap_or_else(|| DEFAULT_SITE_TEMPLATE.to_string()),
        }
    }
}

fn parse_languages(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
        .collect()
}

/// Looks up article introductions on Wikipedia.
///
/// Searches each configured language in order and stops at the first one
/// that returns titles.
#[derive(Debug, Clone)]
pub struct WikipediaFetcher {
    client: HttpClient,
    languages: Vec<String>,
    site_template: String,
}

impl WikipediaFetcher {
    /// Returns the search languages in fallback order.
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    fn site(&self, lang: &str) -> String {
        self.site_template.replace("{lang}", lang)
    }

    /// URL of the opensearch request for `query`.
    pub fn search_url(&self, lang: &str, query: &str) -> Result<Url, FetchError> {
        url_with_params(
            &format!("{}/w/api.php", self.site(lang)),
            &[
                ("action", "opensearch"),
                ("search", query),
                ("limit", SEARCH_LIMIT),
                ("format", "json"),
            ],
        )
    }

    /// URL of the plain-text introduction of `title`.
    pub fn extract_url(&self, lang: &str, title: &str) -> Result<Url, FetchError> {
        url_with_params(
            &format!("{}/w/api.php", self.site(lang)),
            &[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", ""),
                ("explaintext", ""),
                ("titles", title),
                ("format", "json"),
            ],
        )
    }

    /// Public article URL of `title`.
    pub fn page_url(&self, lang: &str, title: &str) -> Result<Url, FetchError> {
        let site = self.site(lang);
        let mut url =
            Url::parse(&site).map_err(|e| FetchError::InvalidUrl(format!("{site}: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| FetchError::InvalidUrl(site.clone()))?
            .pop_if_empty()
            .extend(["wiki", title]);
        Ok(url)
    }

    fn search(&self, lang: &str, query: &str) -> Result<Vec<String>, FetchError> {
        let body: serde_json::Value = self.client.get_json(self.search_url(lang, query)?)?;
        Ok(parse_search_titles(&body))
    }

    fn details(&self, lang: &str, titles: &[String]) -> Vec<FetchResult> {
        let mut results = Vec::new();
        for title in titles.iter().take(DETAIL_TITLES) {
            match self.detail(lang, title) {
                Ok(Some(result)) => results.push(result),
                Ok(None) => debug!(lang = %lang, title = %title, "No extract"),
                Err(e) => warn!(lang = %lang, title = %title, error = %e, "Failed to fetch extract"),
            }
        }
        results
    }

    fn detail(&self, lang: &str, title: &str) -> Result<Option<FetchResult>, FetchError> {
        let response: ExtractResponse = self.client.get_json(self.extract_url(lang, title)?)?;
        let Some(page) = first_page_with_extract(response) else {
            return Ok(None);
        };

        let url = self.page_url(lang, title)?;
        Ok(Some(FetchResult::new(
            page.title,
            page.extract.unwrap_or_default(),
            url.as_str(),
            SOURCE_NAME,
            Some(Quality::High),
        )))
    }
}

impl SourceFetcher for WikipediaFetcher {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn fetch(&self, query: &str) -> Result<Vec<FetchResult>, FetchError> {
        for lang in &self.languages {
            let titles = self.search(lang, query)?;
            if titles.is_empty() {
                debug!(lang = %lang, query = %query, "No titles, trying next language");
                continue;
            }
            return Ok(self.details(lang, &titles));
        }
        Ok(Vec::new())
    }
}

/// Titles from an opensearch response: `[query, [titles], [descriptions], [urls]]`.
fn parse_search_titles(body: &serde_json::Value) -> Vec<String> {
    body.get(1)
        .and_then(|titles| titles.as_array())
        .map(|titles| {
            titles
                .iter()
                .filter_map(|t| t.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: HashMap<String, ExtractPage>,
}

#[derive(Debug, Deserialize)]
struct ExtractPage {
    title: String,
    extract: Option<String>,
}

fn first_page_with_extract(response: ExtractResponse) -> Option<ExtractPage> {
    response
        .query?
        .pages
        .into_values()
        .find(|page| page.extract.as_deref().is_some_and(|e| !e.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::HttpClientBuilder;

    fn fetcher() -> WikipediaFetcher {
        WikipediaFetcherBuilder::new()
            .client(HttpClientBuilder::new().build().unwrap())
            .languages(["ar", "en"])
            .build()
    }

    #[test]
    fn search_url_targets_language_site() {
        let url = fetcher().search_url("en", "Nile river").unwrap();
        assert_eq!(url.host_str(), Some("en.wikipedia.org"));
        assert_eq!(url.path(), "/w/api.php");

        let pairs: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["action"], "opensearch");
        assert_eq!(pairs["search"], "Nile river");
        assert_eq!(pairs["limit"], "3");
        assert_eq!(pairs["format"], "json");
    }

    #[test]
    fn extract_url_requests_plain_intro() {
        let url = fetcher().extract_url("ar", "القاهرة").unwrap();
        assert_eq!(url.host_str(), Some("ar.wikipedia.org"));

        let pairs: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["prop"], "extracts");
        assert!(pairs.contains_key("exintro"));
        assert!(pairs.contains_key("explaintext"));
        assert_eq!(pairs["titles"], "القاهرة");
    }

    #[test]
    fn page_url_escapes_title() {
        let url = fetcher().page_url("en", "Aswan Dam").unwrap();
        assert_eq!(url.as_str(), "https://en.wikipedia.org/wiki/Aswan%20Dam");
    }

    #[test]
    fn site_template_allows_local_endpoints() {
        let fetcher = WikipediaFetcherBuilder::new()
            .client(HttpClientBuilder::new().build().unwrap())
            .site_template("http://localhost:8080/{lang}/")
            .build();
        let url = fetcher.page_url("en", "Cairo").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/en/wiki/Cairo");
    }

    #[test]
    fn parse_search_titles_reads_second_element() {
        let body = serde_json::json!(["nile", ["Nile", "Nile Delta", "Nile River"], [], []]);
        assert_eq!(
            parse_search_titles(&body),
            vec!["Nile", "Nile Delta", "Nile River"]
        );
    }

    #[test]
    fn parse_search_titles_tolerates_unexpected_shapes() {
        assert!(parse_search_titles(&serde_json::json!(["nile", []])).is_empty());
        assert!(parse_search_titles(&serde_json::json!({"error": "x"})).is_empty());
    }

    #[test]
    fn first_page_with_extract_skips_missing_pages() {
        let response: ExtractResponse = serde_json::from_value(serde_json::json!({
            "query": {"pages": {
                "-1": {"title": "Missing", "missing": ""},
                "42": {"title": "Nile", "extract": "The Nile is a river."}
            }}
        }))
        .unwrap();

        let page = first_page_with_extract(response).unwrap();
        assert_eq!(page.title, "Nile");
        assert_eq!(page.extract.as_deref(), Some("The Nile is a river."));
    }

    #[test]
    fn first_page_with_extract_none_without_query() {
        let response: ExtractResponse =
            serde_json::from_value(serde_json::json!({"batchcomplete": ""})).unwrap();
        assert!(first_page_with_extract(response).is_none());
    }

    #[test]
    #[serial_test::serial]
    fn languages_default_from_env() {
        unsafe {
            std::env::set_var("MAKTABA_WIKIPEDIA_LANGS", " en , fr,,");
        }
        let fetcher = WikipediaFetcherBuilder::new()
            .client(HttpClientBuilder::new().build().unwrap())
            .build();
        assert_eq!(fetcher.languages(), ["en", "fr"]);

        unsafe {
            std::env::remove_var("MAKTABA_WIKIPEDIA_LANGS");
        }
        let fetcher = WikipediaFetcherBuilder::new()
            .client(HttpClientBuilder::new().build().unwrap())
            .build();
        assert_eq!(fetcher.languages(), ["ar", "en"]);
    }
}
