//! Blocking HTTP client shared by the remote sources.
//!
//! This module provides `HttpClient` for JSON GET requests with a per-request
//! timeout, along with the error type every fetcher reports.
use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
const CONNECT_TIMEOUT_SECS: u64 = 5;
const USER_AGENT: &str = concat!("maktaba/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur when fetching from a remote source.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// HTTP errors with status code
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// The response body was not the expected JSON
    #[error("Invalid response body: {0}")]
    Parse(#[source] serde_json::Error),

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error)
        } else {
            Self::Network(error)
        }
    }
}

/// Builder for constructing `HttpClient` instances.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use maktaba::fetcher::HttpClientBuilder;
///
/// let client = HttpClientBuilder::new()
///     .timeout(Duration::from_secs(3))
///     .build()
///     .expect("Failed to create client");
/// assert_eq!(client.timeout(), Duration::from_secs(3));
/// ```
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    timeout: Option<Duration>,
}

impl HttpClientBuilder {
    /// Creates a new `HttpClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the whole-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the `HttpClient`.
    ///
    /// # Environment Variables
    ///
    /// If `timeout()` was not called, this method reads whole seconds from
    /// `MAKTABA_FETCH_TIMEOUT_SECS`, defaulting to 10.
    pub fn build(self) -> Result<HttpClient, FetchError> {
        let timeout = self.timeout.unwrap_or_else(|| {
            let secs = std::env::var("MAKTABA_FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS);
            Duration::from_secs(secs)
        });

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS).min(timeout))
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Network)?;

        Ok(HttpClient { client, timeout })
    }
}

/// Synchronous JSON client with a fixed timeout and no retries.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl HttpClient {
    /// Returns the configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetches `url` and deserializes the JSON body.
    pub fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        debug!(%url, "GET");
        let response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.text()?;
        serde_json::from_str(&body).map_err(FetchError::Parse)
    }
}

/// Parses `base` and appends query parameters.
pub(crate) fn url_with_params(base: &str, params: &[(&str, &str)]) -> Result<Url, FetchError> {
    Url::parse_with_params(base, params)
        .map_err(|e| FetchError::InvalidUrl(format!("{base}: {e}")))
}
