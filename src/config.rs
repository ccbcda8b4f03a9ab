//! Runtime configuration for the text pipeline.
//!
//! Two pieces live here:
//!
//! - [`Lexicon`]: the keyword, stop-word, noise and source-quality vocabularies
//!   used by the scoring components. It is plain JSON data so new languages or
//!   domains can be added without touching code. A default lexicon covering
//!   Arabic and English ships with the crate.
//! - [`PipelineConfig`]: numeric limits (summary length, ranking cut-off, content
//!   length bounds) read from `MAKTABA_*` environment variables.

use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bundled default lexicon.
const BUNDLED_LEXICON: &str = include_str!("../config/lexicon.json");

/// Errors that can occur while loading or compiling a lexicon.
#[derive(Debug, Error)]
pub enum LexiconError {
    /// The lexicon file could not be read
    #[error("Failed to read lexicon {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The lexicon JSON is malformed
    #[error("Invalid lexicon JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// A term list could not be compiled into a matcher
    #[error("Invalid lexicon pattern: {0}")]
    Pattern(#[source] regex::Error),
}

/// Keywords that identify one topic for [`crate::analysis::TextAnalyzer::classify_topic`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicKeywords {
    pub name: String,
    pub keywords: Vec<String>,
}

/// Data-driven vocabularies used by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lexicon {
    /// Terms that raise a sentence's summary score (+1 each, substring match).
    pub summary_keywords: Vec<String>,
    /// Sentence-initial phrases that mark a definition.
    pub definition_prefixes: Vec<String>,
    /// Terms that mark a sentence as emphasised.
    pub emphasis_terms: Vec<String>,
    /// Line prefixes of advertising and subscription boilerplate.
    pub noise_prefixes: Vec<String>,
    /// Whole-word terms of legal/cookie boilerplate.
    pub noise_terms: Vec<String>,
    /// Words ignored by keyword extraction.
    pub stop_words: Vec<String>,
    /// Source-name markers of the high trust tier.
    pub high_quality_sources: Vec<String>,
    /// Source-name markers of the medium trust tier.
    pub medium_quality_sources: Vec<String>,
    #[serde(default)]
    pub positive_words: Vec<String>,
    #[serde(default)]
    pub negative_words: Vec<String>,
    /// Topics in priority order; later topics win exact ties.
    #[serde(default)]
    pub topics: Vec<TopicKeywords>,
}

impl Lexicon {
    /// Returns the lexicon bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error only if the bundled file is malformed.
    pub fn bundled() -> Result<Self, LexiconError> {
        Self::from_json(BUNDLED_LEXICON)
    }

    /// Parses a lexicon from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, LexiconError> {
        serde_json::from_str(json).map_err(LexiconError::Parse)
    }

    /// Loads a lexicon from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LexiconError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LexiconError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Loads the lexicon named by `MAKTABA_LEXICON`, or the bundled one when the
    /// variable is not set.
    pub fn from_env() -> Result<Self, LexiconError> {
        match std::env::var("MAKTABA_LEXICON") {
            Ok(path) if !path.trim().is_empty() => Self::from_path(path.trim()),
            _ => Self::bundled(),
        }
    }
}

/// Compiles `terms` into one case-insensitive alternation wrapped in `prefix`
/// and `suffix`. Returns `None` for an empty term list.
pub(crate) fn term_matcher(
    terms: &[String],
    prefix: &str,
    suffix: &str,
) -> Result<Option<Regex>, LexiconError> {
    let mut escaped: Vec<String> = terms
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(regex::escape)
        .collect();
    if escaped.is_empty() {
        return Ok(None);
    }

    // Longest first so "cookies" wins over "cookie" inside the alternation
    escaped.sort_by_key(|t| std::cmp::Reverse(t.chars().count()));

    let pattern = format!("{prefix}(?:{}){suffix}", escaped.join("|"));
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map(Some)
        .map_err(LexiconError::Pattern)
}

/// Numeric limits of the pipeline.
///
/// Parsed from environment variables at call time with fallback defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Sentences in the answer summary (default 7).
    pub summary_sentences: usize,
    /// Maximum key points (default 7).
    pub key_point_limit: usize,
    /// Maximum ranked local records (default 5).
    pub rank_limit: usize,
    /// Characters of raw context kept by a degraded answer (default 800).
    pub fallback_chars: usize,
    /// Unique sentences kept when merging documents (default 15).
    pub merge_sentence_limit: usize,
    /// Processed content shorter than this is invalid (default 50).
    pub min_content_chars: usize,
    /// Processed content longer than this is truncated (default 5000).
    pub max_content_chars: usize,
    /// Characters of content stored as a record's summary (default 500).
    pub stored_summary_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            summary_sentences: 7,
            key_point_limit: 7,
            rank_limit: 5,
            fallback_chars: 800,
            merge_sentence_limit: 15,
            min_content_chars: 50,
            max_content_chars: 5000,
            stored_summary_chars: 500,
        }
    }
}

impl PipelineConfig {
    /// Parses configuration from environment variables.
    ///
    /// Falls back to defaults when env vars are not set or invalid.
    ///
    /// # Environment Variables
    ///
    /// - `MAKTABA_SUMMARY_SENTENCES` (default 7)
    /// - `MAKTABA_KEY_POINT_LIMIT` (default 7)
    /// - `MAKTABA_RANK_LIMIT` (default 5)
    /// - `MAKTABA_FALLBACK_CHARS` (default 800)
    /// - `MAKTABA_MERGE_SENTENCE_LIMIT` (default 15)
    /// - `MAKTABA_MIN_CONTENT_CHARS` (default 50)
    /// - `MAKTABA_MAX_CONTENT_CHARS` (default 5000)
    /// - `MAKTABA_STORED_SUMMARY_CHARS` (default 500)
    ///
    /// # Examples
    ///
    /// ```
    /// use maktaba::config::PipelineConfig;
    ///
    /// let config = PipelineConfig::from_env();
    /// assert!(config.rank_limit > 0);
    /// ```
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            summary_sentences: env_usize("MAKTABA_SUMMARY_SENTENCES", defaults.summary_sentences),
            key_point_limit: env_usize("MAKTABA_KEY_POINT_LIMIT", defaults.key_point_limit),
            rank_limit: env_usize("MAKTABA_RANK_LIMIT", defaults.rank_limit),
            fallback_chars: env_usize("MAKTABA_FALLBACK_CHARS", defaults.fallback_chars),
            merge_sentence_limit: env_usize(
                "MAKTABA_MERGE_SENTENCE_LIMIT",
                defaults.merge_sentence_limit,
            ),
            min_content_chars: env_usize("MAKTABA_MIN_CONTENT_CHARS", defaults.min_content_chars),
            max_content_chars: env_usize("MAKTABA_MAX_CONTENT_CHARS", defaults.max_content_chars),
            stored_summary_chars: env_usize(
                "MAKTABA_STORED_SUMMARY_CHARS",
                defaults.stored_summary_chars,
            ),
        }
    }
}

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
