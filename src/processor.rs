//! Cleaning, validation and quality assessment of fetched content.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use time::OffsetDateTime;
use tracing::debug;

use crate::config::{Lexicon, LexiconError};
use crate::models::{FetchResult, Quality};
use crate::text::{TextNormalizer, segment, truncate_chars};

/// Default minimum length of usable content, in characters.
pub const DEFAULT_MIN_CONTENT_CHARS: usize = 50;
/// Default maximum length of content kept whole, in characters.
pub const DEFAULT_MAX_CONTENT_CHARS: usize = 5000;
/// Sentences kept when over-long content is cut down.
const TRUNCATED_SENTENCES: usize = 15;
/// Keywords reported by [`ContentProcessor::analyze_content`].
const ANALYSIS_KEYWORDS: usize = 10;
const READING_WORDS_PER_MINUTE: usize = 200;
/// Keywords must be longer than this many characters.
const MIN_KEYWORD_CHARS: usize = 3;

/// Why a result was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    ContentTooShort,
}

impl std::fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContentTooShort => write!(f, "content_too_short"),
        }
    }
}

/// Outcome of length validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Valid,
    /// Valid, but the content was cut down to its leading sentences.
    Truncated,
    Invalid(InvalidReason),
}

impl Validity {
    pub fn is_valid(self) -> bool {
        !matches!(self, Self::Invalid(_))
    }
}

/// A fetched result after cleaning and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedResult {
    pub title: String,
    pub content: String,
    pub url: String,
    pub source: String,
    pub quality: Quality,
    pub timestamp: OffsetDateTime,
    pub validity: Validity,
}

/// Shallow statistics about a text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentAnalysis {
    pub keywords: Vec<String>,
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_words_per_sentence: usize,
    pub reading_minutes: usize,
}

/// Prepares fetched results for answering and storage.
#[derive(Debug, Clone)]
pub struct ContentProcessor {
    normalizer: TextNormalizer,
    high_quality_sources: Vec<String>,
    medium_quality_sources: Vec<String>,
    stop_words: HashSet<String>,
    min_content_chars: usize,
    max_content_chars: usize,
}

impl ContentProcessor {
    /// Creates a processor with the given content length bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if the lexicon's noise lists cannot be compiled.
    pub fn new(
        lexicon: &Lexicon,
        min_content_chars: usize,
        max_content_chars: usize,
    ) -> Result<Self, LexiconError> {
        let lower = |terms: &[String]| -> Vec<String> {
            terms.iter().map(|t| t.trim().to_lowercase()).collect()
        };

        Ok(Self {
            normalizer: TextNormalizer::new(lexicon)?,
            high_quality_sources: lower(&lexicon.high_quality_sources),
            medium_quality_sources: lower(&lexicon.medium_quality_sources),
            stop_words: lower(&lexicon.stop_words).into_iter().collect(),
            min_content_chars,
            max_content_chars,
        })
    }

    /// Classifies a source by the markers in its name or URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use maktaba::config::Lexicon;
    /// use maktaba::models::Quality;
    /// use maktaba::processor::ContentProcessor;
    ///
    /// let processor = ContentProcessor::new(&Lexicon::bundled().unwrap(), 50, 5000).unwrap();
    /// assert_eq!(processor.assess_quality("Wikipedia (en)"), Quality::High);
    /// assert_eq!(processor.assess_quality("BBC News"), Quality::Medium);
    /// assert_eq!(processor.assess_quality("someblog.com"), Quality::Low);
    /// ```
    pub fn assess_quality(&self, source: &str) -> Quality {
        let source = source.to_lowercase();
        let has_marker = |markers: &[String]| {
            markers
                .iter()
                .any(|m| !m.is_empty() && source.contains(m.as_str()))
        };

        if has_marker(&self.high_quality_sources) {
            Quality::High
        } else if has_marker(&self.medium_quality_sources) {
            Quality::Medium
        } else {
            Quality::Low
        }
    }

    /// Cleans one result, fills in its quality and validates its length.
    pub fn process_result(&self, result: FetchResult) -> ProcessedResult {
        let quality = result
            .quality
            .unwrap_or_else(|| self.assess_quality(&result.source));
        let mut content = self.normalizer.normalize(&result.content);
        let chars = content.chars().count();

        let validity = if chars < self.min_content_chars {
            let reason = InvalidReason::ContentTooShort;
            debug!(title = %result.title, chars, reason = %reason, "Rejecting content");
            Validity::Invalid(reason)
        } else if chars > self.max_content_chars {
            let key_info = extract_key_info(&content, TRUNCATED_SENTENCES);
            content = if key_info.is_empty() {
                truncate_chars(&content, self.max_content_chars).to_string()
            } else {
                key_info
            };
            Validity::Truncated
        } else {
            Validity::Valid
        };

        ProcessedResult {
            title: result.title,
            content,
            url: result.url,
            source: result.source,
            quality,
            timestamp: result.timestamp,
            validity,
        }
    }

    /// Processes every result, drops invalid ones and orders the rest from
    /// high to low quality. Results of equal quality keep their order.
    pub fn process_results(&self, results: Vec<FetchResult>) -> Vec<ProcessedResult> {
        let mut processed: Vec<ProcessedResult> = results
            .into_iter()
            .map(|result| self.process_result(result))
            .filter(|result| result.validity.is_valid())
            .collect();

        processed.sort_by_key(|result| std::cmp::Reverse(result.quality.rank()));
        processed
    }

    /// Returns the `count` most frequent content words of `text`.
    ///
    /// Words are lowercased, must be longer than three characters, consist of
    /// Arabic or Latin letters only and must not be stop words. Equal
    /// frequencies keep first-appearance order.
    pub fn extract_keywords(&self, text: &str, count: usize) -> Vec<String> {
        let mut order: Vec<String> = Vec::new();
        let mut frequency: HashMap<String, usize> = HashMap::new();

        for word in text.to_lowercase().split_whitespace() {
            if word.chars().count() <= MIN_KEYWORD_CHARS
                || !word.chars().all(is_keyword_char)
                || self.stop_words.contains(word)
            {
                continue;
            }
            let seen = frequency.entry(word.to_string()).or_insert(0);
            if *seen == 0 {
                order.push(word.to_string());
            }
            *seen += 1;
        }

        // Stable sort keeps first appearance among equal counts
        order.sort_by_key(|word| std::cmp::Reverse(frequency[word]));
        order.truncate(count);
        order
    }

    /// Computes keyword and length statistics of `text`.
    pub fn analyze_content(&self, text: &str) -> ContentAnalysis {
        let word_count = text.split_whitespace().count();
        let sentence_count = text
            .split(['.', '!', '?'])
            .filter(|piece| !piece.trim().is_empty())
            .count();
        let avg_words_per_sentence = if sentence_count == 0 {
            0
        } else {
            (word_count as f64 / sentence_count as f64).round() as usize
        };

        ContentAnalysis {
            keywords: self.extract_keywords(text, ANALYSIS_KEYWORDS),
            word_count,
            sentence_count,
            avg_words_per_sentence,
            reading_minutes: word_count.div_ceil(READING_WORDS_PER_MINUTE),
        }
    }
}

/// Keeps the first `max_sentences` segmented sentences of `text`.
///
/// The result ends in `...` when sentences were dropped and in `.` otherwise.
/// Text with no sentences yields an empty string.
///
/// # Examples
///
/// ```
/// use maktaba::processor::extract_key_info;
///
/// let text = "The first sentence is long enough. The second sentence is long enough.";
/// assert_eq!(extract_key_info(text, 1), "The first sentence is long enough...");
/// assert_eq!(extract_key_info(text, 5), text);
/// ```
pub fn extract_key_info(text: &str, max_sentences: usize) -> String {
    let sentences: Vec<&str> = segment(text).collect();
    if sentences.is_empty() {
        return String::new();
    }

    let kept = &sentences[..sentences.len().min(max_sentences)];
    let ending = if sentences.len() > max_sentences { "..." } else { "." };
    format!("{}{ending}", kept.join(". "))
}

fn is_keyword_char(c: char) -> bool {
    c.is_ascii_lowercase() || ('\u{0600}'..='\u{06FF}').contains(&c)
}
