//! Pattern-based key-point extraction.
//!
//! Independent of summary scoring: a sentence is a key point when it looks like
//! a definition, carries a number, or uses an emphasis term.

use regex::Regex;

use crate::config::{Lexicon, LexiconError, term_matcher};
use crate::summarizer::Summarizer;
use crate::text::{has_digit, segment};

/// Sentences in the fallback summary used when nothing matches.
const FALLBACK_SUMMARY_SENTENCES: usize = 3;

/// Extracts structurally or lexically significant sentences.
#[derive(Debug, Clone)]
pub struct KeyPointExtractor {
    definition: Option<Regex>,
    emphasis: Option<Regex>,
    limit: usize,
    summarizer: Summarizer,
}

impl KeyPointExtractor {
    /// Creates an extractor returning at most `limit` key points.
    ///
    /// # Errors
    ///
    /// Returns an error if a lexicon term list cannot be compiled.
    pub fn new(lexicon: &Lexicon, limit: usize) -> Result<Self, LexiconError> {
        Ok(Self {
            definition: term_matcher(&lexicon.definition_prefixes, "^", "")?,
            emphasis: term_matcher(&lexicon.emphasis_terms, "", "")?,
            limit,
            summarizer: Summarizer::new(lexicon),
        })
    }

    /// Returns true if the sentence matches any key-point pattern.
    pub fn is_key_sentence(&self, sentence: &str) -> bool {
        let sentence = sentence.trim();
        self.definition.as_ref().is_some_and(|re| re.is_match(sentence))
            || has_digit(sentence)
            || self.emphasis.as_ref().is_some_and(|re| re.is_match(sentence))
    }

    /// Extracts up to `limit` key points from `text`.
    ///
    /// Each point is a trimmed sentence ending in a period. When no sentence
    /// matches, the single point returned is a three-sentence summary of the
    /// text, so non-empty input never yields an empty list.
    ///
    /// # Examples
    ///
    /// ```
    /// use maktaba::config::Lexicon;
    /// use maktaba::key_points::KeyPointExtractor;
    ///
    /// let extractor = KeyPointExtractor::new(&Lexicon::bundled().unwrap(), 7).unwrap();
    /// let points = extractor.extract_key_points(
    ///     "The city was founded in 969. Its streets wind between old houses.",
    /// );
    /// assert_eq!(points, vec!["The city was founded in 969."]);
    /// ```
    pub fn extract_key_points(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let points: Vec<String> = segment(text)
            .filter(|sentence| self.is_key_sentence(sentence))
            .take(self.limit)
            .map(format_point)
            .collect();

        if points.is_empty() {
            vec![self.summarizer.summarize(text, FALLBACK_SUMMARY_SENTENCES)]
        } else {
            points
        }
    }
}

fn format_point(sentence: &str) -> String {
    let mut point = sentence.trim().to_string();
    if !point.ends_with('.') {
        point.push('.');
    }
    point
}
