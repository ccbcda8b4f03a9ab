//! Answer composition from summary and key points.

use std::fmt::Write as _;

use tracing::warn;

use crate::key_points::KeyPointExtractor;
use crate::summarizer::Summarizer;

use super::types::{Answer, ComposeError, DegradeReason};

/// Default summary length of a composed answer.
pub const DEFAULT_SUMMARY_SENTENCES: usize = 7;
/// Default length of the raw-context fallback.
pub const DEFAULT_FALLBACK_CHARS: usize = 800;

/// Builder for constructing `AnswerComposer` instances.
#[derive(Default)]
pub struct AnswerComposerBuilder {
    summarizer: Option<Summarizer>,
    key_points: Option<KeyPointExtractor>,
    summary_sentences: Option<usize>,
    fallback_chars: Option<usize>,
}

impl AnswerComposerBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the summarizer used for the summary section.
    pub fn summarizer(mut self, summarizer: Summarizer) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Sets the extractor used for the key-points section.
    pub fn key_points(mut self, key_points: KeyPointExtractor) -> Self {
        self.key_points = Some(key_points);
        self
    }

    /// Sets the number of summary sentences (default 7).
    pub fn summary_sentences(mut self, sentences: usize) -> Self {
        self.summary_sentences = Some(sentences);
        self
    }

    /// Sets the fallback length in characters (default 800).
    pub fn fallback_chars(mut self, chars: usize) -> Self {
        self.fallback_chars = Some(chars);
        self
    }

    /// Builds the `AnswerComposer`.
    ///
    /// # Panics
    ///
    /// Panics if `summarizer()` or `key_points()` was not called.
    #[must_use]
    pub fn build(self) -> AnswerComposer {
        AnswerComposer {
            summarizer: self
                .summarizer
                .expect("summarizer must be set via summarizer() method"),
            key_points: self
                .key_points
                .expect("key_points must be set via key_points() method"),
            summary_sentences: self.summary_sentences.unwrap_or(DEFAULT_SUMMARY_SENTENCES),
            fallback_chars: self.fallback_chars.unwrap_or(DEFAULT_FALLBACK_CHARS),
        }
    }
}

/// Combines an extractive summary and key points into one answer.
#[derive(Debug, Clone)]
pub struct AnswerComposer {
    summarizer: Summarizer,
    key_points: KeyPointExtractor,
    summary_sentences: usize,
    fallback_chars: usize,
}

impl AnswerComposer {
    /// Composes an answer to `query` from `context`.
    ///
    /// Never fails: when the structured answer cannot be produced, the result
    /// is [`Answer::Degraded`] holding a prefix of the raw context.
    pub fn generate_answer(&self, query: &str, context: &str) -> Answer {
        match self.compose(context) {
            Ok(text) => Answer::Full(text),
            Err(ComposeError::EmptyContext) => {
                Answer::degraded(DegradeReason::EmptyContext, "", self.fallback_chars)
            }
            Err(e) => {
                warn!(query = %query, error = %e, "Answer composition failed, using raw context");
                self.degrade(e.reason(), context)
            }
        }
    }

    /// Builds a degraded answer from raw context with this composer's
    /// fallback length.
    pub fn degrade(&self, reason: DegradeReason, context: &str) -> Answer {
        Answer::degraded(reason, context, self.fallback_chars)
    }

    /// Formats the structured answer.
    ///
    /// The key-points section only appears when there is more than one point.
    pub fn compose(&self, context: &str) -> Result<String, ComposeError> {
        if context.trim().is_empty() {
            return Err(ComposeError::EmptyContext);
        }

        let summary = self.summarizer.summarize(context, self.summary_sentences);
        let points = self.key_points.extract_key_points(context);

        let mut answer = String::new();
        write!(answer, "**Summary:**\n\n{summary}\n\n")?;

        if points.len() > 1 {
            answer.push_str("**Key Points:**\n\n");
            for (i, point) in points.iter().enumerate() {
                writeln!(answer, "{}. {point}", i + 1)?;
            }
        }

        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Lexicon;

    fn composer() -> AnswerComposer {
        let lexicon = Lexicon::bundled().unwrap();
        AnswerComposerBuilder::new()
            .summarizer(Summarizer::new(&lexicon))
            .key_points(KeyPointExtractor::new(&lexicon, 7).unwrap())
            .build()
    }

    #[test]
    fn full_answer_has_summary_and_numbered_key_points() {
        let context = "Egypt is a country in North Africa. \
                       Its population is over 100 million people. \
                       The Nile is the main river flowing through it.";
        let answer = composer().generate_answer("Egypt", context);

        let Answer::Full(text) = answer else {
            panic!("expected a full answer");
        };
        assert!(text.starts_with("**Summary:**\n\n"));
        assert!(text.contains("**Key Points:**\n\n1. "));
        assert!(text.contains("\n2. "));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn single_key_point_omits_the_section() {
        // Only the sentence with a number qualifies
        let context = "The old harbour was rebuilt in 1902. Boats drift slowly along the water.";
        let text = composer().compose(context).unwrap();

        assert_eq!(text, format!("**Summary:**\n\n{context}\n\n"));
    }

    #[test]
    fn empty_context_degrades_to_empty_answer() {
        let answer = composer().generate_answer("anything", "  ");
        assert_eq!(answer.reason(), Some(DegradeReason::EmptyContext));
        assert_eq!(answer.text(), "");
    }

    #[test]
    fn degrade_uses_configured_fallback_length() {
        let lexicon = Lexicon::bundled().unwrap();
        let composer = AnswerComposerBuilder::new()
            .summarizer(Summarizer::new(&lexicon))
            .key_points(KeyPointExtractor::new(&lexicon, 7).unwrap())
            .fallback_chars(5)
            .build();

        let answer = composer.degrade(DegradeReason::UpstreamFailure, "0123456789");
        assert_eq!(answer.text(), "01234...");
    }

    #[test]
    fn default_fallback_is_eight_hundred_chars() {
        let context = "x".repeat(1000);
        let answer = composer().degrade(DegradeReason::Composition, &context);
        assert_eq!(answer.text().chars().count(), 803);
    }

    #[test]
    #[should_panic(expected = "summarizer must be set")]
    fn builder_requires_summarizer() {
        let lexicon = Lexicon::bundled().unwrap();
        let _ = AnswerComposerBuilder::new()
            .key_points(KeyPointExtractor::new(&lexicon, 7).unwrap())
            .build();
    }
}
