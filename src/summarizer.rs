//! Rule-based extractive summarization.
//!
//! Sentences are scored on position, length, digits and lexicon keywords; the
//! best ones are returned in their original order.

use crate::config::Lexicon;
use crate::text::{has_digit, segment, word_count};

/// Bonus for each of the first [`LEAD_SENTENCES`] sentences.
const LEAD_BONUS: f64 = 5.0;
const LEAD_SENTENCES: usize = 3;
/// Bonus for sentences containing a digit.
const DIGIT_BONUS: f64 = 2.0;
/// Bonus for sentences whose word count lies strictly inside the band.
const BAND_BONUS: f64 = 3.0;
const BAND_MIN_WORDS: usize = 10;
const BAND_MAX_WORDS: usize = 30;
/// Fractional length bonus is `words / LENGTH_DIVISOR`, capped at `LENGTH_CAP`.
const LENGTH_DIVISOR: f64 = 5.0;
const LENGTH_CAP: f64 = 3.0;

/// A sentence with its summary-worthiness score.
///
/// `original_index` is the sentence's position in the source document and
/// survives any reordering by score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSentence<'a> {
    pub text: &'a str,
    pub score: f64,
    pub original_index: usize,
}

/// Selects the most summary-worthy sentences of a document.
#[derive(Debug, Clone)]
pub struct Summarizer {
    keywords: Vec<String>,
}

impl Summarizer {
    /// Creates a summarizer scoring with the lexicon's summary keywords.
    pub fn new(lexicon: &Lexicon) -> Self {
        let mut keywords: Vec<String> = Vec::new();
        for keyword in &lexicon.summary_keywords {
            let keyword = keyword.trim().to_lowercase();
            if !keyword.is_empty() && !keywords.contains(&keyword) {
                keywords.push(keyword);
            }
        }
        Self { keywords }
    }

    /// Scores one sentence found at `index` in its document.
    pub fn score_sentence(&self, sentence: &str, index: usize) -> f64 {
        let mut score = 0.0;

        if index < LEAD_SENTENCES {
            score += LEAD_BONUS;
        }

        if has_digit(sentence) {
            score += DIGIT_BONUS;
        }

        let words = word_count(sentence);
        if words > BAND_MIN_WORDS && words < BAND_MAX_WORDS {
            score += BAND_BONUS;
        }

        // One point per distinct keyword, matched as a substring
        let lower = sentence.to_lowercase();
        score += self
            .keywords
            .iter()
            .filter(|keyword| lower.contains(keyword.as_str()))
            .count() as f64;

        score += (words as f64 / LENGTH_DIVISOR).min(LENGTH_CAP);

        score
    }

    /// Scores every segmented sentence of `text`, in document order.
    pub fn score_sentences<'a>(&self, text: &'a str) -> Vec<ScoredSentence<'a>> {
        segment(text)
            .enumerate()
            .map(|(original_index, sentence)| ScoredSentence {
                text: sentence,
                score: self.score_sentence(sentence, original_index),
                original_index,
            })
            .collect()
    }

    /// Produces an extractive summary of at most `max_sentences` sentences.
    ///
    /// Returns `text` unchanged when it has no more than `max_sentences`
    /// segmented sentences. Otherwise the highest scoring sentences (earliest
    /// first on ties) are joined with `". "` in document order and terminated
    /// with a period.
    ///
    /// # Examples
    ///
    /// ```
    /// use maktaba::config::Lexicon;
    /// use maktaba::summarizer::Summarizer;
    ///
    /// let summarizer = Summarizer::new(&Lexicon::bundled().unwrap());
    /// let short = "Only one sentence lives in this text.";
    /// assert_eq!(summarizer.summarize(short, 3), short);
    /// ```
    #[must_use]
    pub fn summarize(&self, text: &str, max_sentences: usize) -> String {
        let mut scored = self.score_sentences(text);
        if scored.len() <= max_sentences {
            return text.to_string();
        }
        if max_sentences == 0 {
            return String::new();
        }

        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.original_index.cmp(&b.original_index))
        });
        scored.truncate(max_sentences);
        scored.sort_by_key(|sentence| sentence.original_index);

        let joined = scored
            .iter()
            .map(|sentence| sentence.text)
            .collect::<Vec<_>>()
            .join(". ");
        format!("{joined}.")
    }
}
