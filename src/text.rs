//! Text normalization and sentence segmentation.
//!
//! Every component that works on sentences goes through [`segment`], so the
//! ranker, summarizer, key-point extractor and merger always agree on what a
//! sentence is.

mod normalizer;
mod segmenter;

pub use normalizer::TextNormalizer;
pub use segmenter::{MIN_SENTENCE_CHARS, segment};

/// Counts whitespace-separated words.
pub(crate) fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Returns true if the text contains a decimal digit: ASCII, Arabic-Indic or
/// extended Arabic-Indic. Superscripts, fractions and numerals do not count.
pub(crate) fn has_digit(text: &str) -> bool {
    text.chars().any(|c| {
        c.is_ascii_digit()
            || ('\u{0660}'..='\u{0669}').contains(&c)
            || ('\u{06F0}'..='\u{06F9}').contains(&c)
    })
}

/// Returns the longest prefix of `text` holding at most `max_chars` characters.
///
/// Never splits a multi-byte character.
///
/// # Examples
///
/// ```
/// use maktaba::text::truncate_chars;
///
/// assert_eq!(truncate_chars("hello", 3), "hel");
/// assert_eq!(truncate_chars("مرحبا", 2), "مر");
/// assert_eq!(truncate_chars("hi", 10), "hi");
/// ```
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
