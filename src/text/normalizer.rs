use regex::Regex;

use crate::config::{Lexicon, LexiconError, term_matcher};
use crate::text::word_count;

/// Lines of at most this many words that mention a noise term are notices.
const NOTICE_MAX_WORDS: usize = 12;

/// Cleans raw fetched text before it is segmented or stored.
///
/// Construct once from a [`Lexicon`] and reuse; the noise matchers are compiled
/// up front.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    empty_brackets: Regex,
    lone_date: Regex,
    noise_prefix: Option<Regex>,
    noise_term: Option<Regex>,
}

impl TextNormalizer {
    /// Builds a normalizer using the lexicon's noise vocabularies.
    ///
    /// # Errors
    ///
    /// Returns an error if a noise term list cannot be compiled.
    pub fn new(lexicon: &Lexicon) -> Result<Self, LexiconError> {
        Ok(Self {
            empty_brackets: Regex::new(r"\(\s*\)|\[\s*\]").map_err(LexiconError::Pattern)?,
            lone_date: Regex::new(r"^\d{1,2}/\d{1,2}/\d{2,4}$").map_err(LexiconError::Pattern)?,
            noise_prefix: term_matcher(&lexicon.noise_prefixes, "^", r"\b")?,
            noise_term: term_matcher(&lexicon.noise_terms, r"\b", r"\b")?,
        })
    }

    /// Normalizes whitespace, control characters and punctuation.
    ///
    /// # Normalization rules
    ///
    /// - Line breaks are kept; any other whitespace becomes a space
    /// - Other C0/C1 control characters are removed
    /// - Empty `()` and `[]` pairs are removed, nested ones included
    /// - Runs of the same terminal punctuation collapse (`!!!` becomes `!`)
    /// - Runs of spaces collapse and every line is trimmed
    /// - Two or more blank lines collapse to one blank line
    /// - Leading and trailing blank lines are removed
    ///
    /// The result is a fixed point: cleaning it again changes nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use maktaba::config::Lexicon;
    /// use maktaba::text::TextNormalizer;
    ///
    /// let normalizer = TextNormalizer::new(&Lexicon::bundled().unwrap()).unwrap();
    /// assert_eq!(normalizer.clean("  Wow!!!   Really ()  "), "Wow! Really");
    /// assert_eq!(normalizer.clean("a\n\n\n\nb"), "a\n\nb");
    /// ```
    #[must_use]
    pub fn clean(&self, text: &str) -> String {
        let visible: String = text
            .replace("\r\n", "\n")
            .chars()
            .filter_map(|c| match c {
                '\n' | '\r' => Some('\n'),
                c if c.is_whitespace() => Some(' '),
                c if c.is_control() => None,
                c => Some(c),
            })
            .collect();

        // Removing one pair can expose an enclosing empty pair
        let mut unbracketed = visible;
        while self.empty_brackets.is_match(&unbracketed) {
            unbracketed = self
                .empty_brackets
                .replace_all(&unbracketed, "")
                .into_owned();
        }

        let mut punctuated = String::with_capacity(unbracketed.len());
        let mut previous = None;
        for c in unbracketed.chars() {
            if matches!(c, '.' | '!' | '?') && previous == Some(c) {
                continue;
            }
            punctuated.push(c);
            previous = Some(c);
        }

        let lines: Vec<String> = punctuated
            .split('\n')
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .collect();

        collapse_blank_lines(lines.iter().map(String::as_str))
    }

    /// Removes boilerplate lines from cleaned text.
    ///
    /// A line is dropped when it starts with an advertising or subscription
    /// word, is a short notice mentioning cookie or legal boilerplate, or
    /// consists of a lone `dd/mm/yyyy` style date. Longer lines only lose the
    /// boilerplate terms themselves. Expects the output of [`Self::clean`].
    ///
    /// # Examples
    ///
    /// ```
    /// use maktaba::config::Lexicon;
    /// use maktaba::text::TextNormalizer;
    ///
    /// let normalizer = TextNormalizer::new(&Lexicon::bundled().unwrap()).unwrap();
    /// let text = "Cairo is large.\nSubscribe to our newsletter\n12/05/2023\nIt is old.";
    /// assert_eq!(normalizer.filter_noise(text), "Cairo is large.\nIt is old.");
    /// ```
    #[must_use]
    pub fn filter_noise(&self, text: &str) -> String {
        let kept: Vec<String> = text
            .lines()
            .filter(|line| !self.is_noise_line(line.trim()))
            .map(|line| self.strip_noise_terms(line))
            .collect();
        collapse_blank_lines(kept.iter().map(String::as_str))
    }

    /// Convenience for `filter_noise(clean(text))`.
    #[must_use]
    pub fn normalize(&self, text: &str) -> String {
        self.filter_noise(&self.clean(text))
    }

    fn is_noise_line(&self, line: &str) -> bool {
        if line.is_empty() {
            return false;
        }

        self.noise_prefix.as_ref().is_some_and(|re| re.is_match(line))
            || (word_count(line) <= NOTICE_MAX_WORDS
                && self.noise_term.as_ref().is_some_and(|re| re.is_match(line)))
            || self.lone_date.is_match(line)
    }

    fn strip_noise_terms(&self, line: &str) -> String {
        match &self.noise_term {
            Some(re) if re.is_match(line) => re
                .replace_all(line, "")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" "),
            _ => line.to_string(),
        }
    }
}

/// Joins lines, keeping at most one blank line in a row and trimming the ends.
fn collapse_blank_lines<'a>(lines: impl Iterator<Item = &'a str>) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for line in lines {
        if line.is_empty() && kept.last().is_some_and(|last| last.is_empty()) {
            continue;
        }
        kept.push(line);
    }

    kept.join("\n").trim().to_string()
}
