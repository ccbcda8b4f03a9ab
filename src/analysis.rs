//! Lexicon-driven sentiment and topic heuristics.

use serde::Serialize;

use crate::config::{Lexicon, TopicKeywords};

/// Net positive-minus-negative count beyond which a text is not neutral.
const SENTIMENT_THRESHOLD: i64 = 2;

/// Coarse polarity of a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive => write!(f, "positive"),
            Self::Neutral => write!(f, "neutral"),
            Self::Negative => write!(f, "negative"),
        }
    }
}

/// Word-counting sentiment and topic classifier.
#[derive(Debug, Clone)]
pub struct TextAnalyzer {
    positive_words: Vec<String>,
    negative_words: Vec<String>,
    topics: Vec<TopicKeywords>,
}

impl TextAnalyzer {
    pub fn new(lexicon: &Lexicon) -> Self {
        Self {
            positive_words: lowercase_terms(&lexicon.positive_words),
            negative_words: lowercase_terms(&lexicon.negative_words),
            topics: lexicon
                .topics
                .iter()
                .map(|topic| TopicKeywords {
                    name: topic.name.clone(),
                    keywords: lowercase_terms(&topic.keywords),
                })
                .collect(),
        }
    }

    /// Classifies `text` by counting literal occurrences of positive and
    /// negative words.
    ///
    /// # Examples
    ///
    /// ```
    /// use maktaba::analysis::{Sentiment, TextAnalyzer};
    /// use maktaba::config::Lexicon;
    ///
    /// let analyzer = TextAnalyzer::new(&Lexicon::bundled().unwrap());
    /// assert_eq!(analyzer.analyze_sentiment("good, great, excellent"), Sentiment::Positive);
    /// assert_eq!(analyzer.analyze_sentiment("good but bad"), Sentiment::Neutral);
    /// ```
    pub fn analyze_sentiment(&self, text: &str) -> Sentiment {
        let lower = text.to_lowercase();
        let score = count_terms(&lower, &self.positive_words) as i64
            - count_terms(&lower, &self.negative_words) as i64;

        if score > SENTIMENT_THRESHOLD {
            Sentiment::Positive
        } else if score < -SENTIMENT_THRESHOLD {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    /// Returns the topic whose keywords occur most often in `text`.
    ///
    /// A later topic wins an exact tie. Returns `None` when no keyword occurs.
    pub fn classify_topic(&self, text: &str) -> Option<&str> {
        let lower = text.to_lowercase();
        let mut best: Option<(&str, usize)> = None;

        for topic in &self.topics {
            let score = count_terms(&lower, &topic.keywords);
            if best.is_none_or(|(_, best_score)| score >= best_score) {
                best = Some((topic.name.as_str(), score));
            }
        }

        best.filter(|(_, score)| *score > 0).map(|(name, _)| name)
    }
}

fn lowercase_terms(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn count_terms(haystack: &str, terms: &[String]) -> usize {
    terms
        .iter()
        .map(|term| haystack.matches(term.as_str()).count())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> TextAnalyzer {
        TextAnalyzer::new(&Lexicon::bundled().unwrap())
    }

    #[test]
    fn sentiment_needs_a_margin_above_two() {
        let analyzer = analyzer();
        assert_eq!(analyzer.analyze_sentiment("good great"), Sentiment::Neutral);
        assert_eq!(analyzer.analyze_sentiment("good great positive"), Sentiment::Positive);
        assert_eq!(analyzer.analyze_sentiment("bad wrong poor"), Sentiment::Negative);
        assert_eq!(analyzer.analyze_sentiment("bad wrong"), Sentiment::Neutral);
    }

    #[test]
    fn sentiment_is_case_insensitive_and_counts_arabic() {
        assert_eq!(
            analyzer().analyze_sentiment("GOOD جيد ممتاز رائع"),
            Sentiment::Positive
        );
    }

    #[test]
    fn sentiment_of_empty_text_is_neutral() {
        assert_eq!(analyzer().analyze_sentiment(""), Sentiment::Neutral);
    }

    #[test]
    fn classify_topic_picks_highest_count() {
        let analyzer = analyzer();
        assert_eq!(
            analyzer.classify_topic("Software runs on every computer connected to the internet"),
            Some("technology")
        );
        assert_eq!(
            analyzer.classify_topic("The ancient civilization left a rich history"),
            Some("history")
        );
    }

    #[test]
    fn classify_topic_later_topic_wins_ties() {
        // one science hit, one geography hit
        assert_eq!(
            analyzer().classify_topic("research about a country"),
            Some("geography")
        );
    }

    #[test]
    fn classify_topic_none_without_hits() {
        assert_eq!(analyzer().classify_topic("nothing to see"), None);
        assert_eq!(analyzer().classify_topic(""), None);
    }

    #[test]
    fn sentiment_display() {
        assert_eq!(Sentiment::Positive.to_string(), "positive");
        assert_eq!(Sentiment::Negative.to_string(), "negative");
        assert_eq!(Sentiment::Neutral.to_string(), "neutral");
    }
}
