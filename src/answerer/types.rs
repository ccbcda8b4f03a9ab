//! Types for composed answers.

use thiserror::Error;

use crate::text::truncate_chars;

/// Why an answer fell back to raw context instead of a composed summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradeReason {
    /// There was no context to answer from.
    EmptyContext,
    /// Formatting the structured answer failed.
    Composition,
    /// The retrieval layer failed and the caller chose to degrade.
    UpstreamFailure,
}

impl std::fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyContext => write!(f, "empty_context"),
            Self::Composition => write!(f, "composition"),
            Self::UpstreamFailure => write!(f, "upstream_failure"),
        }
    }
}

/// Errors raised while composing a structured answer.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("No context to compose an answer from")]
    EmptyContext,

    #[error("Failed to format answer: {0}")]
    Format(#[from] std::fmt::Error),
}

impl ComposeError {
    /// The degrade reason reported when this error is swallowed.
    pub fn reason(&self) -> DegradeReason {
        match self {
            Self::EmptyContext => DegradeReason::EmptyContext,
            Self::Format(_) => DegradeReason::Composition,
        }
    }
}

/// The answer shown to the user.
///
/// A full answer carries the markdown-labelled summary and key points. A
/// degraded answer carries a prefix of the raw context and the reason the
/// composed form is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Full(String),
    Degraded { text: String, reason: DegradeReason },
}

impl Answer {
    /// Builds a degraded answer from the first `max_chars` characters of
    /// `context`, appending `...` when it was cut.
    ///
    /// # Examples
    ///
    /// ```
    /// use maktaba::answerer::{Answer, DegradeReason};
    ///
    /// let answer = Answer::degraded(DegradeReason::Composition, "abcdef", 3);
    /// assert_eq!(answer.text(), "abc...");
    ///
    /// let answer = Answer::degraded(DegradeReason::Composition, "abc", 3);
    /// assert_eq!(answer.text(), "abc");
    /// ```
    pub fn degraded(reason: DegradeReason, context: &str, max_chars: usize) -> Self {
        let prefix = truncate_chars(context, max_chars);
        let text = if prefix.len() < context.len() {
            format!("{prefix}...")
        } else {
            prefix.to_string()
        };
        Self::Degraded { text, reason }
    }

    /// Returns the answer text.
    pub fn text(&self) -> &str {
        match self {
            Self::Full(text) | Self::Degraded { text, .. } => text,
        }
    }

    /// Returns true if this is a fallback answer.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Returns the degrade reason, if any.
    pub fn reason(&self) -> Option<DegradeReason> {
        match self {
            Self::Full(_) => None,
            Self::Degraded { reason, .. } => Some(*reason),
        }
    }

    /// Returns true if there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.text().is_empty()
    }
}
