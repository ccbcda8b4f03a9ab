//! Extractive answer composition.
//!
//! This module provides the `AnswerComposer`, which turns retrieved context into
//! a markdown-labelled summary plus a numbered key-point list, and the `Answer`
//! type that makes the raw-context fallback explicit.

mod composer;
mod types;

pub use composer::{
    AnswerComposer, AnswerComposerBuilder, DEFAULT_FALLBACK_CHARS, DEFAULT_SUMMARY_SENTENCES,
};
pub use types::{Answer, ComposeError, DegradeReason};
