//! The text pipeline as one explicitly constructed value.

use crate::analysis::TextAnalyzer;
use crate::answerer::{AnswerComposer, AnswerComposerBuilder};
use crate::config::{Lexicon, LexiconError, PipelineConfig};
use crate::key_points::KeyPointExtractor;
use crate::processor::ContentProcessor;
use crate::ranking::Ranker;
use crate::summarizer::Summarizer;
use crate::text::TextNormalizer;

/// All text components, built from one lexicon and one set of limits.
///
/// Components are configuration-only and cheap to share by reference.
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub normalizer: TextNormalizer,
    pub summarizer: Summarizer,
    pub key_points: KeyPointExtractor,
    pub composer: AnswerComposer,
    pub ranker: Ranker,
    pub processor: ContentProcessor,
    pub analyzer: TextAnalyzer,
    pub config: PipelineConfig,
}

impl Pipeline {
    /// Builds every component from `lexicon` and `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if a lexicon term list cannot be compiled.
    pub fn new(lexicon: &Lexicon, config: PipelineConfig) -> Result<Self, LexiconError> {
        let summarizer = Summarizer::new(lexicon);
        let key_points = KeyPointExtractor::new(lexicon, config.key_point_limit)?;
        let composer = AnswerComposerBuilder::new()
            .summarizer(summarizer.clone())
            .key_points(key_points.clone())
            .summary_sentences(config.summary_sentences)
            .fallback_chars(config.fallback_chars)
            .build();

        Ok(Self {
            normalizer: TextNormalizer::new(lexicon)?,
            summarizer,
            key_points,
            composer,
            ranker: Ranker::new(config.rank_limit),
            processor: ContentProcessor::new(
                lexicon,
                config.min_content_chars,
                config.max_content_chars,
            )?,
            analyzer: TextAnalyzer::new(lexicon),
            config,
        })
    }

    /// Builds the pipeline from `MAKTABA_LEXICON` and the `MAKTABA_*` limits.
    pub fn from_env() -> Result<Self, LexiconError> {
        Self::new(&Lexicon::from_env()?, PipelineConfig::from_env())
    }

    /// Builds the pipeline from the bundled lexicon and default limits.
    pub fn bundled() -> Result<Self, LexiconError> {
        Self::new(&Lexicon::bundled()?, PipelineConfig::default())
    }
}
