//! Optional NLP capabilities: sentiment scoring and semantic similarity.
//!
//! Both are injected behind traits and resolved once into [`Capabilities`].
//! Call sites branch on availability and substitute a neutral default; a
//! missing capability is never an error for the caller.

mod lexicon;
mod overlap;

pub use lexicon::LexiconSentiment;
pub use overlap::TokenOverlapMatcher;

use crate::error::CoreResult;
use crate::shared::CoreConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Sentiment vector in the VADER shape. `compound` is in [-1, 1]; the other
/// three are proportions in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentScores {
    pub compound: f32,
    pub pos: f32,
    pub neg: f32,
    pub neu: f32,
}

impl SentimentScores {
    /// Zero vector used whenever the analyzer is absent or fails.
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn with_compound(compound: f32) -> Self {
        Self {
            compound: compound.clamp(-1.0, 1.0),
            ..Self::default()
        }
    }
}

pub trait SentimentAnalyzer: Send + Sync {
    fn name(&self) -> &str;

    fn score(&self, text: &str) -> CoreResult<SentimentScores>;
}

pub trait SemanticMatcher: Send + Sync {
    fn name(&self) -> &str;

    /// Similarity in [0, 1]; 1 means equivalent.
    fn similarity(&self, a: &str, b: &str) -> CoreResult<f32>;
}

/// Resolved set of optional capabilities. `None` means unavailable.
#[derive(Clone, Default)]
pub struct Capabilities {
    pub sentiment: Option<Arc<dyn SentimentAnalyzer>>,
    pub semantic: Option<Arc<dyn SemanticMatcher>>,
}

impl Capabilities {
    /// No capabilities: sentiment is always neutral and semantic matching is skipped.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_sentiment(mut self, analyzer: Arc<dyn SentimentAnalyzer>) -> Self {
        self.sentiment = Some(analyzer);
        self
    }

    pub fn with_semantic(mut self, matcher: Arc<dyn SemanticMatcher>) -> Self {
        self.semantic = Some(matcher);
        self
    }

    /// Builds the built-in capabilities enabled in `config`. Logs each disabled
    /// one once, here, rather than on every request.
    pub fn from_config(config: &CoreConfig) -> Self {
        let mut caps = Self::none();
        if config.sentiment_enabled {
            caps = caps.with_sentiment(Arc::new(LexiconSentiment::new()));
        } else {
            tracing::warn!(
                target: "ilm::nlp",
                capability = "sentiment",
                "Sentiment analyzer disabled; contexts will carry a neutral score"
            );
        }
        if config.semantic_enabled {
            caps = caps.with_semantic(Arc::new(TokenOverlapMatcher::new()));
        } else {
            tracing::warn!(
                target: "ilm::nlp",
                capability = "semantic",
                "Semantic matcher disabled; semantic matching step will be skipped"
            );
        }
        tracing::info!(
            target: "ilm::nlp",
            sentiment = caps.sentiment.as_ref().map(|s| s.name()).unwrap_or("none"),
            semantic = caps.semantic.as_ref().map(|s| s.name()).unwrap_or("none"),
            "NLP capabilities resolved"
        );
        caps
    }

    pub fn nlp_available(&self) -> bool {
        self.sentiment.is_some() || self.semantic.is_some()
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("sentiment", &self.sentiment.as_ref().map(|s| s.name().to_string()))
            .field("semantic", &self.semantic.as_ref().map(|s| s.name().to_string()))
            .finish()
    }
}

/// Lower-cases and strips punctuation except `'`, `!` and `?`, collapsing whitespace.
pub fn clean_text(text: &str) -> String {
    let mut mapped = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_alphanumeric() || c == '\'' || c == '!' || c == '?' {
            mapped.extend(c.to_lowercase());
        } else {
            mapped.push(' ');
        }
    }
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Word tokens of an already-cleaned string, with `!`/`?` trimmed off.
pub fn tokens(cleaned: &str) -> impl Iterator<Item = &str> {
    cleaned
        .split_whitespace()
        .map(|t| t.trim_matches(|c| c == '!' || c == '?' || c == '\''))
        .filter(|t| !t.is_empty())
}
