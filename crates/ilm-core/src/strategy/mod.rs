//! Response resolution: an ordered chain of strategies, first accepted wins.
//!
//! | Step | Strategy            | Accepts when                                  | Confidence |
//! |------|---------------------|-----------------------------------------------|------------|
//! | 1    | `KeywordMatch`      | a keyword rule is a substring of the message   | 0.9        |
//! | 2    | `SemanticMatch`     | best similarity > 0.6 (capability required)    | similarity |
//! | 3    | `SentimentResponse` | compound < -0.3 or > 0.3                       | 0.8        |
//! | 4    | `FallbackResponse`  | always                                         | 0.6        |
//!
//! Errors and panics inside steps 1–3 count as abstention. A panic outside a
//! step (fallback included) is caught at [`StrategyChain::resolve`] and becomes
//! the apology candidate.

mod fallback;
mod keyword;
mod semantic;
mod sentiment;

pub use fallback::FallbackResponse;
pub use keyword::{KeywordMatch, KeywordRule, KeywordRules, RuleConflict};
pub use semantic::{SemanticMatch, SEMANTIC_THRESHOLD};
pub use sentiment::{SentimentResponse, NEGATIVE_THRESHOLD, POSITIVE_THRESHOLD};

use crate::context::Context;
use crate::error::CoreResult;
use crate::knowledge::KnowledgeSource;
use crate::nlp::Capabilities;
use crate::shared::message_prefix;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

pub const EMERGENCY_CONFIDENCE: f32 = 0.5;
pub const EMERGENCY_SOURCE_LABEL: &str = "Emergency Fallback";
pub const APOLOGY_TEXT: &str = "I'm sorry, something went wrong while preparing an answer. \
     Please try asking again in a moment.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyName {
    KeywordMatching,
    SemanticMatching,
    SentimentAnalysis,
    Fallback,
    EmergencyFallback,
}

impl StrategyName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyName::KeywordMatching => "keyword_matching",
            StrategyName::SemanticMatching => "semantic_matching",
            StrategyName::SentimentAnalysis => "sentiment_analysis",
            StrategyName::Fallback => "fallback",
            StrategyName::EmergencyFallback => "emergency_fallback",
        }
    }
}

impl fmt::Display for StrategyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A proposed answer. Confidence is clamped to [0, 1] on construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseCandidate {
    pub answer_text: String,
    pub citations: Vec<String>,
    pub source_label: String,
    pub confidence: f32,
    pub strategy: StrategyName,
}

impl ResponseCandidate {
    pub fn new(
        answer_text: impl Into<String>,
        citations: Vec<String>,
        source_label: impl Into<String>,
        confidence: f32,
        strategy: StrategyName,
    ) -> Self {
        let confidence = if confidence.is_nan() { 0.0 } else { confidence.clamp(0.0, 1.0) };
        Self {
            answer_text: answer_text.into(),
            citations,
            source_label: source_label.into(),
            confidence,
            strategy,
        }
    }

    /// Fixed apology returned when the chain itself fails.
    pub fn emergency() -> Self {
        Self::new(
            APOLOGY_TEXT,
            Vec::new(),
            EMERGENCY_SOURCE_LABEL,
            EMERGENCY_CONFIDENCE,
            StrategyName::EmergencyFallback,
        )
    }
}

/// One non-terminal step of the chain. `Ok(None)` abstains.
pub trait Strategy: Send + Sync {
    fn name(&self) -> StrategyName;

    fn attempt(&self, message: &str, context: &Context) -> CoreResult<Option<ResponseCandidate>>;
}

/// Ordered strategies plus the terminal fallback.
pub struct StrategyChain {
    strategies: Vec<Box<dyn Strategy>>,
    fallback: FallbackResponse,
}

impl StrategyChain {
    pub fn new(strategies: Vec<Box<dyn Strategy>>, fallback: FallbackResponse) -> Self {
        Self { strategies, fallback }
    }

    /// Keyword → semantic (when the matcher is available) → sentiment → fallback.
    pub fn standard(
        knowledge: Arc<dyn KnowledgeSource>,
        rules: Arc<KeywordRules>,
        capabilities: &Capabilities,
    ) -> Self {
        let mut strategies: Vec<Box<dyn Strategy>> = vec![Box::new(KeywordMatch::new(Arc::clone(&knowledge), rules))];
        if let Some(matcher) = capabilities.semantic.as_ref() {
            strategies.push(Box::new(SemanticMatch::new(Arc::clone(&knowledge), Arc::clone(matcher))));
        }
        strategies.push(Box::new(SentimentResponse::new()));
        Self::new(strategies, FallbackResponse::new(knowledge.as_ref()))
    }

    /// Names of the steps in order, terminal fallback included.
    pub fn step_names(&self) -> Vec<StrategyName> {
        self.strategies
            .iter()
            .map(|s| s.name())
            .chain(std::iter::once(StrategyName::Fallback))
            .collect()
    }

    /// Always returns exactly one candidate; never panics past this boundary.
    pub fn resolve(&self, message: &str, context: &Context) -> ResponseCandidate {
        match panic::catch_unwind(AssertUnwindSafe(|| self.run(message, context))) {
            Ok(candidate) => candidate,
            Err(_) => {
                tracing::error!(
                    target: "ilm::strategy",
                    message = %message_prefix(message),
                    "Strategy chain panicked; returning apology"
                );
                ResponseCandidate::emergency()
            }
        }
    }

    fn run(&self, message: &str, context: &Context) -> ResponseCandidate {
        for strategy in &self.strategies {
            let attempt = panic::catch_unwind(AssertUnwindSafe(|| strategy.attempt(message, context)));
            let Ok(outcome) = attempt else {
                tracing::error!(
                    target: "ilm::strategy",
                    strategy = %strategy.name(),
                    message = %message_prefix(message),
                    "Strategy panicked; treating as abstention"
                );
                continue;
            };
            match outcome {
                Ok(Some(candidate)) => {
                    tracing::debug!(
                        target: "ilm::strategy",
                        strategy = %candidate.strategy,
                        confidence = candidate.confidence,
                        "Strategy accepted"
                    );
                    return candidate;
                }
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(
                        target: "ilm::strategy",
                        strategy = %strategy.name(),
                        kind = e.kind(),
                        message = %message_prefix(message),
                        error = %e,
                        "Strategy failed; treating as abstention"
                    );
                }
            }
        }
        self.fallback.respond()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::error::CoreError;
    use crate::knowledge::KnowledgeBase;
    use crate::nlp::{SemanticMatcher, SentimentScores, TokenOverlapMatcher};

    fn ctx(message: &str, compound: f32) -> Context {
        Context::detached(message, SentimentScores::with_compound(compound), Default::default())
    }

    fn seeded_chain(caps: &Capabilities) -> StrategyChain {
        StrategyChain::standard(
            Arc::new(KnowledgeBase::with_seed()),
            Arc::new(KeywordRules::default_rules()),
            caps,
        )
    }

    struct Failing;

    impl Strategy for Failing {
        fn name(&self) -> StrategyName {
            StrategyName::KeywordMatching
        }

        fn attempt(&self, _message: &str, _context: &Context) -> CoreResult<Option<ResponseCandidate>> {
            Err(CoreError::Internal("boom".into()))
        }
    }

    struct Panicking;

    impl Strategy for Panicking {
        fn name(&self) -> StrategyName {
            StrategyName::SemanticMatching
        }

        fn attempt(&self, _message: &str, _context: &Context) -> CoreResult<Option<ResponseCandidate>> {
            panic!("matcher crashed")
        }
    }

    struct Crashing;

    impl SemanticMatcher for Crashing {
        fn name(&self) -> &str {
            "crashing"
        }

        fn similarity(&self, _a: &str, _b: &str) -> CoreResult<f32> {
            panic!("similarity crashed")
        }
    }

    struct AlwaysOne;

    impl SemanticMatcher for AlwaysOne {
        fn name(&self) -> &str {
            "always_one"
        }

        fn similarity(&self, _a: &str, _b: &str) -> CoreResult<f32> {
            Ok(1.0)
        }
    }

    #[test]
    fn five_pillars_beats_general_islam_rule() {
        let chain = seeded_chain(&Capabilities::none());
        let msg = "what are the five pillars of islam";
        let c = chain.resolve(msg, &ctx(msg, 0.0));
        assert_eq!(c.strategy, StrategyName::KeywordMatching);
        assert!((c.confidence - 0.9).abs() < 1e-6);
        assert!(c.answer_text.contains("Shahada"));
        assert_eq!(c.source_label, "Knowledge Base: What are the five pillars of Islam?");
    }

    #[test]
    fn sentiment_boundary() {
        let chain = seeded_chain(&Capabilities::none());
        let msg = "everything feels heavy lately";
        let low = chain.resolve(msg, &ctx(msg, -0.31));
        assert_eq!(low.strategy, StrategyName::SentimentAnalysis);
        assert!((low.confidence - 0.8).abs() < 1e-6);
        let mid = chain.resolve(msg, &ctx(msg, -0.29));
        assert_eq!(mid.strategy, StrategyName::Fallback);
        let high = chain.resolve(msg, &ctx(msg, 0.31));
        assert_eq!(high.strategy, StrategyName::SentimentAnalysis);
    }

    #[test]
    fn empty_store_without_capabilities_falls_back() {
        let chain = StrategyChain::standard(
            Arc::new(KnowledgeBase::empty()),
            Arc::new(KeywordRules::default_rules()),
            &Capabilities::none(),
        );
        let c = chain.resolve("anything", &ctx("anything", 0.0));
        assert_eq!(c.strategy, StrategyName::Fallback);
        assert!((c.confidence - 0.6).abs() < 1e-6);
        assert!(!c.answer_text.is_empty());

        // Keywords pointing at missing keys are skipped, not fatal.
        let c = chain.resolve("tell me about zakat", &ctx("tell me about zakat", 0.0));
        assert_eq!(c.strategy, StrategyName::Fallback);
    }

    #[test]
    fn every_message_yields_one_bounded_candidate() {
        let chain = seeded_chain(&Capabilities::none());
        let long = "long ".repeat(500);
        let messages: [&str; 6] = ["", " ", "?", "hajj", "ñandú 🙂", long.as_str()];
        for msg in messages {
            for compound in [-1.0, -0.3, 0.0, 0.3, 1.0] {
                let c = chain.resolve(msg, &ctx(msg, compound));
                assert!((0.0..=1.0).contains(&c.confidence));
                assert!(!c.answer_text.is_empty());
            }
        }
    }

    #[test]
    fn semantic_matcher_does_not_change_keyword_hits() {
        let without = seeded_chain(&Capabilities::none());
        let with = seeded_chain(&Capabilities::none().with_semantic(Arc::new(AlwaysOne)));
        for msg in ["what is zakat", "tell me about hajj please", "the five pillars of islam?", "how do i pray"] {
            let a = without.resolve(msg, &ctx(msg, 0.0));
            let b = with.resolve(msg, &ctx(msg, 0.0));
            assert_eq!(a, b, "outcome changed for {}", msg);
            assert_eq!(a.strategy, StrategyName::KeywordMatching);
        }
    }

    #[test]
    fn semantic_step_runs_only_when_available() {
        let msg = "how many times should muslims worship daily";
        let caps = Capabilities::none().with_semantic(Arc::new(TokenOverlapMatcher::new()));
        assert_eq!(seeded_chain(&caps).step_names().len(), 4);
        assert_eq!(seeded_chain(&Capabilities::none()).step_names().len(), 3);
        let c = seeded_chain(&Capabilities::none()).resolve(msg, &ctx(msg, 0.0));
        assert_eq!(c.strategy, StrategyName::Fallback);
    }

    #[test]
    fn failing_strategy_abstains() {
        let chain = StrategyChain::new(vec![Box::new(Failing)], FallbackResponse::new(&KnowledgeBase::empty()));
        let c = chain.resolve("hi", &ctx("hi", 0.0));
        assert_eq!(c.strategy, StrategyName::Fallback);
    }

    #[test]
    fn panicking_step_abstains() {
        let chain = StrategyChain::new(vec![Box::new(Panicking)], FallbackResponse::new(&KnowledgeBase::empty()));
        let c = chain.resolve("hi", &ctx("hi", 0.0));
        assert_eq!(c.strategy, StrategyName::Fallback);
        assert_ne!(c.source_label, EMERGENCY_SOURCE_LABEL);
        assert!((c.confidence - 0.6).abs() < 1e-6);
    }

    #[test]
    fn panicking_matcher_hands_over_to_sentiment() {
        let chain = seeded_chain(&Capabilities::none().with_semantic(Arc::new(Crashing)));
        let msg = "everything feels heavy lately";
        let c = chain.resolve(msg, &ctx(msg, -0.8));
        assert_eq!(c.strategy, StrategyName::SentimentAnalysis);
        assert!((c.confidence - 0.8).abs() < 1e-6);

        let neutral = chain.resolve(msg, &ctx(msg, 0.0));
        assert_eq!(neutral.strategy, StrategyName::Fallback);
    }

    #[test]
    fn candidate_confidence_is_clamped() {
        let c = ResponseCandidate::new("x", vec![], "s", 1.7, StrategyName::SemanticMatching);
        assert_eq!(c.confidence, 1.0);
        let c = ResponseCandidate::new("x", vec![], "s", f32::NAN, StrategyName::SemanticMatching);
        assert_eq!(c.confidence, 0.0);
    }
}
