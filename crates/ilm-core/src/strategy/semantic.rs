use super::{ResponseCandidate, Strategy, StrategyName};
use crate::context::Context;
use crate::error::CoreResult;
use crate::knowledge::{KnowledgeEntry, KnowledgeSource};
use crate::nlp::SemanticMatcher;
use std::sync::Arc;

/// Best similarity must be strictly above this to be accepted.
pub const SEMANTIC_THRESHOLD: f32 = 0.6;

/// Full scan of canonical questions; the store is small and static.
pub struct SemanticMatch {
    knowledge: Arc<dyn KnowledgeSource>,
    matcher: Arc<dyn SemanticMatcher>,
}

impl SemanticMatch {
    pub fn new(knowledge: Arc<dyn KnowledgeSource>, matcher: Arc<dyn SemanticMatcher>) -> Self {
        Self { knowledge, matcher }
    }
}

impl Strategy for SemanticMatch {
    fn name(&self) -> StrategyName {
        StrategyName::SemanticMatching
    }

    fn attempt(&self, message: &str, _context: &Context) -> CoreResult<Option<ResponseCandidate>> {
        let mut best: Option<(&KnowledgeEntry, f32)> = None;
        for entry in self.knowledge.all_entries() {
            let score = self.matcher.similarity(message, &entry.canonical_question)?;
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((entry, score));
            }
        }

        Ok(best
            .filter(|(_, score)| *score > SEMANTIC_THRESHOLD)
            .map(|(entry, score)| {
                ResponseCandidate::new(
                    entry.answer_text.clone(),
                    entry.citations.clone(),
                    format!("Knowledge Base: {}", entry.canonical_question),
                    score,
                    StrategyName::SemanticMatching,
                )
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::knowledge::KnowledgeBase;
    use crate::nlp::{SentimentScores, TokenOverlapMatcher};

    struct Fixed(f32);

    impl SemanticMatcher for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn similarity(&self, _a: &str, _b: &str) -> CoreResult<f32> {
            Ok(self.0)
        }
    }

    struct Unreachable;

    impl SemanticMatcher for Unreachable {
        fn name(&self) -> &str {
            "unreachable"
        }

        fn similarity(&self, _a: &str, _b: &str) -> CoreResult<f32> {
            Err(CoreError::CapabilityUnavailable("embedding service down".into()))
        }
    }

    fn ctx() -> Context {
        Context::detached("", SentimentScores::neutral(), Default::default())
    }

    fn seed() -> Arc<dyn KnowledgeSource> {
        Arc::new(KnowledgeBase::with_seed())
    }

    #[test]
    fn paraphrase_matches_canonical_question() {
        let sm = SemanticMatch::new(seed(), Arc::new(TokenOverlapMatcher::new()));
        let c = sm.attempt("how many times each day do muslims worship", &ctx()).unwrap().unwrap();
        assert_eq!(c.strategy, StrategyName::SemanticMatching);
        assert_eq!(c.source_label, "Knowledge Base: How many times do Muslims pray each day?");
        assert!(c.confidence > SEMANTIC_THRESHOLD && c.confidence <= 1.0);
    }

    #[test]
    fn threshold_is_strict() {
        let at = SemanticMatch::new(seed(), Arc::new(Fixed(0.6)));
        assert!(at.attempt("x", &ctx()).unwrap().is_none());
        let above = SemanticMatch::new(seed(), Arc::new(Fixed(0.61)));
        assert!((above.attempt("x", &ctx()).unwrap().unwrap().confidence - 0.61).abs() < 1e-6);
    }

    #[test]
    fn matcher_error_propagates_for_abstention() {
        let sm = SemanticMatch::new(seed(), Arc::new(Unreachable));
        assert!(sm.attempt("x", &ctx()).is_err());
        let empty = SemanticMatch::new(Arc::new(KnowledgeBase::empty()), Arc::new(Unreachable));
        assert!(empty.attempt("x", &ctx()).unwrap().is_none());
    }
}
