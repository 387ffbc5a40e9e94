use super::store::InteractionStore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearningStats {
    pub total_conversations: usize,
    pub average_effectiveness: f32,
    pub learned_patterns: usize,
    pub unique_users: usize,
    pub nlp_available: bool,
    pub learning_active: bool,
}

impl LearningStats {
    /// Reported when the store is absent or unreadable.
    pub fn degraded(nlp_available: bool) -> Self {
        Self {
            total_conversations: 0,
            average_effectiveness: 0.0,
            learned_patterns: 0,
            unique_users: 0,
            nlp_available,
            learning_active: false,
        }
    }

    /// Reads aggregates from `store`; never fails.
    pub fn collect(store: Option<&InteractionStore>, nlp_available: bool) -> Self {
        let Some(store) = store else {
            return Self::degraded(nlp_available);
        };
        match store.counts() {
            Ok(c) => Self {
                total_conversations: c.interactions,
                average_effectiveness: c.average_effectiveness,
                learned_patterns: c.patterns,
                unique_users: c.users,
                nlp_available,
                learning_active: true,
            },
            Err(e) => {
                tracing::warn!(target: "ilm::learning", kind = e.kind(), error = %e, "Stats read failed");
                Self::degraded(nlp_available)
            }
        }
    }
}

impl InteractionStore {
    pub fn stats(&self, nlp_available: bool) -> LearningStats {
        LearningStats::collect(Some(self), nlp_available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::nlp::SentimentScores;
    use crate::strategy::{ResponseCandidate, StrategyName};

    fn record(store: &InteractionStore, user: &str, msg: &str) {
        let c = ResponseCandidate::new("a", vec![], "General Help", 0.6, StrategyName::Fallback);
        let ctx = Context::detached(msg, SentimentScores::neutral(), Default::default());
        store.record(user, msg, &c, &ctx).unwrap();
    }

    #[test]
    fn absent_store_is_degraded() {
        let s = LearningStats::collect(None, true);
        assert!(!s.learning_active);
        assert!(s.nlp_available);
        assert_eq!(s.total_conversations, 0);
        assert_eq!(s.learned_patterns, 0);
    }

    #[test]
    fn empty_store_is_active_with_zero_average() {
        let store = InteractionStore::temporary(100).unwrap();
        let s = store.stats(false);
        assert!(s.learning_active);
        assert_eq!(s.average_effectiveness, 0.0);
    }

    #[test]
    fn learned_patterns_never_decrease() {
        let store = InteractionStore::temporary(100).unwrap();
        let messages = [
            "what is salah",
            "what is salah",
            "tell me about the night journey please, I have been reading a lot about it lately and wonder",
            "hi",
            "why do we fast?",
        ];
        let mut last = 0;
        for (i, m) in messages.iter().enumerate() {
            record(&store, &format!("user{}", i % 2), m);
            let s = store.stats(false);
            assert!(s.learned_patterns >= last);
            last = s.learned_patterns;
        }
        let s = store.stats(false);
        assert_eq!(s.total_conversations, 5);
        assert_eq!(s.unique_users, 2);
        assert!((s.average_effectiveness - 0.6).abs() < 1e-5);
    }
}
