//! ilm-core: curated-knowledge question answering with a learning log.
//!
//! Knowledge base, optional NLP capabilities, per-request context extraction,
//! the ordered strategy chain, and the sled-backed interaction/pattern store,
//! wired together by [`Assistant`] so the gateway keeps a small public API.

mod assistant;
mod context;
mod error;
mod knowledge;
mod learning;
mod nlp;
mod shared;
mod strategy;

// Shared
pub use error::{CoreError, CoreResult};
pub use shared::{message_prefix, now_ms, resolve_user_id, CoreConfig, DEFAULT_USER_ID};

// Knowledge
pub use knowledge::{seed_entries, KnowledgeBase, KnowledgeEntry, KnowledgeSource, TopicSummary};

// Capabilities
pub use nlp::{
    clean_text, Capabilities, LexiconSentiment, SemanticMatcher, SentimentAnalyzer, SentimentScores,
    TokenOverlapMatcher,
};

// Context
pub use context::{detect_emotions, Context, ContextExtractor, ContextSnapshot, SessionStore, UserTurn};

// Strategy chain
pub use strategy::{
    FallbackResponse, KeywordMatch, KeywordRule, KeywordRules, ResponseCandidate, RuleConflict, SemanticMatch,
    SentimentResponse, Strategy, StrategyChain, StrategyName,
};

// Learning
pub use learning::{
    derive_patterns, InteractionStore, LearnedPattern, LearningMonitor, LearningStats, MonitorTarget,
    StoredInteraction, TickOutcome,
};

pub use assistant::{Answer, Assistant, ChatResponse};
