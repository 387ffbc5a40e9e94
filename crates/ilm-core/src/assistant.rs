//! Facade wiring the knowledge base, capabilities, context extractor, strategy
//! chain and learning store.
//!
//! `answer` is the read path and `record` is the best-effort write path. The gateway
//! runs them as separate blocking tasks so a slow store never delays a reply.
//! Capabilities + chain and the store live in swappable slots so the learning
//! monitor can rebuild them without blocking requests.

use crate::context::{Context, ContextExtractor, ContextSnapshot, SessionStore};
use crate::error::{CoreError, CoreResult};
use crate::knowledge::{KnowledgeBase, KnowledgeSource, TopicSummary};
use crate::learning::{InteractionStore, LearnedPattern, LearningStats, MonitorTarget, StoredInteraction};
use crate::nlp::{Capabilities, SentimentScores};
use crate::shared::{message_prefix, resolve_user_id, CoreConfig};
use crate::strategy::{KeywordRules, ResponseCandidate, StrategyChain, StrategyName};
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Outbound reply. Never empty: the worst case is the apology payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response_text: String,
    pub citations: Vec<String>,
    pub source_label: String,
    pub confidence: f32,
    pub response_time_seconds: f64,
    /// Context the answer was resolved against (history omitted).
    pub context_used: Option<ContextSnapshot>,
    pub strategy: StrategyName,
    /// Id the interaction is (or will be) recorded under; usable for feedback.
    pub interaction_id: Option<Uuid>,
}

impl ChatResponse {
    /// Apology payload for failures outside the answer pipeline (e.g. a lost worker).
    pub fn emergency(response_time_seconds: f64) -> Self {
        let c = ResponseCandidate::emergency();
        Self {
            response_text: c.answer_text,
            citations: c.citations,
            source_label: c.source_label,
            confidence: c.confidence,
            response_time_seconds,
            context_used: None,
            strategy: c.strategy,
            interaction_id: None,
        }
    }
}

/// Result of [`Assistant::answer`]: the reply plus what `record` needs.
#[derive(Debug, Clone)]
pub struct Answer {
    pub response: ChatResponse,
    pub candidate: ResponseCandidate,
    /// `None` only when context extraction itself failed.
    pub context: Option<Context>,
    pub user_id: String,
    pub message: String,
    pub interaction_id: Uuid,
}

struct Pipeline {
    capabilities: Capabilities,
    chain: StrategyChain,
}

impl Pipeline {
    fn build(knowledge: &Arc<KnowledgeBase>, rules: &Arc<KeywordRules>, capabilities: Capabilities) -> Self {
        let source: Arc<dyn KnowledgeSource> = Arc::clone(knowledge) as Arc<dyn KnowledgeSource>;
        let chain = StrategyChain::standard(source, Arc::clone(rules), &capabilities);
        Self { capabilities, chain }
    }
}

pub struct Assistant {
    config: CoreConfig,
    knowledge: Arc<KnowledgeBase>,
    rules: Arc<KeywordRules>,
    extractor: ContextExtractor,
    pipeline: RwLock<Arc<Pipeline>>,
    store: RwLock<Option<Arc<InteractionStore>>>,
}

impl Assistant {
    /// Loads knowledge, resolves capabilities and opens the learning store from
    /// `config`. A store that fails to open leaves learning inactive until the
    /// monitor reinitializes it.
    pub fn from_config(config: CoreConfig) -> Self {
        let knowledge = KnowledgeBase::load_or_seed(config.knowledge_path.as_deref());
        let capabilities = Capabilities::from_config(&config);
        let store = match Self::open_store(&config) {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::error!(
                    target: "ilm::learning",
                    path = %config.learning_db_path().display(),
                    kind = e.kind(),
                    error = %e,
                    "Learning store unavailable; continuing without it"
                );
                None
            }
        };
        Self::with_parts(config, knowledge, KeywordRules::default_rules(), capabilities, store)
    }

    pub fn with_parts(
        config: CoreConfig,
        knowledge: KnowledgeBase,
        rules: KeywordRules,
        capabilities: Capabilities,
        store: Option<InteractionStore>,
    ) -> Self {
        let knowledge = Arc::new(knowledge);
        let rules = Arc::new(rules);

        for key in rules.missing_keys(knowledge.as_ref()) {
            let err = CoreError::ConfigurationInconsistency(format!("keyword rules reference missing knowledge key '{}'", key));
            tracing::warn!(target: "ilm::strategy", kind = err.kind(), error = %err, "Keyword rule check");
        }
        for conflict in rules.validate() {
            tracing::warn!(
                target: "ilm::strategy",
                shadowed = %conflict.shadowed,
                shadowed_by = %conflict.shadowed_by,
                "Keyword rule can never fire"
            );
        }

        let sessions = Arc::new(SessionStore::new(
            config.history_limit,
            Duration::from_secs(config.session_idle_ttl_secs),
            config.max_sessions,
        ));
        let pipeline = Pipeline::build(&knowledge, &rules, capabilities);
        tracing::info!(
            target: "ilm::strategy",
            topics = knowledge.len(),
            steps = ?pipeline.chain.step_names(),
            learning = store.is_some(),
            "Assistant ready"
        );

        Self {
            knowledge,
            rules,
            extractor: ContextExtractor::new(sessions),
            pipeline: RwLock::new(Arc::new(pipeline)),
            store: RwLock::new(store.map(Arc::new)),
            config,
        }
    }

    fn open_store(config: &CoreConfig) -> CoreResult<InteractionStore> {
        InteractionStore::open_path(config.learning_db_path(), config.max_interactions)
    }

    fn pipeline(&self) -> Arc<Pipeline> {
        Arc::clone(&self.pipeline.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn store(&self) -> Option<Arc<InteractionStore>> {
        self.store.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        self.extractor.sessions()
    }

    /// Resolves one message. Blocking; never fails and never panics.
    pub fn answer(&self, message: &str, user_id: Option<&str>) -> Answer {
        let started = Instant::now();
        let user_id = resolve_user_id(user_id).to_string();
        let span = tracing::info_span!("answer", user_id = %user_id);
        let _guard = span.enter();

        let pipeline = self.pipeline();
        let resolved = panic::catch_unwind(AssertUnwindSafe(|| {
            let context = self.extractor.extract(message, &user_id, &pipeline.capabilities);
            let candidate = pipeline.chain.resolve(message, &context);
            (context, candidate)
        }));
        let (context, candidate) = match resolved {
            Ok((context, candidate)) => (Some(context), candidate),
            Err(_) => {
                tracing::error!(
                    target: "ilm::strategy",
                    user_id = %user_id,
                    message = %message_prefix(message),
                    "Answer pipeline panicked; returning apology"
                );
                (None, ResponseCandidate::emergency())
            }
        };

        let interaction_id = Uuid::new_v4();
        let response = ChatResponse {
            response_text: candidate.answer_text.clone(),
            citations: candidate.citations.clone(),
            source_label: candidate.source_label.clone(),
            confidence: candidate.confidence,
            response_time_seconds: started.elapsed().as_secs_f64(),
            context_used: context.as_ref().map(Context::snapshot),
            strategy: candidate.strategy,
            interaction_id: Some(interaction_id),
        };
        tracing::info!(
            target: "ilm::strategy",
            strategy = %candidate.strategy,
            confidence = candidate.confidence,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Answered"
        );

        Answer {
            response,
            candidate,
            context,
            user_id,
            message: message.to_string(),
            interaction_id,
        }
    }

    /// Persists an answered interaction. Best-effort: failures are logged and
    /// `None` is returned.
    pub fn record(&self, answer: &Answer) -> Option<Uuid> {
        let Some(store) = self.store() else {
            tracing::debug!(target: "ilm::learning", user_id = %answer.user_id, "Learning store absent; not recording");
            return None;
        };
        let fallback_context;
        let context = match answer.context.as_ref() {
            Some(c) => c,
            None => {
                fallback_context = Context::detached(&answer.message, SentimentScores::neutral(), Default::default());
                &fallback_context
            }
        };
        match store.record_as(answer.interaction_id, &answer.user_id, &answer.message, &answer.candidate, context) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::error!(
                    target: "ilm::learning",
                    user_id = %answer.user_id,
                    message = %message_prefix(&answer.message),
                    strategy = %answer.candidate.strategy,
                    kind = e.kind(),
                    error = %e,
                    "Failed to record interaction"
                );
                None
            }
        }
    }

    /// `answer` then `record`, on the calling thread.
    pub fn respond(&self, message: &str, user_id: Option<&str>) -> ChatResponse {
        let answer = self.answer(message, user_id);
        let recorded = self.record(&answer);
        let mut response = answer.response;
        response.interaction_id = recorded;
        response
    }

    pub fn learning_stats(&self) -> LearningStats {
        let nlp_available = self.pipeline().capabilities.nlp_available();
        LearningStats::collect(self.store().as_deref(), nlp_available)
    }

    /// `Ok(false)` when the interaction does not exist.
    pub fn rate_interaction(&self, interaction_id: Uuid, score: f32) -> CoreResult<bool> {
        let store = self.require_store()?;
        let found = store.rate_interaction(interaction_id, score)?;
        tracing::info!(target: "ilm::learning", interaction_id = %interaction_id, score, found, "Feedback received");
        Ok(found)
    }

    pub fn top_patterns(&self, limit: usize) -> CoreResult<Vec<LearnedPattern>> {
        self.require_store()?.top_patterns(limit)
    }

    pub fn recent_interactions(&self, user_id: Option<&str>, limit: usize) -> CoreResult<Vec<StoredInteraction>> {
        self.require_store()?.recent_interactions(resolve_user_id(user_id), limit)
    }

    pub fn topics(&self) -> Vec<TopicSummary> {
        self.knowledge.topics()
    }

    pub fn topic_count(&self) -> usize {
        self.knowledge.len()
    }

    pub fn strategy_steps(&self) -> Vec<StrategyName> {
        self.pipeline().chain.step_names()
    }

    fn require_store(&self) -> CoreResult<Arc<InteractionStore>> {
        self.store()
            .ok_or_else(|| CoreError::CapabilityUnavailable("learning store is not open".to_string()))
    }

    pub fn probe(&self) -> CoreResult<()> {
        self.require_store()?.probe()
    }

    /// Reopens the learning store and rebuilds the capabilities and chain.
    ///
    /// The old store is released before reopening since sled holds an exclusive
    /// file lock. Requests still holding the old handle keep it until they finish;
    /// if that makes the reopen fail the slot stays empty and the next monitor
    /// round tries again.
    pub fn reinitialize(&self) -> CoreResult<()> {
        let pipeline = Pipeline::build(&self.knowledge, &self.rules, Capabilities::from_config(&self.config));
        *self.pipeline.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(pipeline);

        let old = self.store.write().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(old) = old {
            if let Err(e) = old.flush() {
                tracing::warn!(target: "ilm::learning", error = %e, "Flush before reopen failed");
            }
        }

        let reopened = Self::open_store(&self.config)?;
        *self.store.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(reopened));
        Ok(())
    }
}

impl MonitorTarget for Assistant {
    fn probe(&self) -> CoreResult<()> {
        Assistant::probe(self)
    }

    fn reinitialize(&self) -> CoreResult<()> {
        Assistant::reinitialize(self)
    }

    fn evict_stale_sessions(&self) -> usize {
        self.sessions().evict_stale()
    }
}
