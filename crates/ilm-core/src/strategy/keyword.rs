//! Keyword matching over an explicit, priority-ordered rule list.
//!
//! Order matters: the first rule whose keyword is a substring of the
//! lower-cased message wins, so a rule must come before every rule whose
//! keyword it contains ("five pillars of islam" before "islam").

use super::{ResponseCandidate, Strategy, StrategyName};
use crate::context::Context;
use crate::error::{CoreError, CoreResult};
use crate::knowledge::KnowledgeSource;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const KEYWORD_CONFIDENCE: f32 = 0.9;

const DEFAULT_RULES: &[(&str, &str)] = &[
    ("five pillars of islam", "five_pillars"),
    ("pillars of islam", "five_pillars"),
    ("five pillars", "five_pillars"),
    ("six articles of faith", "articles_of_faith"),
    ("articles of faith", "articles_of_faith"),
    ("pillars of iman", "articles_of_faith"),
    ("testimony of faith", "shahada"),
    ("shahada", "shahada"),
    ("prophet muhammad", "prophet_muhammad"),
    ("muhammad", "prophet_muhammad"),
    ("salah", "salah"),
    ("prayer", "salah"),
    ("pray", "salah"),
    ("zakat", "zakat"),
    ("charity", "zakat"),
    ("ramadan", "sawm"),
    ("fasting", "sawm"),
    ("sawm", "sawm"),
    ("hajj", "hajj"),
    ("pilgrimage", "hajj"),
    ("qur'an", "quran"),
    ("quran", "quran"),
    ("oneness of god", "tawhid"),
    ("tawhid", "tawhid"),
    ("patience", "sabr"),
    ("sabr", "sabr"),
    ("supplication", "dua"),
    ("make dua", "dua"),
    ("islam", "islam"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    /// Lower-case phrase searched for as a substring.
    pub keyword: String,
    pub knowledge_key: String,
}

/// A rule that can never fire because an earlier rule's keyword is a substring of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleConflict {
    pub shadowed: String,
    pub shadowed_by: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRules {
    rules: Vec<KeywordRule>,
}

impl KeywordRules {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|r| KeywordRule {
                keyword: r.keyword.trim().to_lowercase(),
                knowledge_key: r.knowledge_key,
            })
            .filter(|r| !r.keyword.is_empty())
            .collect();
        Self { rules }
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(k, v)| KeywordRule {
                    keyword: k.to_string(),
                    knowledge_key: v.to_string(),
                })
                .collect(),
        )
    }

    pub fn default_rules() -> Self {
        Self::from_pairs(DEFAULT_RULES)
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    /// Rules shadowed by an earlier, shorter keyword they contain.
    pub fn validate(&self) -> Vec<RuleConflict> {
        let mut conflicts = Vec::new();
        for (i, later) in self.rules.iter().enumerate() {
            if let Some(earlier) = self.rules[..i]
                .iter()
                .find(|e| e.keyword != later.keyword && later.keyword.contains(&e.keyword))
            {
                conflicts.push(RuleConflict {
                    shadowed: later.keyword.clone(),
                    shadowed_by: earlier.keyword.clone(),
                });
            }
        }
        conflicts
    }

    /// Keys referenced by rules that `knowledge` does not contain.
    pub fn missing_keys(&self, knowledge: &dyn KnowledgeSource) -> Vec<String> {
        let mut missing: Vec<String> = self
            .rules
            .iter()
            .filter(|r| knowledge.lookup(&r.knowledge_key).is_none())
            .map(|r| r.knowledge_key.clone())
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }
}

pub struct KeywordMatch {
    knowledge: Arc<dyn KnowledgeSource>,
    rules: Arc<KeywordRules>,
}

impl KeywordMatch {
    pub fn new(knowledge: Arc<dyn KnowledgeSource>, rules: Arc<KeywordRules>) -> Self {
        Self { knowledge, rules }
    }
}

impl Strategy for KeywordMatch {
    fn name(&self) -> StrategyName {
        StrategyName::KeywordMatching
    }

    fn attempt(&self, message: &str, _context: &Context) -> CoreResult<Option<ResponseCandidate>> {
        let lower = message.to_lowercase();
        for rule in self.rules.rules() {
            if !lower.contains(&rule.keyword) {
                continue;
            }
            match self.knowledge.lookup(&rule.knowledge_key) {
                Some(entry) => {
                    return Ok(Some(ResponseCandidate::new(
                        entry.answer_text.clone(),
                        entry.citations.clone(),
                        format!("Knowledge Base: {}", entry.canonical_question),
                        KEYWORD_CONFIDENCE,
                        StrategyName::KeywordMatching,
                    )));
                }
                None => {
                    let err = CoreError::ConfigurationInconsistency(format!(
                        "keyword '{}' maps to missing knowledge key '{}'",
                        rule.keyword, rule.knowledge_key
                    ));
                    tracing::warn!(
                        target: "ilm::strategy",
                        strategy = "keyword_matching",
                        kind = err.kind(),
                        error = %err,
                        "Skipping keyword rule"
                    );
                }
            }
        }
        Ok(None)
    }
}
