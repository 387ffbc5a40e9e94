//! In-memory knowledge table. Built once at startup from a JSON file or the
//! built-in seed and never mutated afterwards.

use super::KnowledgeSource;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One curated topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Stable topic key referenced by keyword rules (e.g. "five_pillars").
    pub key: String,
    /// The question this entry answers; semantic matching compares against it.
    pub canonical_question: String,
    pub answer_text: String,
    /// Ordered source references shown with the answer.
    #[serde(default)]
    pub citations: Vec<String>,
}

impl KnowledgeEntry {
    pub fn new(
        key: impl Into<String>,
        canonical_question: impl Into<String>,
        answer_text: impl Into<String>,
        citations: &[&str],
    ) -> Self {
        Self {
            key: key.into(),
            canonical_question: canonical_question.into(),
            answer_text: answer_text.into(),
            citations: citations.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Topic listing row for the `/topics` surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicSummary {
    pub key: String,
    pub question: String,
}

/// Immutable knowledge table keyed by topic key.
#[derive(Debug, Default)]
pub struct KnowledgeBase {
    entries: BTreeMap<String, KnowledgeEntry>,
}

impl KnowledgeBase {
    /// A knowledge base with no topics. Every request falls through to the fallback.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in topics.
    pub fn with_seed() -> Self {
        // Seed keys are unique by construction.
        Self::from_entries(super::seed_entries()).unwrap_or_default()
    }

    /// Builds the table, rejecting blank or duplicate keys.
    pub fn from_entries(entries: Vec<KnowledgeEntry>) -> CoreResult<Self> {
        let mut map = BTreeMap::new();
        for mut entry in entries {
            let key = entry.key.trim().to_string();
            if key.is_empty() {
                return Err(CoreError::KnowledgeLoad(format!(
                    "entry '{}' has an empty key",
                    entry.canonical_question
                )));
            }
            if entry.answer_text.trim().is_empty() {
                return Err(CoreError::KnowledgeLoad(format!("entry '{}' has no answer", key)));
            }
            if map.contains_key(&key) {
                return Err(CoreError::KnowledgeLoad(format!("duplicate key '{}'", key)));
            }
            entry.key = key.clone();
            map.insert(key, entry);
        }
        Ok(Self { entries: map })
    }

    /// Loads a JSON array of entries from `path`.
    pub fn load_json_path<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CoreError::KnowledgeLoad(format!("{}: {}", path.display(), e)))?;
        let entries: Vec<KnowledgeEntry> = serde_json::from_str(&raw)
            .map_err(|e| CoreError::KnowledgeLoad(format!("{}: {}", path.display(), e)))?;
        let kb = Self::from_entries(entries)?;
        tracing::info!(
            target: "ilm::knowledge",
            path = %path.display(),
            topics = kb.len(),
            "Knowledge base loaded from file"
        );
        Ok(kb)
    }

    /// Loads from `path` when given, falling back to the seed if the file is
    /// missing or invalid. Startup never fails on a bad knowledge file.
    pub fn load_or_seed(path: Option<&str>) -> Self {
        match path {
            Some(p) => match Self::load_json_path(p) {
                Ok(kb) => kb,
                Err(e) => {
                    tracing::warn!(
                        target: "ilm::knowledge",
                        error = %e,
                        "Knowledge file unusable, using built-in topics"
                    );
                    Self::with_seed()
                }
            },
            None => {
                let kb = Self::with_seed();
                tracing::info!(target: "ilm::knowledge", topics = kb.len(), "Built-in knowledge base loaded");
                kb
            }
        }
    }

    pub fn topics(&self) -> Vec<TopicSummary> {
        self.entries
            .values()
            .map(|e| TopicSummary {
                key: e.key.clone(),
                question: e.canonical_question.clone(),
            })
            .collect()
    }
}

impl KnowledgeSource for KnowledgeBase {
    fn lookup(&self, key: &str) -> Option<&KnowledgeEntry> {
        self.entries.get(key)
    }

    fn all_entries(&self) -> Box<dyn Iterator<Item = &KnowledgeEntry> + '_> {
        Box::new(self.entries.values())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
