//! Sled-backed interaction log and learned-pattern table.
//!
//! | Tree                 | Key                          | Value                         |
//! |----------------------|------------------------------|-------------------------------|
//! | `interactions`       | `{timestamp_ms:020}_{uuid}`  | JSON [`StoredInteraction`]    |
//! | `interaction_index`  | interaction uuid (16 bytes)  | key in `interactions`         |
//! | `patterns`           | pattern text                 | JSON [`LearnedPattern`]       |
//! | `users`              | user id                      | last seen (ms, big-endian)    |
//!
//! Interaction keys sort chronologically, so retention pruning walks from the front.
//! Pattern upserts go through `update_and_fetch`, which retries on contention and
//! never loses an increment. Rows that no longer decode are left untouched and
//! reported as serialization errors.
//!
//! Aggregates for [`InteractionStore::counts`] are running tallies, rebuilt by one
//! scan when the store opens and adjusted on every write after that.

use super::patterns::derive_patterns;
use crate::context::Context;
use crate::error::{CoreError, CoreResult};
use crate::shared::now_ms;
use crate::strategy::ResponseCandidate;
use serde::{Deserialize, Serialize};
use sled::{Db, Tree};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

const TREE_INTERACTIONS: &str = "interactions";
const TREE_INTERACTION_INDEX: &str = "interaction_index";
const TREE_PATTERNS: &str = "patterns";
const TREE_USERS: &str = "users";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredInteraction {
    pub id: Uuid,
    pub user_id: String,
    pub message: String,
    pub response_text: String,
    /// Strategy that produced the response (e.g. "keyword_matching").
    pub strategy: String,
    /// Confidence of the emitting candidate.
    pub confidence: f32,
    pub timestamp_ms: i64,
    pub context_json: serde_json::Value,
    /// Explicit feedback score; `None` until rated.
    #[serde(default)]
    pub effectiveness_score: Option<f32>,
}

impl StoredInteraction {
    fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }

    fn from_bytes(bytes: &[u8]) -> Option<Self> {
        serde_json::from_slice(bytes).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedPattern {
    pub pattern_text: String,
    pub response_type: String,
    pub effectiveness: f32,
    pub usage_count: u64,
    pub last_used_ms: i64,
}

impl LearnedPattern {
    fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }

    fn from_bytes(bytes: &[u8]) -> Option<Self> {
        serde_json::from_slice(bytes).ok()
    }
}

/// Raw aggregates read from the store.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StoreCounts {
    pub interactions: usize,
    pub average_effectiveness: f32,
    pub patterns: usize,
    pub users: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct Tallies {
    interactions: usize,
    confidence_sum: f64,
    rated: usize,
    rated_sum: f64,
    patterns: usize,
    users: usize,
}

impl Tallies {
    fn scan(interactions: &Tree, patterns: &Tree, users: &Tree) -> CoreResult<Self> {
        let mut t = Tallies::default();
        for item in interactions.iter() {
            let (_, v) = item?;
            t.interactions += 1;
            if let Some(i) = StoredInteraction::from_bytes(&v) {
                t.add_row(&i, 1.0);
            }
        }
        t.patterns = patterns.len();
        t.users = users.len();
        Ok(t)
    }

    /// Adds (`sign = 1.0`) or removes (`sign = -1.0`) a row's confidence and rating.
    fn add_row(&mut self, i: &StoredInteraction, sign: f64) {
        self.confidence_sum += sign * f64::from(i.confidence);
        if let Some(score) = i.effectiveness_score {
            self.rated_sum += sign * f64::from(score);
            if sign > 0.0 {
                self.rated += 1;
            } else {
                self.rated = self.rated.saturating_sub(1);
            }
        }
    }
}

pub struct InteractionStore {
    db: Db,
    interactions: Tree,
    interaction_index: Tree,
    patterns: Tree,
    users: Tree,
    max_interactions: usize,
    prune_every: u64,
    appends: AtomicU64,
    tallies: Mutex<Tallies>,
    prune_lock: Mutex<()>,
}

impl InteractionStore {
    /// Opens or creates the learning DB at `path`.
    pub fn open_path<P: AsRef<Path>>(path: P, max_interactions: usize) -> CoreResult<Self> {
        let db = sled::open(path.as_ref())?;
        let store = Self::from_db(db, max_interactions)?;
        tracing::info!(
            target: "ilm::learning",
            path = %path.as_ref().display(),
            max_interactions,
            "Learning store opened"
        );
        Ok(store)
    }

    /// In-memory store removed on drop.
    pub fn temporary(max_interactions: usize) -> CoreResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db, max_interactions)
    }

    fn from_db(db: Db, max_interactions: usize) -> CoreResult<Self> {
        let max_interactions = max_interactions.max(1);
        let interactions = db.open_tree(TREE_INTERACTIONS)?;
        let patterns = db.open_tree(TREE_PATTERNS)?;
        let users = db.open_tree(TREE_USERS)?;
        let tallies = Tallies::scan(&interactions, &patterns, &users)?;
        Ok(Self {
            interactions,
            interaction_index: db.open_tree(TREE_INTERACTION_INDEX)?,
            patterns,
            users,
            db,
            max_interactions,
            prune_every: (max_interactions as u64 / 10).clamp(1, 256),
            appends: AtomicU64::new(0),
            tallies: Mutex::new(tallies),
            prune_lock: Mutex::new(()),
        })
    }

    fn tallies(&self) -> MutexGuard<'_, Tallies> {
        self.tallies.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends the interaction, marks the user, and upserts every pattern derived
    /// from the message. Returns the new interaction id.
    pub fn record(
        &self,
        user_id: &str,
        message: &str,
        candidate: &ResponseCandidate,
        context: &Context,
    ) -> CoreResult<Uuid> {
        self.record_as(Uuid::new_v4(), user_id, message, candidate, context)
    }

    /// [`Self::record`] under an id handed out before the write.
    pub fn record_as(
        &self,
        id: Uuid,
        user_id: &str,
        message: &str,
        candidate: &ResponseCandidate,
        context: &Context,
    ) -> CoreResult<Uuid> {
        let ts = now_ms();
        let interaction = StoredInteraction {
            id,
            user_id: user_id.to_string(),
            message: message.to_string(),
            response_text: candidate.answer_text.clone(),
            strategy: candidate.strategy.as_str().to_string(),
            confidence: candidate.confidence,
            timestamp_ms: ts,
            context_json: context.to_json(),
            effectiveness_score: None,
        };
        let key = format!("{:020}_{}", ts.max(0), interaction.id.simple());
        let replaced = self.interactions.insert(key.as_bytes(), interaction.to_bytes())?;
        self.interaction_index.insert(interaction.id.as_bytes(), key.as_bytes())?;
        let returning = self.users.insert(user_id.as_bytes(), ts.to_be_bytes().to_vec())?;
        {
            let mut t = self.tallies();
            if replaced.is_none() {
                t.interactions += 1;
                t.add_row(&interaction, 1.0);
            }
            if returning.is_none() {
                t.users += 1;
            }
        }

        let patterns = derive_patterns(message, context);
        for pattern in &patterns {
            match self.upsert_pattern(pattern, candidate.strategy.as_str(), candidate.confidence) {
                // logged by upsert_pattern; the remaining patterns still apply
                Ok(_) | Err(CoreError::Serialization(_)) => {}
                Err(e) => return Err(e),
            }
        }

        tracing::debug!(
            target: "ilm::learning",
            user_id = %user_id,
            interaction_id = %interaction.id,
            strategy = %candidate.strategy,
            patterns = patterns.len(),
            "Interaction recorded"
        );

        if self.appends.fetch_add(1, Ordering::Relaxed) % self.prune_every == self.prune_every - 1 {
            self.enforce_retention()?;
        }
        Ok(interaction.id)
    }

    /// Atomic increment-or-insert of one pattern.
    pub fn upsert_pattern(
        &self,
        pattern_text: &str,
        response_type: &str,
        effectiveness: f32,
    ) -> CoreResult<LearnedPattern> {
        let now = now_ms();
        let mut created = false;
        let mut corrupt = None;
        let updated = self.patterns.update_and_fetch(pattern_text.as_bytes(), |old| {
            // may run more than once under contention; only the last run counts
            created = false;
            corrupt = None;
            let next = match old {
                Some(bytes) => match serde_json::from_slice::<LearnedPattern>(bytes) {
                    Ok(mut p) => {
                        p.usage_count = p.usage_count.saturating_add(1);
                        p.effectiveness = effectiveness;
                        p.last_used_ms = now.max(p.last_used_ms);
                        p.response_type = response_type.to_string();
                        p
                    }
                    Err(e) => {
                        corrupt = Some(e);
                        return Some(bytes.to_vec());
                    }
                },
                None => {
                    created = true;
                    LearnedPattern {
                        pattern_text: pattern_text.to_string(),
                        response_type: response_type.to_string(),
                        effectiveness,
                        usage_count: 1,
                        last_used_ms: now,
                    }
                }
            };
            Some(next.to_bytes())
        })?;
        if let Some(e) = corrupt {
            tracing::warn!(
                target: "ilm::learning",
                pattern = %pattern_text,
                error = %e,
                "Pattern row is unreadable; left unchanged"
            );
            return Err(CoreError::Serialization(e));
        }
        if created {
            self.tallies().patterns += 1;
        }
        updated
            .and_then(|bytes| LearnedPattern::from_bytes(&bytes))
            .ok_or_else(|| CoreError::Internal(format!("pattern '{}' vanished during upsert", pattern_text)))
    }

    pub fn get_pattern(&self, pattern_text: &str) -> CoreResult<Option<LearnedPattern>> {
        Ok(self
            .patterns
            .get(pattern_text.as_bytes())?
            .and_then(|b| LearnedPattern::from_bytes(&b)))
    }

    /// Patterns by usage count (desc), ties broken by text.
    pub fn top_patterns(&self, limit: usize) -> CoreResult<Vec<LearnedPattern>> {
        let mut all = Vec::new();
        for item in self.patterns.iter() {
            let (_, v) = item?;
            if let Some(p) = LearnedPattern::from_bytes(&v) {
                all.push(p);
            }
        }
        all.sort_by(|a, b| {
            b.usage_count
                .cmp(&a.usage_count)
                .then_with(|| a.pattern_text.cmp(&b.pattern_text))
        });
        all.truncate(limit);
        Ok(all)
    }

    /// A user's interactions, newest first.
    pub fn recent_interactions(&self, user_id: &str, limit: usize) -> CoreResult<Vec<StoredInteraction>> {
        let mut out = Vec::new();
        for item in self.interactions.iter().rev() {
            if out.len() >= limit {
                break;
            }
            let (_, v) = item?;
            if let Some(i) = StoredInteraction::from_bytes(&v) {
                if i.user_id == user_id {
                    out.push(i);
                }
            }
        }
        Ok(out)
    }

    pub fn get_interaction(&self, id: Uuid) -> CoreResult<Option<StoredInteraction>> {
        let Some(key) = self.interaction_index.get(id.as_bytes())? else {
            return Ok(None);
        };
        Ok(self.interactions.get(key)?.and_then(|b| StoredInteraction::from_bytes(&b)))
    }

    /// Sets the feedback score of an interaction. `false` if it does not exist.
    pub fn rate_interaction(&self, id: Uuid, score: f32) -> CoreResult<bool> {
        let score = if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) };
        let Some(key) = self.interaction_index.get(id.as_bytes())? else {
            return Ok(false);
        };
        // Outer `None`: the row is gone. Inner: the score it had before.
        let mut previous: Option<Option<f32>> = None;
        let mut corrupt = None;
        self.interactions.update_and_fetch(key, |old| {
            previous = None;
            corrupt = None;
            let bytes = old?;
            match serde_json::from_slice::<StoredInteraction>(bytes) {
                Ok(mut i) => {
                    previous = Some(i.effectiveness_score);
                    i.effectiveness_score = Some(score);
                    Some(i.to_bytes())
                }
                Err(e) => {
                    corrupt = Some(e);
                    Some(bytes.to_vec())
                }
            }
        })?;
        if let Some(e) = corrupt {
            tracing::warn!(
                target: "ilm::learning",
                interaction_id = %id,
                error = %e,
                "Interaction row is unreadable; rating not applied"
            );
            return Err(CoreError::Serialization(e));
        }
        let Some(previous) = previous else {
            return Ok(false);
        };
        let mut t = self.tallies();
        match previous {
            Some(old) => t.rated_sum += f64::from(score) - f64::from(old),
            None => {
                t.rated += 1;
                t.rated_sum += f64::from(score);
            }
        }
        Ok(true)
    }

    /// Drops the oldest interactions beyond the retention bound. Returns 0
    /// without waiting when another caller is already pruning.
    pub fn enforce_retention(&self) -> CoreResult<usize> {
        let _pruning = match self.prune_lock.try_lock() {
            Ok(guard) => guard,
            Err(std::sync::TryLockError::Poisoned(p)) => p.into_inner(),
            Err(std::sync::TryLockError::WouldBlock) => return Ok(0),
        };
        // Tallies trail inserts, never removals, so this never overshoots.
        let len = self.tallies().interactions;
        if len <= self.max_interactions {
            return Ok(0);
        }
        let excess = len - self.max_interactions;
        let mut removed = 0;
        for item in self.interactions.iter().take(excess) {
            let (k, _) = item?;
            let Some(old) = self.interactions.remove(&k)? else {
                continue;
            };
            let decoded = StoredInteraction::from_bytes(&old);
            if let Some(i) = decoded.as_ref() {
                self.interaction_index.remove(i.id.as_bytes())?;
            }
            let mut t = self.tallies();
            t.interactions = t.interactions.saturating_sub(1);
            if let Some(i) = decoded.as_ref() {
                t.add_row(i, -1.0);
            }
            removed += 1;
        }
        tracing::info!(
            target: "ilm::learning",
            removed,
            retained = self.max_interactions,
            "Pruned interaction log"
        );
        Ok(removed)
    }

    /// Mean effectiveness covers rated rows when any exist, otherwise the
    /// confidence each row was answered with.
    pub fn counts(&self) -> CoreResult<StoreCounts> {
        let t = *self.tallies();
        let average_effectiveness = match (t.rated, t.interactions) {
            (_, 0) => 0.0,
            (0, n) => (t.confidence_sum / n as f64) as f32,
            (r, _) => (t.rated_sum / r as f64) as f32,
        };
        Ok(StoreCounts {
            interactions: t.interactions,
            average_effectiveness: average_effectiveness.clamp(0.0, 1.0),
            patterns: t.patterns,
            users: t.users,
        })
    }

    /// Cheap reachability check used by the monitor.
    pub fn probe(&self) -> CoreResult<()> {
        self.db.get(b"__probe__")?;
        Ok(())
    }

    pub fn flush(&self) -> CoreResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::nlp::SentimentScores;
    use crate::strategy::StrategyName;
    use std::collections::BTreeSet;
    use std::sync::Arc;

    fn candidate(confidence: f32) -> ResponseCandidate {
        ResponseCandidate::new("answer", vec![], "Knowledge Base", confidence, StrategyName::KeywordMatching)
    }

    fn ctx(message: &str) -> Context {
        Context::detached(message, SentimentScores::neutral(), BTreeSet::new())
    }

    #[test]
    fn same_message_twice_increments_each_pattern_once() {
        let store = InteractionStore::temporary(100).unwrap();
        let msg = "what is zakat exactly?";
        store.record("u1", msg, &candidate(0.9), &ctx(msg)).unwrap();
        let first = store.counts().unwrap();
        store.record("u1", msg, &candidate(0.6), &ctx(msg)).unwrap();
        let second = store.counts().unwrap();

        assert_eq!(first.patterns, second.patterns, "no duplicate pattern rows");
        for text in ["what is", "zakat exactly?", "question_pattern"] {
            let p = store.get_pattern(text).unwrap().unwrap();
            assert_eq!(p.usage_count, 2, "pattern {}", text);
            assert!((p.effectiveness - 0.6).abs() < 1e-6);
        }
        assert_eq!(second.interactions, 2);
        assert_eq!(second.users, 1);
    }

    #[test]
    fn new_patterns_start_at_one() {
        let store = InteractionStore::temporary(100).unwrap();
        let p = store.upsert_pattern("emotion_hope", "sentiment_analysis", 0.8).unwrap();
        assert_eq!(p.usage_count, 1);
        assert_eq!(p.response_type, "sentiment_analysis");
    }

    #[test]
    fn concurrent_upserts_lose_no_increments() {
        let store = Arc::new(InteractionStore::temporary(100).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        store.upsert_pattern("short_message", "fallback", 0.6).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.get_pattern("short_message").unwrap().unwrap().usage_count, 400);
    }

    #[test]
    fn rated_rows_drive_the_average() {
        let store = InteractionStore::temporary(100).unwrap();
        let id = store.record("u1", "hello there", &candidate(0.6), &ctx("hello there")).unwrap();
        store.record("u2", "hello again", &candidate(0.8), &ctx("hello again")).unwrap();
        assert!((store.counts().unwrap().average_effectiveness - 0.7).abs() < 1e-5);

        assert!(store.rate_interaction(id, 1.0).unwrap());
        assert!((store.counts().unwrap().average_effectiveness - 1.0).abs() < 1e-5);
        assert_eq!(store.get_interaction(id).unwrap().unwrap().effectiveness_score, Some(1.0));
        assert!(!store.rate_interaction(Uuid::new_v4(), 1.0).unwrap());
        assert_eq!(store.counts().unwrap().users, 2);
    }

    #[test]
    fn retention_prunes_oldest() {
        let store = InteractionStore::temporary(3).unwrap();
        let mut ids = Vec::new();
        for i in 0..5 {
            let msg = format!("message number {}", i);
            ids.push(store.record("u1", &msg, &candidate(0.6), &ctx(&msg)).unwrap());
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
        assert_eq!(store.counts().unwrap().interactions, 3);
        assert!(store.get_interaction(ids[0]).unwrap().is_none());
        assert!(store.get_interaction(ids[4]).unwrap().is_some());

        let recent = store.recent_interactions("u1", 2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].message, "message number 4");
    }

    #[test]
    fn top_patterns_orders_by_usage() {
        let store = InteractionStore::temporary(100).unwrap();
        for _ in 0..3 {
            store.upsert_pattern("question_pattern", "keyword_matching", 0.9).unwrap();
        }
        store.upsert_pattern("short_message", "fallback", 0.6).unwrap();
        store.upsert_pattern("long_message", "fallback", 0.6).unwrap();
        let top = store.top_patterns(2).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].pattern_text, "question_pattern");
        assert_eq!(top[1].pattern_text, "long_message");
    }

    #[test]
    fn unreadable_pattern_row_is_kept_and_reported() {
        let store = InteractionStore::temporary(100).unwrap();
        store.patterns.insert("what is", &b"{not json"[..]).unwrap();

        let err = store.upsert_pattern("what is", "keyword_matching", 0.9).unwrap_err();
        assert!(matches!(err, CoreError::Serialization(_)));
        assert_eq!(store.patterns.get("what is").unwrap().unwrap(), &b"{not json"[..]);

        // Recording still lands and the readable patterns still count.
        let msg = "what is zakat?";
        store.record("u1", msg, &candidate(0.9), &ctx(msg)).unwrap();
        assert_eq!(store.patterns.get("what is").unwrap().unwrap(), &b"{not json"[..]);
        assert_eq!(store.get_pattern("question_pattern").unwrap().unwrap().usage_count, 1);
        assert_eq!(store.counts().unwrap().interactions, 1);
    }

    #[test]
    fn unreadable_interaction_row_is_not_rated() {
        let store = InteractionStore::temporary(100).unwrap();
        let id = store.record("u1", "hello there", &candidate(0.6), &ctx("hello there")).unwrap();
        let key = store.interaction_index.get(id.as_bytes()).unwrap().unwrap();
        store.interactions.insert(&key, &b"garbage"[..]).unwrap();

        assert!(matches!(store.rate_interaction(id, 1.0), Err(CoreError::Serialization(_))));
        assert_eq!(store.interactions.get(&key).unwrap().unwrap(), &b"garbage"[..]);
    }

    #[test]
    fn concurrent_recording_never_prunes_below_the_cap() {
        let store = Arc::new(InteractionStore::temporary(5).unwrap());
        for i in 0..5 {
            let msg = format!("warm up {}", i);
            store.record("seed", &msg, &candidate(0.6), &ctx(&msg)).unwrap();
        }
        let done = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let watcher = {
            let store = Arc::clone(&store);
            let done = Arc::clone(&done);
            std::thread::spawn(move || {
                let mut lowest = usize::MAX;
                while !done.load(Ordering::Relaxed) {
                    lowest = lowest.min(store.counts().unwrap().interactions);
                }
                lowest
            })
        };
        let writers: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        let msg = format!("writer {} message {}", t, i);
                        store.record(&format!("w{}", t), &msg, &candidate(0.6), &ctx(&msg)).unwrap();
                    }
                })
            })
            .collect();
        for w in writers {
            w.join().unwrap();
        }
        done.store(true, Ordering::Relaxed);
        assert!(watcher.join().unwrap() >= 5);

        let settled = store.counts().unwrap().interactions;
        assert!(settled >= 5, "settled at {}", settled);
        assert_eq!(store.interactions.len(), settled);
        store.enforce_retention().unwrap();
        assert_eq!(store.counts().unwrap().interactions, 5);
        assert_eq!(store.interactions.len(), 5);
        assert_eq!(store.interaction_index.len(), 5);
    }

    #[test]
    fn counts_track_writes_and_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("learning");
        let before = {
            let store = InteractionStore::open_path(&path, 3).unwrap();
            let mut ids = Vec::new();
            for (user, msg, conf) in [("u1", "what is hajj", 0.9), ("u2", "salam", 0.6), ("u1", "why?", 0.6)] {
                ids.push(store.record(user, msg, &candidate(conf), &ctx(msg)).unwrap());
            }
            assert!(store.rate_interaction(ids[1], 0.4).unwrap());
            assert!(store.rate_interaction(ids[1], 0.2).unwrap());
            let counts = store.counts().unwrap();
            assert_eq!(counts.interactions, 3);
            assert_eq!(counts.users, 2);
            assert_eq!(counts.patterns, store.patterns.len());
            assert!((counts.average_effectiveness - 0.2).abs() < 1e-5);
            store.flush().unwrap();
            counts
        };
        let after = InteractionStore::open_path(&path, 3).unwrap().counts().unwrap();
        assert_eq!(after.interactions, before.interactions);
        assert_eq!(after.users, before.users);
        assert_eq!(after.patterns, before.patterns);
        assert!((after.average_effectiveness - before.average_effectiveness).abs() < 1e-6);
    }

    #[test]
    fn pruned_ratings_leave_the_average() {
        let store = InteractionStore::temporary(1).unwrap();
        let id = store.record("u1", "hello there", &candidate(0.6), &ctx("hello there")).unwrap();
        assert!(store.rate_interaction(id, 0.1).unwrap());
        std::thread::sleep(std::time::Duration::from_millis(2));
        store.record("u1", "hello again", &candidate(0.8), &ctx("hello again")).unwrap();
        let counts = store.counts().unwrap();
        assert_eq!(counts.interactions, 1);
        assert!((counts.average_effectiveness - 0.8).abs() < 1e-5);
    }

    #[test]
    fn reopening_path_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("learning");
        {
            let store = InteractionStore::open_path(&path, 100).unwrap();
            store.record("u1", "what is hajj", &candidate(0.9), &ctx("what is hajj")).unwrap();
            store.flush().unwrap();
        }
        let store = InteractionStore::open_path(&path, 100).unwrap();
        assert_eq!(store.counts().unwrap().interactions, 1);
        assert!(store.probe().is_ok());
    }
}
