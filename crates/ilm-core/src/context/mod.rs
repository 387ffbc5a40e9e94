//! Per-request context: sentiment, emotional keywords, rolling history and
//! simple message features. A [`Context`] is read-only once built.

mod emotion;
mod session;

pub use emotion::{detect_emotions, EMOTION_TABLE};
pub use session::SessionStore;

use crate::nlp::{clean_text, Capabilities, SentimentScores};
use crate::shared::{message_prefix, now_ms};
use chrono::{Datelike, Local, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Context without its history; stored inside each [`UserTurn`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub sentiment: SentimentScores,
    pub emotional_keywords: BTreeSet<String>,
    pub hour_of_day: u32,
    pub day_of_week: String,
    pub message_length: usize,
    pub has_question_mark: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTurn {
    pub message: String,
    pub timestamp_ms: i64,
    pub context_snapshot: ContextSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    sentiment: SentimentScores,
    emotional_keywords: BTreeSet<String>,
    recent_history: Vec<UserTurn>,
    hour_of_day: u32,
    day_of_week: String,
    message_length: usize,
    has_question_mark: bool,
}

impl Context {
    /// Context for `message` with no history, stamped with the local clock.
    pub fn detached(message: &str, sentiment: SentimentScores, emotional_keywords: BTreeSet<String>) -> Self {
        let now = Local::now();
        Self {
            sentiment,
            emotional_keywords,
            recent_history: Vec::new(),
            hour_of_day: now.hour(),
            day_of_week: now.weekday().to_string(),
            message_length: message.chars().count(),
            has_question_mark: message.contains('?'),
        }
    }

    fn with_history(mut self, history: Vec<UserTurn>) -> Self {
        self.recent_history = history;
        self
    }

    pub fn sentiment(&self) -> &SentimentScores {
        &self.sentiment
    }

    pub fn emotional_keywords(&self) -> &BTreeSet<String> {
        &self.emotional_keywords
    }

    pub fn recent_history(&self) -> &[UserTurn] {
        &self.recent_history
    }

    pub fn hour_of_day(&self) -> u32 {
        self.hour_of_day
    }

    pub fn day_of_week(&self) -> &str {
        &self.day_of_week
    }

    pub fn message_length(&self) -> usize {
        self.message_length
    }

    pub fn has_question_mark(&self) -> bool {
        self.has_question_mark
    }

    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot {
            sentiment: self.sentiment,
            emotional_keywords: self.emotional_keywords.clone(),
            hour_of_day: self.hour_of_day,
            day_of_week: self.day_of_week.clone(),
            message_length: self.message_length,
            has_question_mark: self.has_question_mark,
        }
    }

    /// JSON form stored with each interaction.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Builds contexts and maintains the per-user history they read.
pub struct ContextExtractor {
    sessions: Arc<SessionStore>,
}

impl ContextExtractor {
    pub fn new(sessions: Arc<SessionStore>) -> Self {
        Self { sessions }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Builds the context for `message` and appends the new turn to the user's
    /// history. Sentiment failures degrade to the neutral vector.
    pub fn extract(&self, message: &str, user_id: &str, capabilities: &Capabilities) -> Context {
        let cleaned = clean_text(message);

        let sentiment = match capabilities.sentiment.as_ref() {
            Some(analyzer) => match panic::catch_unwind(AssertUnwindSafe(|| analyzer.score(&cleaned))) {
                Ok(Ok(scores)) => scores,
                Ok(Err(e)) => {
                    tracing::warn!(
                        target: "ilm::context",
                        user_id = %user_id,
                        message = %message_prefix(message),
                        analyzer = analyzer.name(),
                        error = %e,
                        "Sentiment scoring failed, using neutral score"
                    );
                    SentimentScores::neutral()
                }
                Err(_) => {
                    tracing::error!(
                        target: "ilm::context",
                        user_id = %user_id,
                        message = %message_prefix(message),
                        analyzer = analyzer.name(),
                        "Sentiment analyzer panicked, using neutral score"
                    );
                    SentimentScores::neutral()
                }
            },
            None => SentimentScores::neutral(),
        };

        let emotional_keywords = detect_emotions(&cleaned);
        let history = self.sessions.recent(user_id);

        let context = Context::detached(message, sentiment, emotional_keywords).with_history(history);

        self.sessions.append(
            user_id,
            UserTurn {
                message: message.to_string(),
                timestamp_ms: now_ms(),
                context_snapshot: context.snapshot(),
            },
        );

        tracing::debug!(
            target: "ilm::context",
            user_id = %user_id,
            compound = context.sentiment.compound,
            emotions = ?context.emotional_keywords,
            history_turns = context.recent_history.len(),
            "Context extracted"
        );
        context
    }
}
