//! Learning log: interaction history, derived usage patterns, stats, and the
//! background monitor that keeps the store reachable.

mod monitor;
mod patterns;
mod stats;
mod store;

pub use monitor::{LearningMonitor, MonitorTarget, TickOutcome};
pub use patterns::{derive_patterns, LONG_MESSAGE, QUESTION_PATTERN, SHORT_MESSAGE};
pub use stats::LearningStats;
pub use store::{InteractionStore, LearnedPattern, StoreCounts, StoredInteraction};
