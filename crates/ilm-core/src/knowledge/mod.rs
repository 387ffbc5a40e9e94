//! Curated knowledge base (read-only, loaded once).
//!
//! | Piece            | Purpose                                              |
//! |------------------|------------------------------------------------------|
//! | `KnowledgeEntry` | One topic: canonical question, answer, citations     |
//! | `KnowledgeBase`  | Immutable in-memory table keyed by topic key         |
//! | `seed`           | Built-in topics used when no knowledge file is given |

mod seed;
mod store;

pub use seed::seed_entries;
pub use store::{KnowledgeBase, KnowledgeEntry, TopicSummary};

/// Read-only lookup contract the strategy chain depends on.
pub trait KnowledgeSource: Send + Sync {
    /// Returns the entry stored under `key`, if any.
    fn lookup(&self, key: &str) -> Option<&KnowledgeEntry>;

    /// Every entry, in stable key order.
    fn all_entries(&self) -> Box<dyn Iterator<Item = &KnowledgeEntry> + '_>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
