//! Token-overlap semantic matcher: cosine similarity between the content-word
//! sets of two texts. Cheap enough for a full scan of a small knowledge base.

use super::{clean_text, tokens, SemanticMatcher};
use crate::error::CoreResult;
use std::collections::HashSet;

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "of", "in", "on", "to", "for", "and",
    "or", "do", "does", "did", "i", "me", "my", "you", "your", "we", "it", "this", "that",
    "what", "who", "how", "why", "when", "which", "about", "can", "could", "should", "would",
    "tell", "please", "there", "with", "at", "by", "as", "so",
];

pub struct TokenOverlapMatcher;

impl TokenOverlapMatcher {
    pub fn new() -> Self {
        Self
    }

    fn content_words(text: &str) -> HashSet<String> {
        let cleaned = clean_text(text);
        tokens(&cleaned)
            .filter(|t| !STOPWORDS.contains(t))
            .map(normalize)
            .collect()
    }
}

impl Default for TokenOverlapMatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Strips a plural `s` so "prayers" and "prayer" meet.
fn normalize(token: &str) -> String {
    if token.len() > 3 && token.ends_with('s') && !token.ends_with("ss") {
        token[..token.len() - 1].to_string()
    } else {
        token.to_string()
    }
}

impl SemanticMatcher for TokenOverlapMatcher {
    fn name(&self) -> &str {
        "token_overlap"
    }

    fn similarity(&self, a: &str, b: &str) -> CoreResult<f32> {
        let wa = Self::content_words(a);
        let wb = Self::content_words(b);
        if wa.is_empty() || wb.is_empty() {
            return Ok(0.0);
        }
        let shared = wa.intersection(&wb).count() as f32;
        let score = shared / ((wa.len() as f32).sqrt() * (wb.len() as f32).sqrt());
        Ok(score.clamp(0.0, 1.0))
    }
}
