use crate::context::Context;

pub const QUESTION_PATTERN: &str = "question_pattern";
pub const SHORT_MESSAGE: &str = "short_message";
pub const LONG_MESSAGE: &str = "long_message";

const SHORT_BELOW_CHARS: usize = 20;
const LONG_ABOVE_CHARS: usize = 100;

/// Bookkeeping tags for one message, distinct and in derivation order.
pub fn derive_patterns(message: &str, context: &Context) -> Vec<String> {
    let words: Vec<String> = message.split_whitespace().map(str::to_lowercase).collect();
    let mut out: Vec<String> = Vec::new();
    let mut push = |p: String| {
        if !out.contains(&p) {
            out.push(p);
        }
    };

    if words.len() >= 2 {
        push(format!("{} {}", words[0], words[1]));
        push(format!("{} {}", words[words.len() - 2], words[words.len() - 1]));
    }
    for emotion in context.emotional_keywords() {
        push(format!("emotion_{}", emotion));
    }
    if message.contains('?') {
        push(QUESTION_PATTERN.to_string());
    }
    let chars = message.chars().count();
    if chars < SHORT_BELOW_CHARS {
        push(SHORT_MESSAGE.to_string());
    } else if chars > LONG_ABOVE_CHARS {
        push(LONG_MESSAGE.to_string());
    }
    out
}
