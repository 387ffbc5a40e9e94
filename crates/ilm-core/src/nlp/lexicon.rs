//! Lexicon sentiment analyzer in the VADER style: per-token valence on a
//! -4..4 scale, negation flips, exclamation emphasis, normalized compound.

use super::{clean_text, tokens, SentimentAnalyzer, SentimentScores};
use crate::error::CoreResult;
use std::collections::HashMap;

/// Normalization constant for the compound score.
const ALPHA: f32 = 15.0;
/// Scalar applied to a valence preceded by a negation.
const NEGATION_SCALAR: f32 = -0.74;
/// Extra magnitude per `!`, capped at four.
const EXCLAMATION_BOOST: f32 = 0.292;
/// How many preceding tokens a negation reaches.
const NEGATION_WINDOW: usize = 3;

const VALENCES: &[(&str, f32)] = &[
    // negative
    ("sad", -2.1),
    ("unhappy", -1.8),
    ("depressed", -2.6),
    ("depression", -2.6),
    ("lonely", -1.9),
    ("alone", -1.0),
    ("hopeless", -2.9),
    ("hurt", -2.1),
    ("pain", -2.0),
    ("grief", -2.5),
    ("grieving", -2.3),
    ("cry", -1.9),
    ("crying", -2.1),
    ("lost", -1.3),
    ("anxious", -1.9),
    ("anxiety", -1.9),
    ("worried", -1.6),
    ("worry", -1.4),
    ("afraid", -1.9),
    ("scared", -1.9),
    ("fear", -2.2),
    ("stress", -1.8),
    ("stressed", -1.9),
    ("angry", -2.3),
    ("anger", -2.2),
    ("hate", -2.7),
    ("frustrated", -1.9),
    ("upset", -1.6),
    ("bad", -2.5),
    ("terrible", -2.8),
    ("awful", -2.5),
    ("worst", -3.1),
    ("guilty", -1.8),
    ("guilt", -1.7),
    ("ashamed", -2.1),
    ("confused", -1.3),
    ("struggling", -1.6),
    ("difficult", -1.4),
    ("hard", -0.4),
    ("tired", -1.2),
    ("broken", -1.9),
    ("miserable", -2.8),
    ("doubt", -1.5),
    ("sin", -1.6),
    // positive
    ("happy", 2.7),
    ("glad", 2.0),
    ("joy", 2.8),
    ("joyful", 2.9),
    ("love", 3.2),
    ("grateful", 2.2),
    ("thankful", 2.2),
    ("thank", 1.5),
    ("thanks", 1.9),
    ("blessed", 2.9),
    ("peace", 2.5),
    ("peaceful", 2.2),
    ("hope", 1.9),
    ("hopeful", 2.3),
    ("good", 1.9),
    ("great", 3.1),
    ("wonderful", 2.7),
    ("amazing", 2.8),
    ("excited", 2.5),
    ("beautiful", 2.9),
    ("calm", 1.3),
    ("content", 1.5),
    ("better", 1.9),
    ("alhamdulillah", 2.4),
    ("inspired", 2.2),
    ("motivated", 1.9),
    ("kind", 2.4),
    ("helpful", 1.9),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nothing", "don't", "dont", "doesn't", "isn't", "aren't",
    "wasn't", "can't", "cannot", "won't", "didn't", "without",
];

/// Built-in lexicon analyzer.
pub struct LexiconSentiment {
    valences: HashMap<&'static str, f32>,
}

impl LexiconSentiment {
    pub fn new() -> Self {
        Self {
            valences: VALENCES.iter().copied().collect(),
        }
    }

    fn valence(&self, token: &str) -> Option<f32> {
        self.valences.get(token).copied()
    }
}

impl Default for LexiconSentiment {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentAnalyzer for LexiconSentiment {
    fn name(&self) -> &str {
        "lexicon"
    }

    fn score(&self, text: &str) -> CoreResult<SentimentScores> {
        let cleaned = clean_text(text);
        let toks: Vec<&str> = tokens(&cleaned).collect();
        if toks.is_empty() {
            return Ok(SentimentScores::neutral());
        }

        let mut sum = 0.0_f32;
        let mut pos_sum = 0.0_f32;
        let mut neg_sum = 0.0_f32;
        let mut neutral = 0usize;

        for (i, tok) in toks.iter().enumerate() {
            let Some(mut v) = self.valence(tok) else {
                neutral += 1;
                continue;
            };
            let window = &toks[i.saturating_sub(NEGATION_WINDOW)..i];
            if window.iter().any(|w| NEGATIONS.contains(w)) {
                v *= NEGATION_SCALAR;
            }
            sum += v;
            if v > 0.0 {
                pos_sum += v + 1.0;
            } else {
                neg_sum += v - 1.0;
            }
        }

        let bangs = cleaned.matches('!').count().min(4) as f32;
        if sum > 0.0 {
            sum += bangs * EXCLAMATION_BOOST;
        } else if sum < 0.0 {
            sum -= bangs * EXCLAMATION_BOOST;
        }

        let compound = (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0);
        let total = pos_sum + neg_sum.abs() + neutral as f32;
        let (pos, neg, neu) = if total > 0.0 {
            (pos_sum / total, neg_sum.abs() / total, neutral as f32 / total)
        } else {
            (0.0, 0.0, 1.0)
        };

        Ok(SentimentScores { compound, pos, neg, neu })
    }
}
