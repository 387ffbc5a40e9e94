//! Templated replies for strongly negative or positive messages.

use super::{ResponseCandidate, Strategy, StrategyName};
use crate::context::Context;
use crate::error::CoreResult;

pub const NEGATIVE_THRESHOLD: f32 = -0.3;
pub const POSITIVE_THRESHOLD: f32 = 0.3;
pub const SENTIMENT_CONFIDENCE: f32 = 0.8;
const SOURCE_LABEL: &str = "Sentiment Support";

struct Template {
    emotion: Option<&'static str>,
    text: &'static str,
    citations: &'static [&'static str],
}

/// Emotion-specific templates first; the `None` entry is the default.
const COMFORTING: &[Template] = &[
    Template {
        emotion: Some("anxiety"),
        text: "It sounds like you are carrying a lot of worry right now. Remember that \
               hearts find rest in the remembrance of Allah; take a slow breath, and take \
               one small step at a time. If you want, ask me about dua or patience.",
        citations: &["Quran 13:28", "Quran 2:286"],
    },
    Template {
        emotion: Some("guilt"),
        text: "Feeling remorse is itself a sign of a living heart. Allah's mercy is vast \
               and the door of repentance stays open, so do not despair of it.",
        citations: &["Quran 39:53"],
    },
    Template {
        emotion: Some("loneliness"),
        text: "I'm sorry you are feeling alone. Allah is near to those who call on Him, \
               and reaching out to family, friends or your local community can help too.",
        citations: &["Quran 2:186"],
    },
    Template {
        emotion: Some("sadness"),
        text: "I'm sorry you are going through this. Hardship does not last forever: \
               with hardship comes ease. Be gentle with yourself, and consider talking to \
               someone you trust.",
        citations: &["Quran 94:5-6"],
    },
    Template {
        emotion: None,
        text: "I can hear that things feel difficult right now. Allah does not burden a \
               soul beyond what it can bear, and with hardship comes ease. I'm here if you \
               want to ask about anything.",
        citations: &["Quran 2:286", "Quran 94:5-6"],
    },
];

const ENCOURAGING: &[Template] = &[
    Template {
        emotion: Some("gratitude"),
        text: "Alhamdulillah, it's wonderful to hear your gratitude. Allah promises that \
               if you are grateful, He will surely increase you.",
        citations: &["Quran 14:7"],
    },
    Template {
        emotion: Some("hope"),
        text: "Your hope is beautiful. Keep trusting in Allah and keep striving; no soul \
               loses what it sincerely works toward.",
        citations: &["Quran 65:3"],
    },
    Template {
        emotion: None,
        text: "It's great to hear you are in good spirits! May Allah bless your day. Feel \
               free to ask me about the pillars of Islam, prayer, fasting or anything else.",
        citations: &["Quran 14:7"],
    },
];

pub struct SentimentResponse;

impl SentimentResponse {
    pub fn new() -> Self {
        Self
    }

    fn pick(templates: &'static [Template], context: &Context) -> &'static Template {
        context
            .emotional_keywords()
            .iter()
            .find_map(|emotion| templates.iter().find(|t| t.emotion == Some(emotion.as_str())))
            .or_else(|| templates.iter().find(|t| t.emotion.is_none()))
            .unwrap_or(&templates[0])
    }
}

impl Default for SentimentResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for SentimentResponse {
    fn name(&self) -> StrategyName {
        StrategyName::SentimentAnalysis
    }

    fn attempt(&self, _message: &str, context: &Context) -> CoreResult<Option<ResponseCandidate>> {
        let compound = context.sentiment().compound;
        let templates = if compound < NEGATIVE_THRESHOLD {
            COMFORTING
        } else if compound > POSITIVE_THRESHOLD {
            ENCOURAGING
        } else {
            return Ok(None);
        };
        let template = Self::pick(templates, context);
        Ok(Some(ResponseCandidate::new(
            template.text,
            template.citations.iter().map(|c| c.to_string()).collect(),
            SOURCE_LABEL,
            SENTIMENT_CONFIDENCE,
            StrategyName::SentimentAnalysis,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::SentimentScores;
    use std::collections::BTreeSet;

    fn ctx(compound: f32, emotions: &[&str]) -> Context {
        let set: BTreeSet<String> = emotions.iter().map(|e| e.to_string()).collect();
        Context::detached("msg", SentimentScores::with_compound(compound), set)
    }

    #[test]
    fn neutral_band_abstains() {
        let s = SentimentResponse::new();
        for compound in [-0.3, -0.29, 0.0, 0.29, 0.3] {
            assert!(s.attempt("msg", &ctx(compound, &[])).unwrap().is_none(), "compound {}", compound);
        }
    }

    #[test]
    fn comforting_reply_follows_detected_emotion() {
        let s = SentimentResponse::new();
        let c = s.attempt("msg", &ctx(-0.7, &["guilt"])).unwrap().unwrap();
        assert_eq!(c.citations, vec!["Quran 39:53".to_string()]);
        assert_eq!(c.source_label, "Sentiment Support");
        let generic = s.attempt("msg", &ctx(-0.7, &["joy"])).unwrap().unwrap();
        assert!(generic.answer_text.contains("beyond what it can bear"));
    }

    #[test]
    fn encouraging_reply_for_positive_messages() {
        let s = SentimentResponse::new();
        let c = s.attempt("msg", &ctx(0.9, &["gratitude"])).unwrap().unwrap();
        assert!(c.answer_text.starts_with("Alhamdulillah"));
        assert!((c.confidence - SENTIMENT_CONFIDENCE).abs() < 1e-6);
    }
}
