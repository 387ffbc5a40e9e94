//! Fixed token → emotion-cluster table. Detection is a plain lookup over the
//! tokens of the cleaned message; nothing is inferred beyond this table.

use crate::nlp::tokens;
use std::collections::BTreeSet;

pub const EMOTION_TABLE: &[(&str, &str)] = &[
    // sadness
    ("sad", "sadness"),
    ("unhappy", "sadness"),
    ("depressed", "sadness"),
    ("depression", "sadness"),
    ("grief", "sadness"),
    ("grieving", "sadness"),
    ("crying", "sadness"),
    ("cry", "sadness"),
    ("heartbroken", "sadness"),
    ("miserable", "sadness"),
    ("hopeless", "sadness"),
    // anxiety
    ("anxious", "anxiety"),
    ("anxiety", "anxiety"),
    ("worried", "anxiety"),
    ("worry", "anxiety"),
    ("afraid", "anxiety"),
    ("scared", "anxiety"),
    ("fear", "anxiety"),
    ("nervous", "anxiety"),
    ("stressed", "anxiety"),
    ("stress", "anxiety"),
    ("panic", "anxiety"),
    // anger
    ("angry", "anger"),
    ("anger", "anger"),
    ("furious", "anger"),
    ("frustrated", "anger"),
    ("hate", "anger"),
    ("annoyed", "anger"),
    // joy
    ("happy", "joy"),
    ("joy", "joy"),
    ("joyful", "joy"),
    ("glad", "joy"),
    ("excited", "joy"),
    ("delighted", "joy"),
    // gratitude
    ("grateful", "gratitude"),
    ("thankful", "gratitude"),
    ("thanks", "gratitude"),
    ("thank", "gratitude"),
    ("alhamdulillah", "gratitude"),
    ("blessed", "gratitude"),
    // confusion
    ("confused", "confusion"),
    ("unsure", "confusion"),
    ("doubt", "confusion"),
    ("doubts", "confusion"),
    ("lost", "confusion"),
    // loneliness
    ("lonely", "loneliness"),
    ("alone", "loneliness"),
    ("isolated", "loneliness"),
    // guilt
    ("guilty", "guilt"),
    ("guilt", "guilt"),
    ("ashamed", "guilt"),
    ("regret", "guilt"),
    ("sinned", "guilt"),
    // hope
    ("hope", "hope"),
    ("hopeful", "hope"),
    ("optimistic", "hope"),
    ("inspired", "hope"),
];

/// Emotion clusters whose tokens appear in `cleaned`.
pub fn detect_emotions(cleaned: &str) -> BTreeSet<String> {
    tokens(cleaned)
        .filter_map(|tok| {
            EMOTION_TABLE
                .iter()
                .find(|(word, _)| *word == tok)
                .map(|(_, cluster)| cluster.to_string())
        })
        .collect()
}
