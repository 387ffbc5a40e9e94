//! Feedback and learning inspection handlers.

use crate::AppState;
use axum::extract::{Json, Query, State};
use std::sync::Arc;

pub(crate) const DEFAULT_PATTERN_LIMIT: usize = 20;
pub(crate) const MAX_PATTERN_LIMIT: usize = 200;

#[derive(serde::Deserialize)]
pub(crate) struct FeedbackRequest {
    pub(crate) interaction_id: uuid::Uuid,
    pub(crate) score: f32,
}

/// POST /api/v1/feedback – sets the effectiveness score of a recorded interaction.
pub(crate) async fn feedback(
    State(state): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> Json<serde_json::Value> {
    let assistant = Arc::clone(&state.assistant);
    let id = req.interaction_id;
    let rated = tokio::task::spawn_blocking(move || assistant.rate_interaction(id, req.score)).await;
    let body = match rated {
        Ok(Ok(true)) => serde_json::json!({ "status": "ok", "interaction_id": id }),
        Ok(Ok(false)) => serde_json::json!({ "status": "not_found", "interaction_id": id }),
        Ok(Err(e)) => {
            tracing::warn!(target: "ilm::gateway", interaction_id = %id, kind = e.kind(), error = %e, "Feedback failed");
            serde_json::json!({ "status": "error", "error": e.to_string() })
        }
        Err(e) => {
            tracing::error!(target: "ilm::gateway", interaction_id = %id, error = %e, "Feedback worker failed");
            serde_json::json!({ "status": "error", "error": "internal error" })
        }
    };
    Json(body)
}

#[derive(serde::Deserialize)]
pub(crate) struct PatternsQuery {
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

/// GET /api/v1/learning/patterns?limit=N – most used learned patterns.
pub(crate) async fn patterns(
    State(state): State<AppState>,
    Query(q): Query<PatternsQuery>,
) -> Json<serde_json::Value> {
    let limit = q.limit.unwrap_or(DEFAULT_PATTERN_LIMIT).clamp(1, MAX_PATTERN_LIMIT);
    let assistant = Arc::clone(&state.assistant);
    let top = tokio::task::spawn_blocking(move || assistant.top_patterns(limit)).await;
    let body = match top {
        Ok(Ok(patterns)) => serde_json::json!({ "status": "ok", "limit": limit, "patterns": patterns }),
        Ok(Err(e)) => {
            tracing::warn!(target: "ilm::gateway", kind = e.kind(), error = %e, "Pattern listing failed");
            serde_json::json!({ "status": "degraded", "limit": limit, "patterns": [] })
        }
        Err(e) => {
            tracing::error!(target: "ilm::gateway", error = %e, "Pattern worker failed");
            serde_json::json!({ "status": "error", "limit": limit, "patterns": [] })
        }
    };
    Json(body)
}

#[derive(serde::Deserialize)]
pub(crate) struct InteractionsQuery {
    #[serde(default)]
    pub(crate) user_id: Option<String>,
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

/// GET /api/v1/learning/interactions?user_id=U&limit=N – a user's recorded interactions, newest first.
pub(crate) async fn interactions(
    State(state): State<AppState>,
    Query(q): Query<InteractionsQuery>,
) -> Json<serde_json::Value> {
    let limit = q.limit.unwrap_or(DEFAULT_PATTERN_LIMIT).clamp(1, MAX_PATTERN_LIMIT);
    let assistant = Arc::clone(&state.assistant);
    let user_id = q.user_id;
    let recent = tokio::task::spawn_blocking(move || assistant.recent_interactions(user_id.as_deref(), limit)).await;
    let body = match recent {
        Ok(Ok(items)) => serde_json::json!({ "status": "ok", "limit": limit, "interactions": items }),
        Ok(Err(e)) => {
            tracing::warn!(target: "ilm::gateway", kind = e.kind(), error = %e, "Interaction listing failed");
            serde_json::json!({ "status": "degraded", "limit": limit, "interactions": [] })
        }
        Err(e) => {
            tracing::error!(target: "ilm::gateway", error = %e, "Interaction worker failed");
            serde_json::json!({ "status": "error", "limit": limit, "interactions": [] })
        }
    };
    Json(body)
}
