//! Chat handler. The answer runs on the blocking pool; recording runs as a
//! separate blocking task that the response never waits for.

use crate::AppState;
use axum::extract::{Json, State};
use ilm_core::{message_prefix, ChatResponse};
use std::sync::Arc;
use std::time::Instant;

#[derive(serde::Deserialize)]
pub(crate) struct ChatRequest {
    pub(crate) message: String,
    #[serde(default)]
    pub(crate) user_id: Option<String>,
}

/// POST /api/v1/chat
pub(crate) async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Json<ChatResponse> {
    let started = Instant::now();
    tracing::info!(
        target: "ilm::gateway",
        chars = req.message.chars().count(),
        user_id = req.user_id.as_deref().unwrap_or(""),
        "Chat request received"
    );

    let assistant = Arc::clone(&state.assistant);
    let ChatRequest { message, user_id } = req;
    let log_prefix = message_prefix(&message);
    let answered = tokio::task::spawn_blocking(move || assistant.answer(&message, user_id.as_deref())).await;

    let answer = match answered {
        Ok(answer) => answer,
        Err(e) => {
            tracing::error!(
                target: "ilm::gateway",
                message = %log_prefix,
                error = %e,
                "Answer worker failed; returning apology"
            );
            return Json(ChatResponse::emergency(started.elapsed().as_secs_f64()));
        }
    };

    let response = answer.response.clone();
    let assistant = Arc::clone(&state.assistant);
    tokio::task::spawn_blocking(move || {
        assistant.record(&answer);
    });
    Json(response)
}
