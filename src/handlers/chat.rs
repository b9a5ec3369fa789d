use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::FountainError;
use crate::router::FountainState;
use crate::service::{ChatCompleter as _, ChatTurn};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// POST /api/chat — public. Relays the message to the completion upstream.
pub async fn relay_chat(
    State(state): State<FountainState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, FountainError> {
    let message = req.message.as_deref().map(str::trim).unwrap_or_default();
    if message.is_empty() {
        return Err(FountainError::validation("message is required"));
    }
    let reply = state.chat.complete(message, &req.history).await?;
    Ok(Json(ChatResponse { reply }))
}
