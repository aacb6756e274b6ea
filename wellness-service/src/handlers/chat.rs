use axum::{extract::rejection::JsonRejection, extract::State, Json};

use super::parse_body;
use crate::dtos::{ChatRequest, ChatResponse};
use crate::startup::AppState;

/// `POST /chat-gemini`
#[tracing::instrument(skip_all)]
pub async fn chat_reply(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Json<ChatResponse> {
    Json(state.chat.respond(parse_body(payload)).await)
}
