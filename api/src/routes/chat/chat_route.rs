//! POST /chat — one support exchange with RAG context.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
};
use tracing::debug;

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    middleware_layer::request_id::REQUEST_ID,
    routes::chat::chat_request::{ChatRequest, ChatResponse},
};

/// Handler: POST /chat
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:5000/chat \
///   -H 'content-type: application/json' \
///   -d '{"user_input":"my bill is wrong"}'
/// ```
pub async fn chat_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<Json<ChatResponse>> {
    let request_id = headers
        .get(REQUEST_ID)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-");

    let Json(body) = payload?;
    let user_input = body.user_input.unwrap_or_default();
    debug!(request_id = %request_id, input_chars = user_input.len(), "chat_route: start");

    let out = state.chat.handle_chat(&state.session, &user_input).await?;

    debug!(request_id = %request_id, "chat_route: success");
    Ok(Json(ChatResponse {
        response: out.reply,
        original_input: out.original_input,
    }))
}
