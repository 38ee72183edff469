//! POST /reset — clears the shared conversation.

use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::info;

use crate::{core::app_state::AppState, routes::MessageResponse};

pub async fn reset_route(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    state.session.lock().await.reset();
    info!("chat history cleared");
    Json(MessageResponse {
        message: "Chat history cleared",
    })
}
