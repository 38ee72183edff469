//! GET /health — Ollama probe snapshot; always 200.

use std::sync::Arc;

use ai_llm_service::HealthStatus;
use axum::{Json, extract::State};

use crate::core::app_state::AppState;

pub async fn health_route(State(state): State<Arc<AppState>>) -> Json<Vec<HealthStatus>> {
    Json(state.llm.health_all().await)
}
