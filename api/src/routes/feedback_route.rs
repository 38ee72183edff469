//! POST /feedback — appends one rating row to the feedback log.

use std::sync::Arc;

use assistant::FeedbackRecord;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use tracing::debug;

use crate::{core::app_state::AppState, error_handler::AppResult, routes::MessageResponse};

/// Request payload for /feedback. Missing or `null` fields become empty cells.
#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub original_input: Option<String>,
    #[serde(default)]
    pub bot_reply: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
}

impl From<FeedbackRequest> for FeedbackRecord {
    fn from(r: FeedbackRequest) -> Self {
        FeedbackRecord {
            original_input: r.original_input.unwrap_or_default(),
            bot_reply: r.bot_reply.unwrap_or_default(),
            feedback: r.feedback.unwrap_or_default(),
        }
    }
}

pub async fn feedback_route(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(body) = payload?;
    debug!(feedback = ?body.feedback, "feedback_route: start");

    state.feedback.submit(body.into()).await?;

    Ok(Json(MessageResponse {
        message: "Feedback saved successfully",
    }))
}
