use assistant::{ChatError, FeedbackError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

/// Public application error type.
///
/// Each variant maps to a stable `error` code; the client only ever sees a
/// generic message, the underlying cause goes to the log.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("configuration error: {0}")]
    Config(String),

    #[error("vector store unavailable: {0}")]
    Store(#[from] rag_store::RagError),

    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request ---
    #[error("malformed request body: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Chat(ChatError),

    #[error(transparent)]
    Feedback(#[from] FeedbackError),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Chat(ChatError::Validation(_)) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Chat(_) => StatusCode::BAD_GATEWAY,
            AppError::Store(_) => StatusCode::BAD_GATEWAY,
            AppError::Feedback(_)
            | AppError::Config(_)
            | AppError::Bind(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Chat(ChatError::Validation(_)) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Chat(ChatError::Retrieval(_)) | AppError::Store(_) => "RETRIEVAL_FAILED",
            AppError::Chat(ChatError::Generation(_)) => "GENERATION_FAILED",
            AppError::Feedback(_) => "FEEDBACK_WRITE_FAILED",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
        }
    }

    /// Text safe to show to callers.
    fn public_message(&self) -> String {
        match self {
            AppError::Chat(ChatError::Validation(m)) => m.clone(),
            AppError::BadRequest(_) => "Request body must be a valid JSON object".into(),
            AppError::Chat(ChatError::Retrieval(_)) | AppError::Store(_) => {
                "Could not look up support context, please try again".into()
            }
            AppError::Chat(ChatError::Generation(_)) => {
                "The assistant could not produce a reply, please try again".into()
            }
            AppError::Feedback(_) => "Feedback could not be saved".into(),
            AppError::Config(_) | AppError::Bind(_) | AppError::Server(_) => {
                "Internal server error".into()
            }
        }
    }
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        AppError::Chat(err)
    }
}

impl From<assistant::ConfigError> for AppError {
    fn from(err: assistant::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<ai_llm_service::AiLlmError> for AppError {
    fn from(err: ai_llm_service::AiLlmError) -> Self {
        AppError::Config(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = self.error_code(), error = %self, "request failed");
        } else {
            debug!(code = self.error_code(), error = %self, "request rejected");
        }
        let body = ErrorBody {
            error: self.error_code(),
            message: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Convert Axum JSON rejections (syntax, content type, shape) to `AppError`.
impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        let cases = [
            (
                AppError::from(ChatError::Validation("Missing user_input".into())),
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
            (
                AppError::BadRequest("EOF".into()),
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
            ),
            (
                AppError::from(ChatError::Retrieval(rag_store::RagError::Qdrant("down".into()))),
                StatusCode::BAD_GATEWAY,
                "RETRIEVAL_FAILED",
            ),
            (
                AppError::from(ChatError::Generation("timeout".into())),
                StatusCode::BAD_GATEWAY,
                "GENERATION_FAILED",
            ),
            (
                AppError::from(FeedbackError::Task("cancelled".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
                "FEEDBACK_WRITE_FAILED",
            ),
            (
                AppError::from(assistant::ConfigError::InvalidNumber {
                    var: "FAQ_LIMIT",
                    value: "many".into(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
            ),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_code(), status);
            assert_eq!(err.error_code(), code);
        }
    }

    #[test]
    fn internal_details_stay_out_of_the_message() {
        let err = AppError::from(ChatError::Generation("dial tcp 10.0.0.7:11434".into()));
        assert!(!err.public_message().contains("10.0.0.7"));
    }
}
