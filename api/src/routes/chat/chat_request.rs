use serde::{Deserialize, Serialize};

/// Request payload for /chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Customer message; absent, `null` and `""` are rejected by the handler.
    #[serde(default)]
    pub user_input: Option<String>,
}

/// Response payload for /chat.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// Trimmed model reply.
    pub response: String,
    /// Echo of the request input, used by the page when sending feedback.
    pub original_input: String,
}
