//! Generator seam.

use ai_llm_service::LlmServiceProfiles;
use futures::future::BoxFuture;

use crate::error::ChatError;

/// Anything that turns a prompt into a completion.
pub trait TextGenerator: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, ChatError>>;
}

/// Uses the **chat** profile (non-streaming `/api/generate`).
impl TextGenerator for LlmServiceProfiles {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, ChatError>> {
        Box::pin(async move {
            LlmServiceProfiles::generate(self, prompt)
                .await
                .map_err(|e| ChatError::Generation(e.to_string()))
        })
    }
}
