//! Shared LLM service with two profiles: `chat` and `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Both underlying Ollama clients are built up front, so a bad config fails
//!   at startup rather than on the first request.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::LlmServiceProfiles;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = Arc::new(LlmServiceProfiles::from_env()?);
//!
//! let reply = svc.generate("User: my bill is wrong\nAssistant:").await?;
//! println!("CHAT: {}", reply);
//!
//! let emb = svc.embed("my bill is wrong").await?;
//! println!("Embedding dim = {}", emb.len());
//! # Ok(()) }
//! ```

use std::sync::Arc;

use tracing::info;

use crate::{
    config::{
        default_config::{config_ollama_chat, config_ollama_embedding},
        llm_model_config::LlmModelConfig,
    },
    error_handler::AiLlmError,
    health_service::{HealthService, HealthStatus},
    services::ollama_service::OllamaService,
};

/// Shared service that manages the **chat** and **embedding** profiles.
pub struct LlmServiceProfiles {
    chat: Arc<OllamaService>,
    embedding: Arc<OllamaService>,
    health: HealthService,
}

impl LlmServiceProfiles {
    /// Creates a new service with both profiles.
    ///
    /// - `chat`: model answering customers.
    /// - `embedding`: model producing vectors for the FAQ/dialogue collections.
    /// - `health_timeout_secs`: optional timeout for the health checker.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if either client cannot be built.
    pub fn new(
        chat: LlmModelConfig,
        embedding: LlmModelConfig,
        health_timeout_secs: Option<u64>,
    ) -> Result<Self, AiLlmError> {
        info!(
            chat_model = %chat.model,
            embedding_model = %embedding.model,
            endpoint = %chat.endpoint,
            "initializing LLM profiles"
        );

        Ok(Self {
            chat: Arc::new(OllamaService::new(chat)?),
            embedding: Arc::new(OllamaService::new(embedding)?),
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Builds both profiles from environment variables.
    ///
    /// # Errors
    /// Returns [`AiLlmError::Config`] on missing/invalid variables.
    pub fn from_env() -> Result<Self, AiLlmError> {
        Self::new(config_ollama_chat()?, config_ollama_embedding()?, None)
    }

    /// Generates a completion for `prompt` using the **chat** profile.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if generation fails.
    pub async fn generate(&self, prompt: &str) -> Result<String, AiLlmError> {
        self.chat.generate(prompt).await.map_err(AiLlmError::from)
    }

    /// Computes an embedding using the **embedding** profile.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if embedding fails.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        self.embedding
            .embeddings(input)
            .await
            .map_err(AiLlmError::from)
    }

    /// Returns a health snapshot for both profiles (once if they are identical).
    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let mut list = vec![self.chat.config().clone()];
        if self.embedding.config() != self.chat.config() {
            list.push(self.embedding.config().clone());
        }
        self.health.check_many(&list).await
    }
}
