use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use assistant::{AssistantConfig, ChatService, ChatSession, FeedbackLog, SessionHandle};
use rag_store::{EmbeddingsProvider, RagConfig, RagStore, embed::ollama::{OllamaConfig, OllamaEmbedder}};
use tracing::info;

use crate::error_handler::AppError;

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub chat: ChatService,
    /// The one conversation shared by every caller.
    pub session: SessionHandle,
    pub feedback: Arc<FeedbackLog>,
    /// Ollama profiles, probed by `/health`.
    pub llm: Arc<LlmServiceProfiles>,
}

impl AppState {
    /// Load shared state from environment variables.
    ///
    /// Opens both collections; fails if either does not exist yet.
    pub async fn from_env() -> Result<Self, AppError> {
        let llm = Arc::new(LlmServiceProfiles::from_env()?);
        let rag_cfg = RagConfig::from_env()?;
        let cfg = AssistantConfig::from_env()?;

        let embedder: Arc<dyn EmbeddingsProvider> = Arc::new(OllamaEmbedder::new(OllamaConfig {
            svc: llm.clone(),
            dim: rag_cfg.embedding_dim,
        }));
        let store = RagStore::new(rag_cfg)?;
        let retriever = store.retriever(embedder).await?;

        info!(
            faq_limit = cfg.faq_limit,
            dialogue_limit = cfg.dialogue_limit,
            history_limit = cfg.history_limit,
            feedback_log = %cfg.feedback_log.display(),
            "application state ready"
        );

        Ok(Self {
            chat: ChatService::new(retriever, llm.clone(), &cfg),
            session: ChatSession::with_capacity(cfg.history_limit).handle(),
            feedback: Arc::new(FeedbackLog::new(cfg.feedback_log)),
            llm,
        })
    }
}
