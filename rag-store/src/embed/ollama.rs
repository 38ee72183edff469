//! Ollama embedding provider implementation.
//!
//! Delegates to the shared [`LlmServiceProfiles`] embedding profile.

use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use futures::future::BoxFuture;
use tracing::warn;

use crate::{EmbeddingsProvider, RagError};

/// Configuration for the Ollama embedding backend.
#[derive(Clone)]
pub struct OllamaConfig {
    pub svc: Arc<LlmServiceProfiles>,
    /// Expected embedding dimension size, if known.
    pub dim: Option<usize>,
}

/// Ollama embedding provider (async).
#[derive(Clone)]
pub struct OllamaEmbedder {
    svc: Arc<LlmServiceProfiles>,
    dim: Option<usize>,
}

impl OllamaEmbedder {
    /// Construct a new embedder from configuration.
    pub fn new(cfg: OllamaConfig) -> Self {
        Self {
            svc: cfg.svc,
            dim: cfg.dim,
        }
    }
}

impl EmbeddingsProvider for OllamaEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>> {
        Box::pin(async move {
            let resp = self
                .svc
                .embed(text)
                .await
                .map_err(|e| RagError::Embedding(e.to_string()))?;

            if let Some(want) = self.dim {
                if resp.len() != want {
                    warn!(got = resp.len(), want, "embedding dimension mismatch");
                    return Err(RagError::VectorSizeMismatch {
                        got: resp.len(),
                        want,
                    });
                }
            }

            Ok(resp)
        })
    }
}
