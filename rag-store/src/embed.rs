//! Embedding abstraction.

use futures::future::BoxFuture;

use crate::errors::RagError;

pub mod ollama;

/// Provider interface for embedding generation.
///
/// Async because the real provider (Ollama) performs HTTP requests. The same
/// provider must be used for ingestion and for queries.
pub trait EmbeddingsProvider: Send + Sync {
    /// Produces an embedding vector for the given text.
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>>;
}
