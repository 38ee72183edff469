//! Unified error types for the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error for rag-store operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Corpus source could not be read or parsed; halts the loader.
    #[error("ingestion failed for {}: {reason}", path.display())]
    Ingestion { path: PathBuf, reason: String },

    /// Mismatch in vector dimensionality across entries.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// The embedding backend failed.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// A collection the caller requires does not exist yet.
    #[error("collection '{0}' does not exist; run the corpus loader first")]
    CollectionMissing(String),

    /// Qdrant client errors (wrapped).
    #[error("qdrant error: {0}")]
    Qdrant(String),
}

impl RagError {
    pub(crate) fn ingestion(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Ingestion {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
