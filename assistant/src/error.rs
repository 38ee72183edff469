//! Typed errors for the assistant crate.

use thiserror::Error;

/// Failure of one chat exchange.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The caller sent no usable input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Embedding the query or searching a collection failed.
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] rag_store::RagError),

    /// The language model call failed (transport, model, timeout).
    #[error("generation failed: {0}")]
    Generation(String),
}

/// Failure to persist a feedback row.
#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The blocking writer task did not complete.
    #[error("feedback writer task failed: {0}")]
    Task(String),
}

/// Invalid assistant configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A limit variable is set but is not a non-negative integer.
    #[error("invalid number in {var}: {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}
