//! Embedding executor with concurrency and dimension checks.

use futures::stream::{self, StreamExt, TryStreamExt};
use indicatif::ProgressBar;
use tracing::debug;

use crate::{embed::EmbeddingsProvider, errors::RagError};

/// Embeds `texts`, keeping input order in the output.
///
/// # Arguments
/// - `provider`: embedding backend.
/// - `expected_dim`: if `Some`, enforces this vector size (error on mismatch);
///   otherwise every vector must match the first one.
/// - `concurrency`: maximum number of in-flight embedding requests.
/// - `progress`: ticked once per finished text.
///
/// # Errors
/// Returns [`RagError::VectorSizeMismatch`] if dimensions mismatch,
/// or [`RagError::Embedding`] if the provider fails. No retries.
pub async fn embed_all(
    texts: &[String],
    provider: &dyn EmbeddingsProvider,
    expected_dim: Option<usize>,
    concurrency: usize,
    progress: &ProgressBar,
) -> Result<Vec<Vec<f32>>, RagError> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }
    debug!(total = texts.len(), concurrency, "embedding batch");

    let vectors: Vec<Vec<f32>> = stream::iter(texts.iter())
        .map(|text| async move {
            let v = provider.embed(text).await;
            progress.inc(1);
            v
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    let want = expected_dim.unwrap_or(vectors[0].len());
    if let Some(bad) = vectors.iter().find(|v| v.len() != want) {
        return Err(RagError::VectorSizeMismatch {
            got: bad.len(),
            want,
        });
    }

    Ok(vectors)
}
