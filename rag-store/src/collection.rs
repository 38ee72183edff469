//! Collection abstraction shared by the loader and the retriever.

use std::collections::HashSet;

use futures::future::BoxFuture;

use crate::errors::RagError;
use crate::record::{QueryHit, StoredEntry};

/// A named set of `(id, vector, document, metadata)` entries with
/// nearest-neighbour lookup.
pub trait VectorCollection: Send + Sync {
    /// Collection name (`faq_embeddings`, `dialogue_embeddings`).
    fn name(&self) -> &str;

    /// Whether the collection has been created.
    fn exists<'a>(&'a self) -> BoxFuture<'a, Result<bool, RagError>>;

    /// Creates the collection for `dim`-sized vectors unless it already exists.
    fn ensure<'a>(&'a self, dim: usize) -> BoxFuture<'a, Result<(), RagError>>;

    /// Returns the subset of `ids` already stored in the collection.
    fn existing_ids<'a>(&'a self, ids: &'a [String])
    -> BoxFuture<'a, Result<HashSet<String>, RagError>>;

    /// Inserts or replaces entries by id. Returns the number written.
    fn upsert<'a>(&'a self, entries: Vec<StoredEntry>) -> BoxFuture<'a, Result<usize, RagError>>;

    /// Returns up to `limit` hits, nearest first.
    ///
    /// Fewer entries than `limit` (or none at all) is not an error.
    fn query<'a>(
        &'a self,
        vector: &'a [f32],
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<QueryHit>, RagError>>;
}
