//! In-process collection with exact cosine search.
//!
//! Used for tests and for running the pipeline without a Qdrant instance.
//! Ties keep insertion order.

use std::collections::HashSet;

use futures::future::BoxFuture;
use tokio::sync::RwLock;
use tracing::debug;

use crate::collection::VectorCollection;
use crate::errors::RagError;
use crate::record::{QueryHit, StoredEntry};

/// Cosine similarity; `0.0` for empty, mismatched or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let (dot, na, nb) = a
        .iter()
        .zip(b.iter())
        .fold((0.0f32, 0.0f32, 0.0f32), |(d, aa, bb), (x, y)| {
            (d + (x * y), aa + (x * x), bb + (y * y))
        });

    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na.sqrt() * nb.sqrt())
    }
}

pub struct MemoryCollection {
    name: String,
    entries: RwLock<Vec<StoredEntry>>,
    writes: RwLock<usize>,
    /// `None` until created; the vector size once known.
    created: RwLock<Option<Option<usize>>>,
}

impl MemoryCollection {
    /// An existing, empty collection.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_state(name, Some(None))
    }

    /// A collection that has not been created yet.
    pub fn absent(name: impl Into<String>) -> Self {
        Self::with_state(name, None)
    }

    fn with_state(name: impl Into<String>, created: Option<Option<usize>>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(Vec::new()),
            writes: RwLock::new(0),
            created: RwLock::new(created),
        }
    }

    /// Vector size fixed at creation (or by the first write).
    pub async fn dim(&self) -> Option<usize> {
        self.created.read().await.flatten()
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Total number of entries ever written (replacements included).
    pub async fn write_count(&self) -> usize {
        *self.writes.read().await
    }

    /// Snapshot of all entries in insertion order.
    pub async fn entries(&self) -> Vec<StoredEntry> {
        self.entries.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<StoredEntry> {
        self.entries
            .read()
            .await
            .iter()
            .find(|e| e.id == id)
            .cloned()
    }
}

impl VectorCollection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn exists<'a>(&'a self) -> BoxFuture<'a, Result<bool, RagError>> {
        Box::pin(async move { Ok(self.created.read().await.is_some()) })
    }

    fn ensure<'a>(&'a self, dim: usize) -> BoxFuture<'a, Result<(), RagError>> {
        Box::pin(async move {
            let mut created = self.created.write().await;
            if created.flatten().is_none() {
                debug!(collection = %self.name, dim, "memory collection created");
                *created = Some(Some(dim));
            }
            Ok(())
        })
    }

    fn existing_ids<'a>(
        &'a self,
        ids: &'a [String],
    ) -> BoxFuture<'a, Result<HashSet<String>, RagError>> {
        Box::pin(async move {
            let entries = self.entries.read().await;
            let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
            Ok(entries
                .iter()
                .filter(|e| wanted.contains(e.id.as_str()))
                .map(|e| e.id.clone())
                .collect())
        })
    }

    fn upsert<'a>(&'a self, batch: Vec<StoredEntry>) -> BoxFuture<'a, Result<usize, RagError>> {
        Box::pin(async move {
            if let Some(first) = batch.first() {
                let mut created = self.created.write().await;
                if created.flatten().is_none() {
                    *created = Some(Some(first.vector.len()));
                }
            }
            let mut entries = self.entries.write().await;
            let n = batch.len();
            for entry in batch {
                match entries.iter_mut().find(|e| e.id == entry.id) {
                    Some(slot) => *slot = entry,
                    None => entries.push(entry),
                }
            }
            *self.writes.write().await += n;
            debug!(collection = %self.name, written = n, total = entries.len(), "memory upsert");
            Ok(n)
        })
    }

    fn query<'a>(
        &'a self,
        vector: &'a [f32],
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<QueryHit>, RagError>> {
        Box::pin(async move {
            let entries = self.entries.read().await;
            let mut scored: Vec<(&StoredEntry, f32)> = entries
                .iter()
                .map(|e| (e, cosine_similarity(vector, &e.vector)))
                .collect();

            scored.sort_by(|a, b| b.1.total_cmp(&a.1));
            Ok(scored
                .into_iter()
                .take(limit)
                .map(|(e, score)| QueryHit {
                    id: e.id.clone(),
                    score,
                    document: e.document.clone(),
                    metadata: e.metadata.clone(),
                })
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Metadata;

    fn entry(id: &str, v: Vec<f32>) -> StoredEntry {
        StoredEntry {
            id: id.to_string(),
            vector: v,
            document: format!("doc-{id}"),
            metadata: Metadata::new(),
        }
    }

    #[test]
    fn cosine_handles_degenerate_input() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn query_returns_nearest_first_and_caps_at_limit() {
        let c = MemoryCollection::new("t");
        c.upsert(vec![
            entry("far", vec![0.0, 1.0]),
            entry("near", vec![1.0, 0.0]),
            entry("mid", vec![1.0, 1.0]),
        ])
        .await
        .unwrap();

        let hits = c.query(&[1.0, 0.0], 2).await.unwrap();
        let ids: Vec<_> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid"]);

        let all = c.query(&[1.0, 0.0], 10).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn upsert_replaces_by_id() {
        let c = MemoryCollection::new("t");
        c.upsert(vec![entry("a", vec![1.0])]).await.unwrap();
        c.upsert(vec![entry("a", vec![2.0])]).await.unwrap();
        assert_eq!(c.len().await, 1);
        assert_eq!(c.write_count().await, 2);
        assert_eq!(c.get("a").await.unwrap().vector, vec![2.0]);
    }

    #[tokio::test]
    async fn absent_collection_is_created_by_ensure() {
        let c = MemoryCollection::absent("t");
        assert!(!c.exists().await.unwrap());

        c.ensure(3).await.unwrap();
        assert!(c.exists().await.unwrap());
        assert_eq!(c.dim().await, Some(3));

        c.ensure(7).await.unwrap();
        assert_eq!(c.dim().await, Some(3));
    }

    #[tokio::test]
    async fn existing_ids_is_a_subset_of_the_request() {
        let c = MemoryCollection::new("t");
        c.upsert(vec![entry("a", vec![1.0]), entry("b", vec![1.0])])
            .await
            .unwrap();
        let asked = vec!["b".to_string(), "z".to_string()];
        let found = c.existing_ids(&asked).await.unwrap();
        assert_eq!(found, HashSet::from(["b".to_string()]));
    }
}
