//! Retrieval: embed the live query, then k-NN against each collection.
//!
//! Results keep the store's ranking (nearest first); nothing is re-sorted.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::collection::VectorCollection;
use crate::embed::EmbeddingsProvider;
use crate::errors::RagError;
use crate::record::FaqExample;

pub const DEFAULT_FAQ_LIMIT: usize = 3;
pub const DEFAULT_DIALOGUE_LIMIT: usize = 6;

/// Query-side view over both collections.
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn EmbeddingsProvider>,
    faqs: Arc<dyn VectorCollection>,
    dialogues: Arc<dyn VectorCollection>,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingsProvider>,
        faqs: Arc<dyn VectorCollection>,
        dialogues: Arc<dyn VectorCollection>,
    ) -> Self {
        Self {
            embedder,
            faqs,
            dialogues,
        }
    }

    /// Like [`Retriever::new`], but first checks that both collections exist.
    ///
    /// # Errors
    /// `RagError::CollectionMissing` naming the first missing collection.
    pub async fn open(
        embedder: Arc<dyn EmbeddingsProvider>,
        faqs: Arc<dyn VectorCollection>,
        dialogues: Arc<dyn VectorCollection>,
    ) -> Result<Self, RagError> {
        for c in [&faqs, &dialogues] {
            if !c.exists().await? {
                return Err(RagError::CollectionMissing(c.name().to_string()));
            }
        }
        debug!("both collections present");
        Ok(Self::new(embedder, faqs, dialogues))
    }

    /// Nearest FAQ pairs for `query`.
    ///
    /// The question comes from the `customer_input` metadata field and the
    /// answer from the stored document.
    pub async fn retrieve_faqs(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<FaqExample>, RagError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let vector = self.embedder.embed(query).await?;
        let hits = self.faqs.query(&vector, limit).await?;
        trace!(collection = self.faqs.name(), hits = hits.len(), "faq hits");

        Ok(hits
            .into_iter()
            .map(|h| FaqExample {
                customer_input: h.metadata.get("customer_input").cloned().unwrap_or_default(),
                answer: h.document,
            })
            .collect())
    }

    /// Nearest customer-side dialogue turns for `query`.
    pub async fn retrieve_dialogue_shots(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<String>, RagError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let vector = self.embedder.embed(query).await?;
        let hits = self.dialogues.query(&vector, limit).await?;
        debug!(collection = self.dialogues.name(), hits = hits.len(), "dialogue hits");

        Ok(hits.into_iter().map(|h| h.document).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCollection;
    use crate::record::{Metadata, QueryHit, StoredEntry};
    use futures::future::BoxFuture;
    use std::collections::HashSet;

    struct FixedEmbedder;

    impl EmbeddingsProvider for FixedEmbedder {
        fn embed<'a>(&'a self, _text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>> {
            Box::pin(async { Ok(vec![1.0, 0.0]) })
        }
    }

    /// Returns canned hits in a fixed, deliberately non-score order.
    struct CannedCollection(Vec<QueryHit>);

    impl VectorCollection for CannedCollection {
        fn name(&self) -> &str {
            "canned"
        }

        fn exists<'a>(&'a self) -> BoxFuture<'a, Result<bool, RagError>> {
            Box::pin(async { Ok(true) })
        }

        fn ensure<'a>(&'a self, _dim: usize) -> BoxFuture<'a, Result<(), RagError>> {
            Box::pin(async { Ok(()) })
        }

        fn existing_ids<'a>(
            &'a self,
            _ids: &'a [String],
        ) -> BoxFuture<'a, Result<HashSet<String>, RagError>> {
            Box::pin(async { Ok(HashSet::new()) })
        }

        fn upsert<'a>(&'a self, _e: Vec<StoredEntry>) -> BoxFuture<'a, Result<usize, RagError>> {
            Box::pin(async { Ok(0) })
        }

        fn query<'a>(
            &'a self,
            _vector: &'a [f32],
            limit: usize,
        ) -> BoxFuture<'a, Result<Vec<QueryHit>, RagError>> {
            Box::pin(async move { Ok(self.0.iter().take(limit).cloned().collect()) })
        }
    }

    fn hit(doc: &str, score: f32, question: Option<&str>) -> QueryHit {
        let mut metadata = Metadata::new();
        if let Some(q) = question {
            metadata.insert("customer_input".into(), q.into());
        }
        QueryHit {
            id: doc.into(),
            score,
            document: doc.into(),
            metadata,
        }
    }

    #[tokio::test]
    async fn store_order_is_preserved() {
        let canned = Arc::new(CannedCollection(vec![
            hit("first", 0.2, Some("q1")),
            hit("second", 0.9, Some("q2")),
            hit("third", 0.5, None),
        ]));
        let r = Retriever::new(Arc::new(FixedEmbedder), canned.clone(), canned);

        let faqs = r.retrieve_faqs("anything", 3).await.unwrap();
        let answers: Vec<_> = faqs.iter().map(|f| f.answer.as_str()).collect();
        assert_eq!(answers, vec!["first", "second", "third"]);
        assert_eq!(faqs[0].customer_input, "q1");
        assert_eq!(faqs[2].customer_input, "");

        let shots = r.retrieve_dialogue_shots("anything", 2).await.unwrap();
        assert_eq!(shots, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn sparse_collections_yield_short_or_empty_results() {
        let faqs = Arc::new(MemoryCollection::new("faq_embeddings"));
        let dialogues = Arc::new(MemoryCollection::new("dialogue_embeddings"));
        dialogues
            .upsert(vec![StoredEntry {
                id: "dlg_0".into(),
                vector: vec![1.0, 0.0],
                document: "no signal".into(),
                metadata: Metadata::new(),
            }])
            .await
            .unwrap();
        let r = Retriever::new(Arc::new(FixedEmbedder), faqs, dialogues);

        assert!(r.retrieve_faqs("q", DEFAULT_FAQ_LIMIT).await.unwrap().is_empty());
        assert_eq!(
            r.retrieve_dialogue_shots("q", DEFAULT_DIALOGUE_LIMIT)
                .await
                .unwrap(),
            vec!["no signal"]
        );
        assert!(r.retrieve_dialogue_shots("q", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn open_names_the_missing_collection() {
        let present = || Arc::new(MemoryCollection::new("dialogue_embeddings"));

        let err = Retriever::open(
            Arc::new(FixedEmbedder),
            Arc::new(MemoryCollection::absent("faq_embeddings")),
            present(),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, RagError::CollectionMissing(ref n) if n == "faq_embeddings"));

        let err = Retriever::open(
            Arc::new(FixedEmbedder),
            Arc::new(MemoryCollection::new("faq_embeddings")),
            Arc::new(MemoryCollection::absent("dialogue_embeddings")),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, RagError::CollectionMissing(ref n) if n == "dialogue_embeddings"));

        let ok = Retriever::open(
            Arc::new(FixedEmbedder),
            Arc::new(MemoryCollection::new("faq_embeddings")),
            present(),
        )
        .await;
        assert!(ok.is_ok());
    }
}
