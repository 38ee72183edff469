//! FAQ/dialogue vector store: corpus ingestion and similarity retrieval.
//!
//! This crate provides a clean API to:
//! - Load FAQ tables and dialogue transcripts into two Qdrant collections
//!   (`faq_embeddings`, `dialogue_embeddings`), idempotently by id
//! - Retrieve the nearest FAQ pairs and customer turns for a live query
//!
//! The design is flat (no deep nesting) and splits responsibilities into focused modules.
//! Collaborators sit behind two traits, [`EmbeddingsProvider`] and
//! [`VectorCollection`], so the pipeline also runs against [`MemoryCollection`].

mod collection;
mod config;
pub mod corpus;
pub mod embed;
mod embed_pool;
mod errors;
mod ids;
mod ingest;
mod memory;
mod qdrant_facade;
mod record;
mod retrieve;

use std::sync::Arc;

pub use collection::VectorCollection;
pub use config::{DIALOGUE_COLLECTION, DistanceKind, FAQ_COLLECTION, RagConfig};
pub use embed::EmbeddingsProvider;
pub use errors::RagError;
pub use ids::stable_uuid;
pub use ingest::{CollectionReport, CorpusLoader, CorpusSources, IngestReport};
pub use memory::{MemoryCollection, cosine_similarity};
pub use qdrant_facade::{QdrantCollection, QdrantFacade};
pub use record::{FaqExample, Metadata, QueryHit, StoredEntry};
pub use retrieve::{DEFAULT_DIALOGUE_LIMIT, DEFAULT_FAQ_LIMIT, Retriever};

use tracing::trace;

/// High-level facade that wires configuration and the Qdrant client.
///
/// This is the single entry point recommended for application code.
pub struct RagStore {
    cfg: RagConfig,
    client: QdrantFacade,
}

impl RagStore {
    /// Constructs a new store from the given configuration.
    ///
    /// # Errors
    /// Returns `RagError::Config` / `RagError::Qdrant` if the client cannot be initialized.
    pub fn new(cfg: RagConfig) -> Result<Self, RagError> {
        trace!(
            faq = %cfg.faq_collection,
            dialogue = %cfg.dialogue_collection,
            "RagStore::new"
        );
        let client = QdrantFacade::new(&cfg)?;
        Ok(Self { cfg, client })
    }

    pub fn config(&self) -> &RagConfig {
        &self.cfg
    }

    /// Builds a retriever over both collections; both must already exist.
    ///
    /// # Errors
    /// `RagError::CollectionMissing` naming the first missing collection.
    pub async fn retriever(
        &self,
        embedder: Arc<dyn EmbeddingsProvider>,
    ) -> Result<Retriever, RagError> {
        let faqs = self.client.collection(&self.cfg.faq_collection);
        let dialogues = self.client.collection(&self.cfg.dialogue_collection);
        Retriever::open(embedder, Arc::new(faqs), Arc::new(dialogues)).await
    }

    /// Builds a loader; it creates both collections if they are missing.
    pub fn loader(&self, embedder: Arc<dyn EmbeddingsProvider>) -> CorpusLoader {
        let faqs = self.client.collection(&self.cfg.faq_collection);
        let dialogues = self.client.collection(&self.cfg.dialogue_collection);
        CorpusLoader::new(embedder, Arc::new(faqs), Arc::new(dialogues)).with_config(&self.cfg)
    }
}
