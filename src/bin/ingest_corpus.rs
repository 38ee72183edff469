//! One-shot corpus loader: fills `faq_embeddings` and `dialogue_embeddings`.
//!
//! Reads `FAQ_SOURCES` / `DIALOGUE_SOURCE` (see `CorpusSources::from_env`),
//! embeds with the Ollama embedding profile and upserts into Qdrant. Safe to
//! re-run: ids already stored are skipped.

use std::error::Error;
use std::sync::Arc;

use ai_llm_service::{LlmServiceProfiles, telemetry};
use rag_store::{
    CorpusSources, EmbeddingsProvider, RagConfig, RagStore,
    embed::ollama::{OllamaConfig, OllamaEmbedder},
};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let dotenv = dotenvy::dotenv();
    telemetry::init("info")?;
    if let Err(e) = dotenv {
        warn!(error = %e, "no .env loaded; using process environment");
    }

    let svc = Arc::new(LlmServiceProfiles::from_env()?);
    let cfg = RagConfig::from_env()?;
    let embedder: Arc<dyn EmbeddingsProvider> = Arc::new(OllamaEmbedder::new(OllamaConfig {
        svc,
        dim: cfg.embedding_dim,
    }));

    let store = RagStore::new(cfg)?;
    let sources = CorpusSources::from_env();

    match store.loader(embedder).ingest(&sources).await {
        Ok(report) => {
            info!(
                faq_written = report.faq.written,
                faq_skipped = report.faq.skipped,
                dialogue_written = report.dialogue.written,
                dialogue_skipped = report.dialogue.skipped,
                assistant_shots_not_stored = report.assistant_shots,
                "FAQ and dialogue data embedded and stored"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "corpus ingestion aborted; entries written so far are kept");
            Err(e.into())
        }
    }
}
