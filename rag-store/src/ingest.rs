//! Corpus loader: read FAQ tables and dialogues → embed → upsert.
//!
//! Idempotent by id: every batch first asks the collection which ids already
//! exist and only embeds/writes the rest. Nothing is rolled back on failure;
//! entries written before an error stay in the collection.

use std::path::PathBuf;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::collection::VectorCollection;
use crate::config::RagConfig;
use crate::corpus::{self, FaqRecord, FewShot, ShotRole};
use crate::embed::EmbeddingsProvider;
use crate::embed_pool::embed_all;
use crate::errors::RagError;
use crate::record::{Metadata, StoredEntry};

/// Default FAQ tables, merged in this order.
pub const DEFAULT_FAQ_SOURCES: [&str; 2] = ["faq_data_transformed.csv", "telecom_faq_dataset.csv"];
pub const DEFAULT_DIALOGUE_SOURCE: &str = "dialogue_data.json";

/// Embedded to learn the vector size when the corpus is empty and no
/// dimension is configured.
const SIZING_TEXT: &str = "telecom support";

/// Input files for one loader run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorpusSources {
    pub faq_files: Vec<PathBuf>,
    pub dialogue_file: PathBuf,
}

impl Default for CorpusSources {
    fn default() -> Self {
        Self {
            faq_files: DEFAULT_FAQ_SOURCES.iter().map(PathBuf::from).collect(),
            dialogue_file: PathBuf::from(DEFAULT_DIALOGUE_SOURCE),
        }
    }
}

impl CorpusSources {
    /// Reads `FAQ_SOURCES` (comma separated) and `DIALOGUE_SOURCE`.
    pub fn from_env() -> Self {
        let mut out = Self::default();
        if let Ok(list) = std::env::var("FAQ_SOURCES") {
            let files: Vec<PathBuf> = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .collect();
            if !files.is_empty() {
                out.faq_files = files;
            }
        }
        if let Ok(p) = std::env::var("DIALOGUE_SOURCE") {
            if !p.trim().is_empty() {
                out.dialogue_file = PathBuf::from(p.trim());
            }
        }
        out
    }
}

/// Write statistics for a single collection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollectionReport {
    pub collection: String,
    pub written: usize,
    pub skipped: usize,
}

/// Summary of one loader run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub faq: CollectionReport,
    pub dialogue: CollectionReport,
    /// Assistant-side dialogue shots seen but not stored.
    pub assistant_shots: usize,
}

impl IngestReport {
    pub fn total_written(&self) -> usize {
        self.faq.written + self.dialogue.written
    }
}

/// A not-yet-embedded entry.
struct Pending {
    id: String,
    text: String,
    document: String,
    metadata: Metadata,
}

/// Populates the FAQ and dialogue collections.
pub struct CorpusLoader {
    embedder: Arc<dyn EmbeddingsProvider>,
    faqs: Arc<dyn VectorCollection>,
    dialogues: Arc<dyn VectorCollection>,
    batch: usize,
    concurrency: usize,
    expected_dim: Option<usize>,
    show_progress: bool,
}

impl CorpusLoader {
    pub fn new(
        embedder: Arc<dyn EmbeddingsProvider>,
        faqs: Arc<dyn VectorCollection>,
        dialogues: Arc<dyn VectorCollection>,
    ) -> Self {
        Self {
            embedder,
            faqs,
            dialogues,
            batch: 64,
            concurrency: 4,
            expected_dim: None,
            show_progress: true,
        }
    }

    /// Applies batch size, concurrency and dimension from `cfg`.
    pub fn with_config(mut self, cfg: &RagConfig) -> Self {
        self.batch = cfg.upsert_batch.max(1);
        self.concurrency = cfg.embedding_concurrency.max(1);
        self.expected_dim = cfg.embedding_dim;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Loads every source and stores what is missing.
    ///
    /// All files are read before anything is written, so a broken source
    /// halts the run without touching the collections.
    ///
    /// # Errors
    /// `RagError::Ingestion` for unreadable sources; embedding and store
    /// errors otherwise.
    pub async fn ingest(&self, sources: &CorpusSources) -> Result<IngestReport, RagError> {
        info!(
            faq_files = sources.faq_files.len(),
            dialogue_file = %sources.dialogue_file.display(),
            "corpus ingestion started"
        );

        let faq_data = corpus::read_faq_sources(&sources.faq_files)?;
        let dialogues = corpus::read_dialogue_file(&sources.dialogue_file)?;
        let shots = corpus::few_shots(&dialogues);

        let sample = faq_data
            .first()
            .map(FaqRecord::embedding_text)
            .or_else(|| shots.first().map(|s| s.content.clone()));
        self.ensure_collections(sample.as_deref().unwrap_or(SIZING_TEXT))
            .await?;

        let faq = self.store_faq_embeddings(&faq_data).await?;
        let dialogue = self.store_dialogue_embeddings(&shots).await?;
        let assistant_shots = shots
            .iter()
            .filter(|s| s.role == ShotRole::Assistant)
            .count();

        let report = IngestReport {
            faq,
            dialogue,
            assistant_shots,
        };
        info!(
            faq_written = report.faq.written,
            faq_skipped = report.faq.skipped,
            dialogue_written = report.dialogue.written,
            dialogue_skipped = report.dialogue.skipped,
            assistant_shots,
            "corpus ingestion finished"
        );
        Ok(report)
    }

    /// Stores FAQ records as `faq_<i>`.
    ///
    /// Embeds `customer_input + " " + bot_reply`; the document is the reply.
    pub async fn store_faq_embeddings(
        &self,
        records: &[FaqRecord],
    ) -> Result<CollectionReport, RagError> {
        let pending = records
            .iter()
            .enumerate()
            .map(|(i, faq)| {
                let mut metadata = Metadata::new();
                metadata.insert("type".into(), faq.kind.clone());
                metadata.insert("customer_input".into(), faq.customer_input.clone());
                metadata.insert("bot_reply".into(), faq.bot_reply.clone());
                Pending {
                    id: format!("faq_{i}"),
                    text: faq.embedding_text(),
                    document: faq.bot_reply.clone(),
                    metadata,
                }
            })
            .collect();

        self.store(self.faqs.as_ref(), pending).await
    }

    /// Stores user-role shots as `dlg_<i>`, `i` being the index in `shots`.
    pub async fn store_dialogue_embeddings(
        &self,
        shots: &[FewShot],
    ) -> Result<CollectionReport, RagError> {
        let pending = shots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.role == ShotRole::User)
            .map(|(i, s)| {
                let mut metadata = Metadata::new();
                metadata.insert("role".into(), s.role.as_str().into());
                Pending {
                    id: format!("dlg_{i}"),
                    text: s.content.clone(),
                    document: s.content.clone(),
                    metadata,
                }
            })
            .collect();

        self.store(self.dialogues.as_ref(), pending).await
    }

    /// Creates whichever collection is missing, so the server can open both
    /// even when a source yields nothing to store.
    async fn ensure_collections(&self, sample: &str) -> Result<(), RagError> {
        let mut dim = self.expected_dim;
        for target in [self.faqs.as_ref(), self.dialogues.as_ref()] {
            if target.exists().await? {
                continue;
            }
            let size = match dim {
                Some(d) => d,
                None => {
                    let len = self.embedder.embed(sample).await?.len();
                    if len == 0 {
                        return Err(RagError::Embedding("empty embedding vector".into()));
                    }
                    *dim.insert(len)
                }
            };
            target.ensure(size).await?;
        }
        Ok(())
    }

    async fn store(
        &self,
        target: &dyn VectorCollection,
        pending: Vec<Pending>,
    ) -> Result<CollectionReport, RagError> {
        let mut report = CollectionReport {
            collection: target.name().to_string(),
            ..Default::default()
        };
        if pending.is_empty() {
            debug!(collection = %report.collection, "nothing to store");
            return Ok(report);
        }

        let pb = self.progress_bar(pending.len() as u64, target.name());
        let mut expected_dim = self.expected_dim;

        let mut rest = pending;
        while !rest.is_empty() {
            let tail = rest.split_off(rest.len().min(self.batch));
            let chunk = std::mem::replace(&mut rest, tail);

            let ids: Vec<String> = chunk.iter().map(|p| p.id.clone()).collect();
            let existing = target.existing_ids(&ids).await?;
            let (skip, todo): (Vec<Pending>, Vec<Pending>) =
                chunk.into_iter().partition(|p| existing.contains(&p.id));
            report.skipped += skip.len();
            pb.inc(skip.len() as u64);
            if todo.is_empty() {
                continue;
            }

            let texts: Vec<String> = todo.iter().map(|p| p.text.clone()).collect();
            let vectors =
                embed_all(&texts, self.embedder.as_ref(), expected_dim, self.concurrency, &pb)
                    .await?;
            // Later batches must match the first one written.
            expected_dim = expected_dim.or_else(|| vectors.first().map(Vec::len));

            let entries: Vec<StoredEntry> = todo
                .into_iter()
                .zip(vectors)
                .map(|(p, vector)| StoredEntry {
                    id: p.id,
                    vector,
                    document: p.document,
                    metadata: p.metadata,
                })
                .collect();
            report.written += target.upsert(entries).await?;
        }

        pb.finish_and_clear();
        info!(
            collection = %report.collection,
            written = report.written,
            skipped = report.skipped,
            "collection stored"
        );
        Ok(report)
    }

    fn progress_bar(&self, len: u64, name: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len);
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {msg} [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
        )
        .map(|s| s.progress_chars("##-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb.set_message(name.to_string());
        pb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCollection;
    use futures::future::BoxFuture;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic 3-d embedding; counts calls.
    #[derive(Default)]
    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    impl EmbeddingsProvider for CountingEmbedder {
        fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                let n = text.len() as f32;
                Ok(vec![1.0, n, text.matches(' ').count() as f32])
            })
        }
    }

    struct Fixture {
        embedder: Arc<CountingEmbedder>,
        faqs: Arc<MemoryCollection>,
        dialogues: Arc<MemoryCollection>,
        _dir: tempfile::TempDir,
        sources: CorpusSources,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let faq_a = dir.path().join("a.csv");
            let faq_b = dir.path().join("b.csv");
            let dlg = dir.path().join("d.json");

            std::fs::File::create(&faq_a)
                .unwrap()
                .write_all(
                    b"type,customer_input,bot_reply\nbilling,Why is my bill high?,Check roaming charges.\n",
                )
                .unwrap();
            std::fs::File::create(&faq_b)
                .unwrap()
                .write_all(b"type,customer_input,bot_reply\nsim,How to activate SIM?,Insert it and reboot.\n")
                .unwrap();
            std::fs::File::create(&dlg)
                .unwrap()
                .write_all(
                    br#"[
                        {"turns": [{"speaker": "customer", "text": "no signal"},
                                   {"speaker": "agent", "text": "restart"}]},
                        {"turns": [{"speaker": "agent", "text": "hello"},
                                   {"speaker": "Customer", "text": "internet slow"}]}
                    ]"#,
                )
                .unwrap();

            Self {
                embedder: Arc::new(CountingEmbedder::default()),
                faqs: Arc::new(MemoryCollection::new("faq_embeddings")),
                dialogues: Arc::new(MemoryCollection::new("dialogue_embeddings")),
                sources: CorpusSources {
                    faq_files: vec![faq_a, faq_b],
                    dialogue_file: dlg,
                },
                _dir: dir,
            }
        }

        fn loader(&self) -> CorpusLoader {
            CorpusLoader::new(
                self.embedder.clone(),
                self.faqs.clone(),
                self.dialogues.clone(),
            )
            .with_progress(false)
        }
    }

    #[tokio::test]
    async fn faq_entries_carry_reply_and_metadata() {
        let fx = Fixture::new();
        fx.loader().ingest(&fx.sources).await.unwrap();

        let e = fx.faqs.get("faq_1").await.unwrap();
        assert_eq!(e.document, "Insert it and reboot.");
        assert_eq!(e.metadata["type"], "sim");
        assert_eq!(e.metadata["customer_input"], "How to activate SIM?");
        assert_eq!(e.metadata["bot_reply"], "Insert it and reboot.");
        let combined = "How to activate SIM? Insert it and reboot.";
        assert_eq!(e.vector[1], combined.len() as f32);
    }

    #[tokio::test]
    async fn only_user_shots_are_stored_under_global_index() {
        let fx = Fixture::new();
        let report = fx.loader().ingest(&fx.sources).await.unwrap();

        let ids: Vec<String> = fx.dialogues.entries().await.into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["dlg_0", "dlg_3"]);
        let e = fx.dialogues.get("dlg_3").await.unwrap();
        assert_eq!(e.document, "internet slow");
        assert_eq!(e.metadata["role"], "user");
        assert_eq!(report.assistant_shots, 2);
    }

    #[tokio::test]
    async fn second_run_writes_nothing() {
        let fx = Fixture::new();
        let first = fx.loader().ingest(&fx.sources).await.unwrap();
        assert_eq!(first.faq.written, 2);
        assert_eq!(first.dialogue.written, 2);
        let writes = fx.faqs.write_count().await + fx.dialogues.write_count().await;
        let calls = fx.embedder.calls.load(Ordering::SeqCst);
        let before_faqs = fx.faqs.entries().await;

        let second = fx.loader().ingest(&fx.sources).await.unwrap();
        assert_eq!(second.total_written(), 0);
        assert_eq!(second.faq.skipped, 2);
        assert_eq!(second.dialogue.skipped, 2);
        assert_eq!(
            fx.faqs.write_count().await + fx.dialogues.write_count().await,
            writes
        );
        assert_eq!(fx.embedder.calls.load(Ordering::SeqCst), calls);
        assert_eq!(fx.faqs.entries().await, before_faqs);
    }

    #[tokio::test]
    async fn small_batches_cover_every_record() {
        let fx = Fixture::new();
        let mut cfg = RagConfig::new_default("http://localhost:6334");
        cfg.upsert_batch = 1;
        let report = fx
            .loader()
            .with_config(&cfg)
            .ingest(&fx.sources)
            .await
            .unwrap();
        assert_eq!(report.faq.written, 2);
        assert_eq!(fx.faqs.len().await, 2);
    }

    fn empty_sources(dir: &std::path::Path) -> CorpusSources {
        let faq = dir.join("empty.csv");
        let dlg = dir.join("agent_only.json");
        std::fs::write(&faq, "type,customer_input,bot_reply\n").unwrap();
        std::fs::write(&dlg, r#"[{"turns": [{"speaker": "agent", "text": "hello"}]}]"#).unwrap();
        CorpusSources {
            faq_files: vec![faq],
            dialogue_file: dlg,
        }
    }

    #[tokio::test]
    async fn empty_corpus_still_creates_both_collections() {
        let dir = tempfile::tempdir().unwrap();
        let sources = empty_sources(dir.path());
        let embedder = Arc::new(CountingEmbedder::default());
        let faqs = Arc::new(MemoryCollection::absent("faq_embeddings"));
        let dialogues = Arc::new(MemoryCollection::absent("dialogue_embeddings"));

        let report = CorpusLoader::new(embedder.clone(), faqs.clone(), dialogues.clone())
            .with_progress(false)
            .ingest(&sources)
            .await
            .unwrap();

        assert_eq!(report.total_written(), 0);
        assert_eq!(report.assistant_shots, 1);
        assert!(faqs.exists().await.unwrap());
        assert!(dialogues.exists().await.unwrap());
        assert_eq!(faqs.dim().await, Some(3));
        assert_eq!(dialogues.dim().await, Some(3));
        // One sizing call shared by both collections.
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn configured_dimension_sizes_new_collections() {
        let dir = tempfile::tempdir().unwrap();
        let sources = empty_sources(dir.path());
        let embedder = Arc::new(CountingEmbedder::default());
        let faqs = Arc::new(MemoryCollection::absent("faq_embeddings"));
        let dialogues = Arc::new(MemoryCollection::new("dialogue_embeddings"));
        let mut cfg = RagConfig::new_default("http://localhost:6334");
        cfg.embedding_dim = Some(5);

        CorpusLoader::new(embedder.clone(), faqs.clone(), dialogues.clone())
            .with_config(&cfg)
            .with_progress(false)
            .ingest(&sources)
            .await
            .unwrap();

        assert_eq!(faqs.dim().await, Some(5));
        assert!(dialogues.exists().await.unwrap());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn broken_source_halts_before_any_write() {
        let fx = Fixture::new();
        let mut sources = fx.sources.clone();
        sources.dialogue_file = PathBuf::from("/missing/dialogue_data.json");

        let err = fx.loader().ingest(&sources).await.unwrap_err();
        assert!(matches!(err, RagError::Ingestion { .. }));
        assert!(fx.faqs.is_empty().await);
    }

    #[test]
    fn default_sources_follow_the_merge_order() {
        let s = CorpusSources::default();
        assert_eq!(
            s.faq_files,
            vec![
                PathBuf::from("faq_data_transformed.csv"),
                PathBuf::from("telecom_faq_dataset.csv")
            ]
        );
        assert_eq!(s.dialogue_file, PathBuf::from("dialogue_data.json"));
    }
}
