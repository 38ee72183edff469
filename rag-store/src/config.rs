//! Runtime and collection configuration.

use crate::errors::RagError;

/// Collection holding FAQ question/answer pairs.
pub const FAQ_COLLECTION: &str = "faq_embeddings";
/// Collection holding customer-side dialogue turns.
pub const DIALOGUE_COLLECTION: &str = "dialogue_embeddings";

/// Distance function used for the vector space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceKind {
    /// Cosine distance (recommended for most embeddings).
    Cosine,
    /// Dot product (useful for normalized vectors).
    Dot,
    /// Euclidean distance (L2).
    Euclid,
}

impl DistanceKind {
    /// Parse from env string (case-insensitive). Defaults to Cosine.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "dot" | "dotproduct" => DistanceKind::Dot,
            "euclid" | "l2" => DistanceKind::Euclid,
            _ => DistanceKind::Cosine,
        }
    }
}

/// Configuration for ingestion and retrieval.
#[derive(Clone, Debug)]
pub struct RagConfig {
    /// Qdrant gRPC endpoint, e.g. `http://localhost:6334`.
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// FAQ collection name.
    pub faq_collection: String,
    /// Dialogue collection name.
    pub dialogue_collection: String,
    /// Distance function used when the loader creates a collection.
    pub distance: DistanceKind,
    /// Upsert batch size.
    pub upsert_batch: usize,
    /// Exact search flag (false = HNSW ANN).
    pub exact_search: bool,
    /// Expected embedding dimension; `None` trusts the first vector produced.
    pub embedding_dim: Option<usize>,
    /// Maximum number of in-flight embedding requests during ingestion.
    pub embedding_concurrency: usize,
}

impl RagConfig {
    /// Creates a default config for the given Qdrant endpoint.
    pub fn new_default(url: impl Into<String>) -> Self {
        Self {
            qdrant_url: url.into(),
            qdrant_api_key: None,
            faq_collection: FAQ_COLLECTION.to_string(),
            dialogue_collection: DIALOGUE_COLLECTION.to_string(),
            distance: DistanceKind::Cosine,
            upsert_batch: 64,
            exact_search: false,
            embedding_dim: None,
            embedding_concurrency: 4,
        }
    }

    /// Builds the config from environment variables with defaults.
    ///
    /// # Errors
    /// Returns `RagError::Config` when a numeric variable does not parse or
    /// the result fails [`RagConfig::validate`].
    pub fn from_env() -> Result<Self, RagError> {
        let mut cfg = Self::new_default(env("QDRANT_URL", "http://localhost:6334"));
        cfg.qdrant_api_key = std::env::var("QDRANT_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        cfg.faq_collection = env("FAQ_COLLECTION", FAQ_COLLECTION);
        cfg.dialogue_collection = env("DIALOGUE_COLLECTION", DIALOGUE_COLLECTION);
        cfg.distance = DistanceKind::parse(&env("QDRANT_DISTANCE", "cosine"));
        cfg.upsert_batch = parse("QDRANT_BATCH_SIZE", cfg.upsert_batch)?;
        cfg.exact_search = env("RAG_EXACT_SEARCH", "false") == "true";
        cfg.embedding_dim = parse_opt("EMBEDDING_DIM")?;
        cfg.embedding_concurrency = parse("EMBEDDING_CONCURRENCY", cfg.embedding_concurrency)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.qdrant_url.trim().is_empty() {
            return Err(RagError::Config("qdrant_url is empty".into()));
        }
        if self.faq_collection.trim().is_empty() || self.dialogue_collection.trim().is_empty() {
            return Err(RagError::Config("collection name is empty".into()));
        }
        if self.faq_collection == self.dialogue_collection {
            return Err(RagError::Config(
                "faq and dialogue collections must differ".into(),
            ));
        }
        if self.upsert_batch == 0 {
            return Err(RagError::Config("upsert_batch must be > 0".into()));
        }
        if self.embedding_dim == Some(0) {
            return Err(RagError::Config("embedding_dim must be > 0".into()));
        }
        Ok(())
    }
}

fn env(k: &str, dflt: &str) -> String {
    match std::env::var(k) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => dflt.to_string(),
    }
}

fn parse_opt<T: std::str::FromStr>(k: &str) -> Result<Option<T>, RagError> {
    match std::env::var(k) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| RagError::Config(format!("{k} is not a valid number: {v}"))),
        _ => Ok(None),
    }
}

fn parse<T: std::str::FromStr>(k: &str, dflt: T) -> Result<T, RagError> {
    Ok(parse_opt(k)?.unwrap_or(dflt))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_fixed_collection_names() {
        let cfg = RagConfig::new_default("http://localhost:6334");
        assert_eq!(cfg.faq_collection, "faq_embeddings");
        assert_eq!(cfg.dialogue_collection, "dialogue_embeddings");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_degenerate_values() {
        let mut cfg = RagConfig::new_default("http://localhost:6334");
        cfg.upsert_batch = 0;
        assert!(matches!(cfg.validate(), Err(RagError::Config(_))));

        let mut cfg = RagConfig::new_default("http://localhost:6334");
        cfg.dialogue_collection = cfg.faq_collection.clone();
        assert!(matches!(cfg.validate(), Err(RagError::Config(_))));
    }

    #[test]
    fn distance_parsing_is_lenient() {
        assert_eq!(DistanceKind::parse("L2"), DistanceKind::Euclid);
        assert_eq!(DistanceKind::parse("dot"), DistanceKind::Dot);
        assert_eq!(DistanceKind::parse("whatever"), DistanceKind::Cosine);
    }
}
