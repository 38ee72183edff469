//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! This facade concentrates all Qdrant interactions behind the
//! [`VectorCollection`] trait, hiding away the verbose builder pattern and
//! keeping the rest of the application decoupled from `qdrant-client`.
//!
//! Point layout:
//! - point id  = UUIDv5 of `<collection>/<logical id>`
//! - payload   = `{ eid, document, metadata: { .. } }`

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::BoxFuture;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, GetPointsBuilder, PointId, PointStruct,
    SearchParamsBuilder, SearchPointsBuilder, Struct, UpsertPointsBuilder, Value as QValue,
    VectorParamsBuilder, point_id::PointIdOptions, value,
};
use qdrant_client::{Payload, Qdrant};
use tracing::{debug, info, warn};

use crate::collection::VectorCollection;
use crate::config::{DistanceKind, RagConfig};
use crate::errors::RagError;
use crate::ids::stable_uuid;
use crate::record::{Metadata, QueryHit, StoredEntry};

const EID: &str = "eid";
const DOCUMENT: &str = "document";
const METADATA: &str = "metadata";

/// Shared Qdrant client plus the knobs every collection handle needs.
#[derive(Clone)]
pub struct QdrantFacade {
    client: Arc<Qdrant>,
    distance: DistanceKind,
    exact: bool,
}

impl QdrantFacade {
    /// Creates a new facade from the given configuration.
    ///
    /// Supports optional API key authentication.
    pub fn new(cfg: &RagConfig) -> Result<Self, RagError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        info!(url = %cfg.qdrant_url, "Qdrant client initialized");
        Ok(Self {
            client: Arc::new(client),
            distance: cfg.distance,
            exact: cfg.exact_search,
        })
    }

    /// Returns a handle to `name`; the collection itself may not exist yet.
    pub fn collection(&self, name: &str) -> QdrantCollection {
        QdrantCollection {
            facade: self.clone(),
            name: name.to_string(),
        }
    }

    async fn exists(&self, name: &str) -> Result<bool, RagError> {
        self.client
            .collection_exists(name)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))
    }

}

/// One named Qdrant collection.
pub struct QdrantCollection {
    facade: QdrantFacade,
    name: String,
}

impl QdrantCollection {
    /// Ensures that the collection exists, creating it with `size`-dimensional vectors.
    async fn ensure_collection(&self, size: usize) -> Result<(), RagError> {
        if self.facade.exists(&self.name).await? {
            return Ok(());
        }

        let distance = match self.facade.distance {
            DistanceKind::Cosine => Distance::Cosine,
            DistanceKind::Dot => Distance::Dot,
            DistanceKind::Euclid => Distance::Euclid,
        };

        info!(
            collection = %self.name,
            size,
            distance = ?self.facade.distance,
            "creating collection"
        );
        self.facade
            .client
            .create_collection(
                CreateCollectionBuilder::new(&self.name)
                    .vectors_config(VectorParamsBuilder::new(size as u64, distance)),
            )
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;
        Ok(())
    }

    fn point_id(&self, id: &str) -> PointId {
        stable_uuid(&self.name, id).to_string().into()
    }
}

impl VectorCollection for QdrantCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn exists<'a>(&'a self) -> BoxFuture<'a, Result<bool, RagError>> {
        Box::pin(self.facade.exists(&self.name))
    }

    fn ensure<'a>(&'a self, dim: usize) -> BoxFuture<'a, Result<(), RagError>> {
        Box::pin(self.ensure_collection(dim))
    }

    fn existing_ids<'a>(
        &'a self,
        ids: &'a [String],
    ) -> BoxFuture<'a, Result<HashSet<String>, RagError>> {
        Box::pin(async move {
            if ids.is_empty() || !self.facade.exists(&self.name).await? {
                return Ok(HashSet::new());
            }

            let by_uuid: HashMap<String, &String> = ids
                .iter()
                .map(|id| (stable_uuid(&self.name, id).to_string(), id))
                .collect();
            let point_ids: Vec<PointId> = ids.iter().map(|id| self.point_id(id)).collect();

            let res = self
                .facade
                .client
                .get_points(
                    GetPointsBuilder::new(&self.name, point_ids)
                        .with_payload(false)
                        .with_vectors(false),
                )
                .await
                .map_err(|e| RagError::Qdrant(e.to_string()))?;

            let found: HashSet<String> = res
                .result
                .into_iter()
                .filter_map(|p| match p.id.and_then(|id| id.point_id_options) {
                    Some(PointIdOptions::Uuid(u)) => by_uuid.get(&u).map(|s| (*s).clone()),
                    _ => None,
                })
                .collect();

            debug!(
                collection = %self.name,
                asked = ids.len(),
                found = found.len(),
                "existing ids resolved"
            );
            Ok(found)
        })
    }

    fn upsert<'a>(&'a self, entries: Vec<StoredEntry>) -> BoxFuture<'a, Result<usize, RagError>> {
        Box::pin(async move {
            let Some(first) = entries.first() else {
                debug!("No points provided for upsert");
                return Ok(0);
            };
            let size = first.vector.len();
            if let Some(bad) = entries.iter().find(|e| e.vector.len() != size) {
                return Err(RagError::VectorSizeMismatch {
                    got: bad.vector.len(),
                    want: size,
                });
            }
            self.ensure_collection(size).await?;

            let n = entries.len();
            let points: Vec<PointStruct> = entries
                .into_iter()
                .map(|e| {
                    let pid = self.point_id(&e.id);
                    PointStruct::new(pid, e.vector, entry_payload(e.id, e.document, e.metadata))
                })
                .collect();

            info!(collection = %self.name, points = n, "upserting points");
            let res = self
                .facade
                .client
                .upsert_points(UpsertPointsBuilder::new(&self.name, points).wait(true))
                .await
                .map_err(|e| RagError::Qdrant(e.to_string()))?;
            debug!("Upsert operation result={:?}", res.result);

            Ok(n)
        })
    }

    fn query<'a>(
        &'a self,
        vector: &'a [f32],
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<QueryHit>, RagError>> {
        Box::pin(async move {
            if limit == 0 {
                return Ok(Vec::new());
            }
            debug!(collection = %self.name, limit, exact = self.facade.exact, "searching");

            let mut builder =
                SearchPointsBuilder::new(&self.name, vector.to_vec(), limit as u64)
                    .with_payload(true);
            if self.facade.exact {
                builder = builder.params(SearchParamsBuilder::default().exact(true));
            }

            let res = self
                .facade
                .client
                .search_points(builder)
                .await
                .map_err(|e| RagError::Qdrant(e.to_string()))?;

            let mut out = Vec::with_capacity(res.result.len());
            for r in res.result {
                match hit_from_payload(r.score, r.payload) {
                    Some(hit) => out.push(hit),
                    None => warn!(collection = %self.name, "point without `eid` payload skipped"),
                }
            }

            debug!(collection = %self.name, hits = out.len(), "search completed");
            Ok(out)
        })
    }
}

/// Wraps a string into Qdrant `Value`.
fn qstring(s: impl Into<String>) -> QValue {
    QValue {
        kind: Some(value::Kind::StringValue(s.into())),
    }
}

fn entry_payload(id: String, document: String, metadata: Metadata) -> Payload {
    let fields = metadata
        .into_iter()
        .map(|(k, v)| (k, qstring(v)))
        .collect();

    let mut payload: HashMap<String, QValue> = HashMap::new();
    payload.insert(EID.into(), qstring(id));
    payload.insert(DOCUMENT.into(), qstring(document));
    payload.insert(
        METADATA.into(),
        QValue {
            kind: Some(value::Kind::StructValue(Struct { fields })),
        },
    );
    Payload::from(payload)
}

fn as_str(v: &QValue) -> Option<&str> {
    match &v.kind {
        Some(value::Kind::StringValue(s)) => Some(s),
        _ => None,
    }
}

/// Rebuilds a hit from a search payload. Non-string metadata values are dropped.
fn hit_from_payload(score: f32, mut payload: HashMap<String, QValue>) -> Option<QueryHit> {
    let id = payload.get(EID).and_then(as_str)?.to_string();
    let document = payload
        .get(DOCUMENT)
        .and_then(as_str)
        .unwrap_or_default()
        .to_string();
    let metadata = match payload.remove(METADATA).and_then(|v| v.kind) {
        Some(value::Kind::StructValue(s)) => s
            .fields
            .iter()
            .filter_map(|(k, v)| as_str(v).map(|s| (k.clone(), s.to_string())))
            .collect(),
        _ => Metadata::new(),
    };

    Some(QueryHit {
        id,
        score,
        document,
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_survives_the_hit_mapping() {
        let mut meta = Metadata::new();
        meta.insert("customer_input".into(), "How do I roam?".into());
        meta.insert("type".into(), "roaming".into());

        let payload = entry_payload("faq_7".into(), "Enable roaming in the app.".into(), meta.clone());
        let map: HashMap<String, QValue> = payload.into();
        let hit = hit_from_payload(0.9, map).unwrap();

        assert_eq!(hit.id, "faq_7");
        assert_eq!(hit.document, "Enable roaming in the app.");
        assert_eq!(hit.metadata, meta);
    }

    #[test]
    fn payload_without_eid_is_rejected() {
        let mut map = HashMap::new();
        map.insert(DOCUMENT.to_string(), qstring("orphan"));
        assert!(hit_from_payload(0.1, map).is_none());
    }
}
