//! Core data models used by the library.

use std::collections::BTreeMap;

/// Flat string metadata attached to a stored entry.
pub type Metadata = BTreeMap<String, String>;

/// One entry of a collection: logical id, vector, retrievable document, metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredEntry {
    /// Logical id, unique per collection (`faq_<i>`, `dlg_<i>`).
    pub id: String,
    pub vector: Vec<f32>,
    /// Text returned on retrieval.
    pub document: String,
    pub metadata: Metadata,
}

/// A single nearest-neighbour hit.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryHit {
    pub id: String,
    pub score: f32,
    pub document: String,
    pub metadata: Metadata,
}

/// FAQ pair recovered from the FAQ collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaqExample {
    pub customer_input: String,
    pub answer: String,
}
