use uuid::Uuid;

/// Deterministic UUIDv5 for a logical entry id within a collection.
///
/// Qdrant only accepts UUIDs or integers as point ids; the logical id is kept
/// in the payload.
pub fn stable_uuid(collection: &str, id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, format!("{collection}/{id}").as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_input_same_uuid() {
        assert_eq!(
            stable_uuid("faq_embeddings", "faq_0"),
            stable_uuid("faq_embeddings", "faq_0")
        );
        assert_ne!(
            stable_uuid("faq_embeddings", "faq_0"),
            stable_uuid("faq_embeddings", "faq_1")
        );
        assert_ne!(
            stable_uuid("faq_embeddings", "faq_0"),
            stable_uuid("dialogue_embeddings", "faq_0")
        );
    }
}
