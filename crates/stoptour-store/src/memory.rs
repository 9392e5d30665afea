//! In-process document store, used by tests and offline tooling.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{merge_shallow, Document, DocumentStore};
use crate::StoreError;

type Key = (String, String);

#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<Key, Document>>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection`.
    pub async fn count(&self, collection: &str) -> usize {
        self.documents
            .read()
            .await
            .keys()
            .filter(|(c, _)| c == collection)
            .count()
    }
}

fn key(collection: &str, id: &str) -> Key {
    (collection.to_string(), id.to_string())
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Document, StoreError> {
        self.documents
            .read()
            .await
            .get(&key(collection, id))
            .cloned()
            .ok_or_else(|| StoreError::not_found(collection, id))
    }

    async fn set(&self, collection: &str, id: &str, document: Document) -> Result<(), StoreError> {
        self.documents
            .write()
            .await
            .insert(key(collection, id), document);
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        partial: Document,
    ) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        let existing = documents
            .get_mut(&key(collection, id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        merge_shallow(existing, partial);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.documents.write().await.remove(&key(collection, id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::document::into_document;

    fn doc(value: serde_json::Value) -> Document {
        into_document(value).unwrap()
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = MemoryDocumentStore::new();
        let err = store.get("stopPages", "nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { ref id, .. } if id == "nope"));
    }

    #[tokio::test]
    async fn set_overwrites_last_write_wins() {
        let store = MemoryDocumentStore::new();
        store
            .set("stopPages", "a", doc(json!({ "title": "one", "x": 1 })))
            .await
            .unwrap();
        store
            .set("stopPages", "a", doc(json!({ "title": "two" })))
            .await
            .unwrap();
        let stored = store.get("stopPages", "a").await.unwrap();
        assert_eq!(stored, doc(json!({ "title": "two" })));
    }

    #[tokio::test]
    async fn update_merges_into_existing_document() {
        let store = MemoryDocumentStore::new();
        store
            .set("stopPages", "a", doc(json!({ "title": "one", "x": 1 })))
            .await
            .unwrap();
        store
            .update("stopPages", "a", doc(json!({ "title": "renamed" })))
            .await
            .unwrap();
        let stored = store.get("stopPages", "a").await.unwrap();
        assert_eq!(stored, doc(json!({ "title": "renamed", "x": 1 })));
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let store = MemoryDocumentStore::new();
        let result = store
            .update("stopPages", "ghost", doc(json!({ "title": "x" })))
            .await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert_eq!(store.count("stopPages").await, 0);
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_scoped_to_collection() {
        let store = MemoryDocumentStore::new();
        store.set("stopPages", "a", doc(json!({}))).await.unwrap();
        store.set("tours", "a", doc(json!({}))).await.unwrap();

        store.delete("stopPages", "a").await.unwrap();
        store.delete("stopPages", "a").await.unwrap();

        assert_eq!(store.count("stopPages").await, 0);
        assert_eq!(store.count("tours").await, 1);
    }
}
