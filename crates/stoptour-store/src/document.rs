//! The document store seam: JSON objects addressed by `(collection, id)`.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::StoreError;

/// A stored document. Always a JSON object at the top level.
pub type Document = Map<String, Value>;

/// Persistence contract for whole-document reads and writes.
///
/// Writes are last-write-wins; there is no versioning or conflict detection.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if nothing is stored under `id`.
    async fn get(&self, collection: &str, id: &str) -> Result<Document, StoreError>;

    /// Create or overwrite the document under `id`.
    async fn set(&self, collection: &str, id: &str, document: Document) -> Result<(), StoreError>;

    /// Merge `partial`'s top-level keys into an existing document.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if nothing is stored under `id`.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        partial: Document,
    ) -> Result<(), StoreError>;

    /// Remove the document. Deleting a missing document succeeds.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}

/// Unwrap a JSON value that must be an object.
///
/// # Errors
///
/// [`StoreError::InvalidDocument`] for arrays, scalars and `null`.
pub fn into_document(value: Value) -> Result<Document, StoreError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidDocument(format!(
            "expected a JSON object, got {}",
            json_type_name(&other)
        ))),
    }
}

/// Replace `target`'s top-level keys with those in `partial`. Nested objects
/// are replaced whole, not merged.
pub fn merge_shallow(target: &mut Document, partial: Document) {
    for (key, value) in partial {
        target.insert(key, value);
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
