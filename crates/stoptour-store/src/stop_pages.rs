//! Stop pages persisted through any [`DocumentStore`].

use serde_json::Value;
use stoptour_core::{StopPage, EDITABLE_FIELDS};

use crate::document::{into_document, merge_shallow, Document, DocumentStore};
use crate::StoreError;

pub const STOP_PAGES_COLLECTION: &str = "stopPages";

#[derive(Debug)]
pub struct StopPageRepository<S> {
    store: S,
}

impl<S: DocumentStore> StopPageRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the page does not exist,
    /// [`StoreError::Serialization`] if the stored document is malformed, or
    /// [`StoreError::InvalidDocument`] if its `id` disagrees with the key.
    pub async fn load(&self, id: &str) -> Result<StopPage, StoreError> {
        let document = self.store.get(STOP_PAGES_COLLECTION, id).await?;
        let page = StopPage::from_document(Value::Object(document))?;
        if page.id != id {
            return Err(StoreError::InvalidDocument(format!(
                "document stored under '{id}' has id '{}'",
                page.id
            )));
        }
        Ok(page)
    }

    /// Validate and overwrite the stored page. Nothing is written when
    /// validation fails.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] with every page and block error, or any
    /// store failure.
    pub async fn save(&self, page: &StopPage) -> Result<(), StoreError> {
        page.validate_for_save()?;
        let document = into_document(page.to_document()?)?;
        self.store
            .set(STOP_PAGES_COLLECTION, &page.id, document)
            .await?;
        tracing::info!(page_id = %page.id, blocks = page.blocks().len(), "stop page saved");
        Ok(())
    }

    /// Patch page-level fields (title, hero/audio metadata, geofence)
    /// without rewriting the block list.
    ///
    /// The patch is applied to the current page and validated before it is
    /// sent to the store.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidDocument`] for keys outside the editable set
    /// (including `id` and `contentBlocks`), [`StoreError::Validation`] if the
    /// patched page would not pass `validate_for_save`, or any store failure.
    pub async fn update_fields(&self, id: &str, patch: Document) -> Result<StopPage, StoreError> {
        if let Some(key) = patch.keys().find(|k| !is_editable(k)) {
            return Err(StoreError::InvalidDocument(format!(
                "field '{key}' cannot be patched on a stop page"
            )));
        }

        let mut merged = self.store.get(STOP_PAGES_COLLECTION, id).await?;
        merge_shallow(&mut merged, patch.clone());
        let page = StopPage::from_document(Value::Object(merged))?;
        page.validate_for_save()?;

        self.store.update(STOP_PAGES_COLLECTION, id, patch).await?;
        tracing::info!(page_id = %id, "stop page fields updated");
        Ok(page)
    }

    /// # Errors
    ///
    /// Any store failure. Deleting a missing page succeeds.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.store.delete(STOP_PAGES_COLLECTION, id).await?;
        tracing::info!(page_id = %id, "stop page deleted");
        Ok(())
    }
}

fn is_editable(key: &str) -> bool {
    EDITABLE_FIELDS.contains(&key)
}

#[cfg(test)]
#[path = "stop_pages_test.rs"]
mod tests;
