//! Postgres-backed document store over the `documents` table.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use crate::document::{into_document, Document, DocumentStore};
use crate::StoreError;

#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Document, StoreError> {
        let body = sqlx::query_scalar::<_, Value>(
            "SELECT body FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match body {
            Some(body) => into_document(body),
            None => Err(StoreError::not_found(collection, id)),
        }
    }

    async fn set(&self, collection: &str, id: &str, document: Document) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO documents (collection, id, body) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (collection, id) DO UPDATE SET \
                 body       = EXCLUDED.body, \
                 updated_at = NOW()",
        )
        .bind(collection)
        .bind(id)
        .bind(Value::Object(document))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        partial: Document,
    ) -> Result<(), StoreError> {
        // `||` on JSONB replaces top-level keys, matching `merge_shallow`.
        let result = sqlx::query(
            "UPDATE documents \
             SET body = body || $3, updated_at = NOW() \
             WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .bind(Value::Object(partial))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(collection, id));
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
