use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use stoptour_core::{AppConfig, ValidationErrors};
use thiserror::Error;

pub mod document;
pub mod files;
pub mod memory;
pub mod postgres;
pub mod stop_pages;

pub use document::{into_document, merge_shallow, Document, DocumentStore};
pub use files::{sanitize_file_name, FileStorage, LocalFileStorage};
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;
pub use stop_pages::{StopPageRepository, STOP_PAGES_COLLECTION};

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

// Path relative to crates/stoptour-store/Cargo.toml; resolves to <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("file storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

impl StoreError {
    pub(crate) fn not_found(collection: &str, id: &str) -> Self {
        StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    /// Whether repeating the same call could succeed. The caller keeps its
    /// in-memory edits and decides whether to retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Sqlx(e) => matches!(
                e,
                sqlx::Error::Io(_)
                    | sqlx::Error::Tls(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
            ),
            StoreError::Io(_) => true,
            StoreError::NotFound { .. }
            | StoreError::Validation(_)
            | StoreError::Migration(_)
            | StoreError::Serialization(_)
            | StoreError::InvalidDocument(_) => false,
        }
    }
}

/// Connect to a Postgres pool using explicit URL and config.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the connection cannot be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Run all pending migrations against the pool.
///
/// Returns the number of migrations that were applied.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, sqlx::migrate::MigrateError> {
    // The _sqlx_migrations table does not exist on a fresh database; count it as zero.
    let applied_before = applied_migrations(pool).await;
    MIGRATOR.run(pool).await?;
    let applied_after = applied_migrations(pool).await;

    let delta = (applied_after - applied_before).max(0);
    Ok(usize::try_from(delta).unwrap_or(0))
}

async fn applied_migrations(pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
        .fetch_one(pool)
        .await
        .unwrap_or(0)
}

/// Send a `SELECT 1` to verify the pool has a live connection.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_config_has_sane_defaults() {
        let config = PoolConfig::default();

        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.min_connections, DEFAULT_MIN_CONNECTIONS);
        assert_eq!(config.acquire_timeout_secs, DEFAULT_ACQUIRE_TIMEOUT_SECS);
    }

    #[test]
    fn only_transport_failures_are_retryable() {
        assert!(StoreError::Sqlx(sqlx::Error::PoolTimedOut).is_retryable());
        assert!(StoreError::Io(std::io::Error::other("disk full")).is_retryable());
        assert!(!StoreError::not_found("stopPages", "x").is_retryable());
        assert!(!StoreError::Sqlx(sqlx::Error::RowNotFound).is_retryable());
        assert!(!StoreError::Validation(ValidationErrors::new()).is_retryable());
        assert!(!StoreError::InvalidDocument("array".to_string()).is_retryable());
    }

    #[test]
    fn not_found_names_collection_and_id() {
        let err = StoreError::not_found("stopPages", "stop-1");
        assert_eq!(err.to_string(), "document stopPages/stop-1 not found");
    }
}
