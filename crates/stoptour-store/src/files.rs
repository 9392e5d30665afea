//! File storage collaborator: binary upload in, public URL out.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use stoptour_core::AppConfig;
use uuid::Uuid;

use crate::StoreError;

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Store `bytes` and return the public URL it is served from.
    async fn upload(&self, file_name: &str, bytes: &[u8]) -> Result<String, StoreError>;
}

/// Writes uploads into a local directory served at `base_url`.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(config.media_dir.clone(), config.media_base_url.clone())
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn upload(&self, file_name: &str, bytes: &[u8]) -> Result<String, StoreError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let stored_name = format!("{}-{}", Uuid::new_v4(), sanitize_file_name(file_name));
        tokio::fs::write(self.root.join(&stored_name), bytes).await?;
        tracing::info!(file = %stored_name, bytes = bytes.len(), "file uploaded");
        Ok(format!("{}/{stored_name}", self.base_url))
    }
}

/// Reduce a client-supplied name to a safe single path segment.
///
/// Directory components are dropped and anything outside `[A-Za-z0-9._-]`
/// becomes `-`.
#[must_use]
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_directories_and_odd_characters() {
        assert_eq!(sanitize_file_name("hero.jpg"), "hero.jpg");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\photos\\my pic.png"), "my-pic.png");
        assert_eq!(sanitize_file_name("café.png"), "caf-.png");
        assert_eq!(sanitize_file_name(".."), "upload");
        assert_eq!(sanitize_file_name(""), "upload");
    }

    #[tokio::test]
    async fn upload_writes_file_and_returns_public_url() {
        let root = std::env::temp_dir().join(format!("stoptour-media-{}", Uuid::new_v4()));
        let storage = LocalFileStorage::new(&root, "https://cdn.example.com/media/");

        let url = storage
            .upload("hero image.jpg", b"\xFF\xD8\xFF")
            .await
            .unwrap();

        let name = url
            .strip_prefix("https://cdn.example.com/media/")
            .expect("url under base");
        assert!(name.ends_with("-hero-image.jpg"), "{name}");
        let written = std::fs::read(root.join(name)).unwrap();
        assert_eq!(written, b"\xFF\xD8\xFF");

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn uploads_with_same_name_do_not_collide() {
        let root = std::env::temp_dir().join(format!("stoptour-media-{}", Uuid::new_v4()));
        let storage = LocalFileStorage::new(&root, "http://localhost:3000/media");

        let a = storage.upload("a.mp3", b"one").await.unwrap();
        let b = storage.upload("a.mp3", b"two").await.unwrap();
        assert_ne!(a, b);

        std::fs::remove_dir_all(&root).ok();
    }
}
