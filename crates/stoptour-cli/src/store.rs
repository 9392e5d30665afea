//! Commands that talk to the document store or file storage.

use std::path::Path;

use stoptour_core::{load_page, save_page, AppConfig};
use stoptour_store::{
    connect_pool, run_migrations, FileStorage, LocalFileStorage, PgDocumentStore, PoolConfig,
    StopPageRepository, StoreError,
};

async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let database_url = config.require_database_url()?;
    let pool = connect_pool(database_url, PoolConfig::from_app_config(config)).await?;
    Ok(pool)
}

async fn repository(config: &AppConfig) -> anyhow::Result<StopPageRepository<PgDocumentStore>> {
    let pool = connect(config).await?;
    Ok(StopPageRepository::new(PgDocumentStore::new(pool)))
}

/// Turn a store failure into a user-facing error, listing validation
/// problems and flagging transient failures as safe to retry.
fn report(err: StoreError) -> anyhow::Error {
    if let StoreError::Validation(errors) = &err {
        for error in errors.errors() {
            eprintln!("  {error}");
        }
        return anyhow::anyhow!("page not saved: {} validation error(s)", errors.len());
    }
    if err.is_retryable() {
        return anyhow::anyhow!(
            "{err} (temporary failure; local edits are unchanged, retry later)"
        );
    }
    err.into()
}

pub(crate) async fn run_migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let applied = run_migrations(&pool).await?;
    println!("applied {applied} migration(s)");
    Ok(())
}

pub(crate) async fn run_push(config: &AppConfig, path: &Path) -> anyhow::Result<()> {
    let page = load_page(path)?;
    let repo = repository(config).await?;
    repo.save(&page).await.map_err(report)?;
    println!("pushed page {} ({} blocks)", page.id, page.blocks().len());
    Ok(())
}

pub(crate) async fn run_pull(config: &AppConfig, id: &str, path: &Path) -> anyhow::Result<()> {
    let repo = repository(config).await?;
    let page = repo.load(id).await.map_err(report)?;
    save_page(path, &page)?;
    println!("pulled page {id} into {}", path.display());
    Ok(())
}

pub(crate) async fn run_delete(config: &AppConfig, id: &str) -> anyhow::Result<()> {
    let repo = repository(config).await?;
    repo.delete(id).await.map_err(report)?;
    println!("deleted page {id}");
    Ok(())
}

/// Upload `image` to file storage and point the page's hero image at it.
/// The page file is updated locally; push it to publish the change.
pub(crate) async fn run_upload_hero(
    config: &AppConfig,
    path: &Path,
    image: &Path,
) -> anyhow::Result<()> {
    let mut page = load_page(path)?;
    let file_name = image
        .file_name()
        .and_then(std::ffi::OsStr::to_str)
        .ok_or_else(|| anyhow::anyhow!("{} has no usable file name", image.display()))?;
    let bytes = tokio::fs::read(image).await?;

    let storage = LocalFileStorage::from_app_config(config);
    let url = storage.upload(file_name, &bytes).await.map_err(report)?;

    page.hero_image_url.clone_from(&url);
    save_page(path, &page)?;
    println!("hero image for '{}' is now {url}", page.title);
    Ok(())
}
