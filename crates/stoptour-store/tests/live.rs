//! Live integration tests for stoptour-store using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/stoptour-store/`), so `"../../migrations"` resolves to the workspace
//! migration directory. Run with `DATABASE_URL` set and `--ignored`.

use serde_json::json;
use stoptour_core::{BlockKind, BlockPayload, Coordinate, StopPage, TextBlock};
use stoptour_store::{
    into_document, ping, DocumentStore, PgDocumentStore, StopPageRepository, StoreError,
    STOP_PAGES_COLLECTION,
};

fn sample_page() -> StopPage {
    let mut page = StopPage::new("Clock Tower", Coordinate::new(48.85, 2.35), 25.0);
    let text = page.add_block(BlockKind::Text).id().to_string();
    page.update_block(
        &text,
        BlockPayload::Text(TextBlock {
            content: "<p>Rebuilt after 1871.</p>".to_string(),
        }),
    )
    .unwrap();
    page.add_block(BlockKind::HowToGetFrom);
    page
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn ping_succeeds(pool: sqlx::PgPool) {
    ping(&pool).await.unwrap();
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn document_crud(pool: sqlx::PgPool) {
    let store = PgDocumentStore::new(pool);
    let doc = into_document(json!({ "title": "one", "x": 1 })).unwrap();

    assert!(matches!(
        store.get("things", "a").await,
        Err(StoreError::NotFound { .. })
    ));

    store.set("things", "a", doc).await.unwrap();
    let patch = into_document(json!({ "title": "two" })).unwrap();
    store.update("things", "a", patch).await.unwrap();
    let stored = store.get("things", "a").await.unwrap();
    assert_eq!(stored["title"], "two");
    assert_eq!(stored["x"], 1);

    store.delete("things", "a").await.unwrap();
    store.delete("things", "a").await.unwrap();
    assert!(store.get("things", "a").await.is_err());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn update_missing_document_is_not_found(pool: sqlx::PgPool) {
    let store = PgDocumentStore::new(pool);
    let result = store
        .update("things", "ghost", into_document(json!({ "a": 1 })).unwrap())
        .await;
    assert!(matches!(result, Err(StoreError::NotFound { .. })));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn stop_page_round_trips_through_postgres(pool: sqlx::PgPool) {
    let repo = StopPageRepository::new(PgDocumentStore::new(pool.clone()));
    let page = sample_page();
    repo.save(&page).await.unwrap();

    let loaded = repo.load(&page.id).await.unwrap();
    assert_eq!(loaded, page);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = $1")
        .bind(STOP_PAGES_COLLECTION)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn saving_twice_overwrites(pool: sqlx::PgPool) {
    let repo = StopPageRepository::new(PgDocumentStore::new(pool));
    let mut page = sample_page();
    repo.save(&page).await.unwrap();

    page.title = "Clock Tower (restored)".to_string();
    let first = page.blocks().ids()[0].to_string();
    page.remove_block(&first).unwrap();
    repo.save(&page).await.unwrap();

    let loaded = repo.load(&page.id).await.unwrap();
    assert_eq!(loaded.title, "Clock Tower (restored)");
    assert_eq!(loaded.blocks().len(), 1);
}
