// ABOUTME: Integration tests for file-backed token storage
// ABOUTME: Tests persistence, overwrite, removal, and corrupt-slot tolerance of the token record

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use emojipost_auth::oauth::{
    storage::{FileStore, KeyValueStore, TokenStorage, TOKEN_RECORD_KEY},
    types::TokenRecord,
};

/// Helper to create a file store in a fresh temporary directory
fn setup_store() -> (FileStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::new(temp_dir.path().join("emojipost"));
    (store, temp_dir)
}

fn create_test_record(suffix: &str, expires_at: i64) -> TokenRecord {
    TokenRecord {
        access_token: Some(format!("xoxp-{}", suffix)),
        refresh_token: Some(format!("xoxe-{}", suffix)),
        expires_at: Some(expires_at),
    }
}

#[tokio::test]
async fn test_store_and_load_record() {
    let (store, _temp_dir) = setup_store();
    let storage = TokenStorage::new(store);
    let record = create_test_record("1", 1_700_003_600);

    storage.save(&record).await.unwrap();

    assert_eq!(storage.load().await.unwrap(), record);
}

#[tokio::test]
async fn test_record_survives_new_store_instance() {
    let (store, _temp_dir) = setup_store();
    let dir = store.dir().to_path_buf();
    let record = create_test_record("1", 1_700_003_600);

    TokenStorage::new(store).save(&record).await.unwrap();

    // Simulates a reload: a fresh store over the same directory
    let reloaded = TokenStorage::new(FileStore::new(dir));
    assert_eq!(reloaded.load().await.unwrap(), record);
}

#[tokio::test]
async fn test_save_overwrites_in_place() {
    let (store, _temp_dir) = setup_store();
    let storage = TokenStorage::new(store.clone());

    storage
        .save(&create_test_record("1", 1_700_003_600))
        .await
        .unwrap();
    let rotated = create_test_record("2", 1_700_007_200);
    storage.save(&rotated).await.unwrap();

    assert_eq!(storage.load().await.unwrap(), rotated);

    let files: Vec<_> = std::fs::read_dir(store.dir())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(files, vec![format!("{}.json", TOKEN_RECORD_KEY)]);
}

#[tokio::test]
async fn test_load_without_file_is_empty() {
    let (store, _temp_dir) = setup_store();
    let storage = TokenStorage::new(store);

    assert!(storage.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_clear_removes_file_and_is_idempotent() {
    let (store, _temp_dir) = setup_store();
    let storage = TokenStorage::new(store.clone());
    storage
        .save(&create_test_record("1", 1_700_003_600))
        .await
        .unwrap();

    storage.clear().await.unwrap();
    storage.clear().await.unwrap();

    assert_eq!(store.get(TOKEN_RECORD_KEY).await.unwrap(), None);
    assert!(storage.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_corrupt_file_loads_as_empty() {
    let (store, _temp_dir) = setup_store();
    store.set(TOKEN_RECORD_KEY, "{\"accessToken\":").await.unwrap();

    let storage = TokenStorage::new(store);
    assert!(storage.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_partial_record_is_read_back_as_is() {
    let (store, _temp_dir) = setup_store();
    store
        .set(TOKEN_RECORD_KEY, r#"{"refreshToken":"xoxe-1"}"#)
        .await
        .unwrap();

    let record = TokenStorage::new(store).load().await.unwrap();
    assert_eq!(record.refresh_token.as_deref(), Some("xoxe-1"));
    assert!(!record.is_complete());
}
