//! Integration tests for the file-backed token store.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use portal_application::ports::{StorageError, TokenStorage};
use portal_infrastructure::FileTokenStore;

#[tokio::test]
async fn test_missing_file_reads_as_empty() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let store = FileTokenStore::new(temp_dir.path().join("tokens.json"));

    assert_eq!(store.get("admin_token").await.unwrap(), None);
    store.remove("admin_token").await.unwrap();
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_set_creates_parent_dirs_and_persists() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let path = temp_dir.path().join("nested").join("portal").join("tokens.json");

    let store = FileTokenStore::new(&path);
    store.set("admin_token", "abc").await.unwrap();
    store.set("auth_token", "visitor").await.unwrap();

    let reopened = FileTokenStore::new(&path);
    assert_eq!(reopened.get("admin_token").await.unwrap().as_deref(), Some("abc"));
    assert_eq!(reopened.get("auth_token").await.unwrap().as_deref(), Some("visitor"));

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "{\n  \"admin_token\": \"abc\",\n  \"auth_token\": \"visitor\"\n}\n"
    );
}

#[tokio::test]
async fn test_remove_keeps_other_keys() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let store = FileTokenStore::new(temp_dir.path().join("tokens.json"));
    store.set("admin_token", "abc").await.unwrap();
    store.set("auth_token", "visitor").await.unwrap();

    store.remove("admin_token").await.unwrap();

    assert_eq!(store.get("admin_token").await.unwrap(), None);
    assert_eq!(store.get("auth_token").await.unwrap().as_deref(), Some("visitor"));
}

#[tokio::test]
async fn test_corrupt_file_is_a_serialization_error() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let path = temp_dir.path().join("tokens.json");
    std::fs::write(&path, "not json").unwrap();

    let store = FileTokenStore::new(&path);
    assert!(matches!(
        store.get("admin_token").await,
        Err(StorageError::Serialization(_))
    ));
}
