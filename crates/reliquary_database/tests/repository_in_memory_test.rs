//! Tests for the in-memory asset repository.

use chrono::Utc;
use reliquary_core::{AssetRecord, Visibility};
use reliquary_database::{AssetRepository, InMemoryAssetRepository};
use reliquary_error::{ReliquaryErrorKind, RepositoryErrorKind};
use uuid::Uuid;

fn sample_record() -> AssetRecord {
    let now = Utc::now();
    AssetRecord {
        id: Uuid::new_v4(),
        display_name: "photo.jpg".to_string(),
        mime_type: "image/jpeg".to_string(),
        size: 1024,
        storage_path: "memory/abc".to_string(),
        public_url: None,
        owner_id: Some("u1".to_string()),
        visibility: Visibility::Private,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn test_create_and_find() {
    let repo = InMemoryAssetRepository::new();
    let record = sample_record();

    let created = repo.create(&record).await.unwrap();
    assert_eq!(created, record);

    let found = repo.find_by_id(record.id).await.unwrap();
    assert_eq!(found, Some(record));
}

#[tokio::test]
async fn test_duplicate_id_is_rejected() {
    let repo = InMemoryAssetRepository::new();
    let record = sample_record();

    repo.create(&record).await.unwrap();
    let err = repo.create(&record).await.unwrap_err();

    match err.kind() {
        ReliquaryErrorKind::Repository(e) => {
            assert!(matches!(e.kind, RepositoryErrorKind::DuplicateId(_)))
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(repo.len().await, 1);
}

#[tokio::test]
async fn test_delete_tolerates_absent_ids() {
    let repo = InMemoryAssetRepository::new();
    let record = sample_record();

    repo.create(&record).await.unwrap();
    repo.delete_by_id(record.id).await.unwrap();
    repo.delete_by_id(record.id).await.unwrap();

    assert!(repo.find_by_id(record.id).await.unwrap().is_none());
    assert!(repo.is_empty().await);
}
