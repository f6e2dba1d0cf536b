//! Tests for the in-memory storage backend.

use reliquary_storage::{AssetStorage, BlobMetadata, InMemoryStorage};

#[tokio::test]
async fn test_round_trip_and_delete() {
    let storage = InMemoryStorage::new();
    let metadata = BlobMetadata {
        display_name: "doc.pdf".to_string(),
        mime_type: "application/pdf".to_string(),
    };

    let blob = storage.save(b"%PDF-1.4", &metadata).await.unwrap();
    assert!(storage.contains(&blob.storage_path).await);

    let stored = storage.get(&blob.storage_path).await.unwrap();
    assert_eq!(stored.mime_type, "application/pdf");

    storage.delete(&blob.storage_path).await.unwrap();
    storage.delete(&blob.storage_path).await.unwrap();
    assert!(storage.is_empty().await);
    assert!(storage.get(&blob.storage_path).await.unwrap_err().is_storage_not_found());
}
