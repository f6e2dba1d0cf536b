//! In-memory blob storage for tests and development.

use crate::{AssetStorage, BlobMetadata, StoredBlob, StoredBytes};
use reliquary_error::{ReliquaryResult, StorageError, StorageErrorKind};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// HashMap-backed storage. All data is lost when the last clone is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    blobs: Arc<RwLock<HashMap<String, StoredBytes>>>,
}

impl InMemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// Whether nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }

    /// Whether a blob exists at `storage_path`.
    pub async fn contains(&self, storage_path: &str) -> bool {
        self.blobs.read().await.contains_key(storage_path)
    }
}

#[async_trait::async_trait]
impl AssetStorage for InMemoryStorage {
    #[tracing::instrument(skip(self, data, metadata), fields(size = data.len()))]
    async fn save(&self, data: &[u8], metadata: &BlobMetadata) -> ReliquaryResult<StoredBlob> {
        let storage_path = format!("memory/{}", Uuid::new_v4().simple());
        let bytes = StoredBytes {
            buffer: data.to_vec(),
            mime_type: metadata.mime_type.clone(),
        };

        self.blobs.write().await.insert(storage_path.clone(), bytes);
        tracing::debug!(storage_path = %storage_path, "Stored blob in memory");

        Ok(StoredBlob {
            storage_path,
            public_url: None,
        })
    }

    async fn get(&self, storage_path: &str) -> ReliquaryResult<StoredBytes> {
        self.blobs
            .read()
            .await
            .get(storage_path)
            .cloned()
            .ok_or_else(|| {
                StorageError::new(StorageErrorKind::NotFound(storage_path.to_string())).into()
            })
    }

    async fn delete(&self, storage_path: &str) -> ReliquaryResult<()> {
        self.blobs.write().await.remove(storage_path);
        Ok(())
    }
}
