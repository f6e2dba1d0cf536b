//! In-memory implementation of AssetRepository for testing.
//!
//! This module provides a simple HashMap-based repository. Useful for unit
//! tests and for running the service without a database.

use crate::AssetRepository;
use async_trait::async_trait;
use reliquary_core::{AssetId, AssetRecord};
use reliquary_error::{ReliquaryResult, RepositoryError, RepositoryErrorKind};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory repository for asset records.
///
/// Stores records in a HashMap protected by an RwLock for thread-safe access.
/// All data is lost when the repository is dropped.
///
/// # Example
/// ```no_run
/// use reliquary_database::{AssetRepository, InMemoryAssetRepository};
///
/// #[tokio::main]
/// async fn main() {
///     let repo = InMemoryAssetRepository::new();
///     assert!(repo.is_empty().await);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssetRepository {
    records: Arc<RwLock<HashMap<AssetId, AssetRecord>>>,
}

impl InMemoryAssetRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of stored records (for testing).
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Check if the repository is empty (for testing).
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl AssetRepository for InMemoryAssetRepository {
    async fn create(&self, record: &AssetRecord) -> ReliquaryResult<AssetRecord> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(RepositoryError::new(RepositoryErrorKind::DuplicateId(
                record.id.to_string(),
            ))
            .into());
        }

        records.insert(record.id, record.clone());
        Ok(record.clone())
    }

    async fn find_by_id(&self, id: AssetId) -> ReliquaryResult<Option<AssetRecord>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn delete_by_id(&self, id: AssetId) -> ReliquaryResult<()> {
        self.records.write().await.remove(&id);
        Ok(())
    }
}
