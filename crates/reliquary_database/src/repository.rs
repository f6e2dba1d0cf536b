//! Repository trait for asset metadata.

use reliquary_core::{AssetId, AssetRecord};
use reliquary_error::ReliquaryResult;

/// Persistence operations for [`AssetRecord`]s.
///
/// Implementations are the source of truth for whether an asset exists.
#[async_trait::async_trait]
pub trait AssetRepository: Send + Sync {
    /// Persist a new record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryErrorKind::DuplicateId` if a record with the same id
    /// already exists, or a connection/query error.
    async fn create(&self, record: &AssetRecord) -> ReliquaryResult<AssetRecord>;

    /// Load a record, `None` if absent.
    async fn find_by_id(&self, id: AssetId) -> ReliquaryResult<Option<AssetRecord>>;

    /// Remove a record. Absent ids are not an error.
    async fn delete_by_id(&self, id: AssetId) -> ReliquaryResult<()>;
}
