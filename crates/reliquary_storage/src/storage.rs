//! Storage trait definition.

use reliquary_error::ReliquaryResult;

/// Trait for pluggable blob storage backends.
///
/// Implementations hold the raw bytes only. Asset metadata lives in the
/// repository, and the asset manager keeps the two consistent.
#[async_trait::async_trait]
pub trait AssetStorage: Send + Sync {
    /// Store bytes and return their locator.
    ///
    /// Every call writes a new blob, even for identical content, so deleting
    /// one asset never removes bytes another asset still references.
    ///
    /// # Arguments
    ///
    /// * `data` - The payload to store
    /// * `metadata` - Display name and MIME type recorded alongside the bytes
    async fn save(&self, data: &[u8], metadata: &BlobMetadata) -> ReliquaryResult<StoredBlob>;

    /// Read bytes by locator.
    ///
    /// # Errors
    ///
    /// Returns `StorageErrorKind::NotFound` when nothing is stored at
    /// `storage_path`.
    async fn get(&self, storage_path: &str) -> ReliquaryResult<StoredBytes>;

    /// Delete bytes by locator.
    ///
    /// Idempotent: deleting an absent path succeeds.
    async fn delete(&self, storage_path: &str) -> ReliquaryResult<()>;
}

/// Metadata recorded alongside stored bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobMetadata {
    /// Sanitized display name
    pub display_name: String,
    /// MIME type of the payload
    pub mime_type: String,
}

/// Locator of freshly written bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoredBlob {
    /// Backend-specific path/key to the bytes
    pub storage_path: String,
    /// Direct URL, when the backend serves blobs itself
    pub public_url: Option<String>,
}

/// Bytes read back from a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBytes {
    /// The payload
    pub buffer: Vec<u8>,
    /// MIME type recorded at save time
    pub mime_type: String,
}
