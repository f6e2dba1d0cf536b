//! The asset metadata record.

use crate::Visibility;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a stored asset.
pub type AssetId = Uuid;

/// Metadata persisted for every committed asset.
///
/// A record only exists once both the bytes and this row are committed.
/// `id`, `storage_path`, `size` and `mime_type` never change after upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Server-generated identifier
    pub id: AssetId,
    /// Sanitized display name
    pub display_name: String,
    /// MIME type detected from the content
    pub mime_type: String,
    /// Payload length in bytes
    pub size: i64,
    /// Backend-specific locator of the bytes
    pub storage_path: String,
    /// Direct URL, when the storage backend exposes one
    pub public_url: Option<String>,
    /// Opaque caller identity that owns the asset
    pub owner_id: Option<String>,
    /// Access policy
    pub visibility: Visibility,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// When the record was last touched
    pub updated_at: DateTime<Utc>,
}

impl AssetRecord {
    /// Whether `requester` may see the full record and the bytes.
    ///
    /// Public assets are readable by everyone. Private assets only by a
    /// requester whose id equals the stored owner id, where an absent id
    /// matches an absent owner: anonymous uploads stay readable by anonymous
    /// callers.
    ///
    /// # Examples
    ///
    /// ```
    /// use reliquary_core::{AssetRecord, Visibility};
    /// use chrono::Utc;
    /// use uuid::Uuid;
    ///
    /// let record = AssetRecord {
    ///     id: Uuid::new_v4(),
    ///     display_name: "cat.png".to_string(),
    ///     mime_type: "image/png".to_string(),
    ///     size: 3,
    ///     storage_path: "ab/cd/abcd".to_string(),
    ///     public_url: None,
    ///     owner_id: Some("u1".to_string()),
    ///     visibility: Visibility::Private,
    ///     created_at: Utc::now(),
    ///     updated_at: Utc::now(),
    /// };
    ///
    /// assert!(record.is_readable_by(Some("u1")));
    /// assert!(!record.is_readable_by(Some("u2")));
    /// assert!(!record.is_readable_by(None));
    /// ```
    pub fn is_readable_by(&self, requester: Option<&str>) -> bool {
        match self.visibility {
            Visibility::Public => true,
            Visibility::Private => self.owner_id.as_deref() == requester,
        }
    }
}
