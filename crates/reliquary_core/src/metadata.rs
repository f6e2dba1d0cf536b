//! Metadata projections handed to callers.

use crate::{AssetId, AssetRecord, Visibility};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything a caller with read rights may see.
///
/// The storage locator stays internal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullMetadata {
    /// Asset identifier
    pub id: AssetId,
    /// Sanitized display name
    pub display_name: String,
    /// Detected MIME type
    pub mime_type: String,
    /// Payload length in bytes
    pub size: i64,
    /// Direct URL, if any
    pub public_url: Option<String>,
    /// Owning identity
    pub owner_id: Option<String>,
    /// Access policy
    pub visibility: Visibility,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

/// Projection shown to requesters without rights on a private asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactedMetadata {
    /// Asset identifier
    pub id: AssetId,
    /// Sanitized display name
    pub display_name: String,
    /// Detected MIME type
    pub mime_type: String,
    /// Payload length in bytes
    pub size: i64,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Result of a metadata read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::From)]
#[serde(untagged)]
pub enum AssetMetadata {
    /// Requester may see everything
    Full(FullMetadata),
    /// Requester lacks rights on a private asset
    Redacted(RedactedMetadata),
}

impl AssetMetadata {
    /// Whether this is the reduced projection.
    pub fn is_redacted(&self) -> bool {
        matches!(self, AssetMetadata::Redacted(_))
    }
}

impl From<&AssetRecord> for FullMetadata {
    fn from(record: &AssetRecord) -> Self {
        Self {
            id: record.id,
            display_name: record.display_name.clone(),
            mime_type: record.mime_type.clone(),
            size: record.size,
            public_url: record.public_url.clone(),
            owner_id: record.owner_id.clone(),
            visibility: record.visibility,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<&AssetRecord> for RedactedMetadata {
    fn from(record: &AssetRecord) -> Self {
        Self {
            id: record.id,
            display_name: record.display_name.clone(),
            mime_type: record.mime_type.clone(),
            size: record.size,
            created_at: record.created_at,
        }
    }
}
