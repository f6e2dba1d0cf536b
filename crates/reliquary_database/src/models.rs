//! Diesel models for the assets table.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use reliquary_core::{AssetRecord, Visibility};
use reliquary_error::{RepositoryError, RepositoryErrorKind};
use uuid::Uuid;

/// Database row for the `assets` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::assets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AssetRow {
    pub id: Uuid,
    pub display_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub storage_path: String,
    pub public_url: Option<String>,
    pub owner_id: Option<String>,
    pub visibility: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&AssetRecord> for AssetRow {
    fn from(record: &AssetRecord) -> Self {
        Self {
            id: record.id,
            display_name: record.display_name.clone(),
            mime_type: record.mime_type.clone(),
            size_bytes: record.size,
            storage_path: record.storage_path.clone(),
            public_url: record.public_url.clone(),
            owner_id: record.owner_id.clone(),
            visibility: record.visibility.as_str().to_string(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl TryFrom<AssetRow> for AssetRecord {
    type Error = RepositoryError;

    fn try_from(row: AssetRow) -> Result<Self, Self::Error> {
        let visibility = row.visibility.parse::<Visibility>().map_err(|_| {
            RepositoryError::new(RepositoryErrorKind::Serialization(format!(
                "asset {} has unknown visibility '{}'",
                row.id, row.visibility
            )))
        })?;

        Ok(AssetRecord {
            id: row.id,
            display_name: row.display_name,
            mime_type: row.mime_type,
            size: row.size_bytes,
            storage_path: row.storage_path,
            public_url: row.public_url,
            owner_id: row.owner_id,
            visibility,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
