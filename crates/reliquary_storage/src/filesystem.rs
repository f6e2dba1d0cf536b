//! Filesystem-based blob storage implementation.
//!
//! Blobs are spread over two levels of subdirectories keyed by content hash,
//! each file named after a fresh UUID so identical uploads never share bytes.

use crate::{AssetStorage, BlobMetadata, StoredBlob, StoredBytes};
use reliquary_error::{ReliquaryResult, StorageError, StorageErrorKind};
use sha2::{Digest, Sha256};
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

/// MIME type recorded when a blob has no sidecar.
const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Filesystem storage backend.
///
/// Stores blobs in the structure:
/// `{base_path}/{hash[0:2]}/{hash[2:4]}/{hash[0:16]}-{uuid}`
///
/// with the MIME type in a `.mime` sidecar next to each blob.
///
/// # Example Structure
///
/// ```text
/// /var/reliquary/blobs/
/// ├── ab/
/// │   └── cd/
/// │       ├── abcdef0123456789-1f0e...      (payload)
/// │       └── abcdef0123456789-1f0e....mime (sidecar)
/// └── 12/
///     └── 34/
///         └── 123456abcdef0123-9a8b...
/// ```
///
/// # Features
///
/// - **Atomic writes**: Uses temp file + rename for atomicity
/// - **Opaque locators**: Storage paths are relative to the base directory
/// - **Traversal-safe**: Locators with `..` or absolute components are refused
pub struct FileSystemStorage {
    base_path: PathBuf,
    public_base_url: Option<String>,
}

impl FileSystemStorage {
    /// Create a new filesystem storage backend.
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or accessed.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> ReliquaryResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Created filesystem storage");
        Ok(Self {
            base_path,
            public_base_url: None,
        })
    }

    /// Serve blobs from `url`, e.g. a static file server mounted on the
    /// base directory. Saved blobs then carry a `public_url`.
    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    /// Compute SHA-256 hash of data.
    fn compute_hash(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        format!("{:x}", hasher.finalize())
    }

    /// Relative locator for a new blob.
    fn new_storage_path(hash: &str) -> String {
        format!(
            "{}/{}/{}-{}",
            &hash[0..2],
            &hash[2..4],
            &hash[0..16],
            Uuid::new_v4().simple()
        )
    }

    /// Resolve a locator inside the base directory.
    fn resolve(&self, storage_path: &str) -> ReliquaryResult<PathBuf> {
        let relative = Path::new(storage_path);
        let is_plain = !storage_path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));

        if !is_plain {
            return Err(StorageError::new(StorageErrorKind::InvalidPath(
                storage_path.to_string(),
            ))
            .into());
        }

        Ok(self.base_path.join(relative))
    }

    fn sidecar_path(path: &Path) -> PathBuf {
        let mut sidecar = path.as_os_str().to_owned();
        sidecar.push(".mime");
        PathBuf::from(sidecar)
    }

    async fn remove_if_present(path: &Path) -> ReliquaryResult<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                "delete {}: {}",
                path.display(),
                e
            )))
            .into()),
        }
    }
}

impl FileSystemStorage {
    /// Write payload then sidecar. On failure nothing written here survives.
    async fn write_blob(path: &Path, data: &[u8], mime_type: &str) -> Result<(), StorageError> {
        let temp_path = path.with_extension("tmp");
        let sidecar = Self::sidecar_path(path);

        let written = async {
            // Write to temp file first, then rename for atomicity
            tokio::fs::write(&temp_path, data).await.map_err(|e| {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "{}: {}",
                    temp_path.display(),
                    e
                )))
            })?;

            tokio::fs::rename(&temp_path, path).await.map_err(|e| {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "rename {} to {}: {}",
                    temp_path.display(),
                    path.display(),
                    e
                )))
            })?;

            tokio::fs::write(&sidecar, mime_type.as_bytes())
                .await
                .map_err(|e| {
                    StorageError::new(StorageErrorKind::FileWrite(format!(
                        "{}: {}",
                        sidecar.display(),
                        e
                    )))
                })
        }
        .await;

        if written.is_err() {
            for leftover in [temp_path.as_path(), path, sidecar.as_path()] {
                if let Err(e) = Self::remove_if_present(leftover).await {
                    tracing::warn!(path = %leftover.display(), error = %e, "Failed to clean up partial write");
                }
            }
        }
        written
    }
}

#[async_trait::async_trait]
impl AssetStorage for FileSystemStorage {
    #[tracing::instrument(skip(self, data, metadata), fields(size = data.len(), mime_type = %metadata.mime_type))]
    async fn save(&self, data: &[u8], metadata: &BlobMetadata) -> ReliquaryResult<StoredBlob> {
        let hash = Self::compute_hash(data);
        let storage_path = Self::new_storage_path(&hash);
        let path = self.resolve(&storage_path)?;

        // Create parent directories
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        Self::write_blob(&path, data, &metadata.mime_type).await?;

        tracing::info!(
            hash = %hash,
            storage_path = %storage_path,
            size = data.len(),
            "Stored blob"
        );

        let public_url = self
            .public_base_url
            .as_ref()
            .map(|base| format!("{}/{}", base, storage_path));

        Ok(StoredBlob {
            storage_path,
            public_url,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn get(&self, storage_path: &str) -> ReliquaryResult<StoredBytes> {
        let path = self.resolve(storage_path)?;

        let buffer = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(storage_path.to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        let mime_type = match tokio::fs::read_to_string(Self::sidecar_path(&path)).await {
            Ok(mime) => mime.trim().to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Missing MIME sidecar, using fallback");
                FALLBACK_MIME_TYPE.to_string()
            }
        };

        tracing::debug!(size = buffer.len(), "Retrieved blob");
        Ok(StoredBytes { buffer, mime_type })
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, storage_path: &str) -> ReliquaryResult<()> {
        let path = self.resolve(storage_path)?;

        Self::remove_if_present(&path).await?;
        Self::remove_if_present(&Self::sidecar_path(&path)).await?;

        tracing::info!("Deleted blob");
        Ok(())
    }
}
