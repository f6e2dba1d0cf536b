//! The asset lifecycle manager.
//!
//! [`AssetManager`] is the only component that mutates assets. It validates
//! uploads, keeps bytes and metadata consistent, and enforces ownership and
//! visibility on every read.

use crate::{ReliquaryConfig, UploadConfig};
use chrono::Utc;
use reliquary_cache::{AssetCache, InMemoryAssetCache};
use reliquary_core::{
    AssetFile, AssetId, AssetMetadata, AssetRecord, DeleteOutcome, FileOutcome, FullMetadata,
    RedactedMetadata, UploadRequest, DEFAULT_ALLOWED_MIME_TYPES, essence, is_sniffable,
    sniff_mime_type,
};
use reliquary_database::AssetRepository;
use reliquary_error::{ConfigError, ReliquaryResult, UploadError, UploadErrorKind};
use reliquary_security::{
    NormalizeMode, NormalizeOptions, SignedLink, SignedUrlService, normalize_display_name,
};
use reliquary_storage::{AssetStorage, BlobMetadata, StoredBlob};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Server-side upload limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Accepted MIME types, lowercase essence form
    pub allowed_mime_types: Vec<String>,
    /// Largest accepted payload in bytes
    pub max_size_bytes: usize,
    /// Display name normalization
    pub normalize: NormalizeOptions,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_size_bytes: 10 * 1024 * 1024,
            normalize: NormalizeOptions::default(),
        }
    }
}

impl From<&UploadConfig> for UploadPolicy {
    fn from(config: &UploadConfig) -> Self {
        Self {
            allowed_mime_types: config
                .allowed_mime_types()
                .iter()
                .map(|m| essence(m))
                .collect(),
            max_size_bytes: *config.max_size_bytes(),
            normalize: NormalizeOptions::default()
                .with_max_len(*config.max_display_name_len())
                .with_fallback_extension(config.fallback_extension().clone()),
        }
    }
}

impl UploadPolicy {
    fn allows(&self, mime_type: &str) -> bool {
        self.allowed_mime_types.iter().any(|m| m == mime_type)
    }

    /// Pick the MIME type to record for `buffer`.
    ///
    /// Recognised content wins over the claim. Unrecognised content keeps the
    /// claim only when the claim names a format that has no signature.
    fn resolve_mime_type(&self, buffer: &[u8], claimed: &str) -> Result<String, UploadError> {
        let claimed = essence(claimed);
        let resolved = match sniff_mime_type(buffer) {
            Some(detected) => {
                if detected != claimed {
                    warn!(claimed = %claimed, detected, "Claimed MIME type does not match content");
                }
                detected.to_string()
            }
            None if is_sniffable(&claimed) => {
                return Err(UploadError::new(UploadErrorKind::DisallowedMimeType(claimed)));
            }
            None => claimed,
        };

        if self.allows(&resolved) {
            Ok(resolved)
        } else {
            Err(UploadError::new(UploadErrorKind::DisallowedMimeType(resolved)))
        }
    }

    /// Check an upload request, returning the MIME type to record.
    fn validate(&self, request: &UploadRequest) -> Result<String, UploadError> {
        if request.buffer.is_empty() {
            return Err(UploadError::new(UploadErrorKind::MissingBuffer));
        }

        let mime_type = self.resolve_mime_type(&request.buffer, &request.mime_type)?;

        if request.declared_size <= 0 {
            return Err(UploadError::new(UploadErrorKind::InvalidSize(
                request.declared_size,
            )));
        }

        let actual = request.buffer.len();
        if usize::try_from(request.declared_size).ok() != Some(actual) {
            return Err(UploadError::new(UploadErrorKind::SizeMismatch {
                declared: request.declared_size,
                actual,
            }));
        }

        if actual > self.max_size_bytes {
            return Err(UploadError::new(UploadErrorKind::TooLarge {
                size: actual,
                limit: self.max_size_bytes,
            }));
        }

        if let Some(owner) = &request.owner_id
            && owner.trim().is_empty()
        {
            return Err(UploadError::new(UploadErrorKind::InvalidOwnerId));
        }

        Ok(mime_type)
    }
}

/// Bytes written to storage whose metadata is not committed yet.
///
/// Unless [`StagedBlob::commit`] runs, the bytes are removed: awaited in
/// [`StagedBlob::release`], or on a spawned task when the guard is dropped
/// because the upload future was cancelled.
#[must_use]
struct StagedBlob {
    storage: Arc<dyn AssetStorage>,
    blob: Option<StoredBlob>,
}

impl StagedBlob {
    fn new(storage: Arc<dyn AssetStorage>, blob: StoredBlob) -> Self {
        Self {
            storage,
            blob: Some(blob),
        }
    }

    fn storage_path(&self) -> &str {
        self.blob
            .as_ref()
            .map(|blob| blob.storage_path.as_str())
            .unwrap_or_default()
    }

    fn public_url(&self) -> Option<String> {
        self.blob.as_ref().and_then(|blob| blob.public_url.clone())
    }

    /// Keep the bytes.
    fn commit(mut self) {
        self.blob = None;
    }

    /// Remove the bytes now. Failures are logged, never returned.
    async fn release(mut self) {
        if let Some(blob) = self.blob.take() {
            remove_orphan(self.storage.as_ref(), &blob.storage_path).await;
        }
    }
}

impl Drop for StagedBlob {
    fn drop(&mut self) {
        let Some(blob) = self.blob.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let storage = Arc::clone(&self.storage);
                handle.spawn(async move {
                    remove_orphan(storage.as_ref(), &blob.storage_path).await;
                });
            }
            Err(_) => error!(
                storage_path = %blob.storage_path,
                "Upload abandoned outside a runtime, blob left in storage"
            ),
        }
    }
}

async fn remove_orphan(storage: &dyn AssetStorage, storage_path: &str) {
    match storage.delete(storage_path).await {
        Ok(()) => warn!(storage_path, "Released orphaned blob"),
        Err(e) => error!(storage_path, error = %e, "Failed to release orphaned blob"),
    }
}

/// Orchestrates the asset lifecycle over the storage, repository and cache
/// ports.
///
/// # Example
///
/// ```
/// use reliquary::{AssetManager, UploadPolicy};
/// use reliquary_core::UploadRequest;
/// use reliquary_database::InMemoryAssetRepository;
/// use reliquary_storage::InMemoryStorage;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let manager = AssetManager::builder()
///     .storage(Arc::new(InMemoryStorage::new()))
///     .repository(Arc::new(InMemoryAssetRepository::new()))
///     .policy(UploadPolicy::default())
///     .build()?;
///
/// let pdf = b"%PDF-1.7 minimal".to_vec();
/// let len = pdf.len() as i64;
/// let record = manager
///     .upload(UploadRequest::new(pdf, "report.pdf", "application/pdf", len))
///     .await?;
/// assert_eq!(record.mime_type, "application/pdf");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, derive_builder::Builder)]
#[builder(pattern = "owned")]
pub struct AssetManager {
    /// Blob store holding the bytes
    storage: Arc<dyn AssetStorage>,
    /// Metadata store, the source of truth for existence
    repository: Arc<dyn AssetRepository>,
    /// Optional read-through cache
    #[builder(default, setter(strip_option))]
    cache: Option<Arc<dyn AssetCache>>,
    /// Signer for delivery links
    #[builder(default, setter(strip_option))]
    signer: Option<SignedUrlService>,
    /// Upload limits
    #[builder(default)]
    policy: UploadPolicy,
}

impl std::fmt::Debug for AssetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetManager")
            .field("cache", &self.cache.is_some())
            .field("signer", &self.signer.is_some())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl AssetManager {
    /// Start building a manager.
    pub fn builder() -> AssetManagerBuilder {
        AssetManagerBuilder::default()
    }

    /// Wire a manager from configuration.
    ///
    /// Storage is the filesystem backend, the cache is in-process when
    /// enabled, and signed links are available when a secret is set.
    pub fn from_config(
        config: &ReliquaryConfig,
        repository: Arc<dyn AssetRepository>,
    ) -> ReliquaryResult<Self> {
        config.validate()?;

        let cache: Option<Arc<dyn AssetCache>> = if *config.cache.enabled() {
            Some(Arc::new(InMemoryAssetCache::new(config.cache.clone())))
        } else {
            None
        };

        Ok(Self {
            storage: Arc::new(config.storage.open()?),
            repository,
            cache,
            signer: config.signing.service()?,
            policy: UploadPolicy::from(&config.upload),
        })
    }

    /// Upload limits in force.
    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Validate and store a new asset.
    ///
    /// Bytes are written before metadata. If the metadata write fails the
    /// bytes are removed again and the repository error is returned.
    ///
    /// # Errors
    ///
    /// Input faults come back as `UploadError` without any side effect.
    /// Storage and repository faults propagate after compensation.
    #[instrument(
        skip(self, request),
        fields(
            display_name = %request.display_name,
            declared_size = request.declared_size,
            owner_id = ?request.owner_id,
        )
    )]
    pub async fn upload(&self, request: UploadRequest) -> ReliquaryResult<AssetRecord> {
        let result = self.upload_inner(request).await;
        match &result {
            Ok(record) => info!(
                asset_id = %record.id,
                owner_id = ?record.owner_id,
                storage_path = %record.storage_path,
                size = record.size,
                "Asset uploaded"
            ),
            Err(e) => error!(error = %e, "Upload failed"),
        }
        result
    }

    async fn upload_inner(&self, request: UploadRequest) -> ReliquaryResult<AssetRecord> {
        let mime_type = self.policy.validate(&request)?;

        let id: AssetId = Uuid::new_v4();
        let options = self
            .policy
            .normalize
            .clone()
            .with_mode(NormalizeMode::Sanitize);
        let normalized = normalize_display_name(&request.display_name, &options)?;
        if *normalized.sanitized() {
            warn!(
                asset_id = %id,
                original = %request.display_name,
                sanitized = %normalized.name(),
                reason = ?normalized.reason(),
                "Display name sanitized"
            );
        }
        let display_name = normalized.into_name();

        let metadata = BlobMetadata {
            display_name: display_name.clone(),
            mime_type: mime_type.clone(),
        };
        let blob = self.storage.save(&request.buffer, &metadata).await?;
        let staged = StagedBlob::new(Arc::clone(&self.storage), blob);
        debug!(asset_id = %id, storage_path = staged.storage_path(), "Blob staged");

        let now = Utc::now();
        let record = AssetRecord {
            id,
            display_name,
            mime_type,
            size: request.buffer.len() as i64,
            storage_path: staged.storage_path().to_string(),
            public_url: staged.public_url(),
            owner_id: request.owner_id,
            visibility: request.visibility.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        let record = match self.repository.create(&record).await {
            Ok(record) => {
                staged.commit();
                record
            }
            Err(e) => {
                warn!(asset_id = %id, error = %e, "Metadata write failed, releasing blob");
                staged.release().await;
                return Err(e);
            }
        };

        self.cache_set(&record).await;
        Ok(record)
    }

    /// Fetch a record, cache first.
    #[instrument(skip(self))]
    pub async fn get(&self, id: AssetId) -> ReliquaryResult<Option<AssetRecord>> {
        if let Some(cache) = &self.cache {
            match cache.get(id).await {
                Ok(Some(record)) => {
                    debug!("Cache hit");
                    return Ok(Some(record));
                }
                Ok(None) => debug!("Cache miss"),
                Err(e) => warn!(error = %e, "Cache read failed, falling back to repository"),
            }
        }

        let record = self.repository.find_by_id(id).await.inspect_err(|e| {
            error!(error = %e, "Repository read failed");
        })?;

        if let Some(record) = &record {
            self.cache_set(record).await;
        }
        Ok(record)
    }

    /// Metadata as `requester` may see it.
    ///
    /// A private asset read by anyone but its owner yields the redacted
    /// projection.
    #[instrument(skip(self))]
    pub async fn get_metadata_by_id(
        &self,
        id: AssetId,
        requester: Option<&str>,
    ) -> ReliquaryResult<Option<AssetMetadata>> {
        let Some(record) = self.get(id).await? else {
            return Ok(None);
        };

        if record.is_readable_by(requester) {
            Ok(Some(FullMetadata::from(&record).into()))
        } else {
            info!(asset_id = %id, "Returning redacted metadata");
            Ok(Some(RedactedMetadata::from(&record).into()))
        }
    }

    /// The bytes, if `requester` may read them.
    ///
    /// Storage is not consulted for a forbidden read.
    #[instrument(skip(self))]
    pub async fn get_file_by_id(
        &self,
        id: AssetId,
        requester: Option<&str>,
    ) -> ReliquaryResult<FileOutcome> {
        let Some(record) = self.get(id).await? else {
            return Ok(FileOutcome::NotFound);
        };

        if !record.is_readable_by(requester) {
            info!(asset_id = %id, "File read forbidden");
            return Ok(FileOutcome::Forbidden);
        }

        self.read_file(&record).await
    }

    /// Remove bytes, metadata row and cache entry.
    ///
    /// A storage or repository failure is returned as is. Storage deletes are
    /// idempotent, so retrying a half-finished delete completes it.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: AssetId) -> ReliquaryResult<DeleteOutcome> {
        let record = self.repository.find_by_id(id).await.inspect_err(|e| {
            error!(error = %e, "Repository read failed");
        })?;
        let Some(record) = record else {
            debug!("Nothing to delete");
            return Ok(DeleteOutcome::NotFound);
        };

        self.storage
            .delete(&record.storage_path)
            .await
            .inspect_err(|e| {
                error!(storage_path = %record.storage_path, error = %e, "Blob delete failed");
            })?;

        self.repository.delete_by_id(id).await.inspect_err(|e| {
            error!(error = %e, "Metadata delete failed after blob removal");
        })?;

        if let Some(cache) = &self.cache
            && let Err(e) = cache.delete(id).await
        {
            warn!(error = %e, "Cache delete failed");
        }

        info!(storage_path = %record.storage_path, "Asset deleted");
        Ok(DeleteOutcome::Deleted)
    }

    /// Issue a delivery link for a public asset.
    ///
    /// Private and absent assets both yield `None`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no signing secret is configured.
    #[instrument(skip(self))]
    pub async fn signed_link(
        &self,
        id: AssetId,
        ttl: Duration,
    ) -> ReliquaryResult<Option<SignedLink>> {
        let signer = self.signer()?;
        match self.get(id).await? {
            Some(record) if record.visibility.is_public() => {
                debug!("Issuing signed link");
                Ok(Some(signer.issue(&id.to_string(), ttl)))
            }
            _ => Ok(None),
        }
    }

    /// Serve bytes to the bearer of a signed link.
    ///
    /// The signature is checked before anything is looked up. Private assets
    /// are never served this way.
    #[instrument(skip(self, signature))]
    pub async fn get_file_by_signature(
        &self,
        id: AssetId,
        expires: i64,
        signature: &str,
    ) -> ReliquaryResult<FileOutcome> {
        let signer = self.signer()?;
        if !signer.verify(&id.to_string(), expires, signature) {
            info!("Rejected invalid or expired signature");
            return Ok(FileOutcome::Forbidden);
        }

        let Some(record) = self.get(id).await? else {
            return Ok(FileOutcome::NotFound);
        };
        if !record.visibility.is_public() {
            info!("Signed read of private asset forbidden");
            return Ok(FileOutcome::Forbidden);
        }

        self.read_file(&record).await
    }

    fn signer(&self) -> ReliquaryResult<&SignedUrlService> {
        self.signer
            .as_ref()
            .ok_or_else(|| ConfigError::new("signed links require a signing secret").into())
    }

    async fn read_file(&self, record: &AssetRecord) -> ReliquaryResult<FileOutcome> {
        match self.storage.get(&record.storage_path).await {
            Ok(bytes) => Ok(FileOutcome::Found(AssetFile {
                buffer: bytes.buffer,
                display_name: record.display_name.clone(),
                mime_type: record.mime_type.clone(),
            })),
            Err(e) if e.is_storage_not_found() => {
                warn!(
                    asset_id = %record.id,
                    storage_path = %record.storage_path,
                    "Record present but blob missing"
                );
                Ok(FileOutcome::NotFound)
            }
            Err(e) => {
                error!(
                    asset_id = %record.id,
                    storage_path = %record.storage_path,
                    error = %e,
                    "Blob read failed"
                );
                Err(e)
            }
        }
    }

    async fn cache_set(&self, record: &AssetRecord) {
        if let Some(cache) = &self.cache
            && let Err(e) = cache.set(record).await
        {
            warn!(asset_id = %record.id, error = %e, "Cache write failed");
        }
    }
}
