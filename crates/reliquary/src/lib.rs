//! Reliquary - asset storage with ownership, visibility and signed delivery
//!
//! Reliquary accepts untrusted uploads, stores the bytes in a blob store and
//! the metadata in a repository, and serves both back under an owner-based
//! access policy.
//!
//! # Features
//!
//! - **Validated uploads**: content-sniffed MIME types, size ceilings, sanitized names
//! - **Consistent writes**: bytes are removed again when the metadata write fails
//! - **Access control**: private assets are owner-only, others see redacted metadata
//! - **Signed links**: stateless, expiring HMAC links for public assets
//! - **Rate limiting**: per-caller fixed windows per operation category
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use reliquary::{AssetManager, ReliquaryConfig, UploadPolicy};
//! use reliquary_core::{UploadRequest, Visibility};
//! use reliquary_database::InMemoryAssetRepository;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ReliquaryConfig::load()?;
//!     let manager = AssetManager::builder()
//!         .storage(Arc::new(config.storage.open()?))
//!         .repository(Arc::new(InMemoryAssetRepository::new()))
//!         .policy(UploadPolicy::from(&config.upload))
//!         .build()?;
//!
//!     let bytes = std::fs::read("cat.png")?;
//!     let size = bytes.len() as i64;
//!     let record = manager
//!         .upload(
//!             UploadRequest::new(bytes, "cat.png", "image/png", size)
//!                 .with_owner_id(Some("u1".to_string()))
//!                 .with_visibility(Some(Visibility::Public)),
//!         )
//!         .await?;
//!     println!("Stored {}", record.id);
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `postgres` - PostgreSQL metadata repository
//!
//! # Architecture
//!
//! - `reliquary_error` - Error types
//! - `reliquary_core` - Records, projections, outcomes and MIME detection
//! - `reliquary_storage` - Blob storage port and backends
//! - `reliquary_database` - Metadata repository port and backends
//! - `reliquary_cache` - Record cache port and in-memory cache
//! - `reliquary_security` - Name normalization, rate limiting, signed links
//!
//! This crate (`reliquary`) ties them together in [`AssetManager`].

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod manager;
mod observability;

pub use config::{
    MAX_DISPLAY_NAME_LEN, ReliquaryConfig, SigningConfig, StorageConfig, UploadConfig,
};
pub use manager::{AssetManager, AssetManagerBuilder, AssetManagerBuilderError, UploadPolicy};
pub use observability::{
    ObservabilityConfig, init_observability, init_observability_with_config,
};

pub use reliquary_cache::{AssetCache, AssetCacheConfig, InMemoryAssetCache};
pub use reliquary_core::{
    AssetFile, AssetId, AssetMetadata, AssetRecord, DeleteOutcome, FileOutcome, FullMetadata,
    RedactedMetadata, UploadRequest, Visibility,
};
pub use reliquary_database::{AssetRepository, InMemoryAssetRepository};
#[cfg(feature = "postgres")]
pub use reliquary_database::PostgresAssetRepository;
pub use reliquary_error::{ReliquaryError, ReliquaryErrorKind, ReliquaryResult};
pub use reliquary_security::{
    OperationCategory, RateLimitConfig, RateLimiter, RateLimiters, SignedLink, SignedUrlService,
    caller_key, normalize_display_name,
};
pub use reliquary_storage::{AssetStorage, FileSystemStorage, InMemoryStorage};
