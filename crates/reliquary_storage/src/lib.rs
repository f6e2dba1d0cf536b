//! Pluggable blob storage for Reliquary.
//!
//! This crate provides the storage port of the asset service. The abstraction
//! separates bytes (stored here, in the filesystem or in memory) from
//! metadata (stored by a repository).
//!
//! # Example
//!
//! ```rust
//! use reliquary_storage::{AssetStorage, BlobMetadata, InMemoryStorage};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = InMemoryStorage::new();
//! let metadata = BlobMetadata {
//!     display_name: "cat.png".to_string(),
//!     mime_type: "image/png".to_string(),
//! };
//!
//! let blob = storage.save(b"bytes", &metadata).await?;
//! let stored = storage.get(&blob.storage_path).await?;
//! assert_eq!(stored.buffer, b"bytes");
//!
//! storage.delete(&blob.storage_path).await?;
//! storage.delete(&blob.storage_path).await?; // idempotent
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filesystem;
mod memory;
mod storage;

pub use filesystem::FileSystemStorage;
pub use memory::InMemoryStorage;
pub use reliquary_error::{StorageError, StorageErrorKind};
pub use storage::{AssetStorage, BlobMetadata, StoredBlob, StoredBytes};
