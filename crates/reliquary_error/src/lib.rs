//! Error types for the Reliquary asset service.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Two families matter to callers. Input faults ([`UploadError`],
//! [`NormalizeError`]) are raised before any side effect. Infrastructure
//! faults ([`StorageError`], [`RepositoryError`], [`CacheError`]) come from
//! the backing stores.
//!
//! # Examples
//!
//! ```
//! use reliquary_error::{ReliquaryResult, StorageError, StorageErrorKind};
//!
//! fn read_blob() -> ReliquaryResult<Vec<u8>> {
//!     Err(StorageError::new(StorageErrorKind::Unavailable("bucket offline".into())))?
//! }
//!
//! assert!(read_blob().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod error;
mod normalize;
mod repository;
mod storage;
mod upload;

pub use cache::CacheError;
pub use config::ConfigError;
pub use error::{ReliquaryError, ReliquaryErrorKind, ReliquaryResult};
pub use normalize::{NormalizeError, NormalizeErrorKind};
pub use repository::{RepositoryError, RepositoryErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use upload::{UploadError, UploadErrorKind};
