//! Top-level error wrapper types.

use crate::{CacheError, ConfigError, NormalizeError, RepositoryError, StorageError, UploadError};

/// Every failure family the asset service can report.
///
/// # Examples
///
/// ```
/// use reliquary_error::{ReliquaryError, StorageError, StorageErrorKind};
///
/// let storage_err = StorageError::new(StorageErrorKind::Unavailable("disk".to_string()));
/// let err: ReliquaryError = storage_err.into();
/// assert!(format!("{}", err).contains("Storage Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum ReliquaryErrorKind {
    /// Rejected upload input
    #[from(UploadError)]
    Upload(UploadError),
    /// Blob store failure
    #[from(StorageError)]
    Storage(StorageError),
    /// Metadata store failure
    #[from(RepositoryError)]
    Repository(RepositoryError),
    /// Cache failure
    #[from(CacheError)]
    Cache(CacheError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Display name refused
    #[from(NormalizeError)]
    Normalize(NormalizeError),
}

/// Reliquary error with kind discrimination.
///
/// # Examples
///
/// ```
/// use reliquary_error::{ReliquaryResult, UploadError, UploadErrorKind};
///
/// fn might_fail() -> ReliquaryResult<()> {
///     Err(UploadError::new(UploadErrorKind::MissingBuffer))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(err.is_input_fault());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Reliquary Error: {}", _0)]
pub struct ReliquaryError(Box<ReliquaryErrorKind>);

impl ReliquaryError {
    /// Create a new error from a kind.
    pub fn new(kind: ReliquaryErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ReliquaryErrorKind {
        &self.0
    }

    /// Whether the caller sent something invalid, as opposed to an
    /// infrastructure fault.
    pub fn is_input_fault(&self) -> bool {
        matches!(
            self.kind(),
            ReliquaryErrorKind::Upload(_) | ReliquaryErrorKind::Normalize(_)
        )
    }

    /// Whether the blob store reported that the bytes are missing.
    pub fn is_storage_not_found(&self) -> bool {
        matches!(self.kind(), ReliquaryErrorKind::Storage(e) if e.is_not_found())
    }
}

// Generic From implementation for any type that converts to ReliquaryErrorKind
impl<T> From<T> for ReliquaryError
where
    T: Into<ReliquaryErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Reliquary operations.
pub type ReliquaryResult<T> = std::result::Result<T, ReliquaryError>;
