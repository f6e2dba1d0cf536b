//! Upload validation errors.
//!
//! These are caller-input faults: they are raised before any side effect
//! happens and are never worth retrying.

/// Reasons an upload request is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum UploadErrorKind {
    /// No payload, or an empty one
    #[display("Upload buffer is missing or empty")]
    MissingBuffer,
    /// MIME type is not on the server allow-list
    #[display("MIME type '{}' is not allowed", _0)]
    DisallowedMimeType(String),
    /// Declared size is zero or negative
    #[display("Declared size {} is invalid", _0)]
    InvalidSize(i64),
    /// Declared size disagrees with the payload
    #[display("Declared size {} does not match payload length {}", declared, actual)]
    SizeMismatch {
        /// Size the caller claimed
        declared: i64,
        /// Actual payload length
        actual: usize,
    },
    /// Payload exceeds the configured ceiling
    #[display("Payload of {} bytes exceeds the {} byte limit", size, limit)]
    TooLarge {
        /// Payload length
        size: usize,
        /// Configured ceiling
        limit: usize,
    },
    /// Owner id was supplied but blank
    #[display("Owner id must be a non-empty string")]
    InvalidOwnerId,
}

/// Upload validation error with location tracking.
///
/// # Examples
///
/// ```
/// use reliquary_error::{UploadError, UploadErrorKind};
///
/// let err = UploadError::new(UploadErrorKind::InvalidSize(0));
/// assert_eq!(err.kind(), &UploadErrorKind::InvalidSize(0));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Upload Error: {} at line {} in {}", kind, line, file)]
pub struct UploadError {
    kind: UploadErrorKind,
    line: u32,
    file: &'static str,
}

impl UploadError {
    /// Create a new upload error with caller location tracking.
    #[track_caller]
    pub fn new(kind: UploadErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &UploadErrorKind {
        &self.kind
    }
}
