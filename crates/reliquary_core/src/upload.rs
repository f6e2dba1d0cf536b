//! Upload request.

use crate::Visibility;

/// Everything a client sends when uploading an asset.
///
/// Only `buffer` is trusted. The name is sanitized, the MIME type is checked
/// against the content and `declared_size` against the buffer length.
///
/// # Examples
///
/// ```
/// use reliquary_core::{UploadRequest, Visibility};
///
/// let request = UploadRequest::new(vec![1, 2, 3], "notes.pdf", "application/pdf", 3)
///     .with_owner_id(Some("u1".to_string()))
///     .with_visibility(Some(Visibility::Public));
///
/// assert_eq!(request.owner_id.as_deref(), Some("u1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct UploadRequest {
    /// Raw payload
    pub buffer: Vec<u8>,
    /// Name claimed by the client
    pub display_name: String,
    /// MIME type claimed by the client
    pub mime_type: String,
    /// Size claimed by the client
    pub declared_size: i64,
    /// Owning identity, if any
    pub owner_id: Option<String>,
    /// Requested visibility; private when absent
    pub visibility: Option<Visibility>,
}

impl UploadRequest {
    /// Create a request without owner or visibility.
    pub fn new(
        buffer: Vec<u8>,
        display_name: impl Into<String>,
        mime_type: impl Into<String>,
        declared_size: i64,
    ) -> Self {
        Self {
            buffer,
            display_name: display_name.into(),
            mime_type: mime_type.into(),
            declared_size,
            owner_id: None,
            visibility: None,
        }
    }
}
