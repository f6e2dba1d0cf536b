//! Tagged results of access-controlled operations.
//!
//! Access-control outcomes are values, not errors. Mapping them to
//! transport status codes is the caller's business.

/// Bytes and the headers needed to serve them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFile {
    /// Raw payload
    pub buffer: Vec<u8>,
    /// Sanitized display name, safe for a content-disposition header
    pub display_name: String,
    /// Detected MIME type
    pub mime_type: String,
}

/// Result of a file read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// No record, or the record's bytes are gone
    NotFound,
    /// Private asset and the requester is not the owner
    Forbidden,
    /// The bytes
    Found(AssetFile),
}

/// Result of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::AsRefStr, derive_more::Display)]
#[strum(serialize_all = "snake_case")]
pub enum DeleteOutcome {
    /// Bytes, row and cache entry are gone
    #[display("deleted")]
    Deleted,
    /// Nothing was stored under that id
    #[display("not_found")]
    NotFound,
}
