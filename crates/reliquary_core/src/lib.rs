//! Core data types for the Reliquary asset service.
//!
//! This crate provides the foundation data types shared by the storage,
//! repository, cache and manager crates: the persisted [`AssetRecord`], the
//! metadata projections handed to callers, and the tagged outcomes of
//! access-controlled reads.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod asset;
mod metadata;
mod mime;
mod outcome;
mod upload;
mod visibility;

pub use asset::{AssetId, AssetRecord};
pub use metadata::{AssetMetadata, FullMetadata, RedactedMetadata};
pub use mime::{DEFAULT_ALLOWED_MIME_TYPES, essence, is_sniffable, sniff_mime_type};
pub use outcome::{AssetFile, DeleteOutcome, FileOutcome};
pub use upload::UploadRequest;
pub use visibility::Visibility;
