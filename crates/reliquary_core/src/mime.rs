//! Content-based MIME type detection.
//!
//! Clients lie about content types. The service trusts the bytes first and
//! the claim only as a fallback for formats without a signature.

/// MIME types accepted when no explicit allow-list is configured.
pub const DEFAULT_ALLOWED_MIME_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "application/pdf",
];

/// Detect a MIME type from magic bytes.
///
/// Returns `None` when the content has no recognised signature.
///
/// # Examples
///
/// ```
/// use reliquary_core::sniff_mime_type;
///
/// let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
/// assert_eq!(sniff_mime_type(&png), Some("image/png"));
/// assert_eq!(sniff_mime_type(b"plain words"), None);
/// ```
pub fn sniff_mime_type(data: &[u8]) -> Option<&'static str> {
    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    if data.starts_with(PNG) {
        Some("image/png")
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        Some("image/webp")
    } else if data.starts_with(b"%PDF-") {
        Some("application/pdf")
    } else if data.starts_with(b"BM") && data.len() >= 14 {
        Some("image/bmp")
    } else if data.starts_with(&[b'I', b'I', 0x2A, 0x00]) || data.starts_with(&[b'M', b'M', 0x00, 0x2A])
    {
        Some("image/tiff")
    } else {
        None
    }
}

/// Strip parameters and case from a client-supplied content type.
///
/// `"Image/PNG; charset=binary"` becomes `"image/png"`.
pub fn essence(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether a MIME type belongs to a format [`sniff_mime_type`] can recognise.
///
/// Claims of these types must be backed by a matching signature.
pub fn is_sniffable(mime_type: &str) -> bool {
    matches!(
        mime_type,
        "image/png"
            | "image/jpeg"
            | "image/gif"
            | "image/webp"
            | "application/pdf"
            | "image/bmp"
            | "image/tiff"
    )
}
