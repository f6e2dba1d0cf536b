//! Display-name normalization.
//!
//! Client-supplied names end up in logs, on disk and in response headers, so
//! they are reduced to a conservative alphabet before anything else sees them.

use derive_getters::Getters;
use reliquary_error::{NormalizeError, NormalizeErrorKind};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

/// How path separators are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizeMode {
    /// Refuse names containing `/` or `\`
    Strict,
    /// Replace separators with `_`
    #[default]
    Sanitize,
}

/// Why a name was changed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::AsRefStr, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SanitizeReason {
    /// Input was empty or blank
    #[display("empty_filename")]
    EmptyFilename,
    /// Input contained path separators
    #[display("path_separators_detected")]
    PathSeparatorsDetected,
    /// Input had content but nothing survived sanitization
    #[display("fully_sanitized_empty")]
    FullySanitizedEmpty,
    /// Characters were replaced or trimmed
    #[display("sanitized")]
    Sanitized,
}

/// Options for [`normalize_display_name`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct NormalizeOptions {
    /// Separator handling
    #[serde(default)]
    mode: NormalizeMode,
    /// Maximum length in characters
    #[serde(default = "default_max_len")]
    max_len: usize,
    /// Extension appended to generated fallback names
    #[serde(default = "default_fallback_extension")]
    fallback_extension: String,
}

fn default_max_len() -> usize {
    255
}

fn default_fallback_extension() -> String {
    ".bin".to_string()
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            mode: NormalizeMode::default(),
            max_len: default_max_len(),
            fallback_extension: default_fallback_extension(),
        }
    }
}

/// Outcome of normalization.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct NormalizedName {
    name: String,
    sanitized: bool,
    reason: Option<SanitizeReason>,
}

impl NormalizedName {
    /// Take the normalized name.
    pub fn into_name(self) -> String {
        self.name
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

fn fallback_name(extension: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    let extension = match extension {
        "" => String::new(),
        ext if ext.starts_with('.') => ext.to_string(),
        ext => format!(".{}", ext),
    };
    format!("file_{}{}", &token[..12], extension)
}

/// Reduce an untrusted name to `[A-Za-z0-9._-]`.
///
/// NFKC-normalizes, strips control characters, handles path separators per
/// [`NormalizeMode`], replaces everything outside the alphabet with `_`,
/// collapses `_` runs, trims leading and trailing `.`/`_` runs and truncates.
/// A name that ends up empty is replaced by `file_<token><ext>`.
///
/// # Errors
///
/// In [`NormalizeMode::Strict`], names containing path separators are refused.
///
/// # Examples
///
/// ```
/// use reliquary_security::{normalize_display_name, NormalizeOptions, SanitizeReason};
///
/// let result = normalize_display_name("../../etc/passwd", &NormalizeOptions::default()).unwrap();
/// assert_eq!(result.name(), "etc_passwd");
/// assert!(*result.sanitized());
/// assert_eq!(*result.reason(), Some(SanitizeReason::PathSeparatorsDetected));
/// ```
pub fn normalize_display_name(
    input: &str,
    options: &NormalizeOptions,
) -> Result<NormalizedName, NormalizeError> {
    if input.trim().is_empty() {
        return Ok(NormalizedName {
            name: fallback_name(&options.fallback_extension),
            sanitized: true,
            reason: Some(SanitizeReason::EmptyFilename),
        });
    }

    let normalized: String = input.nfkc().filter(|c| !c.is_control()).collect();

    let had_separators = normalized.contains(is_separator);
    if had_separators && options.mode == NormalizeMode::Strict {
        return Err(NormalizeError::new(NormalizeErrorKind::PathSeparators(
            input.to_string(),
        )));
    }

    let mut name = String::with_capacity(normalized.len());
    for c in normalized.chars() {
        let c = if is_allowed(c) { c } else { '_' };
        if c == '_' && name.ends_with('_') {
            continue;
        }
        name.push(c);
    }

    let mut name: String = name
        .trim_matches(|c: char| c == '.' || c == '_')
        .chars()
        .take(options.max_len)
        .collect();

    let reason = if name.is_empty() {
        name = fallback_name(&options.fallback_extension);
        Some(SanitizeReason::FullySanitizedEmpty)
    } else if name == input {
        None
    } else if had_separators {
        Some(SanitizeReason::PathSeparatorsDetected)
    } else {
        Some(SanitizeReason::Sanitized)
    };

    Ok(NormalizedName {
        name,
        sanitized: reason.is_some(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitize(input: &str) -> NormalizedName {
        normalize_display_name(input, &NormalizeOptions::default()).unwrap()
    }

    #[test]
    fn test_clean_name_is_untouched() {
        let result = sanitize("holiday-photo_01.png");
        assert_eq!(result.name(), "holiday-photo_01.png");
        assert!(!*result.sanitized());
        assert_eq!(*result.reason(), None);
    }

    #[test]
    fn test_path_traversal_is_neutralized() {
        let result = sanitize("..\\..\\windows\\system32");
        assert_eq!(result.name(), "windows_system32");
        assert_eq!(*result.reason(), Some(SanitizeReason::PathSeparatorsDetected));
    }

    #[test]
    fn test_strict_mode_rejects_separators() {
        let options = NormalizeOptions::default().with_mode(NormalizeMode::Strict);
        let err = normalize_display_name("a/b.png", &options).unwrap_err();
        assert!(matches!(err.kind(), NormalizeErrorKind::PathSeparators(_)));

        assert!(normalize_display_name("ab.png", &options).is_ok());
    }

    #[test]
    fn test_header_injection_is_neutralized() {
        let result = sanitize("evil\r\nSet-Cookie: x=1.png");
        assert!(!result.name().contains('\r'));
        assert!(!result.name().contains('\n'));
        assert_eq!(result.name(), "evilSet-Cookie_x_1.png");
        assert_eq!(*result.reason(), Some(SanitizeReason::Sanitized));
    }

    #[test]
    fn test_unicode_is_normalized_then_replaced() {
        // Fullwidth letters fold to ASCII under NFKC
        assert_eq!(sanitize("ｒｅｐｏｒｔ.pdf").name(), "report.pdf");
        assert_eq!(sanitize("café menu.pdf").name(), "caf_menu.pdf");
    }

    #[test]
    fn test_underscores_collapse_and_edges_trim() {
        assert_eq!(sanitize("__a   b__.png..").name(), "a_b_.png");
    }

    #[test]
    fn test_empty_input_gets_fallback() {
        let result = sanitize("   ");
        assert!(result.name().starts_with("file_"));
        assert!(result.name().ends_with(".bin"));
        assert_eq!(*result.reason(), Some(SanitizeReason::EmptyFilename));
    }

    #[test]
    fn test_fully_sanitized_input_gets_fallback() {
        let options = NormalizeOptions::default().with_fallback_extension("dat".to_string());
        let result = normalize_display_name("../..", &options).unwrap();
        assert!(result.name().starts_with("file_"));
        assert!(result.name().ends_with(".dat"));
        assert_eq!(*result.reason(), Some(SanitizeReason::FullySanitizedEmpty));
    }

    #[test]
    fn test_truncation() {
        let options = NormalizeOptions::default().with_max_len(8);
        let result = normalize_display_name("abcdefghijkl.png", &options).unwrap();
        assert_eq!(result.name(), "abcdefgh");
        assert!(*result.sanitized());
    }

    #[test]
    fn test_fallback_names_are_unique() {
        assert_ne!(sanitize("").name(), sanitize("").name());
    }
}
