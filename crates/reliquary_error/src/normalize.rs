//! Display-name normalization errors.

/// Why a display name was refused in strict mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum NormalizeErrorKind {
    /// Name contains `/` or `\`
    #[display("Display name contains path separators: {}", _0)]
    PathSeparators(String),
}

/// Normalization error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Normalize Error: {} at line {} in {}", kind, line, file)]
pub struct NormalizeError {
    kind: NormalizeErrorKind,
    line: u32,
    file: &'static str,
}

impl NormalizeError {
    /// Create a new normalization error with caller location tracking.
    #[track_caller]
    pub fn new(kind: NormalizeErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &NormalizeErrorKind {
        &self.kind
    }
}
