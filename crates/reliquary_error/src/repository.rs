//! Metadata repository error types.

/// Repository error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum RepositoryErrorKind {
    /// A record with this id already exists
    #[display("Asset '{}' already exists", _0)]
    DuplicateId(String),
    /// Connection failed
    #[display("Database connection error: {}", _0)]
    Connection(String),
    /// Query execution failed
    #[display("Database query error: {}", _0)]
    Query(String),
    /// Stored row could not be converted to a record
    #[display("Serialization error: {}", _0)]
    Serialization(String),
    /// Migration error
    #[display("Migration error: {}", _0)]
    Migration(String),
}

/// Repository error with source location tracking.
///
/// # Examples
///
/// ```
/// use reliquary_error::{RepositoryError, RepositoryErrorKind};
///
/// let err = RepositoryError::new(RepositoryErrorKind::Query("timeout".to_string()));
/// assert!(format!("{}", err).contains("timeout"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Repository Error: {} at line {} in {}", kind, line, file)]
pub struct RepositoryError {
    /// The kind of error that occurred
    pub kind: RepositoryErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl RepositoryError {
    /// Create a new RepositoryError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RepositoryErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

// Diesel error conversions (only available with database feature)
#[cfg(feature = "database")]
impl From<diesel::result::Error> for RepositoryError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match err {
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => RepositoryError::new(
                RepositoryErrorKind::DuplicateId(info.message().to_string()),
            ),
            Error::DeserializationError(e) => {
                RepositoryError::new(RepositoryErrorKind::Serialization(e.to_string()))
            }
            _ => RepositoryError::new(RepositoryErrorKind::Query(err.to_string())),
        }
    }
}

#[cfg(feature = "database")]
impl From<diesel::ConnectionError> for RepositoryError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        RepositoryError::new(RepositoryErrorKind::Connection(err.to_string()))
    }
}
