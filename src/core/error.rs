//! # Errors
//!
//! One error type for everything below the session engine. The engine never
//! crashes on these; it turns them into transient status messages.
//!
//! ```text
//! Error
//! ├── ValidationFailed   bad input, storage untouched
//! ├── NotFound           id has no row
//! ├── StoreFailure       sqlite / io / schema version
//! └── EditorFailure      launch failed, handoff file unreadable
//! ```

use std::error::Error as StdError;
use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    ValidationFailed(String),
    NotFound { entity: &'static str, id: i64 },
    StoreFailure(StoreError),
    EditorFailure(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::ValidationFailed(message.into())
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Error::NotFound { entity, id }
    }

    pub fn editor(message: impl Into<String>) -> Self {
        Error::EditorFailure(message.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ValidationFailed(msg) => write!(f, "invalid input: {msg}"),
            Error::NotFound { entity, id } => write!(f, "{entity} {id} not found"),
            Error::StoreFailure(e) => write!(f, "storage error: {e}"),
            Error::EditorFailure(msg) => write!(f, "editor error: {msg}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::StoreFailure(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for Error {
    fn from(value: StoreError) -> Self {
        Error::StoreFailure(value)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        Error::StoreFailure(StoreError::Sqlite(value))
    }
}

/// Driver-level failures from the persistence layer.
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    Io(io::Error),
    /// The database was written by a newer binary.
    SchemaTooNew { found: u32, supported: u32 },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Sqlite(e) => write!(f, "sqlite: {e}"),
            StoreError::Io(e) => write!(f, "i/o: {e}"),
            StoreError::SchemaTooNew { found, supported } => write!(
                f,
                "database schema version {found} is newer than supported version {supported}"
            ),
        }
    }
}

impl StdError for StoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            StoreError::Sqlite(e) => Some(e),
            StoreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        StoreError::Sqlite(value)
    }
}

impl From<io::Error> for StoreError {
    fn from(value: io::Error) -> Self {
        StoreError::Io(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            Error::validation("title must not be empty").to_string(),
            "invalid input: title must not be empty"
        );
        assert_eq!(Error::not_found("note", 7).to_string(), "note 7 not found");
        let err = Error::from(StoreError::SchemaTooNew { found: 9, supported: 1 });
        assert!(err.to_string().contains("newer than supported"));
    }

    #[test]
    fn test_store_failure_has_source() {
        let err = Error::from(StoreError::Io(io::Error::other("disk gone")));
        assert!(err.source().is_some());
        assert!(Error::editor("boom").source().is_none());
    }
}
