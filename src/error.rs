// Error types for the record store

use std::path::PathBuf;
use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to create store directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Database schema version {found} is newer than supported {supported}")]
    UnsupportedSchemaVersion { found: u32, supported: u32 },

    #[error("Query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Export to {path} failed: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database connection lock poisoned")]
    LockPoisoned,
}

/// Coarse classification of a [`StoreError`] for callers that only need to
/// pick a message or exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The store could not be opened or its schema reconciled
    Initialization,
    /// A statement failed to execute
    Statement,
    /// Writing the export file failed
    Export,
    /// The connection guard is unusable
    Concurrency,
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Directory { .. } | StoreError::Open { .. } | StoreError::UnsupportedSchemaVersion { .. } => {
                ErrorKind::Initialization
            }
            StoreError::Query(_) => ErrorKind::Statement,
            StoreError::Export { .. } => ErrorKind::Export,
            StoreError::LockPoisoned => ErrorKind::Concurrency,
        }
    }

    pub(crate) fn export(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Export {
            path: path.into(),
            source,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Initialization => write!(f, "initialization"),
            ErrorKind::Statement => write!(f, "statement"),
            ErrorKind::Export => write!(f, "export"),
            ErrorKind::Concurrency => write!(f, "concurrency"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = StoreError::UnsupportedSchemaVersion { found: 9, supported: 1 };
        assert_eq!(err.kind(), ErrorKind::Initialization);
        assert_eq!(err.to_string(), "Database schema version 9 is newer than supported 1");

        let err = StoreError::Query(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(err.kind(), ErrorKind::Statement);

        let err = StoreError::export("/tmp/out.csv", std::io::Error::other("disk full"));
        assert_eq!(err.kind(), ErrorKind::Export);
        assert!(err.to_string().contains("disk full"));

        assert_eq!(StoreError::LockPoisoned.kind(), ErrorKind::Concurrency);
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::Initialization.to_string(), "initialization");
        assert_eq!(ErrorKind::Statement.to_string(), "statement");
    }
}
