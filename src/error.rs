//! Error types for the migration library.

use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by a [`Destination`](crate::destination::Destination).
#[derive(Error, Debug)]
pub enum DestinationError {
    /// SQLite execution or connection error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Writing a script or reading database state failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Transaction scoping was used out of order
    #[error("Transaction error: {0}")]
    Transaction(String),
}

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrationError {
    /// A destination table already exists; raised before anything is created
    #[error("Table {table} already exists")]
    Collision { table: String },

    /// A source or override document could not be read or parsed
    #[error("Failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    /// The source folder could not be listed
    #[error("Failed to read source folder {path:?}: {source}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A finished column produced a value it cannot represent
    #[error("Internal inconsistency in column '{column}': {message}")]
    InternalInconsistency { column: String, message: String },

    /// Destination execution failed
    #[error("Destination error: {0}")]
    Destination(#[from] DestinationError),

    /// Invalid migration settings
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MigrationError {
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        MigrationError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn internal(column: impl Into<String>, message: impl Into<String>) -> Self {
        MigrationError::InternalInconsistency {
            column: column.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrationError>;
