//! Error types for DuneDB
//!
//! Two families of errors:
//! - [`DuneError`]: fatal to the whole run (I/O, persistence, corruption)
//! - [`CommandError`]: scoped to a single command; logged as a failure and
//!   never propagated past the engine

use thiserror::Error;

use crate::model::FieldKind;

/// Result type alias using DuneError
pub type Result<T> = std::result::Result<T, DuneError>;

/// Fatal error type for DuneDB operations
#[derive(Debug, Error)]
pub enum DuneError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // WAL Errors
    // -------------------------------------------------------------------------
    #[error("WAL corruption detected: {0}")]
    WalCorruption(String),

    #[error("WAL write failed: {0}")]
    WalWrite(String),

    #[error("WAL replay failed at LSN {lsn}: {source}")]
    Replay {
        lsn: u64,
        #[source]
        source: CommandError,
    },

    // -------------------------------------------------------------------------
    // Snapshot Errors
    // -------------------------------------------------------------------------
    #[error("Snapshot corruption detected: {0}")]
    SnapshotCorruption(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Access Errors
    // -------------------------------------------------------------------------
    #[error("Database locked: another process has exclusive access")]
    DatabaseLocked,
}

impl From<bincode::Error> for DuneError {
    fn from(err: bincode::Error) -> Self {
        DuneError::Serialization(err.to_string())
    }
}

// =============================================================================
// Per-Command Errors
// =============================================================================

/// A recoverable failure of one command
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Malformed command line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty command line")]
    Empty,

    #[error("unrecognized command: {0}")]
    UnknownCommand(String),

    #[error("`{command}` expects {expected} arguments, got {actual}")]
    ArgumentCount {
        command: &'static str,
        expected: String,
        actual: usize,
    },

    #[error("`{token}` is not a valid {what}")]
    InvalidNumber { what: &'static str, token: String },
}

/// Rejected `create type`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("type `{0}` already exists")]
    DuplicateTypeName(String),

    #[error("primary key order {order} is outside 1..={field_count}")]
    InvalidPrimaryKeyIndex { order: usize, field_count: usize },

    #[error("a type needs at least one field")]
    EmptyFieldList,

    #[error("`{0}` is not a valid name (letters and digits, at least one letter)")]
    InvalidName(String),

    #[error("name `{name}` exceeds {max} characters")]
    NameTooLong { name: String, max: usize },

    #[error("{count} fields exceed the limit of {max}")]
    TooManyFields { count: usize, max: usize },

    #[error("unknown field kind `{0}`")]
    UnknownFieldKind(String),

    #[error("field `{0}` is declared more than once")]
    DuplicateFieldName(String),
}

/// Schema lookup failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("type `{0}` not found")]
    TypeNotFound(String),
}

/// Record-level failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("expected {expected} values, got {actual}")]
    FieldCountMismatch { expected: usize, actual: usize },

    #[error("value at position {index} does not match kind {expected}")]
    FieldTypeMismatch { index: usize, expected: FieldKind },

    #[error("primary key `{0}` already exists")]
    DuplicatePrimaryKey(String),

    #[error("primary key `{0}` not found")]
    KeyNotFound(String),
}
