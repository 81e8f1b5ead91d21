//! Unified error types for notekeep.
//!
//! Display strings carry a stable `CODE:` prefix so callers can tell failure
//! kinds apart without matching on variants.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

use crate::note::NoteType;

/// Unified error types for the note store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No bearer credential was supplied.
    #[error("MISSING_CREDENTIAL: token is missing")]
    MissingCredential,

    /// The credential failed verification or has expired.
    #[error("INVALID_CREDENTIAL: {0}")]
    InvalidCredential(String),

    /// Invalid input parameters (e.g., title too long).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Note type outside the registered enumeration.
    #[error("INVALID_NOTE_TYPE: Invalid note type provided: {0}. Must be one of the following: [{allowed}]", allowed = NoteType::allowed_values())]
    InvalidNoteType(String),

    /// A note with the same (user, title, type) already exists.
    #[error("DUPLICATE_KEY: A {note_type} note with title '{title}' already exists.")]
    DuplicateKey { note_type: NoteType, title: String },

    /// The cache backend is not connected or rejected the operation.
    #[error("CACHE_UNAVAILABLE: {0}")]
    CacheUnavailable(String),

    /// A cached value could not be decoded.
    #[error("CACHE_CORRUPT: {0}")]
    CacheCorrupt(String),

    /// Requested note or list is absent. Only raised at the tool boundary.
    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    /// Database operation failed.
    #[error("STORE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Persistence failure annotated with the operation that hit it.
    #[error("STORE_ERROR: {operation} failed for {target}: {message}")]
    StoreFailure { operation: &'static str, target: String, message: String },
}

/// Coarse classification of [`Error`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingCredential,
    InvalidCredential,
    InvalidInput,
    InvalidNoteType,
    DuplicateKey,
    CacheUnavailable,
    NotFound,
    StoreFailure,
}

impl ErrorKind {
    /// JSON-RPC error code reported to MCP clients.
    pub fn code(self) -> i32 {
        match self {
            ErrorKind::InvalidInput | ErrorKind::InvalidNoteType => -32602,
            ErrorKind::NotFound => -32001,
            ErrorKind::CacheUnavailable => -32002,
            ErrorKind::StoreFailure => -32003,
            ErrorKind::DuplicateKey => -32009,
            ErrorKind::MissingCredential => -32010,
            ErrorKind::InvalidCredential => -32011,
        }
    }

    /// Whether the failure lies with the backends rather than the request.
    pub fn is_server_fault(self) -> bool {
        matches!(self, ErrorKind::CacheUnavailable | ErrorKind::StoreFailure)
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingCredential => ErrorKind::MissingCredential,
            Error::InvalidCredential(_) => ErrorKind::InvalidCredential,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::InvalidNoteType(_) => ErrorKind::InvalidNoteType,
            Error::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            Error::CacheUnavailable(_) | Error::CacheCorrupt(_) => ErrorKind::CacheUnavailable,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Database(_) | Error::MigrationFailed(_) | Error::StoreFailure { .. } => ErrorKind::StoreFailure,
        }
    }

    /// Attach operation context to persistence failures.
    ///
    /// Every other kind is returned unchanged so callers still see the
    /// original failure.
    pub fn context(self, operation: &'static str, target: impl Into<String>) -> Self {
        match self {
            Error::Database(e) => Error::StoreFailure { operation, target: target.into(), message: e.to_string() },
            Error::MigrationFailed(msg) => Error::StoreFailure { operation, target: target.into(), message: msg },
            other => other,
        }
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = err.kind().code();
        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}
