//! Errors raised by the metadata store.

use thiserror::Error;

/// Errors raised by [`super::MetadataStore`].
#[derive(Error, Debug)]
pub enum StorageError {
    /// The underlying SQLite connection returned an error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A row the caller expected to exist was not found.
    #[error("not found")]
    NotFound,

    /// A username that must be unique was already taken.
    #[error("username already exists: {0}")]
    DuplicateUsername(String),

    /// An operation targeted the primary admin account (id 1), which the
    /// original implementation protects from deletion or demotion.
    #[error("cannot modify the primary admin account")]
    ProtectedAccount,
}
