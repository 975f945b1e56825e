//! Error types for the fileshare protocol core.
//!
//! Strongly-typed errors for the session state machine and permission
//! engine. We avoid `std::io::Error` here since neither type does any I/O.

use thiserror::Error;

use crate::session::SessionState;

/// Errors raised by the session state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A command that requires authentication arrived before login succeeded.
    #[error("not authenticated: cannot {operation} in state {state:?}")]
    NotAuthenticated {
        /// State the session was in when the command arrived.
        state: SessionState,
        /// Operation that was attempted.
        operation: String,
    },

    /// An upload-data frame arrived with no matching pending upload.
    #[error("no pending upload for this session")]
    NoPendingUpload,

    /// An upload-request frame arrived while a previous upload was still pending.
    #[error("an upload is already pending for this session")]
    UploadAlreadyPending,
}

/// Errors raised while parsing or formatting permission strings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    /// The mode string was neither 3 octal digits nor a plain integer in `0..=777`.
    #[error("invalid permission mode: {0:?}")]
    InvalidMode(String),
}
