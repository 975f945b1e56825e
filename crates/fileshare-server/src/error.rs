//! Top-level server error type.

use thiserror::Error;

/// Errors that can terminate a connection or the server itself.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Wire framing or payload decoding failed.
    #[error("protocol error: {0}")]
    Protocol(#[from] fileshare_proto::ProtocolError),

    /// A JSON payload was malformed or missing required fields.
    #[error("bad payload: {0}")]
    Payload(#[from] fileshare_proto::PayloadError),

    /// The session state machine rejected an operation.
    #[error("session error: {0}")]
    Session(#[from] fileshare_core::SessionError),

    /// The metadata store failed.
    #[error("storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),

    /// The blob store failed.
    #[error("blob store error: {0}")]
    Blob(#[from] std::io::Error),

    /// The request referenced a file or directory id that does not exist.
    #[error("file not found: {0}")]
    FileNotFound(i64),

    /// The caller does not have the permission bits required for this operation.
    #[error("permission denied")]
    PermissionDenied,

    /// The request referenced a user id that does not exist.
    #[error("user not found: {0}")]
    UserNotFound(i64),

    /// Credentials were rejected during login.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The server has reached its configured connection limit.
    #[error("connection limit reached")]
    ConnectionLimitReached,
}

impl ServerError {
    /// Machine-readable error kind sent to the client in an
    /// [`fileshare_proto::payloads::ErrorResponse`].
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Protocol(_) => "protocol_error",
            Self::Payload(_) => "bad_request",
            Self::Session(_) => "bad_state",
            Self::Storage(_) => "storage_error",
            Self::Blob(_) => "storage_error",
            Self::FileNotFound(_) => "not_found",
            Self::PermissionDenied => "permission_denied",
            Self::UserNotFound(_) => "not_found",
            Self::InvalidCredentials => "invalid_credentials",
            Self::ConnectionLimitReached => "connection_limit_reached",
        }
    }
}
