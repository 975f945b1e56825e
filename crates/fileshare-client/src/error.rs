//! Client-side error type.

use thiserror::Error;

/// Errors raised while talking to a fileshare server.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The underlying TCP connection failed.
    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame encoding or decoding failed.
    #[error("protocol error: {0}")]
    Protocol(#[from] fileshare_proto::ProtocolError),

    /// A JSON request or response body was malformed.
    #[error("payload error: {0}")]
    Payload(#[from] serde_json::Error),

    /// The server replied with an `Opcode::Error` frame.
    #[error("server error ({kind}): {message}")]
    Server {
        /// Machine-readable error kind from the server's `ErrorResponse`.
        kind: String,
        /// Human-readable detail.
        message: String,
    },
}
