//! Protocol-level errors: framing failures and malformed payloads.

use thiserror::Error;

/// Errors raised while decoding or encoding wire frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The two-byte magic prefix did not match `{0xFA, 0xCE}`.
    #[error("bad magic bytes")]
    BadMagic,

    /// The stream closed before a full header/payload could be read.
    #[error("short read: expected {expected} bytes, got {actual}")]
    ShortRead {
        /// Bytes the decoder needed.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// The declared payload length exceeds [`crate::FrameHeader::MAX_PAYLOAD_SIZE`].
    #[error("payload too large: {size} bytes exceeds limit of {max} bytes")]
    PayloadTooLarge {
        /// Declared or actual payload size.
        size: usize,
        /// Protocol maximum.
        max: usize,
    },

    /// The peer closed the connection cleanly before sending a new packet.
    ///
    /// This is not an error condition for the caller; the session simply
    /// ends. It is represented here so the decoder can return a single
    /// `Result` type while still letting callers distinguish "no more
    /// packets" from "the stream broke mid-packet".
    #[error("peer closed the connection")]
    PeerClosed,
}

/// Errors raised while interpreting a decoded payload as a request or
/// response body.
#[derive(Error, Debug)]
pub enum PayloadError {
    /// The payload was not valid JSON, or not the JSON shape the command expects.
    #[error("malformed request payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A required field was missing or had an invalid value.
    #[error("bad request: {0}")]
    BadRequest(String),
}

/// Result alias used throughout the protocol crate.
pub type Result<T> = std::result::Result<T, ProtocolError>;
