//! Minimal client for driving the fileshare wire protocol.
//!
//! Used by `fileshare-server`'s integration tests to exercise the real TCP
//! acceptor loop; not a general-purpose SDK.

#![forbid(unsafe_code)]

mod client;
mod error;

pub use client::Client;
pub use error::ClientError;
