//! Wire protocol for the fileshare server: frame layout, command codes, and
//! the JSON payload shapes carried by each command.
//!
//! This crate is pure and I/O-free: it only encodes and decodes bytes. The
//! surrounding read/write loop lives in `fileshare-server`.

#![forbid(unsafe_code)]

mod error;
mod frame;
mod header;
mod opcode;
pub mod payloads;

pub use error::{PayloadError, ProtocolError, Result};
pub use frame::Frame;
pub use header::FrameHeader;
pub use opcode::Opcode;
