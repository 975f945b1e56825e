//! I/O-free domain layer for the fileshare server: the session state
//! machine, the permission engine, and the domain structs the metadata
//! store persists.

#![forbid(unsafe_code)]

pub mod crypto;
pub mod error;
pub mod model;
pub mod perm;
pub mod session;

pub use crypto::hash_password;
pub use error::{PermissionError, SessionError};
pub use model::{ActivityLogEntry, FileRecord, User};
pub use perm::Access;
pub use session::{PendingUpload, Session, SessionState};
