//! Domain structs shared between the metadata store and the handlers that
//! use it. These carry no behavior beyond simple derived helpers; the store
//! (`fileshare-server::storage`) is the only thing that persists them.

use serde::{Deserialize, Serialize};

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Account id, assigned by the metadata store.
    pub id: i64,
    /// Username, unique among active and inactive accounts alike.
    pub username: String,
    /// SHA-256 hex digest of the account's password.
    pub password_hash: String,
    /// Whether the account has admin privileges.
    pub is_admin: bool,
    /// Whether the account can currently log in.
    pub is_active: bool,
    /// Account creation timestamp, as stored by SQLite (`CURRENT_TIMESTAMP`).
    pub created_at: String,
}

/// A file or directory entry in the share tree.
///
/// The share root is a virtual node identified by `parent_id == Some(0)`
/// turning into `id == 0`; entries with `parent_id == 0` live directly under
/// the root. The root itself has no corresponding row in the `files` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// File or directory id.
    pub id: i64,
    /// Parent directory id; `0` means the share root.
    pub parent_id: i64,
    /// Entry name (not a full path).
    pub name: String,
    /// Opaque blob store reference. `None` for directories.
    pub physical_path: Option<String>,
    /// Owning user id.
    pub owner_id: i64,
    /// Size in bytes. Always `0` for directories.
    pub size: i64,
    /// Whether this entry is a directory.
    pub is_directory: bool,
    /// Permission bits (see `crate::perm`).
    pub permissions: u32,
    /// Creation timestamp, as stored by SQLite.
    pub created_at: String,
}

impl FileRecord {
    /// Whether this record's blob can be read (has backing storage).
    #[must_use]
    pub fn has_blob(&self) -> bool {
        !self.is_directory && self.physical_path.is_some()
    }
}

/// One row written to the write-only `activity_logs` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    /// Acting user id.
    pub user_id: i64,
    /// Short machine-readable action name, e.g. `"login"`, `"upload"`.
    pub action_type: String,
    /// Free-form human-readable detail.
    pub description: String,
}
