//! JSON request/response bodies carried inside frame payloads.
//!
//! Each struct here corresponds to one [`crate::Opcode`] (noted per type).
//! Binary commands (`UploadData`, `DownloadResponse`) carry raw bytes
//! instead and have no DTO.

use serde::{Deserialize, Serialize};

/// Body of a [`crate::Opcode::LoginRequest`] frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    /// Account username.
    pub username: String,
    /// Raw password; the server hashes it (SHA-256 hex) before comparing
    /// against the stored digest.
    pub password: String,
}

/// Body of a [`crate::Opcode::LoginResponse`] frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    /// Whether the credentials were accepted.
    pub success: bool,
    /// Authenticated user id, present only when `success` is true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    /// Whether the authenticated account has admin privileges.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

/// Body of a [`crate::Opcode::ListDir`] frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ListDirRequest {
    /// Directory to list. Defaults to the session's current directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory_id: Option<i64>,
}

/// One entry returned by a directory listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirEntry {
    /// File or directory id in the metadata store.
    pub file_id: i64,
    /// Entry name (not a full path).
    pub name: String,
    /// Whether this entry is a directory.
    pub is_directory: bool,
    /// Size in bytes; zero for directories.
    pub size: u64,
    /// Owning user id.
    pub owner_id: i64,
    /// Permission bits, as a 3-digit octal string (see `fileshare_core::perm`).
    pub permissions: String,
}

/// Response to a [`crate::Opcode::ListDir`] request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListDirResponse {
    /// Entries directly under the requested directory.
    pub entries: Vec<DirEntry>,
}

/// Body of a [`crate::Opcode::ChangeDir`] frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeDirRequest {
    /// Directory to change the session's current directory to.
    pub directory_id: i64,
}

/// Body of a [`crate::Opcode::Mkdir`] frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MkdirRequest {
    /// Name of the directory to create.
    pub name: String,
    /// Parent directory id. Defaults to the session's current directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

/// Body of a [`crate::Opcode::UploadRequest`] frame, announcing an upload
/// that will be followed by one [`crate::Opcode::UploadData`] frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadRequest {
    /// Name of the new file.
    pub name: String,
    /// Declared size in bytes of the upload that follows.
    pub size: u64,
    /// Parent directory id. Defaults to the session's current directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

/// Body of a [`crate::Opcode::DownloadRequest`] frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Id of the file to download.
    pub file_id: i64,
}

/// Body of a [`crate::Opcode::Delete`] frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteRequest {
    /// Id of the file or directory to delete.
    pub file_id: i64,
}

/// Body of a [`crate::Opcode::Chmod`] frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChmodRequest {
    /// Id of the file or directory to modify.
    pub file_id: i64,
    /// New permission bits, as a 3-digit octal string or plain integer
    /// (accepted forms mirror the original `parse_permissions` helper).
    pub permissions: String,
}

/// Body of a [`crate::Opcode::FileInfo`] frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileInfoRequest {
    /// Id of the file or directory to describe.
    pub file_id: i64,
}

/// Response to a [`crate::Opcode::FileInfo`] request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileInfoResponse {
    /// File or directory id.
    pub file_id: i64,
    /// Entry name.
    pub name: String,
    /// Containing directory id.
    pub parent_id: i64,
    /// Whether this entry is a directory.
    pub is_directory: bool,
    /// Size in bytes; zero for directories.
    pub size: u64,
    /// Owning user id.
    pub owner_id: i64,
    /// Permission bits, as a 3-digit octal string.
    pub permissions: String,
    /// Creation timestamp, as stored by the metadata store (`CURRENT_TIMESTAMP`).
    pub created_at: String,
}

/// Body of a [`crate::Opcode::SearchRequest`] frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchRequest {
    /// Directory to search under.
    pub directory_id: i64,
    /// Case-insensitive substring/glob pattern to match against entry names.
    pub pattern: String,
    /// Whether to search subdirectories recursively.
    #[serde(default)]
    pub recursive: bool,
    /// Maximum number of results, clamped to `1..=1000`. Defaults to 100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

/// Response to a [`crate::Opcode::SearchRequest`] request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResponse {
    /// Matching entries.
    pub matches: Vec<DirEntry>,
}

/// Body of a [`crate::Opcode::Rename`] frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenameRequest {
    /// Id of the file or directory to rename.
    pub file_id: i64,
    /// New name (not a full path) within the same parent directory.
    pub new_name: String,
}

/// Body of a [`crate::Opcode::Copy`] frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CopyRequest {
    /// Id of the file or directory to copy.
    pub source_id: i64,
    /// Destination parent directory id.
    pub dest_parent_id: i64,
    /// Name for the copy; defaults to the source's name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
}

/// Body of a [`crate::Opcode::Move`] frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveRequest {
    /// Id of the file or directory to move.
    pub file_id: i64,
    /// New parent directory id.
    pub new_parent_id: i64,
}

/// Response to a [`crate::Opcode::AdminListUsers`] request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminListUsersResponse {
    /// All registered accounts.
    pub users: Vec<AdminUserEntry>,
}

/// One account as reported by [`AdminListUsersResponse`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminUserEntry {
    /// Account id.
    pub user_id: i64,
    /// Account username.
    pub username: String,
    /// Whether the account has admin privileges.
    pub is_admin: bool,
}

/// Body of a [`crate::Opcode::AdminCreateUser`] frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminCreateUserRequest {
    /// Username for the new account.
    pub username: String,
    /// Raw password for the new account; the server hashes it before storing.
    pub password: String,
    /// Whether the new account should have admin privileges.
    #[serde(default)]
    pub is_admin: bool,
}

/// Body of a [`crate::Opcode::AdminDeleteUser`] frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminDeleteUserRequest {
    /// Id of the account to delete.
    pub user_id: i64,
}

/// Body of a [`crate::Opcode::AdminUpdateUser`] frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminUpdateUserRequest {
    /// Id of the account to update.
    pub user_id: i64,
    /// New admin flag.
    #[serde(default)]
    pub is_admin: bool,
    /// New active flag.
    #[serde(default)]
    pub is_active: bool,
}

/// Body of a generic [`crate::Opcode::Success`] frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SuccessResponse {
    /// Optional human-readable detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of a generic [`crate::Opcode::Error`] frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Machine-readable error kind, e.g. `"permission_denied"`.
    pub kind: String,
    /// Human-readable detail.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_request_round_trips_through_json() {
        let req = LoginRequest { username: "alice".into(), password: "hunter2".into() };
        let json = serde_json::to_vec(&req).expect("serialize");
        let back: LoginRequest = serde_json::from_slice(&json).expect("deserialize");
        assert_eq!(back, req);
    }

    #[test]
    fn login_response_omits_absent_fields() {
        let resp = LoginResponse { success: false, user_id: None, is_admin: None };
        let json = serde_json::to_string(&resp).expect("serialize");
        assert!(!json.contains("user_id"));
        assert!(!json.contains("is_admin"));
    }

    #[test]
    fn mkdir_request_parent_id_defaults_to_absent() {
        let req = MkdirRequest { name: "docs".into(), parent_id: None };
        let json = serde_json::to_string(&req).expect("serialize");
        assert!(!json.contains("parent_id"));
    }

    #[test]
    fn error_response_requires_both_fields() {
        let raw = serde_json::json!({ "kind": "not_found" });
        let err = serde_json::from_value::<ErrorResponse>(raw);
        assert!(err.is_err());
    }
}
