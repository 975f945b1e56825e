//! Command codes carried in the one-byte `CMD` field of every frame.

/// A single wire command code.
///
/// Every request and response is tagged with one of these. Unknown bytes
/// decode to `None` via [`Opcode::from_u8`] rather than panicking, since a
/// peer may speak a newer or malformed protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Opcode {
    /// Client login attempt.
    LoginRequest,
    /// Server reply to a login attempt.
    LoginResponse,
    /// List the contents of a directory.
    ListDir,
    /// Change the session's current directory.
    ChangeDir,
    /// Create a directory.
    Mkdir,
    /// Announce an upcoming file upload.
    UploadRequest,
    /// The raw bytes of a previously announced upload.
    UploadData,
    /// Request the bytes of a file.
    DownloadRequest,
    /// The raw bytes of a requested file.
    DownloadResponse,
    /// Remove a file or directory.
    Delete,
    /// Change a file's permission bits.
    Chmod,
    /// Request metadata about one file.
    FileInfo,
    /// Search the tree for names matching a pattern.
    SearchRequest,
    /// Reply to a search request.
    SearchResponse,
    /// Rename a file or directory in place.
    Rename,
    /// Duplicate a file or directory under a new parent/name.
    Copy,
    /// Move a file or directory to a new parent.
    Move,
    /// Admin: list all users.
    AdminListUsers,
    /// Admin: create a user.
    AdminCreateUser,
    /// Admin: delete a user.
    AdminDeleteUser,
    /// Admin: update a user's flags.
    AdminUpdateUser,
    /// Generic success acknowledgement.
    Success,
    /// Generic error response.
    Error,
}

impl Opcode {
    /// Encode this opcode as its one-byte wire representation.
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        match self {
            Self::LoginRequest => 0x01,
            Self::LoginResponse => 0x02,
            Self::ListDir => 0x10,
            Self::ChangeDir => 0x11,
            Self::Mkdir => 0x12,
            Self::UploadRequest => 0x20,
            Self::UploadData => 0x21,
            Self::DownloadRequest => 0x30,
            Self::DownloadResponse => 0x31,
            Self::Delete => 0x40,
            Self::Chmod => 0x41,
            Self::FileInfo => 0x42,
            Self::SearchRequest => 0x43,
            Self::SearchResponse => 0x44,
            Self::Rename => 0x45,
            Self::Copy => 0x46,
            Self::Move => 0x47,
            Self::AdminListUsers => 0x50,
            Self::AdminCreateUser => 0x51,
            Self::AdminDeleteUser => 0x52,
            Self::AdminUpdateUser => 0x53,
            Self::Success => 0xFE,
            Self::Error => 0xFF,
        }
    }

    /// Decode a one-byte wire command code. `None` for unrecognized bytes.
    #[must_use]
    pub const fn from_u8(byte: u8) -> Option<Self> {
        Some(match byte {
            0x01 => Self::LoginRequest,
            0x02 => Self::LoginResponse,
            0x10 => Self::ListDir,
            0x11 => Self::ChangeDir,
            0x12 => Self::Mkdir,
            0x20 => Self::UploadRequest,
            0x21 => Self::UploadData,
            0x30 => Self::DownloadRequest,
            0x31 => Self::DownloadResponse,
            0x40 => Self::Delete,
            0x41 => Self::Chmod,
            0x42 => Self::FileInfo,
            0x43 => Self::SearchRequest,
            0x44 => Self::SearchResponse,
            0x45 => Self::Rename,
            0x46 => Self::Copy,
            0x47 => Self::Move,
            0x50 => Self::AdminListUsers,
            0x51 => Self::AdminCreateUser,
            0x52 => Self::AdminDeleteUser,
            0x53 => Self::AdminUpdateUser,
            0xFE => Self::Success,
            0xFF => Self::Error,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[Opcode] = &[
        Opcode::LoginRequest,
        Opcode::LoginResponse,
        Opcode::ListDir,
        Opcode::ChangeDir,
        Opcode::Mkdir,
        Opcode::UploadRequest,
        Opcode::UploadData,
        Opcode::DownloadRequest,
        Opcode::DownloadResponse,
        Opcode::Delete,
        Opcode::Chmod,
        Opcode::FileInfo,
        Opcode::SearchRequest,
        Opcode::SearchResponse,
        Opcode::Rename,
        Opcode::Copy,
        Opcode::Move,
        Opcode::AdminListUsers,
        Opcode::AdminCreateUser,
        Opcode::AdminDeleteUser,
        Opcode::AdminUpdateUser,
        Opcode::Success,
        Opcode::Error,
    ];

    #[test]
    fn round_trip_every_opcode() {
        for op in ALL {
            assert_eq!(Opcode::from_u8(op.to_u8()), Some(*op));
        }
    }

    #[test]
    fn unknown_byte_is_none() {
        assert_eq!(Opcode::from_u8(0x99), None);
    }

    #[test]
    fn wire_values_match_spec() {
        assert_eq!(Opcode::LoginRequest.to_u8(), 0x01);
        assert_eq!(Opcode::UploadData.to_u8(), 0x21);
        assert_eq!(Opcode::Success.to_u8(), 0xFE);
        assert_eq!(Opcode::Error.to_u8(), 0xFF);
    }
}
