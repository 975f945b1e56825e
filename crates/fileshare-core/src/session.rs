//! Per-connection session state machine.
//!
//! ```text
//! ┌───────────┐  login-request   ┌───────────────┐
//! │ Connected │─────────────────>│ Authenticated │
//! └───────────┘   (success)      └───────────────┘
//!       │                              │   ^
//!       │ any other command            │   │ upload-data
//!       │ (error, stays Connected)     │   │ consumed
//!       ↓                      upload- │   │
//!  (connection stays open,     request │   │
//!   error reply sent)                  ↓   │
//!                                ┌─────────────┐
//!                                │ Transferring │
//!                                └─────────────┘
//! ```
//!
//! This is a pure state machine: no I/O, no socket handle. The surrounding
//! dispatcher in `fileshare-server` drives it from decoded frames.

use crate::error::SessionError;

/// Directory id the share root is addressed by, and the session's initial
/// current directory.
pub const ROOT_DIRECTORY_ID: i64 = 0;

/// Lifecycle state of one client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// TCP connection accepted, no successful login yet.
    Connected,
    /// Login succeeded; commands other than upload-data are accepted.
    Authenticated,
    /// An upload-request was accepted; the next frame must be upload-data.
    Transferring,
    /// The connection has been torn down.
    Disconnected,
}

/// An upload announced by `upload-request`, awaiting its `upload-data` frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    /// Opaque blob id reserved for the file being uploaded.
    pub blob_id: String,
    /// Declared size in bytes, as announced by the client.
    pub expected_size: u64,
}

/// Mutable per-connection state: authentication, current directory, and any
/// upload in flight.
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    user_id: Option<i64>,
    is_admin: bool,
    current_directory: i64,
    pending_upload: Option<PendingUpload>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a freshly connected session rooted at the share root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SessionState::Connected,
            user_id: None,
            is_admin: false,
            current_directory: ROOT_DIRECTORY_ID,
            pending_upload: None,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Authenticated user id, `None` before login succeeds.
    #[must_use]
    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    /// Whether the authenticated account has admin privileges.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Session's current directory id.
    #[must_use]
    pub fn current_directory(&self) -> i64 {
        self.current_directory
    }

    /// Set the session's current directory id.
    ///
    /// The session does not validate that `directory_id` exists; that is
    /// the dispatcher's responsibility (it owns the metadata store).
    pub fn set_current_directory(&mut self, directory_id: i64) {
        self.current_directory = directory_id;
    }

    /// Record a successful login, moving `Connected` to `Authenticated` and
    /// resetting the current directory to the share root.
    ///
    /// Calling this again after authentication (e.g. on a stray second
    /// login-request) just overwrites the identity and stays authenticated;
    /// it does not re-validate the prior state, matching the permissive
    /// `dispatch_command` behavior in the original implementation.
    pub fn authenticate(&mut self, user_id: i64, is_admin: bool) {
        self.user_id = Some(user_id);
        self.is_admin = is_admin;
        self.current_directory = ROOT_DIRECTORY_ID;
        self.state = SessionState::Authenticated;
    }

    /// Require that the session has completed login.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotAuthenticated`] if the session is still
    /// `Connected` or has been `Disconnected`.
    pub fn require_authenticated(&self, operation: &str) -> Result<(), SessionError> {
        match self.state {
            SessionState::Authenticated | SessionState::Transferring => Ok(()),
            SessionState::Connected | SessionState::Disconnected => {
                Err(SessionError::NotAuthenticated { state: self.state, operation: operation.to_string() })
            },
        }
    }

    /// Announce an upload, moving `Authenticated` to `Transferring`.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotAuthenticated`] if not yet logged in.
    /// - [`SessionError::UploadAlreadyPending`] if an upload is already in flight.
    pub fn begin_upload(&mut self, blob_id: impl Into<String>, expected_size: u64) -> Result<(), SessionError> {
        self.require_authenticated("upload-request")?;
        if self.pending_upload.is_some() {
            return Err(SessionError::UploadAlreadyPending);
        }
        self.pending_upload = Some(PendingUpload { blob_id: blob_id.into(), expected_size });
        self.state = SessionState::Transferring;
        Ok(())
    }

    /// Consume the pending upload, moving `Transferring` back to `Authenticated`.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoPendingUpload`] if no upload-request preceded this call.
    pub fn take_pending_upload(&mut self) -> Result<PendingUpload, SessionError> {
        let pending = self.pending_upload.take().ok_or(SessionError::NoPendingUpload)?;
        self.state = SessionState::Authenticated;
        Ok(pending)
    }

    /// Tear the session down. Idempotent.
    pub fn disconnect(&mut self) {
        self.state = SessionState::Disconnected;
        self.pending_upload = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_connected_and_unauthenticated() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Connected);
        assert_eq!(session.user_id(), None);
        assert_eq!(session.current_directory(), ROOT_DIRECTORY_ID);
    }

    #[test]
    fn unauthenticated_commands_are_rejected() {
        let session = Session::new();
        assert!(matches!(
            session.require_authenticated("list-dir"),
            Err(SessionError::NotAuthenticated { state: SessionState::Connected, .. })
        ));
    }

    #[test]
    fn login_moves_to_authenticated() {
        let mut session = Session::new();
        session.authenticate(7, false);
        assert_eq!(session.state(), SessionState::Authenticated);
        assert_eq!(session.user_id(), Some(7));
        assert!(session.require_authenticated("list-dir").is_ok());
    }

    #[test]
    fn upload_round_trip() {
        let mut session = Session::new();
        session.authenticate(1, false);
        session.begin_upload("blob-report", 1024).expect("begin upload");
        assert_eq!(session.state(), SessionState::Transferring);

        let pending = session.take_pending_upload().expect("pending upload");
        assert_eq!(pending.blob_id, "blob-report");
        assert_eq!(pending.expected_size, 1024);
        assert_eq!(session.state(), SessionState::Authenticated);
    }

    #[test]
    fn upload_requires_authentication() {
        let mut session = Session::new();
        assert!(matches!(
            session.begin_upload("blob-x", 0),
            Err(SessionError::NotAuthenticated { .. })
        ));
    }

    #[test]
    fn second_upload_request_while_pending_is_rejected() {
        let mut session = Session::new();
        session.authenticate(1, false);
        session.begin_upload("blob-a", 10).expect("first upload");
        assert!(matches!(session.begin_upload("blob-b", 20), Err(SessionError::UploadAlreadyPending)));
    }

    #[test]
    fn upload_data_without_request_is_rejected() {
        let mut session = Session::new();
        session.authenticate(1, false);
        assert!(matches!(session.take_pending_upload(), Err(SessionError::NoPendingUpload)));
    }

    #[test]
    fn disconnect_clears_pending_upload() {
        let mut session = Session::new();
        session.authenticate(1, false);
        session.begin_upload("blob-a", 10).expect("begin upload");
        session.disconnect();
        assert_eq!(session.state(), SessionState::Disconnected);
    }
}
