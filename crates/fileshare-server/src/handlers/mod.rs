//! Command handlers: one function per wire command, each translating a
//! decoded payload into metadata-store/blob-store operations and a response
//! frame.
//!
//! Every handler is grounded on the matching function in the original
//! `commands.c` (e.g. [`auth::login`] on `handle_login`), preserving its
//! permission checks, its ordering of side effects, and the Open Questions
//! documented in `DESIGN.md` (copy does not duplicate blobs, rename/move
//! perform no permission check, no sibling name-uniqueness enforcement,
//! failed uploads leave a phantom metadata row).

mod admin;
mod auth;
mod file_ops;
mod navigation;
mod transfer;

pub use admin::{admin_create_user, admin_delete_user, admin_list_users, admin_update_user};
pub use auth::login;
pub use file_ops::{chmod, copy, delete, file_info, mv, rename, search};
pub use navigation::{change_dir, list_dir, mkdir};
pub use transfer::{download_request, upload_data, upload_request};

use fileshare_core::{Session, perm::Access};

use crate::{
    error::ServerError,
    storage::{BlobStore, MetadataStore, ROOT_ID},
};

/// Shared handles every handler needs: the stores and the caller's session.
pub struct HandlerContext<'a> {
    /// Metadata store (users, files, activity log).
    pub store: &'a MetadataStore,
    /// Sharded on-disk blob store.
    pub blobs: &'a BlobStore,
    /// The calling connection's session state.
    pub session: &'a mut Session,
}

impl<'a> HandlerContext<'a> {
    /// Current authenticated user id.
    ///
    /// # Panics
    ///
    /// Panics if called before authentication; the dispatcher only routes
    /// to handlers after `Session::require_authenticated` succeeds.
    pub(crate) fn user_id(&self) -> i64 {
        self.session.user_id().expect("handlers run only on authenticated sessions")
    }
}

/// Check `access` on `file_id`, resolving its owner/permission bits first.
///
/// The share root (id 0) is accessible to every authenticated user
/// regardless of bits, matching `check_permission`'s root special case in
/// the original server.
pub(crate) fn require_access(ctx: &HandlerContext<'_>, file_id: i64, access: Access) -> Result<(), ServerError> {
    if file_id == ROOT_ID {
        return Ok(());
    }
    let record = ctx.store.get_file_by_id(file_id)?.ok_or(ServerError::FileNotFound(file_id))?;
    if fileshare_core::perm::may(ctx.user_id(), record.owner_id, record.permissions, access) {
        Ok(())
    } else {
        Err(ServerError::PermissionDenied)
    }
}

/// Require that `record.owner_id` matches the caller, for operations the
/// original server gates on strict ownership rather than permission bits
/// (chmod, delete).
pub(crate) fn require_owner(ctx: &HandlerContext<'_>, owner_id: i64) -> Result<(), ServerError> {
    if owner_id == ctx.user_id() {
        Ok(())
    } else {
        Err(ServerError::PermissionDenied)
    }
}
