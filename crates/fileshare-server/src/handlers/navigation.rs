//! `list-dir`, `change-dir`, `mkdir` — grounded on `handle_list_dir`,
//! `handle_change_dir`, and `handle_mkdir` in the original `commands.c`.

use fileshare_core::perm::Access;
use fileshare_proto::{
    Frame, Opcode,
    payloads::{ChangeDirRequest, DirEntry, ListDirRequest, ListDirResponse, MkdirRequest, SuccessResponse},
};

use super::{HandlerContext, require_access};
use crate::{error::ServerError, storage::DEFAULT_DIR_PERMISSIONS};

fn record_to_entry(record: &fileshare_core::model::FileRecord) -> DirEntry {
    DirEntry {
        file_id: record.id,
        name: record.name.clone(),
        is_directory: record.is_directory,
        size: record.size.max(0) as u64,
        owner_id: record.owner_id,
        permissions: fileshare_core::perm::format_permissions(record.permissions),
    }
}

/// List the direct children of a directory.
///
/// # Errors
///
/// [`ServerError::PermissionDenied`] if the caller lacks read access.
pub fn list_dir(ctx: &mut HandlerContext<'_>, req: &ListDirRequest) -> Result<Frame, ServerError> {
    let dir_id = req.directory_id.unwrap_or_else(|| ctx.session.current_directory());
    require_access(ctx, dir_id, Access::Read)?;

    let entries = ctx.store.list_directory(dir_id)?.iter().map(record_to_entry).collect();
    let body = ListDirResponse { entries };
    let payload = serde_json::to_vec(&body).map_err(fileshare_proto::PayloadError::from)?;
    Ok(Frame::new(Opcode::Success.to_u8(), payload))
}

/// Change the session's current directory.
///
/// # Errors
///
/// [`ServerError::FileNotFound`] if `directory_id` doesn't exist, or
/// [`ServerError::PermissionDenied`] if the caller lacks execute access.
pub fn change_dir(ctx: &mut HandlerContext<'_>, req: &ChangeDirRequest) -> Result<Frame, ServerError> {
    require_access(ctx, req.directory_id, Access::Execute)?;

    ctx.session.set_current_directory(req.directory_id);
    let payload = serde_json::to_vec(&SuccessResponse::default()).map_err(fileshare_proto::PayloadError::from)?;
    Ok(Frame::new(Opcode::Success.to_u8(), payload))
}

/// Create a directory entry under `parent_id` (or the session's current
/// directory if absent).
///
/// # Errors
///
/// [`ServerError::PermissionDenied`] if the caller lacks write access on
/// the parent.
pub fn mkdir(ctx: &mut HandlerContext<'_>, req: &MkdirRequest) -> Result<Frame, ServerError> {
    let parent_id = req.parent_id.unwrap_or_else(|| ctx.session.current_directory());
    require_access(ctx, parent_id, Access::Write)?;

    let new_id =
        ctx.store.create_file(parent_id, &req.name, None, ctx.user_id(), 0, true, DEFAULT_DIR_PERMISSIONS)?;

    ctx.store.log_activity(&fileshare_core::model::ActivityLogEntry {
        user_id: ctx.user_id(),
        action_type: "MAKE_DIR".to_string(),
        description: req.name.clone(),
    })?;

    let created = ctx.store.get_file_by_id(new_id)?.ok_or(ServerError::FileNotFound(new_id))?;
    let body = fileshare_proto::payloads::FileInfoResponse {
        file_id: new_id,
        name: req.name.clone(),
        parent_id,
        is_directory: true,
        size: 0,
        owner_id: ctx.user_id(),
        permissions: fileshare_core::perm::format_permissions(DEFAULT_DIR_PERMISSIONS),
        created_at: created.created_at,
    };
    let payload = serde_json::to_vec(&body).map_err(fileshare_proto::PayloadError::from)?;
    Ok(Frame::new(Opcode::Success.to_u8(), payload))
}
