//! Admin-only user management — grounded on `handle_admin_delete_user` and
//! `handle_admin_update_user` in the original `commands.c`. There is no
//! `handle_admin_list_users`/`handle_admin_create_user` in the original
//! (user creation there is a CLI-only operation against the database); both
//! are added here as a natural counterpart, in the same style.

use fileshare_proto::{
    Frame, Opcode,
    payloads::{
        AdminCreateUserRequest, AdminDeleteUserRequest, AdminListUsersResponse, AdminUpdateUserRequest,
        AdminUserEntry, SuccessResponse,
    },
};

use super::HandlerContext;
use crate::error::ServerError;

fn require_admin(ctx: &HandlerContext<'_>) -> Result<(), ServerError> {
    if ctx.store.is_admin(ctx.user_id())? {
        Ok(())
    } else {
        Err(ServerError::PermissionDenied)
    }
}

/// List every registered account.
///
/// # Errors
///
/// [`ServerError::PermissionDenied`] if the caller is not an admin.
pub fn admin_list_users(ctx: &mut HandlerContext<'_>) -> Result<Frame, ServerError> {
    require_admin(ctx)?;

    let users = ctx
        .store
        .list_users()?
        .into_iter()
        .map(|user| AdminUserEntry { user_id: user.id, username: user.username, is_admin: user.is_admin })
        .collect();

    let payload = serde_json::to_vec(&AdminListUsersResponse { users })
        .map_err(fileshare_proto::PayloadError::from)?;
    Ok(Frame::new(Opcode::Success.to_u8(), payload))
}

/// Create a new account.
///
/// # Errors
///
/// [`ServerError::PermissionDenied`] if the caller is not an admin, or
/// [`ServerError::Storage`] if the username is already taken.
pub fn admin_create_user(ctx: &mut HandlerContext<'_>, req: &AdminCreateUserRequest) -> Result<Frame, ServerError> {
    require_admin(ctx)?;

    let password_hash = fileshare_core::hash_password(&req.password);
    let new_id = ctx.store.create_user_admin(&req.username, &password_hash, req.is_admin)?;

    ctx.store.log_activity(&fileshare_core::model::ActivityLogEntry {
        user_id: ctx.user_id(),
        action_type: "ADMIN_CREATE_USER".to_string(),
        description: format!("Created user '{}' (id={new_id})", req.username),
    })?;

    let payload = serde_json::to_vec(&SuccessResponse {
        message: Some(format!("User created successfully (id={new_id})")),
    })
    .map_err(fileshare_proto::PayloadError::from)?;
    Ok(Frame::new(Opcode::Success.to_u8(), payload))
}

/// Delete an account. Admins cannot delete themselves; the primary admin
/// (user id 1) cannot be deleted at all.
///
/// # Errors
///
/// [`ServerError::PermissionDenied`] if the caller is not an admin or is
/// targeting their own account, or [`ServerError::Storage`] with
/// [`crate::storage::StorageError::ProtectedAccount`] for user id 1.
pub fn admin_delete_user(ctx: &mut HandlerContext<'_>, req: &AdminDeleteUserRequest) -> Result<Frame, ServerError> {
    require_admin(ctx)?;

    if req.user_id == ctx.user_id() {
        return Err(ServerError::PermissionDenied);
    }

    let target = ctx.store.get_user_by_id(req.user_id)?.ok_or(ServerError::UserNotFound(req.user_id))?;
    ctx.store.delete_user(req.user_id)?;

    ctx.store.log_activity(&fileshare_core::model::ActivityLogEntry {
        user_id: ctx.user_id(),
        action_type: "ADMIN_DELETE_USER".to_string(),
        description: format!("Deleted user '{}' (id={})", target.username, req.user_id),
    })?;

    let payload = serde_json::to_vec(&SuccessResponse {
        message: Some("User deleted successfully".to_string()),
    })
    .map_err(fileshare_proto::PayloadError::from)?;
    Ok(Frame::new(Opcode::Success.to_u8(), payload))
}

/// Update an account's admin/active flags. Fields absent from the request
/// default to `false`, matching the original's `handle_admin_update_user`
/// defaults for a JSON object with missing keys.
///
/// # Errors
///
/// [`ServerError::PermissionDenied`] if the caller is not an admin, or
/// [`ServerError::Storage`] with [`crate::storage::StorageError::ProtectedAccount`]
/// when this would strip admin privileges from user id 1.
pub fn admin_update_user(ctx: &mut HandlerContext<'_>, req: &AdminUpdateUserRequest) -> Result<Frame, ServerError> {
    require_admin(ctx)?;

    let target = ctx.store.get_user_by_id(req.user_id)?.ok_or(ServerError::UserNotFound(req.user_id))?;
    ctx.store.update_user(req.user_id, req.is_admin, req.is_active)?;

    ctx.store.log_activity(&fileshare_core::model::ActivityLogEntry {
        user_id: ctx.user_id(),
        action_type: "ADMIN_UPDATE_USER".to_string(),
        description: format!(
            "Updated user '{}' (id={}, is_admin={}, is_active={})",
            target.username, req.user_id, req.is_admin, req.is_active
        ),
    })?;

    let payload = serde_json::to_vec(&SuccessResponse {
        message: Some("User updated successfully".to_string()),
    })
    .map_err(fileshare_proto::PayloadError::from)?;
    Ok(Frame::new(Opcode::Success.to_u8(), payload))
}
