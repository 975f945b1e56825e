//! `login-request` — grounded on `handle_login` in the original `commands.c`.

use fileshare_core::model::ActivityLogEntry;
use fileshare_proto::{Frame, Opcode, payloads::LoginRequest};

use super::HandlerContext;
use crate::error::ServerError;

/// Verify credentials and, on success, move the session to `Authenticated`.
///
/// # Errors
///
/// [`ServerError::InvalidCredentials`] if the username is unknown, the
/// account is inactive, or the password hash does not match.
pub fn login(ctx: &mut HandlerContext<'_>, req: &LoginRequest) -> Result<Frame, ServerError> {
    let password_hash = fileshare_core::hash_password(&req.password);
    let user_id =
        ctx.store.verify_user(&req.username, &password_hash)?.ok_or(ServerError::InvalidCredentials)?;

    let is_admin = ctx.store.is_admin(user_id)?;
    ctx.session.authenticate(user_id, is_admin);

    ctx.store.log_activity(&ActivityLogEntry {
        user_id,
        action_type: "LOGIN".to_string(),
        description: "User logged in successfully".to_string(),
    })?;

    let body = fileshare_proto::payloads::LoginResponse {
        success: true,
        user_id: Some(user_id),
        is_admin: Some(is_admin),
    };
    let payload = serde_json::to_vec(&body).map_err(fileshare_proto::PayloadError::from)?;
    Ok(Frame::new(Opcode::LoginResponse.to_u8(), payload))
}
