//! Command dispatch: decode a frame's payload, route it to a handler, and
//! turn the result (or any error) into a reply frame.
//!
//! Grounded on `dispatch_command` in the original `commands.c`: every
//! command except `login-request` requires an authenticated session, and
//! any dispatch failure becomes an `Opcode::Error` frame rather than
//! tearing down the connection.

use fileshare_proto::{Frame, Opcode, PayloadError, payloads::ErrorResponse};
use serde::de::DeserializeOwned;

use crate::{error::ServerError, handlers, handlers::HandlerContext};

fn decode<T: DeserializeOwned>(frame: &Frame) -> Result<T, ServerError> {
    serde_json::from_slice(&frame.payload).map_err(|err| ServerError::Payload(PayloadError::Malformed(err)))
}

/// Route one decoded frame to its handler, enforcing the session's
/// authentication gate first.
///
/// Always returns a frame: either the handler's success reply, or an
/// `Opcode::Error` frame carrying [`ServerError::kind`] and its message.
pub async fn dispatch(ctx: &mut HandlerContext<'_>, frame: Frame) -> Frame {
    match route(ctx, &frame) {
        Ok(reply) => reply,
        Err(err) => error_frame(&err),
    }
}

fn route(ctx: &mut HandlerContext<'_>, frame: &Frame) -> Result<Frame, ServerError> {
    let opcode = Opcode::from_u8(frame.command)
        .ok_or_else(|| ServerError::Payload(PayloadError::BadRequest("unknown command".to_string())))?;

    if opcode != Opcode::LoginRequest {
        ctx.session.require_authenticated(opcode_name(opcode))?;
    }

    match opcode {
        Opcode::LoginRequest => handlers::login(ctx, &decode(frame)?),
        Opcode::ListDir => handlers::list_dir(ctx, &decode(frame)?),
        Opcode::ChangeDir => handlers::change_dir(ctx, &decode(frame)?),
        Opcode::Mkdir => handlers::mkdir(ctx, &decode(frame)?),
        Opcode::UploadRequest => handlers::upload_request(ctx, &decode(frame)?),
        Opcode::UploadData => handlers::upload_data(ctx, &frame.payload),
        Opcode::DownloadRequest => handlers::download_request(ctx, &decode(frame)?),
        Opcode::Delete => handlers::delete(ctx, &decode(frame)?),
        Opcode::Chmod => handlers::chmod(ctx, &decode(frame)?),
        Opcode::FileInfo => handlers::file_info(ctx, &decode(frame)?),
        Opcode::SearchRequest => handlers::search(ctx, &decode(frame)?),
        Opcode::Rename => handlers::rename(ctx, &decode(frame)?),
        Opcode::Copy => handlers::copy(ctx, &decode(frame)?),
        Opcode::Move => handlers::mv(ctx, &decode(frame)?),
        Opcode::AdminListUsers => handlers::admin_list_users(ctx),
        Opcode::AdminCreateUser => handlers::admin_create_user(ctx, &decode(frame)?),
        Opcode::AdminDeleteUser => handlers::admin_delete_user(ctx, &decode(frame)?),
        Opcode::AdminUpdateUser => handlers::admin_update_user(ctx, &decode(frame)?),
        Opcode::LoginResponse
        | Opcode::DownloadResponse
        | Opcode::SearchResponse
        | Opcode::Success
        | Opcode::Error => {
            Err(ServerError::Payload(PayloadError::BadRequest("client sent a server-only command".to_string())))
        },
        _ => Err(ServerError::Payload(PayloadError::BadRequest("unknown command".to_string()))),
    }
}

fn opcode_name(opcode: Opcode) -> &'static str {
    match opcode {
        Opcode::ListDir => "list-dir",
        Opcode::ChangeDir => "change-dir",
        Opcode::Mkdir => "mkdir",
        Opcode::UploadRequest => "upload-request",
        Opcode::UploadData => "upload-data",
        Opcode::DownloadRequest => "download-request",
        Opcode::Delete => "delete",
        Opcode::Chmod => "chmod",
        Opcode::FileInfo => "file-info",
        Opcode::SearchRequest => "search",
        Opcode::Rename => "rename",
        Opcode::Copy => "copy",
        Opcode::Move => "move",
        Opcode::AdminListUsers => "admin-list-users",
        Opcode::AdminCreateUser => "admin-create-user",
        Opcode::AdminDeleteUser => "admin-delete-user",
        Opcode::AdminUpdateUser => "admin-update-user",
        _ => "command",
    }
}

fn error_frame(err: &ServerError) -> Frame {
    let body = ErrorResponse { kind: err.kind().to_string(), message: err.to_string() };
    let payload = serde_json::to_vec(&body).unwrap_or_else(|_| b"{\"kind\":\"internal\",\"message\":\"\"}".to_vec());
    Frame::new(Opcode::Error.to_u8(), payload)
}
