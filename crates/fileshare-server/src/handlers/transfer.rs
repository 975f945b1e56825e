//! `upload-request`, `upload-data`, `download-request` — grounded on
//! `handle_upload_req`, `handle_upload_data`, and `handle_download` in the
//! original `commands.c`.
//!
//! The blob id is reserved and recorded on the file's metadata row at
//! `upload-request` time, before any bytes exist on disk — matching the
//! original, which stores the freshly generated UUID as `physical_path`
//! immediately and remembers it on the session (`pending_upload_uuid`) so
//! `upload-data` never needs to look the file back up by name. If
//! `upload-data` never arrives or fails, that row is left behind
//! referencing a blob that was never written (see the module docs in
//! `fileshare-server::handlers` on this preserved Open Question).

use fileshare_core::perm::Access;
use fileshare_proto::{
    Frame, Opcode,
    payloads::{DownloadRequest, SuccessResponse, UploadRequest},
};

use super::{HandlerContext, require_access};
use crate::{error::ServerError, storage::DEFAULT_FILE_PERMISSIONS};

/// Announce an upload: reserve a blob id, create the file's metadata row,
/// and move the session into `Transferring`.
///
/// # Errors
///
/// [`ServerError::PermissionDenied`] if the caller lacks write access on
/// the parent, or [`ServerError::Session`] if an upload is already pending.
pub fn upload_request(ctx: &mut HandlerContext<'_>, req: &UploadRequest) -> Result<Frame, ServerError> {
    let parent_id = req.parent_id.unwrap_or_else(|| ctx.session.current_directory());
    require_access(ctx, parent_id, Access::Write)?;

    let blob_id = crate::storage::BlobStore::new_blob_id();
    ctx.store.create_file(
        parent_id,
        &req.name,
        Some(&blob_id),
        ctx.user_id(),
        req.size as i64,
        false,
        DEFAULT_FILE_PERMISSIONS,
    )?;

    ctx.session.begin_upload(blob_id.clone(), req.size)?;

    let payload = serde_json::to_vec(&SuccessResponse { message: Some(blob_id) })
        .map_err(fileshare_proto::PayloadError::from)?;
    Ok(Frame::new(Opcode::Success.to_u8(), payload))
}

/// Accept the raw bytes of a previously announced upload.
///
/// # Errors
///
/// [`ServerError::Session`] if no upload is pending or the size doesn't
/// match what was declared in `upload-request`.
pub fn upload_data(ctx: &mut HandlerContext<'_>, data: &[u8]) -> Result<Frame, ServerError> {
    let pending = ctx.session.take_pending_upload()?;

    if data.len() as u64 != pending.expected_size {
        return Err(ServerError::Payload(fileshare_proto::PayloadError::BadRequest(
            "upload-data length does not match the declared size".to_string(),
        )));
    }

    ctx.blobs.write_with_id(&pending.blob_id, data)?;

    ctx.store.log_activity(&fileshare_core::model::ActivityLogEntry {
        user_id: ctx.user_id(),
        action_type: "UPLOAD".to_string(),
        description: pending.blob_id,
    })?;

    let payload = serde_json::to_vec(&SuccessResponse {
        message: Some("File uploaded successfully".to_string()),
    })
    .map_err(fileshare_proto::PayloadError::from)?;
    Ok(Frame::new(Opcode::Success.to_u8(), payload))
}

/// Read a file's bytes for download.
///
/// # Errors
///
/// [`ServerError::FileNotFound`] if `file_id` doesn't exist, if it names a
/// directory, or if no blob backs it (a failed upload left a phantom
/// metadata row). [`ServerError::PermissionDenied`] if the caller lacks
/// read access.
pub fn download_request(ctx: &mut HandlerContext<'_>, req: &DownloadRequest) -> Result<Frame, ServerError> {
    require_access(ctx, req.file_id, Access::Read)?;

    let record = ctx.store.get_file_by_id(req.file_id)?.ok_or(ServerError::FileNotFound(req.file_id))?;
    if record.is_directory {
        return Err(ServerError::FileNotFound(req.file_id));
    }
    let blob_id = record.physical_path.ok_or(ServerError::FileNotFound(req.file_id))?;

    let data = ctx.blobs.read(&blob_id)?;

    ctx.store.log_activity(&fileshare_core::model::ActivityLogEntry {
        user_id: ctx.user_id(),
        action_type: "DOWNLOAD".to_string(),
        description: record.name,
    })?;

    Ok(Frame::new(Opcode::DownloadResponse.to_u8(), data))
}
