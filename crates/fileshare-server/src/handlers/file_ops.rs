//! `delete`, `chmod`, `file-info`, `rename`, `copy`, `move`, `search` —
//! grounded on the matching `handle_*` functions in the original
//! `commands.c` and `db_search_files`'s wildcard handling in `db_manager.c`.
//!
//! Rename, copy, and move perform no permission check in the original
//! server, and this port preserves that (see the module docs in
//! `fileshare-server::handlers`). Chmod and delete are gated on strict
//! ownership rather than permission bits.

use fileshare_proto::{
    Frame, Opcode,
    payloads::{
        ChmodRequest, CopyRequest, DeleteRequest, DirEntry, FileInfoRequest, FileInfoResponse,
        MoveRequest, RenameRequest, SearchRequest, SearchResponse, SuccessResponse,
    },
};

use super::{HandlerContext, require_owner};
use crate::error::ServerError;

/// Default result cap for search, matching the original `handle_search`'s
/// default `limit` of 100 when the client doesn't override it.
const DEFAULT_SEARCH_LIMIT: i64 = 100;
const MAX_SEARCH_LIMIT: i64 = 1000;

fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, MAX_SEARCH_LIMIT)
}

/// Translate a shell-style glob (`*`, `?`) into a SQL `LIKE` pattern,
/// escaping any literal `%`, `_`, or `\` the caller embedded, matching
/// `convert_wildcard_pattern` in the original metadata store.
fn to_sql_pattern(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '*' => out.push('%'),
            '?' => out.push('_'),
            '%' | '_' | '\\' => {
                out.push('\\');
                out.push(ch);
            },
            other => out.push(other),
        }
    }
    out
}

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

/// Delete a file or directory entry. Regular files also have their blob
/// removed; directories never had one.
///
/// # Errors
///
/// [`ServerError::FileNotFound`] if `file_id` doesn't exist, or
/// [`ServerError::PermissionDenied`] if the caller doesn't own the entry.
pub fn delete(ctx: &mut HandlerContext<'_>, req: &DeleteRequest) -> Result<Frame, ServerError> {
    let record = ctx.store.get_file_by_id(req.file_id)?.ok_or(ServerError::FileNotFound(req.file_id))?;
    require_owner(ctx, record.owner_id)?;

    ctx.store.delete_file(req.file_id)?;
    if !record.is_directory {
        if let Some(blob_id) = &record.physical_path {
            let _ = ctx.blobs.delete(blob_id);
        }
    }

    ctx.store.log_activity(&fileshare_core::model::ActivityLogEntry {
        user_id: ctx.user_id(),
        action_type: "DELETE".to_string(),
        description: record.name,
    })?;

    let payload = serde_json::to_vec(&SuccessResponse::default()).map_err(fileshare_proto::PayloadError::from)?;
    Ok(Frame::new(Opcode::Success.to_u8(), payload))
}

/// Change a file or directory's permission bits.
///
/// # Errors
///
/// [`ServerError::FileNotFound`] if `file_id` doesn't exist,
/// [`ServerError::PermissionDenied`] if the caller doesn't own the entry,
/// or [`ServerError::Payload`] if `permissions` is malformed.
pub fn chmod(ctx: &mut HandlerContext<'_>, req: &ChmodRequest) -> Result<Frame, ServerError> {
    let record = ctx.store.get_file_by_id(req.file_id)?.ok_or(ServerError::FileNotFound(req.file_id))?;
    require_owner(ctx, record.owner_id)?;

    let mode = fileshare_core::perm::parse_permissions(&req.permissions)
        .map_err(|err| ServerError::Payload(fileshare_proto::PayloadError::BadRequest(err.to_string())))?;
    ctx.store.update_permissions(req.file_id, mode)?;

    ctx.store.log_activity(&fileshare_core::model::ActivityLogEntry {
        user_id: ctx.user_id(),
        action_type: "CHMOD".to_string(),
        description: record.name,
    })?;

    let payload = serde_json::to_vec(&SuccessResponse {
        message: Some(fileshare_core::perm::format_permissions(mode)),
    })
    .map_err(fileshare_proto::PayloadError::from)?;
    Ok(Frame::new(Opcode::Success.to_u8(), payload))
}

/// Describe a file or directory.
///
/// # Errors
///
/// [`ServerError::FileNotFound`] if `file_id` doesn't exist.
pub fn file_info(ctx: &mut HandlerContext<'_>, req: &FileInfoRequest) -> Result<Frame, ServerError> {
    let record = ctx.store.get_file_by_id(req.file_id)?.ok_or(ServerError::FileNotFound(req.file_id))?;

    let body = FileInfoResponse {
        file_id: record.id,
        name: record.name,
        parent_id: record.parent_id,
        is_directory: record.is_directory,
        size: record.size.max(0) as u64,
        owner_id: record.owner_id,
        permissions: fileshare_core::perm::format_permissions(record.permissions),
        created_at: record.created_at,
    };
    let payload = serde_json::to_vec(&body).map_err(fileshare_proto::PayloadError::from)?;
    Ok(Frame::new(Opcode::Success.to_u8(), payload))
}

/// Rename a file or directory in place. No permission check, matching the
/// original `handle_rename`.
///
/// # Errors
///
/// [`ServerError::Storage`] with [`crate::storage::StorageError::NotFound`]
/// if `file_id` doesn't exist.
pub fn rename(ctx: &mut HandlerContext<'_>, req: &RenameRequest) -> Result<Frame, ServerError> {
    ctx.store.rename_file(req.file_id, &req.new_name)?;

    ctx.store.log_activity(&fileshare_core::model::ActivityLogEntry {
        user_id: ctx.user_id(),
        action_type: "RENAME".to_string(),
        description: format!("Renamed file {} to '{}'", req.file_id, req.new_name),
    })?;

    let payload = serde_json::to_vec(&SuccessResponse {
        message: Some("File renamed successfully".to_string()),
    })
    .map_err(fileshare_proto::PayloadError::from)?;
    Ok(Frame::new(Opcode::Success.to_u8(), payload))
}

/// Duplicate a metadata row under a new parent/name. No permission check
/// and no blob duplication, matching the original `handle_copy`/`db_copy_file`.
///
/// # Errors
///
/// [`ServerError::Storage`] with [`crate::storage::StorageError::NotFound`]
/// if `source_id` doesn't exist.
pub fn copy(ctx: &mut HandlerContext<'_>, req: &CopyRequest) -> Result<Frame, ServerError> {
    let new_id = ctx.store.copy_file(
        req.source_id,
        req.dest_parent_id,
        req.new_name.as_deref(),
        ctx.user_id(),
    )?;

    ctx.store.log_activity(&fileshare_core::model::ActivityLogEntry {
        user_id: ctx.user_id(),
        action_type: "COPY".to_string(),
        description: format!("Copied file {} to parent {} (new id: {new_id})", req.source_id, req.dest_parent_id),
    })?;

    let payload = serde_json::to_vec(&SuccessResponse {
        message: Some(format!("File copied successfully (new_id={new_id})")),
    })
    .map_err(fileshare_proto::PayloadError::from)?;
    Ok(Frame::new(Opcode::Success.to_u8(), payload))
}

/// Move a file or directory to a new parent. No permission check, matching
/// the original `handle_move`.
///
/// # Errors
///
/// [`ServerError::Storage`] with [`crate::storage::StorageError::NotFound`]
/// if `file_id` doesn't exist.
pub fn mv(ctx: &mut HandlerContext<'_>, req: &MoveRequest) -> Result<Frame, ServerError> {
    ctx.store.move_file(req.file_id, req.new_parent_id)?;

    ctx.store.log_activity(&fileshare_core::model::ActivityLogEntry {
        user_id: ctx.user_id(),
        action_type: "MOVE".to_string(),
        description: format!("Moved file {} to parent {}", req.file_id, req.new_parent_id),
    })?;

    let payload = serde_json::to_vec(&SuccessResponse {
        message: Some("File moved successfully".to_string()),
    })
    .map_err(fileshare_proto::PayloadError::from)?;
    Ok(Frame::new(Opcode::Success.to_u8(), payload))
}

/// Search the tree under `directory_id` for names matching `pattern`.
///
/// # Errors
///
/// [`ServerError::Payload`] if `pattern` is empty or overly broad (bare
/// `*`, matching the original's rejection of unqualified wildcard searches).
pub fn search(ctx: &mut HandlerContext<'_>, req: &SearchRequest) -> Result<Frame, ServerError> {
    if req.pattern.is_empty() || req.pattern == "*" {
        return Err(ServerError::Payload(fileshare_proto::PayloadError::BadRequest(
            "search pattern must not be empty or unqualified".to_string(),
        )));
    }

    let sql_pattern = format!("%{}%", to_sql_pattern(&req.pattern));
    let limit = clamp_limit(req.limit);
    let records = ctx.store.search_files(req.directory_id, &sql_pattern, req.recursive, limit)?;

    ctx.store.log_activity(&fileshare_core::model::ActivityLogEntry {
        user_id: ctx.user_id(),
        action_type: "SEARCH".to_string(),
        description: format!(
            "Searched for '{}' (recursive={}, found={})",
            req.pattern,
            req.recursive,
            records.len()
        ),
    })?;

    let body = SearchResponse { matches: records.iter().map(record_to_entry).collect() };
    let payload = serde_json::to_vec(&body).map_err(fileshare_proto::PayloadError::from)?;
    Ok(Frame::new(Opcode::SearchResponse.to_u8(), payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcards_translate_and_escape() {
        assert_eq!(to_sql_pattern("rep*rt_1?.pdf"), "rep%rt\\_1_.pdf");
        assert_eq!(to_sql_pattern("100%"), "100\\%");
    }

    #[test]
    fn limit_is_clamped_into_range() {
        assert_eq!(clamp_limit(None), DEFAULT_SEARCH_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(5000)), MAX_SEARCH_LIMIT);
        assert_eq!(clamp_limit(Some(42)), 42);
    }
}
