//! SQLite-backed metadata store: users, the share tree, and activity logs.
//!
//! Grounded directly on the original `db_manager.c`: same schema shape, same
//! WAL pragma, same single-exclusive-lock concurrency model (here a
//! `std::sync::Mutex` around one `rusqlite::Connection` rather than a
//! pthread mutex around one `sqlite3*`), and the same query shapes for
//! search, rename, copy, and move.

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use fileshare_core::model::{ActivityLogEntry, FileRecord, User};
use rusqlite::{Connection, OptionalExtension, params};

use super::error::StorageError;

const SCHEMA: &str = include_str!("db_init.sql");

/// Default permission bits assigned to newly created directories: owner
/// full access, others read/execute (list and enter, not write).
pub const DEFAULT_DIR_PERMISSIONS: u32 = 0o755;

/// Default permission bits assigned to newly uploaded files: owner
/// read/write, others read-only.
pub const DEFAULT_FILE_PERMISSIONS: u32 = 0o644;

/// The id reserved for the virtual share root. No row in `files` has this id.
pub const ROOT_ID: i64 = 0;

/// Single-connection SQLite metadata store, protected by one exclusive lock.
///
/// Cloning shares the same underlying connection (`Arc`); every method
/// serializes on the mutex, mirroring the original server's
/// `pthread_mutex_t`-guarded single connection.
#[derive(Clone)]
pub struct MetadataStore {
    conn: Arc<Mutex<Connection>>,
}

impl MetadataStore {
    /// Open (creating if needed) the metadata database at `path`, enabling
    /// WAL mode and applying the embedded schema.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] if the connection cannot be opened
    /// or the schema cannot be applied.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.execute_batch(SCHEMA)?;
        seed_primary_admin(&conn)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    /// Open an in-memory database, for tests.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] if the schema cannot be applied.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        seed_primary_admin(&conn)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    // ---- users -----------------------------------------------------

    /// Create an account with default (non-admin) privileges.
    ///
    /// # Errors
    ///
    /// [`StorageError::DuplicateUsername`] if the username is taken.
    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<i64, StorageError> {
        self.create_user_admin(username, password_hash, false)
    }

    /// Create an account, optionally with admin privileges.
    ///
    /// # Errors
    ///
    /// [`StorageError::DuplicateUsername`] if the username is taken.
    pub fn create_user_admin(
        &self,
        username: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<i64, StorageError> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO users (username, password_hash, is_admin) VALUES (?1, ?2, ?3)",
            params![username, password_hash, is_admin],
        )
        .map_err(|err| match err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StorageError::DuplicateUsername(username.to_string())
            },
            other => StorageError::Database(other),
        })?;
        Ok(conn.last_insert_rowid())
    }

    /// Verify credentials, returning the user id on success.
    ///
    /// Inactive accounts never verify, matching the original's
    /// `AND is_active = 1` clause.
    ///
    /// # Errors
    ///
    /// [`StorageError::Database`] on connection failure.
    pub fn verify_user(&self, username: &str, password_hash: &str) -> Result<Option<i64>, StorageError> {
        let conn = self.lock();
        conn.query_row(
            "SELECT id FROM users WHERE username = ?1 AND password_hash = ?2 AND is_active = 1",
            params![username, password_hash],
            |row| row.get(0),
        )
        .optional()
        .map_err(StorageError::from)
    }

    /// Fetch an account by id.
    ///
    /// # Errors
    ///
    /// [`StorageError::Database`] on connection failure.
    pub fn get_user_by_id(&self, user_id: i64) -> Result<Option<User>, StorageError> {
        let conn = self.lock();
        conn.query_row(
            "SELECT id, username, password_hash, is_admin, is_active, created_at FROM users WHERE id = ?1",
            params![user_id],
            row_to_user,
        )
        .optional()
        .map_err(StorageError::from)
    }

    /// Whether `username` is already registered.
    ///
    /// # Errors
    ///
    /// [`StorageError::Database`] on connection failure.
    pub fn user_exists(&self, username: &str) -> Result<bool, StorageError> {
        let conn = self.lock();
        let exists: Option<i64> = conn
            .query_row("SELECT 1 FROM users WHERE username = ?1", params![username], |row| row.get(0))
            .optional()?;
        Ok(exists.is_some())
    }

    /// Whether `user_id` is an active admin.
    ///
    /// # Errors
    ///
    /// [`StorageError::Database`] on connection failure.
    pub fn is_admin(&self, user_id: i64) -> Result<bool, StorageError> {
        let conn = self.lock();
        let is_admin: Option<bool> = conn
            .query_row(
                "SELECT is_admin FROM users WHERE id = ?1 AND is_active = 1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(is_admin.unwrap_or(false))
    }

    /// List every account, ordered by id.
    ///
    /// # Errors
    ///
    /// [`StorageError::Database`] on connection failure.
    pub fn list_users(&self) -> Result<Vec<User>, StorageError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, username, password_hash, is_admin, is_active, created_at FROM users ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], row_to_user)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StorageError::from)
    }

    /// Delete an account.
    ///
    /// # Errors
    ///
    /// [`StorageError::ProtectedAccount`] if `user_id == 1` (the primary
    /// admin), matching the original implementation's safety check.
    pub fn delete_user(&self, user_id: i64) -> Result<(), StorageError> {
        if user_id == 1 {
            return Err(StorageError::ProtectedAccount);
        }
        let conn = self.lock();
        conn.execute("DELETE FROM users WHERE id = ?1", params![user_id])?;
        Ok(())
    }

    /// Update an account's admin/active flags.
    ///
    /// # Errors
    ///
    /// [`StorageError::ProtectedAccount`] if this would strip admin
    /// privileges from user id 1.
    pub fn update_user(&self, user_id: i64, is_admin: bool, is_active: bool) -> Result<(), StorageError> {
        if user_id == 1 && !is_admin {
            return Err(StorageError::ProtectedAccount);
        }
        let conn = self.lock();
        conn.execute(
            "UPDATE users SET is_admin = ?1, is_active = ?2 WHERE id = ?3",
            params![is_admin, is_active, user_id],
        )?;
        Ok(())
    }

    // ---- activity log -----------------------------------------------

    /// Append a write-only activity log entry.
    ///
    /// # Errors
    ///
    /// [`StorageError::Database`] on connection failure.
    pub fn log_activity(&self, entry: &ActivityLogEntry) -> Result<(), StorageError> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO activity_logs (user_id, action_type, description) VALUES (?1, ?2, ?3)",
            params![entry.user_id, entry.action_type, entry.description],
        )?;
        Ok(())
    }

    // ---- files --------------------------------------------------------

    /// Create a file or directory entry. Pass `physical_path: None` for
    /// directories (a `NULL` physical path, avoiding the `UNIQUE` constraint
    /// collisions a shared empty string would cause).
    ///
    /// # Errors
    ///
    /// [`StorageError::Database`] on connection failure.
    #[allow(clippy::too_many_arguments)]
    pub fn create_file(
        &self,
        parent_id: i64,
        name: &str,
        physical_path: Option<&str>,
        owner_id: i64,
        size: i64,
        is_directory: bool,
        permissions: u32,
    ) -> Result<i64, StorageError> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO files (parent_id, name, physical_path, owner_id, size, is_directory, permissions) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![parent_id, name, physical_path, owner_id, size, is_directory, permissions],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Fetch a file or directory entry by id.
    ///
    /// # Errors
    ///
    /// [`StorageError::Database`] on connection failure.
    pub fn get_file_by_id(&self, file_id: i64) -> Result<Option<FileRecord>, StorageError> {
        let conn = self.lock();
        conn.query_row(
            "SELECT id, parent_id, name, physical_path, owner_id, size, is_directory, permissions, created_at \
             FROM files WHERE id = ?1",
            params![file_id],
            row_to_file,
        )
        .optional()
        .map_err(StorageError::from)
    }

    /// List the direct children of `parent_id`, directories first then by name.
    ///
    /// # Errors
    ///
    /// [`StorageError::Database`] on connection failure.
    pub fn list_directory(&self, parent_id: i64) -> Result<Vec<FileRecord>, StorageError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, parent_id, name, physical_path, owner_id, size, is_directory, permissions, created_at \
             FROM files WHERE parent_id = ?1 ORDER BY is_directory DESC, name ASC",
        )?;
        let rows = stmt.query_map(params![parent_id], row_to_file)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StorageError::from)
    }

    /// Delete a file or directory entry.
    ///
    /// Does not recurse into children and does not touch the blob store;
    /// callers are responsible for both (see `fileshare-server::handlers`).
    ///
    /// # Errors
    ///
    /// [`StorageError::Database`] on connection failure.
    pub fn delete_file(&self, file_id: i64) -> Result<(), StorageError> {
        let conn = self.lock();
        conn.execute("DELETE FROM files WHERE id = ?1", params![file_id])?;
        Ok(())
    }

    /// Update a file or directory's permission bits.
    ///
    /// # Errors
    ///
    /// [`StorageError::Database`] on connection failure.
    pub fn update_permissions(&self, file_id: i64, permissions: u32) -> Result<(), StorageError> {
        let conn = self.lock();
        conn.execute("UPDATE files SET permissions = ?1 WHERE id = ?2", params![permissions, file_id])?;
        Ok(())
    }

    /// Search for entries under `base_dir_id` whose name matches `pattern`
    /// (case-insensitive `LIKE`, `*`/`?` already translated to `%`/`_` by
    /// the caller), either directly (`recursive = false`) or through the
    /// whole subtree (`recursive = true`, capped at depth 20 to guard
    /// against cycles), capped at `limit` results.
    ///
    /// # Errors
    ///
    /// [`StorageError::Database`] on connection failure.
    pub fn search_files(
        &self,
        base_dir_id: i64,
        sql_pattern: &str,
        recursive: bool,
        limit: i64,
    ) -> Result<Vec<FileRecord>, StorageError> {
        let conn = self.lock();

        if recursive {
            let mut stmt = conn.prepare(
                "WITH RECURSIVE file_tree(id, parent_id, name, physical_path, owner_id, size, \
                 is_directory, permissions, created_at, level) AS ( \
                   SELECT id, parent_id, name, physical_path, owner_id, size, is_directory, \
                          permissions, created_at, 0 FROM files WHERE id = ?1 \
                   UNION ALL \
                   SELECT f.id, f.parent_id, f.name, f.physical_path, f.owner_id, f.size, \
                          f.is_directory, f.permissions, f.created_at, ft.level + 1 \
                   FROM files f INNER JOIN file_tree ft ON f.parent_id = ft.id \
                   WHERE ft.level < 20 \
                 ) \
                 SELECT id, parent_id, name, physical_path, owner_id, size, is_directory, \
                        permissions, created_at \
                 FROM file_tree \
                 WHERE name LIKE ?2 ESCAPE '\\' COLLATE NOCASE AND id != ?1 \
                 ORDER BY is_directory DESC, name ASC \
                 LIMIT ?3",
            )?;
            let rows = stmt.query_map(params![base_dir_id, sql_pattern, limit], row_to_file)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(StorageError::from)
        } else {
            let mut stmt = conn.prepare(
                "SELECT id, parent_id, name, physical_path, owner_id, size, is_directory, \
                        permissions, created_at \
                 FROM files \
                 WHERE parent_id = ?1 AND name LIKE ?2 ESCAPE '\\' COLLATE NOCASE \
                 ORDER BY is_directory DESC, name ASC \
                 LIMIT ?3",
            )?;
            let rows = stmt.query_map(params![base_dir_id, sql_pattern, limit], row_to_file)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(StorageError::from)
        }
    }

    /// Rename a file or directory in place (same parent).
    ///
    /// # Errors
    ///
    /// [`StorageError::NotFound`] if `file_id` does not exist.
    pub fn rename_file(&self, file_id: i64, new_name: &str) -> Result<(), StorageError> {
        let conn = self.lock();
        let changed = conn.execute("UPDATE files SET name = ?1 WHERE id = ?2", params![new_name, file_id])?;
        if changed == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    /// Duplicate a metadata row for `source_id` under `dest_parent_id`,
    /// owned by `user_id`. The new row's `physical_path` is synthesized as
    /// `copy_<source_id>_<source_physical_path>`; no blob bytes are
    /// duplicated (see the module docs on this preserved behavior).
    ///
    /// # Errors
    ///
    /// [`StorageError::NotFound`] if `source_id` does not exist.
    pub fn copy_file(
        &self,
        source_id: i64,
        dest_parent_id: i64,
        new_name: Option<&str>,
        user_id: i64,
    ) -> Result<i64, StorageError> {
        let conn = self.lock();
        let (orig_name, physical_path, size, is_directory, permissions): (
            String,
            Option<String>,
            i64,
            bool,
            u32,
        ) = conn
            .query_row(
                "SELECT name, physical_path, size, is_directory, permissions FROM files WHERE id = ?1",
                params![source_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )
            .optional()?
            .ok_or(StorageError::NotFound)?;

        let use_name = new_name.filter(|n| !n.is_empty()).map_or(orig_name, str::to_string);
        let new_physical_path =
            physical_path.map(|p| format!("copy_{source_id}_{p}")).unwrap_or_default();
        let new_physical_path = if new_physical_path.is_empty() { None } else { Some(new_physical_path) };

        conn.execute(
            "INSERT INTO files (parent_id, name, physical_path, owner_id, size, is_directory, permissions) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![dest_parent_id, use_name, new_physical_path, user_id, size, is_directory, permissions],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Move a file or directory to a new parent.
    ///
    /// # Errors
    ///
    /// [`StorageError::NotFound`] if `file_id` does not exist.
    pub fn move_file(&self, file_id: i64, new_parent_id: i64) -> Result<(), StorageError> {
        let conn = self.lock();
        let changed =
            conn.execute("UPDATE files SET parent_id = ?1 WHERE id = ?2", params![new_parent_id, file_id])?;
        if changed == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    /// Reconstruct the absolute path of `file_id` by walking the
    /// `parent_id` chain up to the root, the same way the original
    /// `build_full_path` helper does.
    ///
    /// # Errors
    ///
    /// [`StorageError::Database`] on connection failure.
    pub fn full_path(&self, file_id: i64) -> Result<String, StorageError> {
        if file_id == ROOT_ID {
            return Ok("/".to_string());
        }

        let conn = self.lock();
        let mut components = Vec::new();
        let mut current = file_id;
        while current != ROOT_ID {
            let (name, parent_id): (String, i64) = match conn
                .query_row("SELECT name, parent_id FROM files WHERE id = ?1", params![current], |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })
                .optional()?
            {
                Some(row) => row,
                None => break,
            };
            components.push(name);
            current = parent_id;
        }
        components.reverse();
        Ok(format!("/{}", components.join("/")))
    }
}

/// Bootstrap the primary admin account (id=1, username `admin`, password
/// `admin`) the first time the schema is applied to an empty `users` table.
/// A non-empty table means the database has already been seeded or
/// populated by a prior run, so this is a no-op.
fn seed_primary_admin(conn: &Connection) -> Result<(), StorageError> {
    let password_hash = fileshare_core::hash_password("admin");
    conn.execute(
        "INSERT INTO users (id, username, password_hash, is_admin, is_active) \
         SELECT 1, 'admin', ?1, 1, 1 WHERE NOT EXISTS (SELECT 1 FROM users)",
        params![password_hash],
    )?;
    Ok(())
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        is_admin: row.get(3)?,
        is_active: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn row_to_file(row: &rusqlite::Row<'_>) -> rusqlite::Result<FileRecord> {
    Ok(FileRecord {
        id: row.get(0)?,
        parent_id: row.get(1)?,
        name: row.get(2)?,
        physical_path: row.get(3)?,
        owner_id: row.get(4)?,
        size: row.get(5)?,
        is_directory: row.get(6)?,
        permissions: row.get(7)?,
        created_at: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_verify_user() {
        let store = MetadataStore::open_in_memory().expect("open");
        let id = store.create_user("alice", "hash").expect("create");
        assert_eq!(store.verify_user("alice", "hash").expect("verify"), Some(id));
        assert_eq!(store.verify_user("alice", "wrong").expect("verify"), None);
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let store = MetadataStore::open_in_memory().expect("open");
        store.create_user("alice", "hash").expect("create");
        assert!(matches!(
            store.create_user("alice", "other"),
            Err(StorageError::DuplicateUsername(_))
        ));
    }

    #[test]
    fn primary_admin_cannot_be_deleted() {
        let store = MetadataStore::open_in_memory().expect("open");
        store.create_user_admin("root", "hash", true).expect("create");
        assert!(matches!(store.delete_user(1), Err(StorageError::ProtectedAccount)));
    }

    #[test]
    fn list_directory_orders_directories_first() {
        let store = MetadataStore::open_in_memory().expect("open");
        let owner = store.create_user("alice", "hash").expect("create user");
        store.create_file(ROOT_ID, "b.txt", Some("blob-b"), owner, 10, false, 0o644).expect("file b");
        store.create_file(ROOT_ID, "a_dir", None, owner, 0, true, 0o755).expect("dir a");

        let entries = store.list_directory(ROOT_ID).expect("list");
        assert_eq!(entries[0].name, "a_dir");
        assert_eq!(entries[1].name, "b.txt");
    }

    #[test]
    fn full_path_rebuilds_from_parent_chain() {
        let store = MetadataStore::open_in_memory().expect("open");
        let owner = store.create_user("alice", "hash").expect("create user");
        let dir = store.create_file(ROOT_ID, "docs", None, owner, 0, true, 0o755).expect("mkdir");
        let file =
            store.create_file(dir, "report.pdf", Some("blob-1"), owner, 5, false, 0o644).expect("file");

        assert_eq!(store.full_path(file).expect("full path"), "/docs/report.pdf");
        assert_eq!(store.full_path(ROOT_ID).expect("full path"), "/");
    }

    #[test]
    fn copy_does_not_duplicate_the_blob_reference() {
        let store = MetadataStore::open_in_memory().expect("open");
        let owner = store.create_user("alice", "hash").expect("create user");
        let file =
            store.create_file(ROOT_ID, "a.txt", Some("blob-1"), owner, 5, false, 0o644).expect("file");

        let copy_id = store.copy_file(file, ROOT_ID, Some("b.txt"), owner).expect("copy");
        let copy = store.get_file_by_id(copy_id).expect("get").expect("exists");
        assert_eq!(copy.physical_path.as_deref(), Some("copy_1_blob-1"));
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let store = MetadataStore::open_in_memory().expect("open");
        let owner = store.create_user("alice", "hash").expect("create user");
        store.create_file(ROOT_ID, "Report.pdf", Some("b1"), owner, 1, false, 0o644).expect("file");

        let matches = store.search_files(ROOT_ID, "%report%", false, 50).expect("search");
        assert_eq!(matches.len(), 1);
    }
}
