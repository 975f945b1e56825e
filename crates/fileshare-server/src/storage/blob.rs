//! Content-addressed blob storage, sharded on disk by the first two
//! characters of each opaque blob id.
//!
//! Layout: `<base>/<id[0..2]>/<id>`. Grounded directly on the original
//! `storage.c`: same two-character shard width, same write-then-verify,
//! unlink-on-short-write behavior.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use rand::RngCore;

/// Sharded on-disk blob store.
#[derive(Debug, Clone)]
pub struct BlobStore {
    base: PathBuf,
}

impl BlobStore {
    /// Open (creating if needed) a blob store rooted at `base`.
    ///
    /// # Errors
    ///
    /// Returns the underlying `io::Error` if `base` cannot be created.
    pub fn init(base: impl Into<PathBuf>) -> std::io::Result<Self> {
        let base = base.into();
        std::fs::create_dir_all(&base)?;
        Ok(Self { base })
    }

    /// Generate a new opaque blob id: 128 bits of randomness rendered as a
    /// hyphenated hex string shaped like a UUIDv4, with version/variant bits
    /// set so the id looks like a standard UUID to any external tooling.
    #[must_use]
    pub fn new_blob_id() -> String {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        bytes[6] = (bytes[6] & 0x0F) | 0x40;
        bytes[8] = (bytes[8] & 0x3F) | 0x80;
        format!(
            "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            bytes[0], bytes[1], bytes[2], bytes[3],
            bytes[4], bytes[5],
            bytes[6], bytes[7],
            bytes[8], bytes[9],
            bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15],
        )
    }

    fn shard_dir(&self, id: &str) -> PathBuf {
        self.base.join(&id[..2])
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.shard_dir(id).join(id)
    }

    /// Path a blob with `id` would live at. Exposed for tests and for the
    /// rare handler that needs the raw path (none currently do in normal
    /// operation; storage is always accessed through read/write/delete).
    #[must_use]
    pub fn path_for_id(&self, id: &str) -> PathBuf {
        self.path_for(id)
    }

    /// Write `data` under a freshly generated blob id, returning that id.
    ///
    /// On a short write the partial file is removed before returning the error.
    ///
    /// # Errors
    ///
    /// Any I/O failure creating the shard directory or writing the file.
    pub fn write(&self, data: &[u8]) -> std::io::Result<String> {
        let id = Self::new_blob_id();
        self.write_with_id(&id, data)?;
        Ok(id)
    }

    /// Write `data` under a caller-chosen blob id.
    ///
    /// Used by the upload flow, which reserves a blob id (and records it in
    /// the metadata store) at `upload-request` time, before the bytes
    /// arrive in the following `upload-data` frame.
    ///
    /// # Errors
    ///
    /// Any I/O failure creating the shard directory or writing the file.
    pub fn write_with_id(&self, id: &str, data: &[u8]) -> std::io::Result<()> {
        let shard = self.shard_dir(id);
        std::fs::create_dir_all(&shard)?;

        let path = shard.join(id);
        let result = (|| -> std::io::Result<()> {
            let mut file = std::fs::File::create(&path)?;
            file.write_all(data)?;
            file.sync_all()
        })();

        if let Err(err) = result {
            let _ = std::fs::remove_file(&path);
            return Err(err);
        }

        Ok(())
    }

    /// Read the full contents of blob `id`.
    ///
    /// # Errors
    ///
    /// `io::ErrorKind::NotFound` if no blob with that id exists, or any
    /// other I/O failure reading the file.
    pub fn read(&self, id: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.path_for(id))
    }

    /// Delete blob `id`.
    ///
    /// # Errors
    ///
    /// `io::ErrorKind::NotFound` if no blob with that id exists, or any
    /// other I/O failure removing the file.
    pub fn delete(&self, id: &str) -> std::io::Result<()> {
        std::fs::remove_file(self.path_for(id))
    }

    /// Whether a blob with `id` exists on disk.
    #[must_use]
    pub fn exists(&self, id: &str) -> bool {
        self.path_for(id).is_file()
    }

    /// Root directory of this store, for diagnostics.
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempdir().expect("tempdir");
        let store = BlobStore::init(dir.path()).expect("init");

        let id = store.write(b"hello world").expect("write");
        assert!(store.exists(&id));
        assert_eq!(store.read(&id).expect("read"), b"hello world");
    }

    #[test]
    fn shards_by_first_two_chars() {
        let dir = tempdir().expect("tempdir");
        let store = BlobStore::init(dir.path()).expect("init");

        let id = store.write(b"x").expect("write");
        let expected_shard = dir.path().join(&id[..2]);
        assert!(expected_shard.is_dir());
        assert!(expected_shard.join(&id).is_file());
    }

    #[test]
    fn delete_removes_blob() {
        let dir = tempdir().expect("tempdir");
        let store = BlobStore::init(dir.path()).expect("init");

        let id = store.write(b"bye").expect("write");
        store.delete(&id).expect("delete");
        assert!(!store.exists(&id));
    }

    #[test]
    fn read_missing_blob_is_not_found() {
        let dir = tempdir().expect("tempdir");
        let store = BlobStore::init(dir.path()).expect("init");

        let err = store.read("00000000-0000-4000-8000-000000000000").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = BlobStore::new_blob_id();
        let b = BlobStore::new_blob_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }
}
