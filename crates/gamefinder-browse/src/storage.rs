//! Persistence backends for the wishlist.
//!
//! # Design
//! - A backend stores one opaque payload under a fixed key.
//! - File writes go through a temp file and a rename so a crash never leaves a torn payload.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::error::StorageError;

/// Storage key of the wishlist payload.
pub const WISHLIST_STORAGE_KEY: &str = "game-finder-wishlist";

/// Key-value slot holding the serialised wishlist.
pub trait WishlistStorage: Send + Sync {
    /// Read the stored payload; `None` when nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend cannot be read.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Replace the stored payload.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend cannot be written.
    fn save(&self, payload: &str) -> Result<(), StorageError>;
}

/// JSON file under a data directory.
#[derive(Clone, Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Storage for `key` inside `dir` (`<dir>/<key>.json`).
    #[must_use]
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{key}.json")),
        }
    }

    /// Wishlist storage inside `dir`.
    #[must_use]
    pub fn wishlist_in(dir: impl AsRef<Path>) -> Self {
        Self::new(dir, WISHLIST_STORAGE_KEY)
    }

    /// Backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn io_error(operation: &'static str, path: &Path, source: io::Error) -> StorageError {
    StorageError::Io {
        operation,
        path: path.to_path_buf(),
        source,
    }
}

impl WishlistStorage for FileStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error("storage.read", &self.path, err)),
        }
    }

    fn save(&self, payload: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| io_error("storage.create_dir", parent, err))?;
        }
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, payload)
            .map_err(|err| io_error("storage.write", &staging, err))?;
        fs::rename(&staging, &self.path)
            .map_err(|err| io_error("storage.rename", &self.path, err))
    }
}

/// In-process storage for ephemeral sessions and tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    payload: Mutex<Option<String>>,
    read_only: AtomicBool,
}

impl MemoryStorage {
    /// Empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with `payload`.
    #[must_use]
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            payload: Mutex::new(Some(payload.into())),
            read_only: AtomicBool::new(false),
        }
    }

    /// Make subsequent writes fail with [`StorageError::ReadOnly`].
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Currently stored payload.
    #[must_use]
    pub fn snapshot(&self) -> Option<String> {
        self.payload
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl WishlistStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.snapshot())
    }

    fn save(&self, payload: &str) -> Result<(), StorageError> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StorageError::ReadOnly);
        }
        *self.payload.lock().unwrap_or_else(PoisonError::into_inner) = Some(payload.to_string());
        Ok(())
    }
}

impl<T: WishlistStorage + ?Sized> WishlistStorage for std::sync::Arc<T> {
    fn load(&self) -> Result<Option<String>, StorageError> {
        (**self).load()
    }

    fn save(&self, payload: &str) -> Result<(), StorageError> {
        (**self).save(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_round_trips_and_reports_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::wishlist_in(dir.path().join("nested"));
        assert_eq!(storage.load().expect("load"), None);

        storage.save("[1]").expect("save");
        storage.save("[1,2]").expect("overwrite");
        assert_eq!(storage.load().expect("load").as_deref(), Some("[1,2]"));
        assert!(storage.path().ends_with("game-finder-wishlist.json"));
        assert!(!storage.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn file_storage_read_errors_carry_context() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path(), "wishlist");
        fs::create_dir_all(storage.path()).expect("directory in place of file");
        match storage.load() {
            Err(StorageError::Io { operation, path, .. }) => {
                assert_eq!(operation, "storage.read");
                assert_eq!(path, storage.path());
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn memory_storage_can_refuse_writes() {
        let storage = MemoryStorage::with_payload("old");
        storage.set_read_only(true);
        assert!(matches!(storage.save("new"), Err(StorageError::ReadOnly)));
        assert_eq!(storage.snapshot().as_deref(), Some("old"));
    }
}
