//! Filesystem content store.

use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::{Storage, StorageError, StorageErrorKind, clean_path};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Content store rooted at a local directory.
///
/// # Example
///
/// ```ignore
/// use std::path::PathBuf;
/// use xeo_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from("content"));
/// let readme = storage.read("README.md")?;
/// ```
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    /// Create a new filesystem storage rooted at `root`.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Content root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Storage for FsStorage {
    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let relative = clean_path(path).map_err(|e| e.with_backend(BACKEND))?;
        let full = self.root.join(relative);

        let meta = fs::metadata(&full)
            .map_err(|e| StorageError::io(e, Some(PathBuf::from(relative))).with_backend(BACKEND))?;
        if !meta.is_file() {
            return Err(StorageError::new(StorageErrorKind::NotAFile)
                .with_path(relative)
                .with_backend(BACKEND));
        }

        fs::read(&full)
            .map_err(|e| StorageError::io(e, Some(PathBuf::from(relative))).with_backend(BACKEND))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, FsStorage) {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("README.md"), "# Home").unwrap();
        fs::create_dir_all(tmp.path().join("guide")).unwrap();
        fs::write(tmp.path().join("guide/index.md"), "# Guide").unwrap();
        let storage = FsStorage::new(tmp.path().to_path_buf());
        (tmp, storage)
    }

    #[test]
    fn test_read_file() {
        let (_tmp, storage) = fixture();

        assert_eq!(storage.read("README.md").unwrap(), "# Home");
        assert_eq!(storage.read("/guide/index.md").unwrap(), "# Guide");
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let (_tmp, storage) = fixture();

        let err = storage.read("missing.md").unwrap_err();

        assert_eq!(err.kind(), StorageErrorKind::NotFound);
        assert_eq!(err.backend(), Some("Fs"));
        assert_eq!(err.path(), Some(Path::new("missing.md")));
    }

    #[test]
    fn test_read_directory_is_not_a_file() {
        let (_tmp, storage) = fixture();

        let err = storage.read("guide").unwrap_err();

        assert_eq!(err.kind(), StorageErrorKind::NotAFile);
        assert!(err.is_miss());
    }

    #[test]
    fn test_read_rejects_traversal() {
        let (_tmp, storage) = fixture();

        let err = storage.read("../etc/passwd").unwrap_err();

        assert_eq!(err.kind(), StorageErrorKind::InvalidPath);
    }

    #[test]
    fn test_exists() {
        let (_tmp, storage) = fixture();

        assert!(storage.exists("README.md"));
        assert!(!storage.exists("guide"));
        assert!(!storage.exists("nope.md"));
    }

    #[test]
    fn test_read_invalid_utf8() {
        let (tmp, storage) = fixture();
        fs::write(tmp.path().join("blob.md"), [0xFF, 0xFE, 0x00]).unwrap();

        assert!(storage.read_bytes("blob.md").is_ok());
        assert_eq!(
            storage.read("blob.md").unwrap_err().kind(),
            StorageErrorKind::Other
        );
    }
}
