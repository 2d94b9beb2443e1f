//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use crate::storage::{Storage, StorageError, StorageErrorKind, clean_path};

/// Mock storage for testing.
///
/// Stores files in memory and records every probe in order, so tests can
/// assert which physical paths were tried and in what sequence.
///
/// # Example
///
/// ```ignore
/// use xeo_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_file("guide.md", "# Guide")
///     .with_dir("guide");
///
/// assert_eq!(storage.read("guide.md").unwrap(), "# Guide");
/// assert_eq!(storage.probes(), vec!["guide.md"]);
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    files: RwLock<HashMap<String, Vec<u8>>>,
    dirs: RwLock<HashSet<String>>,
    failures: RwLock<HashMap<String, StorageErrorKind>>,
    probes: RwLock<Vec<String>>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given content.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    /// Mark a path as a directory.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_dir(self, path: impl Into<String>) -> Self {
        self.dirs.write().unwrap().insert(path.into());
        self
    }

    /// Make every probe of `path` fail with `kind`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failure(self, path: impl Into<String>, kind: StorageErrorKind) -> Self {
        self.failures.write().unwrap().insert(path.into(), kind);
        self
    }

    /// Add or replace a file after construction.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn insert(&self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.files
            .write()
            .unwrap()
            .insert(path.into(), content.into());
    }

    /// Remove a file after construction.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn remove(&self, path: &str) {
        self.files.write().unwrap().remove(path);
    }

    /// Paths probed so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn probes(&self) -> Vec<String> {
        self.probes.read().unwrap().clone()
    }

    /// Forget recorded probes.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear_probes(&self) {
        self.probes.write().unwrap().clear();
    }
}

impl Storage for MockStorage {
    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let relative = clean_path(path).map_err(|e| e.with_backend("Mock"))?;
        self.probes.write().unwrap().push(relative.to_owned());

        let error = |kind| {
            StorageError::new(kind)
                .with_path(relative)
                .with_backend("Mock")
        };

        if let Some(&kind) = self.failures.read().unwrap().get(relative) {
            return Err(error(kind));
        }
        if self.dirs.read().unwrap().contains(relative) {
            return Err(error(StorageErrorKind::NotAFile));
        }
        self.files
            .read()
            .unwrap()
            .get(relative)
            .cloned()
            .ok_or_else(|| error(StorageErrorKind::NotFound))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_mock_storage_is_send_sync() {
        assert_send_sync::<MockStorage>();
    }

    #[test]
    fn test_with_file() {
        let storage = MockStorage::new().with_file("guide.md", "# Guide\n\nContent.");

        assert_eq!(storage.read("guide.md").unwrap(), "# Guide\n\nContent.");
    }

    #[test]
    fn test_read_missing() {
        let storage = MockStorage::new();

        let err = storage.read("missing.md").unwrap_err();

        assert_eq!(err.kind(), StorageErrorKind::NotFound);
        assert_eq!(err.backend(), Some("Mock"));
        assert_eq!(err.path(), Some(Path::new("missing.md")));
    }

    #[test]
    fn test_dir_is_not_a_file() {
        let storage = MockStorage::new().with_dir("guide");

        assert_eq!(
            storage.read("guide").unwrap_err().kind(),
            StorageErrorKind::NotAFile
        );
    }

    #[test]
    fn test_failure_injection() {
        let storage = MockStorage::new()
            .with_file("a.md", "x")
            .with_failure("a.md", StorageErrorKind::Timeout);

        assert_eq!(
            storage.read("a.md").unwrap_err().kind(),
            StorageErrorKind::Timeout
        );
    }

    #[test]
    fn test_probes_recorded_in_order() {
        let storage = MockStorage::new().with_file("b.md", "b");

        let _ = storage.read("a.md");
        let _ = storage.read("/b.md");

        assert_eq!(storage.probes(), vec!["a.md", "b.md"]);

        storage.clear_probes();
        assert!(storage.probes().is_empty());
    }

    #[test]
    fn test_insert_and_remove() {
        let storage = MockStorage::new();

        storage.insert("late.md", "arrived");
        assert!(storage.exists("late.md"));

        storage.remove("late.md");
        assert!(!storage.exists("late.md"));
    }
}
