//! File-backed key/value store.
//!
//! [`FileStore`] keeps every entry in a single JSON object on disk:
//!
//! ```text
//! {"scroll-/guide": "340", "scroll-/": "0"}
//! ```
//!
//! The document is loaded once on open and rewritten after every `set`
//! through a sibling temp file and a rename, so a crash mid-write leaves
//! the previous document intact. A document that fails to parse is logged
//! and replaced on the next write.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::{KeyValueStore, KvError};

/// File name used inside a state directory.
pub const STATE_FILE: &str = "state.json";

/// [`KeyValueStore`] persisted as a JSON document.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file starts an empty store. A corrupt file is logged and
    /// treated as empty.
    ///
    /// # Errors
    ///
    /// Returns [`KvError::Io`] if the file exists but cannot be read.
    pub fn open(path: PathBuf) -> Result<Self, KvError> {
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Discarding corrupt state file");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No state file yet");
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Open the store at `{dir}/state.json`.
    ///
    /// # Errors
    ///
    /// Same as [`FileStore::open`].
    pub fn in_dir(dir: &Path) -> Result<Self, KvError> {
        Self::open(dir.join(STATE_FILE))
    }

    /// Location of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), KvError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let body = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| KvError::Unavailable(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| KvError::Unavailable(e.to_string()))?;
        let previous = entries.insert(key.to_owned(), value.to_owned());

        if let Err(e) = self.persist(&entries) {
            // Keep memory consistent with disk
            match previous {
                Some(old) => entries.insert(key.to_owned(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}
