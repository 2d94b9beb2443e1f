//! Persisted key/value store abstraction for the Xeo documentation viewer.
//!
//! The viewer remembers small per-client facts (currently the scroll offset
//! of each visited page) in a durable string-to-string store. This crate
//! decouples that consumer from where the values live:
//!
//! - [`KeyValueStore`]: fallible `get`/`set` over string keys and values
//! - [`KeyValueStoreExt`]: typed convenience methods via a blanket impl
//!
//! # Implementations
//!
//! - [`NullStore`]: No-op implementation (always absent, writes discarded)
//! - [`MemoryStore`]: In-process map, shared by cloning an `Arc`
//! - [`FileStore`]: JSON document on disk, rewritten atomically on each set
//!
//! # Example
//!
//! ```
//! use xeo_kv::{KeyValueStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.set("scroll-/guide", "120").unwrap();
//! assert_eq!(store.get("scroll-/guide").unwrap().as_deref(), Some("120"));
//! ```

mod ext;
mod file;

use std::collections::HashMap;
use std::sync::RwLock;

pub use ext::KeyValueStoreExt;
pub use file::FileStore;

/// Error raised by a [`KeyValueStore`] backend.
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    /// I/O error reading or writing the backing file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Backing document could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Backend refused the operation (quota, disabled storage, poisoned state).
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Durable string key/value store.
///
/// Reads and writes may fail; callers decide whether a failure matters.
/// The scroll position store, for example, treats every failure as
/// "nothing saved".
pub trait KeyValueStore: Send + Sync {
    /// Retrieve the value stored under `key`.
    ///
    /// Returns `Ok(None)` when nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), KvError>;
}

/// No-op [`KeyValueStore`] that never stores or retrieves data.
///
/// Use when persistence is disabled.
pub struct NullStore;

impl KeyValueStore for NullStore {
    fn get(&self, _key: &str) -> Result<Option<String>, KvError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), KvError> {
        Ok(())
    }
}

/// In-memory [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map_or(0, |entries| entries.len())
    }

    /// True when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| KvError::Unavailable(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| KvError::Unavailable(e.to_string()))?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
