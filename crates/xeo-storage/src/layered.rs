//! Primary/fallback content store composition.

use std::sync::Arc;

use crate::storage::{Storage, StorageError};

/// Content store that probes a primary backend, then a fallback.
///
/// Each probe is answered by the primary first; only when the primary fails
/// is the same path asked of the fallback. Candidate order is therefore
/// preserved per path: a caller probing `a.md` then `a/index.md` never sees
/// `a/index.md` win over a fallback copy of `a.md`.
pub struct LayeredStorage {
    primary: Arc<dyn Storage>,
    fallback: Arc<dyn Storage>,
}

impl LayeredStorage {
    /// Compose two stores.
    #[must_use]
    pub fn new(primary: Arc<dyn Storage>, fallback: Arc<dyn Storage>) -> Self {
        Self { primary, fallback }
    }
}

impl Storage for LayeredStorage {
    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        match self.primary.read_bytes(path) {
            Ok(bytes) => Ok(bytes),
            Err(primary_err) => {
                tracing::debug!(path, error = %primary_err, "Primary store missed, trying fallback");
                self.fallback.read_bytes(path).map_err(|fallback_err| {
                    // A plain miss on the fallback says nothing new; keep the primary's reason
                    if fallback_err.is_miss() {
                        primary_err
                    } else {
                        fallback_err
                    }
                })
            }
        }
    }
}
