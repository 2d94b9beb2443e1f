//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;

use xeo_config::ViewerConfig;
use xeo_kv::KeyValueStore;
use xeo_site::{RouteMap, Site};
use xeo_storage::Storage;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Site facade (settings, navigation, page pipeline).
    pub(crate) site: Arc<Site>,
    /// Content store for raw file serving.
    pub(crate) storage: Arc<dyn Storage>,
    /// Persisted scroll records, one set per client.
    pub(crate) state: Arc<dyn KeyValueStore>,
    /// Logical path to router URL mapping.
    pub(crate) routes: RouteMap,
    /// Viewer tuning handed to clients.
    pub(crate) viewer: ViewerConfig,
    /// Application version for cache invalidation.
    pub(crate) version: String,
}

impl AppState {
    /// Persisted key for one client's scroll offset on a logical path.
    pub(crate) fn scroll_key(&self, client: &str, logical_path: &str) -> String {
        format!("{client}:{}{logical_path}", self.viewer.scroll_key_prefix)
    }
}
