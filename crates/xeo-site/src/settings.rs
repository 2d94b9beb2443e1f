//! Site settings: navigation groups and global project metadata.
//!
//! Settings live in a JSON document next to the content
//! (`xeocontext.config.json` by default):
//!
//! ```json
//! {
//!   "projectName": "Payments",
//!   "navigation": [
//!     { "title": "Guide", "items": [{ "title": "Intro", "href": "/intro" }] }
//!   ],
//!   "openapi": "api/openapi.yaml"
//! }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use xeo_storage::{Storage, StorageError};

/// A navigation entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    /// Display title.
    pub title: String,
    /// Logical path this entry links to.
    pub href: String,
    /// Child entries, in display order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<NavItem>>,
}

impl NavItem {
    /// Leaf entry without children.
    #[must_use]
    pub fn new(title: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            href: href.into(),
            items: None,
        }
    }

    /// Attach children.
    #[must_use]
    pub fn with_items(mut self, items: Vec<NavItem>) -> Self {
        self.items = Some(items);
        self
    }

    /// Children, empty when none.
    #[must_use]
    pub fn children(&self) -> &[NavItem] {
        self.items.as_deref().unwrap_or_default()
    }
}

/// A top-level navigation section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavGroup {
    /// Section title.
    pub title: String,
    /// Entries in display order.
    #[serde(default)]
    pub items: Vec<NavItem>,
}

/// Parsed site settings document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    /// Project display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    /// Project domain shown next to the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_domain: Option<String>,
    /// Logo location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Navigation groups.
    #[serde(default)]
    pub navigation: Vec<NavGroup>,
    /// OpenAPI document location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openapi: Option<String>,
    /// AsyncAPI document location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asyncapi: Option<String>,
}

impl SiteSettings {
    /// True when there is nothing to navigate.
    #[must_use]
    pub fn has_navigation(&self) -> bool {
        self.navigation.iter().any(|group| !group.items.is_empty())
    }
}

/// Error loading site settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Settings document could not be read.
    #[error("Failed to read {path}: {source}")]
    Storage {
        /// Settings path relative to the content root.
        path: String,
        /// Underlying storage error.
        #[source]
        source: StorageError,
    },
    /// Settings document is not valid JSON of the expected shape.
    #[error("Malformed settings in {path}: {source}")]
    Malformed {
        /// Settings path relative to the content root.
        path: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

/// Source of [`SiteSettings`].
pub trait SettingsProvider: Send + Sync {
    /// Load the current settings.
    ///
    /// Returns `Ok(None)` when no settings document exists.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when a document exists but cannot be used.
    fn load(&self) -> Result<Option<SiteSettings>, SettingsError>;
}

/// Reads settings from a JSON document in a [`Storage`].
pub struct StorageSettingsProvider {
    storage: Arc<dyn Storage>,
    path: String,
}

impl StorageSettingsProvider {
    /// Read settings from `path` inside `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
        }
    }
}

impl SettingsProvider for StorageSettingsProvider {
    fn load(&self) -> Result<Option<SiteSettings>, SettingsError> {
        let raw = match self.storage.read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.is_miss() => {
                tracing::debug!(path = %self.path, "No settings document");
                return Ok(None);
            }
            Err(source) => {
                return Err(SettingsError::Storage {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| SettingsError::Malformed {
                path: self.path.clone(),
                source,
            })
    }
}

/// Fixed settings, for embedding and tests.
#[derive(Clone, Debug, Default)]
pub struct StaticSettingsProvider {
    settings: Option<SiteSettings>,
}

impl StaticSettingsProvider {
    /// Always serve `settings`.
    #[must_use]
    pub fn new(settings: SiteSettings) -> Self {
        Self {
            settings: Some(settings),
        }
    }

    /// Behave as if no settings document exists.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

impl SettingsProvider for StaticSettingsProvider {
    fn load(&self) -> Result<Option<SiteSettings>, SettingsError> {
        Ok(self.settings.clone())
    }
}
