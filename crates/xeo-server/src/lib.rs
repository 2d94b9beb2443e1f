//! HTTP server for the Xeo documentation viewer.
//!
//! This crate exposes the site core over HTTP with axum:
//! - API endpoints for settings, navigation and pages (redirects included)
//! - Raw content files under `/content/`
//! - Per-client scroll records for clients without local storage
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use xeo_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         content_root: PathBuf::from("content"),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Client ──HTTP──► axum router (xeo-server)
//!                       │
//!                       ├─► /api/pages ──► Site::page ──► PathResolver ──► Storage
//!                       │                     │
//!                       │                     └─► RedirectPolicy / HeadingExtractor
//!                       │
//!                       ├─► /content ──► Storage (local, then HTTP fallback)
//!                       │
//!                       └─► /api/scroll ──► KeyValueStore
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use xeo_config::ViewerConfig;
use xeo_kv::{FileStore, KeyValueStore, MemoryStore};
use xeo_site::{RouteMap, Site, SiteConfig, StorageSettingsProvider};
use xeo_storage::{FsStorage, HttpStorage, LayeredStorage, Storage};

pub use error::ServerError;
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Content root directory.
    pub content_root: PathBuf,
    /// Site settings document, relative to the content root.
    pub settings_file: String,
    /// HTTP origin consulted when a probe misses locally.
    pub fallback_url: Option<String>,
    /// Viewer behaviour.
    pub viewer: ViewerConfig,
    /// Application version (for cache invalidation).
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
            content_root: PathBuf::from("content"),
            settings_file: "xeocontext.config.json".to_owned(),
            fallback_url: None,
            viewer: ViewerConfig::default(),
            version: String::new(),
        }
    }
}

impl ServerConfig {
    /// Content store: the content root, layered over the fallback origin
    /// when one is configured.
    #[must_use]
    pub fn storage(&self) -> Arc<dyn Storage> {
        let local: Arc<dyn Storage> = Arc::new(FsStorage::new(self.content_root.clone()));
        match &self.fallback_url {
            Some(origin) => Arc::new(LayeredStorage::new(
                local,
                Arc::new(HttpStorage::new(origin)),
            )),
            None => local,
        }
    }

    /// Site over `storage`, reading settings from the configured document.
    #[must_use]
    pub fn site(&self, storage: Arc<dyn Storage>) -> Site {
        let settings = StorageSettingsProvider::new(Arc::clone(&storage), &self.settings_file);
        Site::new(
            storage,
            Box::new(settings),
            &SiteConfig {
                skip_code_fences: self.viewer.skip_code_fences,
            },
        )
    }

    /// Persisted scroll record: a file under `state_dir`, or memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file exists but cannot be read.
    pub fn state_store(&self) -> Result<Arc<dyn KeyValueStore>, ServerError> {
        match &self.viewer.state_dir {
            Some(dir) => Ok(Arc::new(FileStore::in_dir(dir)?)),
            None => Ok(Arc::new(MemoryStore::new())),
        }
    }
}

/// Run the server.
///
/// # Errors
///
/// Returns an error if the state store cannot be opened or the server fails
/// to start.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let storage = config.storage();
    let site = Arc::new(config.site(Arc::clone(&storage)));

    // Load settings up front so configuration problems show at startup
    let loader = Arc::clone(&site);
    let snapshot = tokio::task::spawn_blocking(move || loader.snapshot()).await?;
    if !snapshot.is_configured() {
        tracing::warn!(
            settings = %config.settings_file,
            "No navigation configured; pages render nothing until settings appear"
        );
    }

    let state = Arc::new(AppState {
        site,
        storage,
        state: config.state_store()?,
        routes: RouteMap::new(config.viewer.base_path.clone()),
        viewer: config.viewer.clone(),
        version: config.version.clone(),
    });

    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from Xeo config.
#[must_use]
pub fn server_config_from_config(config: &xeo_config::Config, version: String) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        content_root: config.content_resolved.root.clone(),
        settings_file: config.content_resolved.settings_file.clone(),
        fallback_url: config.content_resolved.fallback_url.clone(),
        viewer: config.viewer.clone(),
        version,
    }
}
