//! Navigation, content resolution and viewer state for Xeo.
//!
//! This crate provides:
//! - [`Site`]: settings, navigation tree and the page pipeline (redirect,
//!   resolve, extract headings, previous/next)
//! - [`Viewer`]: one mounted document viewer, with the scroll-spy and
//!   per-path scroll persistence, discarding superseded resolutions
//! - [`audit`]: offline check of navigation against content
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use xeo_site::{PageOutcome, Site, SiteConfig, StorageSettingsProvider};
//! use xeo_storage::{FsStorage, Storage};
//!
//! let storage: Arc<dyn Storage> = Arc::new(FsStorage::new(PathBuf::from("content")));
//! let settings = StorageSettingsProvider::new(Arc::clone(&storage), "xeocontext.config.json");
//! let site = Site::new(storage, Box::new(settings), &SiteConfig::default());
//!
//! if let PageOutcome::Redirect(redirect) = site.page("/guide", true) {
//!     assert_ne!(redirect.target, "/guide");
//! }
//! ```

mod audit;
mod headings;
mod navigation;
mod poll;
mod redirect;
mod resolver;
mod route;
mod scroll_spy;
mod scroll_store;
mod settings;
mod site;
mod viewer;

pub use audit::{AuditReport, Finding, MAX_REDIRECT_HOPS, Severity, audit};
pub use headings::{Heading, HeadingExtractor, extract as extract_headings, slugify};
pub use navigation::{NavigationTree, normalize_href};
pub use poll::{PollPolicy, poll_until};
pub use redirect::{Lookup, Redirect, RedirectPolicy, RedirectReason};
pub use resolver::{PathResolver, Resolution, ResolvedContent, candidates};
pub use route::{RouteMap, canonical_path, fragment_id};
pub use scroll_spy::{DEFAULT_BAND, ScrollSpy, SpyState, Viewport};
pub use scroll_store::{DEFAULT_KEY_PREFIX, ScrollAction, ScrollPositionStore};
pub use settings::{
    NavGroup, NavItem, SettingsError, SettingsProvider, SiteSettings, StaticSettingsProvider,
    StorageSettingsProvider,
};
pub use site::{NOT_FOUND_BODY, PageOutcome, PageView, Site, SiteConfig, SiteSnapshot};
pub use viewer::{Commit, ResolutionTicket, Viewer};
