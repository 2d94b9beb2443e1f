//! Site facade: settings, navigation and page assembly.
//!
//! [`Site`] loads [`SiteSettings`] from a [`SettingsProvider`], builds the
//! [`NavigationTree`] once per load, and runs the page pipeline:
//!
//! 1. redirect check before resolution
//! 2. content resolution through the candidate list
//! 3. redirect check after a miss
//! 4. heading extraction and previous/next lookup
//!
//! # Thread Safety
//!
//! `Site` is designed for concurrent access:
//! - `snapshot()` returns `Arc<SiteSnapshot>` with minimal locking (just Arc clone)
//! - reloads use double-checked locking
//! - `invalidate()` is lock-free (atomic flag)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use xeo_storage::Storage;

use crate::headings::{Heading, HeadingExtractor};
use crate::navigation::NavigationTree;
use crate::redirect::{Lookup, Redirect, RedirectPolicy};
use crate::resolver::{PathResolver, Resolution};
use crate::route::canonical_path;
use crate::settings::{NavItem, SettingsProvider, SiteSettings};

/// Body shown when no candidate resolves.
pub const NOT_FOUND_BODY: &str = "# Content not found\nCould not load content for this path.";

/// Configuration for [`Site`].
#[derive(Clone, Debug, Default)]
pub struct SiteConfig {
    /// Ignore `#` lines inside fenced code blocks when extracting headings.
    pub skip_code_fences: bool,
}

/// Settings and navigation as of the last load.
#[derive(Debug, Default)]
pub struct SiteSnapshot {
    settings: Option<SiteSettings>,
    tree: NavigationTree,
}

impl SiteSnapshot {
    /// Build a snapshot from loaded settings.
    #[must_use]
    pub fn new(settings: Option<SiteSettings>) -> Self {
        let tree = settings
            .as_ref()
            .map(|s| NavigationTree::build(&s.navigation))
            .unwrap_or_default();
        Self { settings, tree }
    }

    /// Loaded settings, if any.
    #[must_use]
    pub fn settings(&self) -> Option<&SiteSettings> {
        self.settings.as_ref()
    }

    /// Navigation tree (empty when unconfigured).
    #[must_use]
    pub fn tree(&self) -> &NavigationTree {
        &self.tree
    }

    /// True when there is navigation to serve pages against.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.tree.is_empty()
    }
}

/// A page ready for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageView {
    /// Logical path the page was assembled for.
    pub path: String,
    /// Markdown body (the placeholder when not found).
    pub content: String,
    /// Physical candidate the body came from.
    pub resolved_from: Option<String>,
    /// Table of contents.
    pub headings: Vec<Heading>,
    /// Navigation entry the path displays.
    pub item: Option<NavItem>,
    /// Previous entry in traversal order.
    pub previous: Option<NavItem>,
    /// Next entry in traversal order.
    pub next: Option<NavItem>,
    /// False when the placeholder is shown.
    pub found: bool,
}

/// Result of [`Site::page`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageOutcome {
    /// Replace the current location and run again.
    Redirect(Redirect),
    /// Display this page.
    Page(PageView),
    /// No navigation available; render nothing.
    Unconfigured,
}

/// Documentation site over a content store.
pub struct Site {
    storage: Arc<dyn Storage>,
    settings: Box<dyn SettingsProvider>,
    resolver: PathResolver,
    extractor: HeadingExtractor,
    policy: RedirectPolicy,
    /// Mutex for serializing reload operations.
    reload_lock: Mutex<()>,
    /// Current snapshot (atomically swappable).
    current: RwLock<Arc<SiteSnapshot>>,
    /// Snapshot validity flag.
    valid: AtomicBool,
}

impl Site {
    /// Create a site reading content from `storage` and settings from
    /// `settings`.
    #[must_use]
    pub fn new(
        storage: Arc<dyn Storage>,
        settings: Box<dyn SettingsProvider>,
        config: &SiteConfig,
    ) -> Self {
        Self {
            resolver: PathResolver::new(Arc::clone(&storage)),
            storage,
            settings,
            extractor: HeadingExtractor::new().with_skip_code_fences(config.skip_code_fences),
            policy: RedirectPolicy,
            reload_lock: Mutex::new(()),
            current: RwLock::new(Arc::new(SiteSnapshot::default())),
            valid: AtomicBool::new(false),
        }
    }

    /// Content store pages are resolved from.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Heading extractor configured for this site.
    #[must_use]
    pub fn extractor(&self) -> HeadingExtractor {
        self.extractor
    }

    /// Current snapshot, reloading first if invalidated.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    pub fn snapshot(&self) -> Arc<SiteSnapshot> {
        // Fast path: snapshot valid
        if self.valid.load(Ordering::Acquire) {
            return self.current();
        }

        let _guard = self.reload_lock.lock().unwrap();

        // Double-check after acquiring lock
        if self.valid.load(Ordering::Acquire) {
            return self.current();
        }

        let snapshot = Arc::new(self.load());
        *self.current.write().unwrap() = Arc::clone(&snapshot);
        self.valid.store(true, Ordering::Release);

        snapshot
    }

    fn current(&self) -> Arc<SiteSnapshot> {
        Arc::clone(&self.current.read().unwrap())
    }

    /// Mark the snapshot stale. The next access reloads; current readers
    /// keep their `Arc<SiteSnapshot>`.
    pub fn invalidate(&self) {
        self.valid.store(false, Ordering::Release);
    }

    fn load(&self) -> SiteSnapshot {
        let settings = match self.settings.load() {
            Ok(Some(settings)) => Some(settings),
            Ok(None) => {
                tracing::warn!("No site settings found");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load site settings");
                None
            }
        };

        let snapshot = SiteSnapshot::new(settings);
        if snapshot.settings().is_some() && !snapshot.is_configured() {
            tracing::warn!("Site settings have no navigation");
        }
        tracing::info!(items = snapshot.tree().len(), "Loaded site navigation");
        snapshot
    }

    /// Run the page pipeline for a logical path.
    ///
    /// `foreground` is false for viewers kept alive off-screen; they never
    /// redirect.
    pub fn page(&self, logical_path: &str, foreground: bool) -> PageOutcome {
        let snapshot = self.snapshot();
        if !snapshot.is_configured() {
            return PageOutcome::Unconfigured;
        }

        let path = canonical_path(logical_path);
        let tree = snapshot.tree();

        if let Some(redirect) = self.policy.decide(&path, tree, Lookup::Pending, foreground) {
            tracing::info!(from = %path, to = %redirect.target, "Redirecting");
            return PageOutcome::Redirect(redirect);
        }

        let (content, resolved_from, found) = match self.resolver.resolve(&path) {
            Resolution::Found(resolved) => (resolved.text, Some(resolved.resolved_from), true),
            Resolution::NotFound => {
                if let Some(redirect) =
                    self.policy.decide(&path, tree, Lookup::Missing, foreground)
                {
                    tracing::info!(from = %path, to = %redirect.target, "Redirecting to first child");
                    return PageOutcome::Redirect(redirect);
                }
                tracing::debug!(path = %path, "Content not found");
                (NOT_FOUND_BODY.to_owned(), None, false)
            }
        };

        let (previous, next) = tree.neighbors(&path);
        PageOutcome::Page(PageView {
            headings: self.extractor.extract(&content),
            item: tree.active_item(&path).cloned(),
            previous: previous.cloned(),
            next: next.cloned(),
            path,
            content,
            resolved_from,
            found,
        })
    }
}
