//! Viewer session: one mounted document viewer.
//!
//! A viewer owns its scroll-spy and scroll store and enforces ordering
//! across asynchronous resolution:
//!
//! - every [`Viewer::navigate`] supersedes earlier ones; results carrying an
//!   old [`ResolutionTicket`] are discarded on [`Viewer::commit`]
//! - a redirect commit leaves headings and scroll state alone
//! - navigating away detaches the spy and drops the pending scroll write
//!
//! Several viewers may be mounted at once (one per tab). Only the one
//! marked foreground redirects, restores or writes scroll offsets; the
//! shared state between them is the injected key/value store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Notify;
use xeo_config::ViewerConfig;
use xeo_kv::KeyValueStore;

use crate::headings::Heading;
use crate::poll::{PollPolicy, poll_until};
use crate::redirect::Redirect;
use crate::route::{canonical_path, fragment_id};
use crate::scroll_spy::{ScrollSpy, Viewport};
use crate::scroll_store::{ScrollAction, ScrollPositionStore};
use crate::settings::NavItem;
use crate::site::{PageOutcome, PageView, Site};

/// Tag tying a resolution result to the navigation that requested it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolutionTicket {
    path: String,
    generation: u64,
}

impl ResolutionTicket {
    /// Logical path the resolution is for.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// What a commit did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Commit {
    /// The ticket was superseded; nothing changed.
    Stale,
    /// Replace the location with the redirect target and navigate again.
    Redirect(Redirect),
    /// The page is displayed; apply the scroll action, if any.
    Displayed(Option<ScrollAction>),
    /// Nothing to display.
    Unconfigured,
}

/// A mounted document viewer.
pub struct Viewer {
    foreground: bool,
    generation: u64,
    path: Option<String>,
    page: Option<PageView>,
    /// Last path a page was entered on, to tell navigation from re-entry.
    last_entered: Option<String>,
    spy: ScrollSpy,
    scroll: ScrollPositionStore,
    poll: PollPolicy,
}

impl Viewer {
    /// Create a viewer.
    #[must_use]
    pub fn new(
        scroll: ScrollPositionStore,
        spy: ScrollSpy,
        poll: PollPolicy,
        foreground: bool,
    ) -> Self {
        Self {
            foreground,
            generation: 0,
            path: None,
            page: None,
            last_entered: None,
            spy,
            scroll,
            poll,
        }
    }

    /// Create a viewer tuned by `[viewer]` settings, persisting offsets to
    /// `store`.
    #[must_use]
    pub fn from_config(
        config: &ViewerConfig,
        store: Arc<dyn KeyValueStore>,
        foreground: bool,
    ) -> Self {
        let poll = PollPolicy {
            interval: Duration::from_millis(config.poll_interval_ms),
            max_attempts: config.poll_attempts,
        };
        let scroll = ScrollPositionStore::new(store)
            .with_prefix(config.scroll_key_prefix.clone())
            .with_debounce(Duration::from_millis(config.scroll_debounce_ms));
        Self::new(scroll, ScrollSpy::new(config.spy_band, poll), poll, foreground)
    }

    /// True when this viewer is the visible one.
    #[must_use]
    pub fn is_foreground(&self) -> bool {
        self.foreground
    }

    /// Logical path most recently navigated to.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Displayed page.
    #[must_use]
    pub fn page(&self) -> Option<&PageView> {
        self.page.as_ref()
    }

    /// Table of contents of the displayed page.
    #[must_use]
    pub fn headings(&self) -> &[Heading] {
        self.spy.headings()
    }

    /// Heading the reader is looking at.
    #[must_use]
    pub fn active_heading(&self) -> Option<&str> {
        self.spy.active()
    }

    /// Previous entry around the displayed page.
    #[must_use]
    pub fn previous(&self) -> Option<&NavItem> {
        self.page.as_ref().and_then(|page| page.previous.as_ref())
    }

    /// Next entry around the displayed page.
    #[must_use]
    pub fn next(&self) -> Option<&NavItem> {
        self.page.as_ref().and_then(|page| page.next.as_ref())
    }

    /// Scroll-spy, for wiring scroll events.
    pub fn spy_mut(&mut self) -> &mut ScrollSpy {
        &mut self.spy
    }

    /// Start resolving `path`, superseding any resolution in flight.
    pub fn navigate(&mut self, path: &str) -> ResolutionTicket {
        let path = canonical_path(path);
        self.generation += 1;
        self.spy.reset();
        self.scroll.leave();
        self.path = Some(path.clone());

        ResolutionTicket {
            path,
            generation: self.generation,
        }
    }

    /// Apply a resolution result.
    ///
    /// `fragment` is the current URL fragment (`#id`, `#/id` or bare).
    pub fn commit(
        &mut self,
        ticket: &ResolutionTicket,
        outcome: PageOutcome,
        fragment: Option<&str>,
    ) -> Commit {
        if ticket.generation != self.generation {
            tracing::debug!(
                path = %ticket.path,
                current = ?self.path,
                "Discarding stale resolution"
            );
            return Commit::Stale;
        }

        match outcome {
            PageOutcome::Redirect(redirect) => Commit::Redirect(redirect),
            PageOutcome::Unconfigured => {
                self.page = None;
                self.spy.track(Vec::new());
                Commit::Unconfigured
            }
            PageOutcome::Page(view) => {
                let path = ticket.path.clone();
                let is_navigation = self
                    .last_entered
                    .as_ref()
                    .is_some_and(|previous| *previous != path);

                self.spy.track(view.headings.clone());
                let action = self.scroll.on_enter(
                    &path,
                    is_navigation,
                    self.foreground,
                    fragment.and_then(fragment_id),
                );
                self.last_entered = Some(path);
                self.page = Some(view);
                Commit::Displayed(action)
            }
        }
    }

    /// Navigate to `path` and commit the site's answer in one step.
    pub fn open(&mut self, site: &Site, path: &str, fragment: Option<&str>) -> Commit {
        let ticket = self.navigate(path);
        let outcome = site.page(ticket.path(), self.foreground);
        self.commit(&ticket, outcome, fragment)
    }

    /// Become the visible viewer.
    ///
    /// Re-entering counts as a restore, not a navigation, so the saved
    /// offset or fragment applies if it has not been already.
    pub fn activate(&mut self, fragment: Option<&str>) -> Option<ScrollAction> {
        self.foreground = true;
        let path = self.page.as_ref()?.path.clone();
        if self.scroll.is_restored(&path) {
            return None;
        }
        self.scroll
            .on_enter(&path, false, true, fragment.and_then(fragment_id))
    }

    /// Move off-screen. The pending scroll write is flushed first.
    pub fn deactivate(&mut self) {
        self.scroll.flush_pending();
        self.scroll.leave();
        self.foreground = false;
    }

    /// Poll for the fragment anchor and complete the restore.
    ///
    /// Returns whether the anchor appeared; either way writes are enabled
    /// afterwards.
    pub async fn scroll_to_fragment(
        &mut self,
        id: &str,
        viewport: &dyn Viewport,
        mounted: Option<&Notify>,
    ) -> bool {
        let found = poll_until(self.poll, mounted, || viewport.anchor_top(id).is_some()).await;
        if !found {
            tracing::debug!(id, "Fragment anchor never mounted");
        }
        if let Some(path) = self.page.as_ref().map(|page| page.path.clone()) {
            self.scroll.fragment_settled(&path);
        }
        found
    }

    /// Attach the scroll-spy, polling for rendered anchors.
    pub async fn attach_spy(&mut self, viewport: &dyn Viewport, mounted: Option<&Notify>) -> bool {
        self.spy.attach(viewport, mounted).await
    }

    /// Record a scroll to `offset`, then update the active heading.
    pub fn on_scroll(&mut self, offset: u32, viewport: &dyn Viewport, now: Instant) {
        if let Some(page) = &self.page {
            self.scroll.record_scroll(&page.path, offset, now);
        }
        self.spy.observe(viewport);
    }

    /// Write the pending scroll offset if due.
    pub fn flush(&mut self, now: Instant) -> bool {
        self.scroll.flush_due(now)
    }

    /// When the next scroll write becomes due.
    #[must_use]
    pub fn next_flush(&self) -> Option<Instant> {
        self.scroll.next_deadline()
    }

    /// Tear down: detach the spy and drop the pending write.
    pub fn unmount(&mut self) {
        self.generation += 1;
        self.spy.detach();
        self.scroll.leave();
    }
}
