//! Tracks which heading the reader is currently looking at.
//!
//! A heading becomes active when it enters the top band of the viewport
//! (the top 20% by default). Anchors are rendered asynchronously, so the
//! tracker polls for the first heading's anchor before observing anything.
//!
//! ```text
//! Idle --track/try_attach--> AttachPending --first anchor found--> Attached
//!   ^                              |                                  |
//!   +-------- budget spent --------+                                  |
//!   +------------------- track(new headings) / detach ----------------+
//! ```

use std::collections::HashSet;

use tokio::sync::Notify;

use crate::headings::Heading;
use crate::poll::{PollPolicy, poll_until};

/// Default fraction of the viewport height that counts as "reading".
pub const DEFAULT_BAND: f64 = 0.2;

/// Geometry of the scroll container, supplied by the renderer.
pub trait Viewport {
    /// Visible height of the scroll container.
    fn height(&self) -> f64;

    /// Top edge of the anchor `id` relative to the container's visible top,
    /// or `None` when the anchor is not mounted.
    fn anchor_top(&self, id: &str) -> Option<f64>;
}

/// Attachment state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpyState {
    /// Not observing.
    Idle,
    /// Waiting for the first anchor to be mounted.
    AttachPending {
        /// Failed lookups so far.
        attempts: u32,
    },
    /// Observing every mounted heading anchor.
    Attached,
}

/// Scroll-spy over one heading list.
#[derive(Debug)]
pub struct ScrollSpy {
    band: f64,
    policy: PollPolicy,
    headings: Vec<Heading>,
    state: SpyState,
    /// Ids under observation, in document order.
    observed: Vec<String>,
    /// Ids currently inside the band.
    visible: HashSet<String>,
    active: Option<String>,
}

impl Default for ScrollSpy {
    fn default() -> Self {
        Self::new(DEFAULT_BAND, PollPolicy::default())
    }
}

impl ScrollSpy {
    /// Spy with a band fraction in `(0, 1]` and an attach poll policy.
    #[must_use]
    pub fn new(band: f64, policy: PollPolicy) -> Self {
        Self {
            band,
            policy,
            headings: Vec::new(),
            state: SpyState::Idle,
            observed: Vec::new(),
            visible: HashSet::new(),
            active: None,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SpyState {
        self.state
    }

    /// Active heading id.
    #[must_use]
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Headings being tracked.
    #[must_use]
    pub fn headings(&self) -> &[Heading] {
        &self.headings
    }

    /// Switch to a new heading list.
    ///
    /// A different list detaches every observer and resets to `Idle`; the
    /// same list is a no-op.
    pub fn track(&mut self, headings: Vec<Heading>) {
        if headings == self.headings {
            return;
        }
        self.detach();
        self.active = None;
        self.headings = headings;
    }

    /// Stop observing. Keeps the heading list.
    pub fn detach(&mut self) {
        if self.state != SpyState::Idle {
            tracing::debug!(observed = self.observed.len(), "Detaching scroll spy");
        }
        self.state = SpyState::Idle;
        self.observed.clear();
        self.visible.clear();
    }

    /// Detach and forget the active heading, keeping the heading list.
    ///
    /// Used when leaving a page, so that a next page with the same headings
    /// starts without a stale active id.
    pub fn reset(&mut self) {
        self.detach();
        self.active = None;
    }

    /// Mark a heading active directly (e.g. after a table of contents click).
    pub fn set_active(&mut self, id: &str) {
        self.active = Some(id.to_owned());
    }

    /// Try to attach once.
    ///
    /// Attaches when the first heading's anchor is mounted, observing every
    /// heading whose anchor exists and reporting initial visibility. Returns
    /// `true` once attached. After the retry budget is spent the spy gives
    /// up and returns to `Idle`.
    pub fn try_attach(&mut self, viewport: &dyn Viewport) -> bool {
        let attempts = match self.state {
            SpyState::Attached => return true,
            SpyState::AttachPending { attempts } => attempts,
            SpyState::Idle => 0,
        };

        let Some(first) = self.headings.first() else {
            self.state = SpyState::Idle;
            return false;
        };

        if viewport.anchor_top(&first.id).is_some() {
            self.observed = self
                .headings
                .iter()
                .filter(|h| viewport.anchor_top(&h.id).is_some())
                .map(|h| h.id.clone())
                .collect();
            self.visible.clear();
            self.state = SpyState::Attached;
            tracing::debug!(observed = self.observed.len(), "Scroll spy attached");
            self.observe(viewport);
            return true;
        }

        let attempts = attempts + 1;
        if attempts > self.policy.max_attempts {
            tracing::debug!(attempts, "Heading anchors never mounted, giving up");
            self.state = SpyState::Idle;
        } else {
            self.state = SpyState::AttachPending { attempts };
        }
        false
    }

    /// Poll until attached or the retry budget is spent.
    pub async fn attach(&mut self, viewport: &dyn Viewport, mounted: Option<&Notify>) -> bool {
        let policy = self.policy;
        poll_until(policy, mounted, || self.try_attach(viewport)).await
    }

    /// Re-evaluate visibility after a scroll or layout change.
    ///
    /// Among headings that newly entered the band, the last one in document
    /// order becomes active. Returns the active id when it changed.
    pub fn observe(&mut self, viewport: &dyn Viewport) -> Option<&str> {
        if self.state != SpyState::Attached {
            return None;
        }

        let limit = viewport.height() * self.band;
        let mut entered = None;

        for id in &self.observed {
            let in_band = viewport
                .anchor_top(id)
                .is_some_and(|top| top >= 0.0 && top < limit);

            if in_band {
                if self.visible.insert(id.clone()) {
                    entered = Some(id);
                }
            } else {
                self.visible.remove(id);
            }
        }

        let entered = entered?;
        if self.active.as_ref() == Some(entered) {
            return None;
        }
        self.active = Some(entered.clone());
        self.active.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::headings::extract;

    /// Viewport with anchors at fixed document offsets.
    #[derive(Default)]
    struct FakeViewport {
        height: f64,
        scroll_top: RefCell<f64>,
        anchors: RefCell<HashMap<String, f64>>,
    }

    impl FakeViewport {
        fn new(height: f64) -> Self {
            Self {
                height,
                ..Self::default()
            }
        }

        fn mount(&self, id: &str, offset: f64) {
            self.anchors.borrow_mut().insert(id.to_owned(), offset);
        }

        fn scroll_to(&self, top: f64) {
            *self.scroll_top.borrow_mut() = top;
        }
    }

    impl Viewport for FakeViewport {
        fn height(&self) -> f64 {
            self.height
        }

        fn anchor_top(&self, id: &str) -> Option<f64> {
            let offset = *self.anchors.borrow().get(id)?;
            Some(offset - *self.scroll_top.borrow())
        }
    }

    fn page_viewport() -> FakeViewport {
        let viewport = FakeViewport::new(1000.0);
        viewport.mount("intro", 0.0);
        viewport.mount("setup", 600.0);
        viewport.mount("usage", 1400.0);
        viewport
    }

    fn headings() -> Vec<Heading> {
        extract("# Intro\n## Setup\n## Usage")
    }

    #[test]
    fn test_attach_reports_initial_active() {
        let viewport = page_viewport();
        let mut spy = ScrollSpy::default();
        spy.track(headings());

        assert!(spy.try_attach(&viewport));

        assert_eq!(spy.state(), SpyState::Attached);
        assert_eq!(spy.active(), Some("intro"));
    }

    #[test]
    fn test_heading_entering_band_becomes_active() {
        let viewport = page_viewport();
        let mut spy = ScrollSpy::default();
        spy.track(headings());
        spy.try_attach(&viewport);

        // setup at 600 - 450 = 150, inside the 200px band
        viewport.scroll_to(450.0);
        assert_eq!(spy.observe(&viewport), Some("setup"));

        // Still inside: no change reported
        viewport.scroll_to(500.0);
        assert_eq!(spy.observe(&viewport), None);
        assert_eq!(spy.active(), Some("setup"));
    }

    #[test]
    fn test_active_kept_between_headings() {
        let viewport = page_viewport();
        let mut spy = ScrollSpy::default();
        spy.track(headings());
        spy.try_attach(&viewport);
        viewport.scroll_to(450.0);
        spy.observe(&viewport);

        // setup scrolled above the viewport, usage not yet in band
        viewport.scroll_to(900.0);
        assert_eq!(spy.observe(&viewport), None);
        assert_eq!(spy.active(), Some("setup"));
    }

    #[test]
    fn test_last_entering_heading_wins() {
        let viewport = FakeViewport::new(1000.0);
        viewport.mount("a", 0.0);
        viewport.mount("b", 50.0);
        viewport.mount("c", 100.0);
        let mut spy = ScrollSpy::default();
        spy.track(extract("# A\n# B\n# C"));

        spy.try_attach(&viewport);

        assert_eq!(spy.active(), Some("c"));
    }

    #[test]
    fn test_reentering_heading_reactivates() {
        let viewport = page_viewport();
        let mut spy = ScrollSpy::default();
        spy.track(headings());
        spy.try_attach(&viewport);
        viewport.scroll_to(450.0);
        spy.observe(&viewport);

        viewport.scroll_to(0.0);
        assert_eq!(spy.observe(&viewport), Some("intro"));
    }

    #[test]
    fn test_pending_until_first_anchor_mounted() {
        let viewport = FakeViewport::new(1000.0);
        let mut spy = ScrollSpy::default();
        spy.track(headings());

        assert!(!spy.try_attach(&viewport));
        assert_eq!(spy.state(), SpyState::AttachPending { attempts: 1 });
        assert_eq!(spy.observe(&viewport), None);

        viewport.mount("intro", 0.0);
        assert!(spy.try_attach(&viewport));
        assert_eq!(spy.state(), SpyState::Attached);
    }

    #[test]
    fn test_only_mounted_anchors_observed() {
        let viewport = FakeViewport::new(1000.0);
        viewport.mount("intro", 500.0);
        let mut spy = ScrollSpy::default();
        spy.track(headings());
        spy.try_attach(&viewport);

        // Mounted after attach: never observed
        viewport.mount("setup", 10.0);
        assert_eq!(spy.observe(&viewport), None);
        assert_eq!(spy.active(), None);
    }

    #[test]
    fn test_gives_up_after_budget() {
        let viewport = FakeViewport::new(1000.0);
        let policy = PollPolicy {
            max_attempts: 2,
            ..PollPolicy::default()
        };
        let mut spy = ScrollSpy::new(DEFAULT_BAND, policy);
        spy.track(headings());

        assert!(!spy.try_attach(&viewport));
        assert!(!spy.try_attach(&viewport));
        assert_eq!(spy.state(), SpyState::AttachPending { attempts: 2 });
        assert!(!spy.try_attach(&viewport));
        assert_eq!(spy.state(), SpyState::Idle);
    }

    #[test]
    fn test_new_headings_reset_everything() {
        let viewport = page_viewport();
        let mut spy = ScrollSpy::default();
        spy.track(headings());
        spy.try_attach(&viewport);
        assert_eq!(spy.active(), Some("intro"));

        spy.track(extract("# Other"));

        assert_eq!(spy.state(), SpyState::Idle);
        assert_eq!(spy.active(), None);
        // Old anchors can no longer flip the active heading
        viewport.scroll_to(450.0);
        assert_eq!(spy.observe(&viewport), None);
    }

    #[test]
    fn test_same_headings_keep_attachment() {
        let viewport = page_viewport();
        let mut spy = ScrollSpy::default();
        spy.track(headings());
        spy.try_attach(&viewport);

        spy.track(headings());

        assert_eq!(spy.state(), SpyState::Attached);
    }

    #[test]
    fn test_reset_forgets_active_heading() {
        let viewport = page_viewport();
        let mut spy = ScrollSpy::default();
        spy.track(headings());
        spy.try_attach(&viewport);

        spy.reset();
        spy.track(headings());

        assert_eq!(spy.state(), SpyState::Idle);
        assert_eq!(spy.active(), None);
        assert_eq!(spy.headings(), headings().as_slice());
    }

    #[test]
    fn test_empty_headings_never_attach() {
        let viewport = page_viewport();
        let mut spy = ScrollSpy::default();

        assert!(!spy.try_attach(&viewport));
        assert_eq!(spy.state(), SpyState::Idle);
    }

    #[test]
    fn test_set_active() {
        let mut spy = ScrollSpy::default();

        spy.set_active("usage");

        assert_eq!(spy.active(), Some("usage"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_attach_polls_until_mounted() {
        let viewport = FakeViewport::new(1000.0);
        let mut spy = ScrollSpy::default();
        spy.track(headings());
        viewport.mount("intro", 0.0);

        assert!(spy.attach(&viewport, None).await);
        assert_eq!(spy.active(), Some("intro"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_attach_gives_up_silently() {
        let viewport = FakeViewport::new(1000.0);
        let mut spy = ScrollSpy::default();
        spy.track(headings());
        let start = tokio::time::Instant::now();

        assert!(!spy.attach(&viewport, None).await);

        assert_eq!(spy.state(), SpyState::Idle);
        assert_eq!(start.elapsed(), std::time::Duration::from_secs(2));
    }
}
