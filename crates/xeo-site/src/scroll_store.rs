//! Per-path scroll offset persistence.
//!
//! Restores the reader's position when a page is entered and records it
//! while they scroll. Writes are debounced and held back until the restore
//! for the current path has completed, so a transient offset seen during
//! restore never overwrites the saved one. Only a foreground viewer ever
//! completes a restore, so background viewers never write.

use std::sync::Arc;
use std::time::{Duration, Instant};

use xeo_kv::{KeyValueStore, KeyValueStoreExt};

/// Default key prefix for saved offsets.
pub const DEFAULT_KEY_PREFIX: &str = "scroll-";

/// What the viewer should do with the scroll container on entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScrollAction {
    /// Scroll to the top.
    ResetToTop,
    /// Scroll the anchor with this id into view, polling until it mounts.
    ScrollToFragment(String),
    /// Restore a saved offset.
    RestoreOffset(u32),
}

/// Debounced write waiting for its quiet period to end.
#[derive(Clone, Debug, PartialEq, Eq)]
struct PendingWrite {
    path: String,
    offset: u32,
    deadline: Instant,
}

/// Parse a saved offset leniently: leading decimal digits, anything after
/// them ignored.
fn parse_offset(raw: &str) -> Option<u32> {
    let digits = raw.trim_start();
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}

/// Scroll offset store for one viewer.
pub struct ScrollPositionStore {
    store: Arc<dyn KeyValueStore>,
    prefix: String,
    debounce: Duration,
    /// Path whose restore has completed; writes are allowed for it only.
    restored: Option<String>,
    /// Path waiting for a fragment scroll to settle.
    settling: Option<String>,
    pending: Option<PendingWrite>,
}

impl ScrollPositionStore {
    /// Store over `store` with the default prefix and a 100ms debounce.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            prefix: DEFAULT_KEY_PREFIX.to_owned(),
            debounce: Duration::from_millis(100),
            restored: None,
            settling: None,
            pending: None,
        }
    }

    /// Use a different key prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Use a different debounce window.
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Persisted key for a logical path.
    #[must_use]
    pub fn key(&self, path: &str) -> String {
        format!("{}{path}", self.prefix)
    }

    /// True once the restore for `path` has completed.
    #[must_use]
    pub fn is_restored(&self, path: &str) -> bool {
        self.restored.as_deref() == Some(path)
    }

    /// Decide the scroll action on entering `path`.
    ///
    /// `fragment` is the URL fragment id without `#`. Returns `None` when a
    /// background viewer must leave the scroll position alone.
    pub fn on_enter(
        &mut self,
        path: &str,
        is_navigation: bool,
        foreground: bool,
        fragment: Option<&str>,
    ) -> Option<ScrollAction> {
        self.leave();

        if is_navigation {
            if foreground {
                self.restored = Some(path.to_owned());
            }
            return Some(ScrollAction::ResetToTop);
        }

        if !foreground {
            return None;
        }

        if let Some(id) = fragment.filter(|id| !id.is_empty()) {
            // Restore completes when the fragment scroll settles
            self.settling = Some(path.to_owned());
            return Some(ScrollAction::ScrollToFragment(id.to_owned()));
        }

        self.restored = Some(path.to_owned());
        match self.saved_offset(path) {
            Some(offset) => Some(ScrollAction::RestoreOffset(offset)),
            None => Some(ScrollAction::ResetToTop),
        }
    }

    /// Mark the fragment scroll for `path` as finished, found or not.
    pub fn fragment_settled(&mut self, path: &str) {
        if self.settling.as_deref() == Some(path) {
            self.settling = None;
            self.restored = Some(path.to_owned());
        }
    }

    /// Saved offset for `path`. Store failures read as "nothing saved".
    #[must_use]
    pub fn saved_offset(&self, path: &str) -> Option<u32> {
        match self.store.get(&self.key(path)) {
            Ok(raw) => raw.as_deref().and_then(parse_offset),
            Err(e) => {
                tracing::warn!(path, error = %e, "Failed to read saved scroll offset");
                None
            }
        }
    }

    /// Record a scroll event at `now`.
    ///
    /// Bursts coalesce: only the last offset is written, `debounce` after the
    /// last event. Ignored until the restore for `path` has completed.
    pub fn record_scroll(&mut self, path: &str, offset: u32, now: Instant) {
        if !self.is_restored(path) {
            tracing::debug!(path, "Ignoring scroll before restore");
            return;
        }
        self.pending = Some(PendingWrite {
            path: path.to_owned(),
            offset,
            deadline: now + self.debounce,
        });
    }

    /// When the pending write becomes due.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|write| write.deadline)
    }

    /// Write the pending offset if its quiet period has passed.
    ///
    /// Returns `true` when a write was attempted. Failures are logged and
    /// dropped.
    pub fn flush_due(&mut self, now: Instant) -> bool {
        if self.pending.as_ref().is_none_or(|write| write.deadline > now) {
            return false;
        }
        let Some(write) = self.pending.take() else {
            return false;
        };

        let key = self.key(&write.path);
        if let Err(e) = self.store.set_display(&key, &write.offset) {
            tracing::warn!(path = %write.path, error = %e, "Failed to save scroll offset");
        }
        true
    }

    /// Write the pending offset now, ignoring its deadline.
    pub fn flush_pending(&mut self) -> bool {
        match self.next_deadline() {
            Some(deadline) => self.flush_due(deadline),
            None => false,
        }
    }

    /// Forget the current path: drop any pending write and restore state.
    pub fn leave(&mut self) {
        if let Some(write) = self.pending.take() {
            tracing::debug!(path = %write.path, "Dropping pending scroll write");
        }
        self.restored = None;
        self.settling = None;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use xeo_kv::{KvError, MemoryStore};

    use super::*;

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, KvError> {
            Err(KvError::Unavailable("disabled".to_owned()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), KvError> {
            Err(KvError::Unavailable("disabled".to_owned()))
        }
    }

    fn store_with(entries: &[(&str, &str)]) -> (Arc<MemoryStore>, ScrollPositionStore) {
        let kv = Arc::new(MemoryStore::new());
        for (key, value) in entries {
            kv.set(key, value).unwrap();
        }
        let store = ScrollPositionStore::new(Arc::clone(&kv) as Arc<dyn KeyValueStore>);
        (kv, store)
    }

    #[test]
    fn test_navigation_always_resets() {
        let (_, mut store) = store_with(&[("scroll-/a", "500")]);

        assert_eq!(
            store.on_enter("/a", true, true, Some("section")),
            Some(ScrollAction::ResetToTop)
        );
        assert_eq!(
            store.on_enter("/a", true, false, None),
            Some(ScrollAction::ResetToTop)
        );
    }

    #[test]
    fn test_background_takes_no_action() {
        let (_, mut store) = store_with(&[("scroll-/a", "500")]);

        assert_eq!(store.on_enter("/a", false, false, Some("x")), None);
        assert!(!store.is_restored("/a"));
    }

    #[test]
    fn test_fragment_beats_saved_offset() {
        let (_, mut store) = store_with(&[("scroll-/a", "500")]);

        assert_eq!(
            store.on_enter("/a", false, true, Some("install")),
            Some(ScrollAction::ScrollToFragment("install".to_owned()))
        );
    }

    #[test]
    fn test_saved_offset_restored() {
        let (_, mut store) = store_with(&[("scroll-/a", "500")]);

        assert_eq!(
            store.on_enter("/a", false, true, None),
            Some(ScrollAction::RestoreOffset(500))
        );
        assert!(store.is_restored("/a"));
    }

    #[test]
    fn test_empty_fragment_ignored() {
        let (_, mut store) = store_with(&[("scroll-/a", "0")]);

        assert_eq!(
            store.on_enter("/a", false, true, Some("")),
            Some(ScrollAction::RestoreOffset(0))
        );
    }

    #[test]
    fn test_nothing_saved_resets() {
        let (_, mut store) = store_with(&[]);

        assert_eq!(
            store.on_enter("/a", false, true, None),
            Some(ScrollAction::ResetToTop)
        );
    }

    #[test]
    fn test_unparseable_offset_resets() {
        let (_, mut store) = store_with(&[("scroll-/a", "NaN")]);

        assert_eq!(
            store.on_enter("/a", false, true, None),
            Some(ScrollAction::ResetToTop)
        );
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("120"), Some(120));
        assert_eq!(parse_offset(" 42.7"), Some(42));
        assert_eq!(parse_offset("-5"), None);
        assert_eq!(parse_offset(""), None);
    }

    #[test]
    fn test_read_failure_treated_as_nothing_saved() {
        let mut store = ScrollPositionStore::new(Arc::new(FailingStore));

        assert_eq!(
            store.on_enter("/a", false, true, None),
            Some(ScrollAction::ResetToTop)
        );
    }

    #[test]
    fn test_write_failure_swallowed() {
        let mut store = ScrollPositionStore::new(Arc::new(FailingStore));
        let now = Instant::now();
        store.on_enter("/a", false, true, None);

        store.record_scroll("/a", 10, now);

        assert!(store.flush_due(now + Duration::from_millis(100)));
        assert_eq!(store.next_deadline(), None);
    }

    #[test]
    fn test_writes_debounced() {
        let (kv, mut store) = store_with(&[]);
        let start = Instant::now();
        store.on_enter("/a", false, true, None);

        store.record_scroll("/a", 10, start);
        store.record_scroll("/a", 20, start + Duration::from_millis(50));
        store.record_scroll("/a", 30, start + Duration::from_millis(90));

        assert!(!store.flush_due(start + Duration::from_millis(150)));
        assert_eq!(kv.get("scroll-/a").unwrap(), None);

        assert!(store.flush_due(start + Duration::from_millis(190)));
        assert_eq!(kv.get("scroll-/a").unwrap().as_deref(), Some("30"));
    }

    #[test]
    fn test_no_write_before_restore() {
        let (kv, mut store) = store_with(&[]);
        let now = Instant::now();

        store.record_scroll("/a", 10, now);

        assert_eq!(store.next_deadline(), None);
        assert!(!store.flush_due(now + Duration::from_secs(1)));
        assert!(kv.is_empty());
    }

    #[test]
    fn test_fragment_restore_completes_on_settle() {
        let (kv, mut store) = store_with(&[]);
        let now = Instant::now();
        store.on_enter("/a", false, true, Some("deep"));

        store.record_scroll("/a", 999, now);
        assert_eq!(store.next_deadline(), None);

        store.fragment_settled("/a");
        store.record_scroll("/a", 700, now);
        store.flush_due(now + Duration::from_millis(100));

        assert_eq!(kv.get("scroll-/a").unwrap().as_deref(), Some("700"));
    }

    #[test]
    fn test_settle_for_other_path_ignored() {
        let (_, mut store) = store_with(&[]);
        store.on_enter("/a", false, true, Some("deep"));

        store.fragment_settled("/b");

        assert!(!store.is_restored("/a"));
        assert!(!store.is_restored("/b"));
    }

    #[test]
    fn test_background_never_writes() {
        let (kv, mut store) = store_with(&[]);
        let now = Instant::now();
        store.on_enter("/a", false, false, None);

        store.record_scroll("/a", 10, now);
        store.flush_due(now + Duration::from_secs(1));

        assert!(kv.is_empty());
    }

    #[test]
    fn test_leave_drops_pending_write() {
        let (kv, mut store) = store_with(&[]);
        let now = Instant::now();
        store.on_enter("/a", false, true, None);
        store.record_scroll("/a", 10, now);

        store.on_enter("/b", true, true, None);

        assert!(!store.flush_due(now + Duration::from_secs(1)));
        assert_eq!(kv.get("scroll-/a").unwrap(), None);
    }

    #[test]
    fn test_flush_pending_ignores_deadline() {
        let (kv, mut store) = store_with(&[]);
        store.on_enter("/a", false, true, None);
        store.record_scroll("/a", 42, Instant::now());

        assert!(store.flush_pending());
        assert!(!store.flush_pending());
        assert_eq!(kv.get("scroll-/a").unwrap().as_deref(), Some("42"));
    }

    #[test]
    fn test_custom_prefix() {
        let (kv, store) = store_with(&[]);
        let mut store = store.with_prefix("xeocontext-scroll-");
        let now = Instant::now();
        store.on_enter("/guide", false, true, None);

        store.record_scroll("/guide", 5, now);
        store.flush_due(now + Duration::from_millis(100));

        assert_eq!(
            kv.get("xeocontext-scroll-/guide").unwrap().as_deref(),
            Some("5")
        );
    }
}
