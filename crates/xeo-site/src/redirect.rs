//! Canonicalization of logical paths that have no page of their own.
//!
//! Decisions are one-shot: the caller re-runs the whole pipeline against the
//! redirect target. No loop detection happens here; `xeo check` finds loops
//! offline.

use crate::navigation::NavigationTree;

/// Where a redirect decision is taken in the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup {
    /// Before content resolution.
    Pending,
    /// After every content candidate missed.
    Missing,
}

/// Reason a redirect was issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedirectReason {
    /// Bare root visit sent to the default document.
    RootDefault,
    /// Folder-style path sent to its first child document.
    FirstDescendant,
}

/// Redirect target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect {
    /// Logical path to replace the current one with.
    pub target: String,
    /// Why.
    pub reason: RedirectReason,
}

/// Decides whether a logical path must be replaced before rendering.
#[derive(Clone, Copy, Debug, Default)]
pub struct RedirectPolicy;

impl RedirectPolicy {
    /// Decide whether to redirect `path`.
    ///
    /// Background viewers never redirect.
    #[must_use]
    pub fn decide(
        self,
        path: &str,
        tree: &NavigationTree,
        stage: Lookup,
        foreground: bool,
    ) -> Option<Redirect> {
        if !foreground {
            return None;
        }

        if stage == Lookup::Pending && path == "/" {
            return tree
                .active_item(path)
                .filter(|item| item.href != "/")
                .map(|item| Redirect {
                    target: item.href.clone(),
                    reason: RedirectReason::RootDefault,
                });
        }

        // An exact match gets its own resolution attempt first
        if stage == Lookup::Pending && tree.find(path).is_some() {
            return None;
        }

        tree.first_descendant(path).map(|item| Redirect {
            target: item.href.clone(),
            reason: RedirectReason::FirstDescendant,
        })
    }
}
