//! Navigation tree: normalized, flattened, path-addressable.
//!
//! Items are stored in a flat `Vec` in depth-first, parent-before-children
//! order, concatenated across groups. This provides:
//! - O(1) logical path lookups via `path_index` `HashMap`
//! - stable previous/next relations (flat order is document order)
//! - first-descendant search for folder-style paths

use std::collections::HashMap;

use crate::settings::{NavGroup, NavItem};

/// Canonicalize a navigation `href` into a logical path.
///
/// Adds a leading slash, drops trailing slashes, and strips one trailing
/// `/readme` or `/index` segment (case-insensitive). The empty result is
/// the root `"/"`.
#[must_use]
pub fn normalize_href(href: &str) -> String {
    let href = href.trim();
    let mut path = if href.starts_with('/') {
        href.to_owned()
    } else {
        format!("/{href}")
    };

    while path.ends_with('/') {
        path.pop();
    }

    let lower = path.to_ascii_lowercase();
    if lower.ends_with("/readme") {
        path.truncate(path.len() - "/readme".len());
    } else if lower.ends_with("/index") {
        path.truncate(path.len() - "/index".len());
    }

    if path.is_empty() {
        "/".to_owned()
    } else {
        path
    }
}

fn normalize_item(item: &NavItem) -> NavItem {
    NavItem {
        title: item.title.clone(),
        href: normalize_href(&item.href),
        items: item
            .items
            .as_ref()
            .map(|children| children.iter().map(normalize_item).collect()),
    }
}

fn flatten_into(items: &[NavItem], out: &mut Vec<NavItem>) {
    for item in items {
        out.push(item.clone());
        flatten_into(item.children(), out);
    }
}

/// Flattened, normalized navigation index.
#[derive(Clone, Debug, Default)]
pub struct NavigationTree {
    groups: Vec<NavGroup>,
    items: Vec<NavItem>,
    /// First occurrence of each href.
    path_index: HashMap<String, usize>,
}

impl NavigationTree {
    /// Normalize and flatten navigation groups.
    ///
    /// Never fails: empty input yields an empty tree.
    #[must_use]
    pub fn build(groups: &[NavGroup]) -> Self {
        let groups: Vec<NavGroup> = groups
            .iter()
            .map(|group| NavGroup {
                title: group.title.clone(),
                items: group.items.iter().map(normalize_item).collect(),
            })
            .collect();

        let mut items = Vec::new();
        for group in &groups {
            flatten_into(&group.items, &mut items);
        }

        let mut path_index = HashMap::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            path_index.entry(item.href.clone()).or_insert(idx);
        }

        Self {
            groups,
            items,
            path_index,
        }
    }

    /// Normalized groups, for rendering the sidebar.
    #[must_use]
    pub fn groups(&self) -> &[NavGroup] {
        &self.groups
    }

    /// Flattened items in traversal order.
    #[must_use]
    pub fn items(&self) -> &[NavItem] {
        &self.items
    }

    /// Number of flattened items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when no items exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Position of the first item whose href equals `path`.
    #[must_use]
    pub fn position(&self, path: &str) -> Option<usize> {
        self.path_index.get(path).copied()
    }

    /// First item whose href equals `path`.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&NavItem> {
        self.position(path).map(|idx| &self.items[idx])
    }

    /// First item in traversal order.
    #[must_use]
    pub fn first(&self) -> Option<&NavItem> {
        self.items.first()
    }

    /// Item a path displays: the exact match, or the first item for root.
    #[must_use]
    pub fn active_item(&self, path: &str) -> Option<&NavItem> {
        self.active_position(path).map(|idx| &self.items[idx])
    }

    fn active_position(&self, path: &str) -> Option<usize> {
        self.position(path)
            .or_else(|| (path == "/" && !self.items.is_empty()).then_some(0))
    }

    /// First strict descendant of `path` in traversal order.
    ///
    /// For root, every item other than `"/"` itself qualifies.
    #[must_use]
    pub fn first_descendant(&self, path: &str) -> Option<&NavItem> {
        let prefix = if path == "/" { "" } else { path };
        self.items.iter().find(|item| {
            item.href
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/') && rest.len() > 1)
        })
    }

    /// Previous and next items around the item `path` displays.
    #[must_use]
    pub fn neighbors(&self, path: &str) -> (Option<&NavItem>, Option<&NavItem>) {
        let Some(idx) = self.active_position(path) else {
            return (None, None);
        };
        let previous = idx.checked_sub(1).and_then(|i| self.items.get(i));
        (previous, self.items.get(idx + 1))
    }
}
