//! Mapping between logical paths and router URLs.

/// Maps logical paths onto URLs under a base path, and back.
///
/// With base `/docs`, logical `/` is `/docs` and `/guide` is `/docs/guide`.
/// With an empty base, URLs and logical paths coincide.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteMap {
    base_path: String,
}

impl RouteMap {
    /// Route map under `base_path` (empty, or `/x` without trailing slash).
    #[must_use]
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Base path.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Router URL for a logical path.
    #[must_use]
    pub fn to_url(&self, logical_path: &str) -> String {
        let logical = canonical_path(logical_path);
        if logical == "/" {
            if self.base_path.is_empty() {
                "/".to_owned()
            } else {
                self.base_path.clone()
            }
        } else {
            format!("{}{logical}", self.base_path)
        }
    }

    /// Logical path for a router URL, or `None` when the URL is outside the
    /// base path.
    #[must_use]
    pub fn from_url(&self, url: &str) -> Option<String> {
        let path = url.split(['?', '#']).next().unwrap_or_default();
        let rest = path.strip_prefix(self.base_path.as_str())?;
        if !rest.is_empty() && !rest.starts_with('/') {
            // `/docs2` is not under `/docs`
            return None;
        }
        Some(canonical_path(rest))
    }
}

/// Canonical logical path: leading slash, no trailing slash, no empty
/// segments. The empty path is root.
#[must_use]
pub fn canonical_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

/// Anchor id named by a URL fragment.
///
/// Accepts `#id`, `#/id`, `id` and `/id`. Returns `None` when nothing is
/// left.
#[must_use]
pub fn fragment_id(fragment: &str) -> Option<&str> {
    let id = fragment.strip_prefix('#').unwrap_or(fragment);
    let id = id.strip_prefix('/').unwrap_or(id);
    (!id.is_empty()).then_some(id)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_to_url_without_base() {
        let routes = RouteMap::default();

        assert_eq!(routes.to_url("/"), "/");
        assert_eq!(routes.to_url("/guide/setup"), "/guide/setup");
    }

    #[test]
    fn test_to_url_with_base() {
        let routes = RouteMap::new("/system-design");

        assert_eq!(routes.to_url("/"), "/system-design");
        assert_eq!(routes.to_url("/guide"), "/system-design/guide");
    }

    #[test]
    fn test_from_url_with_base() {
        let routes = RouteMap::new("/system-design");

        assert_eq!(routes.from_url("/system-design"), Some("/".to_owned()));
        assert_eq!(routes.from_url("/system-design/"), Some("/".to_owned()));
        assert_eq!(
            routes.from_url("/system-design/guide?tab=1#intro"),
            Some("/guide".to_owned())
        );
        assert_eq!(routes.from_url("/system-designer"), None);
        assert_eq!(routes.from_url("/other"), None);
    }

    #[test]
    fn test_from_url_without_base() {
        let routes = RouteMap::default();

        assert_eq!(routes.from_url("/"), Some("/".to_owned()));
        assert_eq!(routes.from_url("/a//b/"), Some("/a/b".to_owned()));
    }

    #[test]
    fn test_canonical_path() {
        assert_eq!(canonical_path(""), "/");
        assert_eq!(canonical_path("guide/"), "/guide");
        assert_eq!(canonical_path("//a///b"), "/a/b");
    }

    #[test]
    fn test_fragment_id() {
        assert_eq!(fragment_id("#install"), Some("install"));
        assert_eq!(fragment_id("#/install"), Some("install"));
        assert_eq!(fragment_id("install"), Some("install"));
        assert_eq!(fragment_id("#"), None);
        assert_eq!(fragment_id("#/"), None);
        assert_eq!(fragment_id(""), None);
    }
}
