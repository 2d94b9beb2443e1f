//! Logical path to content resolution.
//!
//! A logical path maps to a fixed, ordered list of physical candidates.
//! Candidates are probed one at a time and the first readable file wins,
//! so a path-named file (`guide.md`) always shadows a sibling folder index
//! (`guide/index.md`).

use std::sync::Arc;

use xeo_storage::Storage;

/// Text resolved for a logical path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedContent {
    /// Raw markdown.
    pub text: String,
    /// Logical path the text was resolved for.
    pub logical_path: String,
    /// Physical candidate that answered.
    pub resolved_from: String,
}

/// Outcome of [`PathResolver::resolve`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// A candidate answered.
    Found(ResolvedContent),
    /// Every candidate missed or failed.
    NotFound,
}

impl Resolution {
    /// Resolved content, if any.
    #[must_use]
    pub fn found(self) -> Option<ResolvedContent> {
        match self {
            Self::Found(content) => Some(content),
            Self::NotFound => None,
        }
    }
}

/// Physical candidates for a logical path, in priority order.
///
/// Root probes `README.md`, `index.md`, then `readme.md` as a
/// case-insensitive fallback for stores that distinguish case.
#[must_use]
pub fn candidates(logical_path: &str) -> Vec<String> {
    let trimmed = logical_path.trim_matches('/');
    if trimmed.is_empty() {
        return vec![
            "README.md".to_owned(),
            "index.md".to_owned(),
            "readme.md".to_owned(),
        ];
    }

    vec![
        format!("{trimmed}.md"),
        format!("{trimmed}/readme.md"),
        format!("{trimmed}/index.md"),
    ]
}

/// Resolves logical paths against a [`Storage`].
#[derive(Clone)]
pub struct PathResolver {
    storage: Arc<dyn Storage>,
}

impl PathResolver {
    /// Create a resolver over `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Probe candidates sequentially and return the first readable one.
    ///
    /// Probe failures of any kind count as a miss for that candidate.
    #[must_use]
    pub fn resolve(&self, logical_path: &str) -> Resolution {
        for candidate in candidates(logical_path) {
            match self.storage.read(&candidate) {
                Ok(text) => {
                    tracing::debug!(logical_path, candidate = %candidate, "Resolved content");
                    return Resolution::Found(ResolvedContent {
                        text,
                        logical_path: logical_path.to_owned(),
                        resolved_from: candidate,
                    });
                }
                Err(e) if e.is_miss() => {
                    tracing::debug!(candidate = %candidate, "Candidate missed");
                }
                Err(e) => {
                    tracing::warn!(candidate = %candidate, error = %e, "Content probe failed");
                }
            }
        }

        Resolution::NotFound
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use xeo_storage::{MockStorage, StorageErrorKind};

    use super::*;

    fn resolver(storage: &Arc<MockStorage>) -> PathResolver {
        PathResolver::new(Arc::clone(storage) as Arc<dyn Storage>)
    }

    #[test]
    fn test_candidates_root() {
        assert_eq!(candidates("/"), vec!["README.md", "index.md", "readme.md"]);
    }

    #[test]
    fn test_candidates_nested() {
        assert_eq!(
            candidates("/guide/setup"),
            vec![
                "guide/setup.md",
                "guide/setup/readme.md",
                "guide/setup/index.md"
            ]
        );
    }

    #[test]
    fn test_root_prefers_readme() {
        let storage = Arc::new(
            MockStorage::new()
                .with_file("README.md", "readme")
                .with_file("index.md", "index"),
        );

        let content = resolver(&storage).resolve("/").found().unwrap();

        assert_eq!(content.text, "readme");
        assert_eq!(content.resolved_from, "README.md");
        assert_eq!(storage.probes(), vec!["README.md"]);
    }

    #[test]
    fn test_root_falls_back_to_index() {
        let storage = Arc::new(MockStorage::new().with_file("index.md", "index"));

        let content = resolver(&storage).resolve("/").found().unwrap();

        assert_eq!(content.text, "index");
        assert_eq!(content.logical_path, "/");
    }

    #[test]
    fn test_path_named_file_shadows_folder_index() {
        let storage = Arc::new(
            MockStorage::new()
                .with_file("guide.md", "named")
                .with_file("guide/readme.md", "readme")
                .with_file("guide/index.md", "index"),
        );

        let content = resolver(&storage).resolve("/guide").found().unwrap();

        assert_eq!(content.text, "named");
    }

    #[test]
    fn test_readme_beats_index() {
        let storage = Arc::new(
            MockStorage::new()
                .with_file("guide/readme.md", "readme")
                .with_file("guide/index.md", "index"),
        );

        let content = resolver(&storage).resolve("/guide").found().unwrap();

        assert_eq!(content.resolved_from, "guide/readme.md");
        assert_eq!(storage.probes(), vec!["guide.md", "guide/readme.md"]);
    }

    #[test]
    fn test_directory_candidate_is_skipped() {
        let storage = Arc::new(
            MockStorage::new()
                .with_dir("guide.md")
                .with_file("guide/index.md", "index"),
        );

        let content = resolver(&storage).resolve("/guide").found().unwrap();

        assert_eq!(content.text, "index");
    }

    #[test]
    fn test_probe_failure_treated_as_miss() {
        let storage = Arc::new(
            MockStorage::new()
                .with_failure("guide.md", StorageErrorKind::Timeout)
                .with_file("guide/readme.md", "readme"),
        );

        let content = resolver(&storage).resolve("/guide").found().unwrap();

        assert_eq!(content.text, "readme");
    }

    #[test]
    fn test_not_found_probes_all_in_order() {
        let storage = Arc::new(MockStorage::new());

        let resolution = resolver(&storage).resolve("/missing");

        assert_eq!(resolution, Resolution::NotFound);
        assert_eq!(
            storage.probes(),
            vec!["missing.md", "missing/readme.md", "missing/index.md"]
        );
    }
}
