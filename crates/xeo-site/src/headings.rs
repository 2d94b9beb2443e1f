//! Table of contents extraction from markdown text.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// ATX heading of level 1 to 3.
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,3})\s+(.*)$").unwrap());

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static HYPHENS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").unwrap());

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// Anchor id derived from the text.
    pub id: String,
    /// Display text with inline code markers removed.
    pub text: String,
    /// Heading level (1-3).
    pub level: u8,
}

/// Derive an anchor id from heading text.
///
/// Lowercases, trims, turns whitespace runs into a hyphen, drops anything
/// that is neither an ASCII letter, digit nor hyphen, then collapses hyphen
/// runs. Non-ASCII letters and underscores are dropped. Colliding slugs are
/// not disambiguated.
#[must_use]
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let hyphenated = WHITESPACE_RE.replace_all(lower.trim(), "-");
    let kept: String = hyphenated
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    HYPHENS_RE.replace_all(&kept, "-").into_owned()
}

/// Extracts headings from markdown text.
///
/// Pure: the same text always yields the same headings.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeadingExtractor {
    skip_code_fences: bool,
}

impl HeadingExtractor {
    /// Extractor that matches every line, fenced or not.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignore `#` lines inside fenced code blocks.
    #[must_use]
    pub fn with_skip_code_fences(mut self, skip: bool) -> Self {
        self.skip_code_fences = skip;
        self
    }

    /// Extract headings in document order.
    #[must_use]
    pub fn extract(&self, text: &str) -> Vec<Heading> {
        let mut headings = Vec::new();
        let mut fence: Option<&str> = None;

        for line in text.lines() {
            if self.skip_code_fences {
                let trimmed = line.trim_start();
                match fence {
                    Some(marker) if trimmed.starts_with(marker) => {
                        fence = None;
                        continue;
                    }
                    Some(_) => continue,
                    None => {
                        if trimmed.starts_with("```") {
                            fence = Some("```");
                            continue;
                        }
                        if trimmed.starts_with("~~~") {
                            fence = Some("~~~");
                            continue;
                        }
                    }
                }
            }

            if let Some(heading) = parse_heading(line) {
                headings.push(heading);
            }
        }

        headings
    }
}

fn parse_heading(line: &str) -> Option<Heading> {
    let caps = HEADING_RE.captures(line)?;
    let level = u8::try_from(caps[1].len()).ok()?;
    let text = caps[2].trim().replace('`', "");
    Some(Heading {
        id: slugify(&text),
        text,
        level,
    })
}

/// Extract headings with default options.
#[must_use]
pub fn extract(text: &str) -> Vec<Heading> {
    HeadingExtractor::new().extract(text)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn heading(id: &str, text: &str, level: u8) -> Heading {
        Heading {
            id: id.to_owned(),
            text: text.to_owned(),
            level,
        }
    }

    #[test]
    fn test_extract_basic() {
        let headings = extract("# Hello World\n\ntext\n## Sub `code`");

        assert_eq!(
            headings,
            vec![
                heading("hello-world", "Hello World", 1),
                heading("sub-code", "Sub code", 2),
            ]
        );
    }

    #[test]
    fn test_extract_is_idempotent() {
        let text = "# A\n## B\n### C\n";

        assert_eq!(extract(text), extract(text));
    }

    #[test]
    fn test_level_four_ignored() {
        let headings = extract("#### Deep\n### Three");

        assert_eq!(headings, vec![heading("three", "Three", 3)]);
    }

    #[test]
    fn test_requires_whitespace_after_hashes() {
        assert!(extract("#hashtag\n##no").is_empty());
    }

    #[test]
    fn test_indented_hash_is_not_heading() {
        assert!(extract("  # indented").is_empty());
    }

    #[test]
    fn test_crlf_lines() {
        let headings = extract("# One\r\n## Two\r\n");

        assert_eq!(
            headings,
            vec![heading("one", "One", 1), heading("two", "Two", 2)]
        );
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Spaced   Out  "), "spaced-out");
        assert_eq!(slugify("What's new?"), "whats-new");
        assert_eq!(slugify("A - B"), "a-b");
        assert_eq!(slugify("snake_case name"), "snakecase-name");
        assert_eq!(slugify("v1.2 (beta)"), "v12-beta");
    }

    #[test]
    fn test_slugify_drops_non_ascii_letters() {
        assert_eq!(slugify("Ünïcode Title"), "ncode-title");
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
        assert_eq!(slugify("日本語 guide"), "-guide");
    }

    #[test]
    fn test_colliding_slugs_kept_as_is() {
        let headings = extract("## Setup\ntext\n## Setup");

        assert_eq!(headings.len(), 2);
        assert_eq!(headings[0].id, "setup");
        assert_eq!(headings[1].id, "setup");
    }

    #[test]
    fn test_fenced_code_matched_by_default() {
        let text = "# Real\n```sh\n# comment\n```\n";

        assert_eq!(extract(text).len(), 2);
    }

    #[test]
    fn test_skip_code_fences() {
        let text = "# Real\n```sh\n# comment\n```\n~~~\n## also code\n~~~\n## After";
        let extractor = HeadingExtractor::new().with_skip_code_fences(true);

        assert_eq!(
            extractor.extract(text),
            vec![heading("real", "Real", 1), heading("after", "After", 2)]
        );
    }
}
