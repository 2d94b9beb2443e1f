//! Offline integrity check of navigation against content.
//!
//! Follows the page pipeline from every navigation entry the way a
//! foreground viewer would, reporting entries that end on the not-found
//! placeholder and redirect chains that revisit a path.

use std::collections::HashSet;
use std::fmt;

use crate::site::{PageOutcome, Site};

/// Redirect hops followed before a chain is reported.
pub const MAX_REDIRECT_HOPS: usize = 16;

/// Severity of an audit finding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// Renders, but not what the author meant.
    Warning,
    /// Never settles on a page.
    Error,
}

/// What is wrong with a navigation entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Finding {
    /// Pipeline ends on the not-found placeholder.
    Unresolved {
        /// Entry href.
        href: String,
        /// Path the placeholder is shown for.
        settled_on: String,
    },
    /// Redirect chain revisits a path.
    RedirectLoop {
        /// Entry href.
        href: String,
        /// Paths visited, in order, ending with the revisited one.
        chain: Vec<String>,
    },
    /// Redirect chain longer than [`MAX_REDIRECT_HOPS`].
    TooManyRedirects {
        /// Entry href.
        href: String,
    },
}

impl Finding {
    /// How bad this is.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::Unresolved { .. } => Severity::Warning,
            Self::RedirectLoop { .. } | Self::TooManyRedirects { .. } => Severity::Error,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved { href, settled_on } if href == settled_on => {
                write!(f, "{href}: no content found")
            }
            Self::Unresolved { href, settled_on } => {
                write!(f, "{href}: redirects to {settled_on}, which has no content")
            }
            Self::RedirectLoop { href, chain } => {
                write!(f, "{href}: redirect loop {}", chain.join(" -> "))
            }
            Self::TooManyRedirects { href } => {
                write!(f, "{href}: more than {MAX_REDIRECT_HOPS} redirects")
            }
        }
    }
}

/// Result of [`audit`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuditReport {
    /// Distinct navigation hrefs checked.
    pub checked: usize,
    /// Problems, in navigation order.
    pub findings: Vec<Finding>,
    /// False when there was no navigation to check.
    pub configured: bool,
}

impl AuditReport {
    /// Number of findings with `severity`.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|finding| finding.severity() == severity)
            .count()
    }

    /// True when any finding is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }
}

/// Check every navigation entry of `site`.
pub fn audit(site: &Site) -> AuditReport {
    let snapshot = site.snapshot();
    if !snapshot.is_configured() {
        return AuditReport::default();
    }

    let mut seen = HashSet::new();
    let mut report = AuditReport {
        configured: true,
        ..AuditReport::default()
    };

    for item in snapshot.tree().items() {
        if !seen.insert(item.href.as_str()) {
            continue;
        }
        report.checked += 1;
        if let Some(finding) = follow(site, &item.href) {
            tracing::debug!(%finding, "Navigation entry failed check");
            report.findings.push(finding);
        }
    }

    tracing::info!(
        checked = report.checked,
        findings = report.findings.len(),
        "Checked navigation"
    );
    report
}

fn follow(site: &Site, href: &str) -> Option<Finding> {
    let mut chain = vec![href.to_owned()];
    let mut path = href.to_owned();

    for _ in 0..=MAX_REDIRECT_HOPS {
        match site.page(&path, true) {
            PageOutcome::Redirect(redirect) => {
                let revisit = chain.contains(&redirect.target);
                chain.push(redirect.target.clone());
                if revisit {
                    return Some(Finding::RedirectLoop {
                        href: href.to_owned(),
                        chain,
                    });
                }
                path = redirect.target;
            }
            PageOutcome::Page(view) if !view.found => {
                return Some(Finding::Unresolved {
                    href: href.to_owned(),
                    settled_on: view.path,
                });
            }
            PageOutcome::Page(_) | PageOutcome::Unconfigured => return None,
        }
    }

    Some(Finding::TooManyRedirects {
        href: href.to_owned(),
    })
}
