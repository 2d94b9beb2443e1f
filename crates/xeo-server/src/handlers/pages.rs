//! Pages API endpoint.
//!
//! Runs the page pipeline for a logical path and returns either a redirect
//! for the client to follow (replacing the current location), or the page
//! content with its table of contents and previous/next entries.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use xeo_site::{Heading, NavItem, PageOutcome, PageView, Redirect, RedirectReason, RouteMap};

use crate::error::ServerError;
use crate::handlers::{blocking, etag_json};
use crate::state::AppState;

/// Query parameters for GET /api/pages.
#[derive(Debug, Deserialize)]
pub(crate) struct PageQuery {
    /// False for viewers kept alive off-screen; they never redirect.
    #[serde(default = "default_foreground")]
    foreground: bool,
}

fn default_foreground() -> bool {
    true
}

/// Response for GET /api/pages/{path}.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum PageResponse {
    Redirect { redirect: RedirectResponse },
    Page(Box<PageBody>),
}

/// Redirect target.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RedirectResponse {
    /// Logical path to load instead.
    path: String,
    /// Router URL for `path`.
    url: String,
    /// `rootDefault` or `firstDescendant`.
    reason: &'static str,
}

impl RedirectResponse {
    fn new(redirect: Redirect, routes: &RouteMap) -> Self {
        Self {
            url: routes.to_url(&redirect.target),
            reason: match redirect.reason {
                RedirectReason::RootDefault => "rootDefault",
                RedirectReason::FirstDescendant => "firstDescendant",
            },
            path: redirect.target,
        }
    }
}

/// Page payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PageBody {
    /// Logical path.
    path: String,
    /// Router URL.
    url: String,
    /// Markdown body (placeholder when not found).
    content: String,
    /// Physical file the body came from.
    #[serde(skip_serializing_if = "Option::is_none")]
    resolved_from: Option<String>,
    /// False when the placeholder is shown.
    found: bool,
    /// Table of contents.
    headings: Vec<Heading>,
    /// Navigation entry for this path.
    item: Option<LinkResponse>,
    /// Previous entry in traversal order.
    previous: Option<LinkResponse>,
    /// Next entry in traversal order.
    next: Option<LinkResponse>,
}

/// Navigation link for serialization.
#[derive(Debug, Serialize)]
struct LinkResponse {
    /// Display title.
    title: String,
    /// Logical path.
    href: String,
    /// Router URL.
    url: String,
}

impl LinkResponse {
    fn new(item: NavItem, routes: &RouteMap) -> Self {
        Self {
            url: routes.to_url(&item.href),
            title: item.title,
            href: item.href,
        }
    }
}

impl PageBody {
    fn new(view: PageView, routes: &RouteMap) -> Self {
        let link = |item: Option<NavItem>| item.map(|item| LinkResponse::new(item, routes));
        Self {
            url: routes.to_url(&view.path),
            path: view.path,
            content: view.content,
            resolved_from: view.resolved_from,
            found: view.found,
            headings: view.headings,
            item: link(view.item),
            previous: link(view.previous),
            next: link(view.next),
        }
    }
}

/// Handle GET /api/pages/ (root page).
pub(crate) async fn get_root_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    get_page_impl("/".to_owned(), &state, query.foreground, &headers).await
}

/// Handle GET /api/pages/{path}.
pub(crate) async fn get_page(
    Path(path): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    get_page_impl(path, &state, query.foreground, &headers).await
}

/// Shared implementation for page lookup.
///
/// The pipeline probes the content store, so it runs on the blocking pool.
async fn get_page_impl(
    path: String,
    state: &AppState,
    foreground: bool,
    headers: &HeaderMap,
) -> Result<Response, ServerError> {
    let site = Arc::clone(&state.site);
    let outcome = blocking(move || site.page(&path, foreground)).await?;

    let response = match outcome {
        // Nothing to render until settings with navigation exist
        PageOutcome::Unconfigured => return Ok(StatusCode::NO_CONTENT.into_response()),
        PageOutcome::Redirect(redirect) => PageResponse::Redirect {
            redirect: RedirectResponse::new(redirect, &state.routes),
        },
        PageOutcome::Page(view) => PageResponse::Page(Box::new(PageBody::new(view, &state.routes))),
    };

    etag_json(&state.version, headers, &response)
}
