//! Raw content endpoint.
//!
//! Serves files from the content store as-is, for images and API
//! specifications referenced by documents.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use xeo_storage::clean_path;

use crate::error::ServerError;
use crate::handlers::blocking;
use crate::state::AppState;

/// Content type for a file name, by extension.
fn content_type(path: &str) -> &'static str {
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "json" => "application/json",
        "md" => "text/markdown; charset=utf-8",
        "yaml" | "yml" => "application/yaml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        _ => "text/plain; charset=utf-8",
    }
}

/// Handle GET /content/{path}.
pub(crate) async fn get_content(
    Path(path): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ServerError> {
    let cleaned = clean_path(&path)
        .map_err(|e| ServerError::from_storage(&path, e))?
        .to_owned();
    let content_type = content_type(&cleaned);

    // May fall through to the HTTP origin
    let bytes = blocking(move || {
        state
            .storage
            .read_bytes(&cleaned)
            .map_err(|e| ServerError::from_storage(&cleaned, e))
    })
    .await??;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "public, max-age=0, must-revalidate"),
        ],
        bytes,
    )
        .into_response())
}
