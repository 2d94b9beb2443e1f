//! HTTP request handlers.

pub(crate) mod config;
pub(crate) mod content;
pub(crate) mod navigation;
pub(crate) mod pages;
pub(crate) mod reload;
pub(crate) mod scroll;

use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use md5::{Digest, Md5};
use serde::Serialize;

use crate::error::ServerError;

/// Run site or store work on the blocking pool.
///
/// Content probes and settings reloads may go through the HTTP fallback
/// store, which blocks for up to its request timeout.
pub(crate) async fn blocking<F, T>(work: F) -> Result<T, ServerError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(work).await?)
}

/// Compute `ETag` from version and content.
///
/// Uses MD5 hash truncated to 64 bits (16 hex chars).
pub(crate) fn compute_etag(version: &str, content: &str) -> String {
    let hash = Md5::digest(format!("{version}:{content}").as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}

/// Serialize `body` as JSON with an `ETag`, answering `304` when the client
/// already has it.
pub(crate) fn etag_json<T: Serialize>(
    version: &str,
    headers: &HeaderMap,
    body: &T,
) -> Result<Response, ServerError> {
    let json = serde_json::to_string(body)?;
    let etag = compute_etag(version, &json);

    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    Ok((
        [
            (header::ETAG, etag),
            (header::CACHE_CONTROL, "no-cache".to_owned()),
            (header::CONTENT_TYPE, "application/json".to_owned()),
        ],
        json,
    )
        .into_response())
}
