//! Scroll record endpoints.
//!
//! Lets clients without durable local storage keep per-path scroll offsets
//! on the server. Each client sends an opaque id in the `x-xeo-client`
//! header and only sees its own record; only navigation entries can be
//! stored.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use xeo_kv::KeyValueStoreExt;
use xeo_site::canonical_path;

use crate::error::ServerError;
use crate::handlers::blocking;
use crate::state::AppState;

/// Header carrying the client id.
pub(crate) const CLIENT_HEADER: &str = "x-xeo-client";

const MAX_CLIENT_LEN: usize = 64;

/// Saved offset for one logical path.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
pub(crate) struct ScrollRecord {
    /// Offset in pixels, absent when nothing is saved.
    offset: Option<u32>,
}

/// Client id from the request headers: 1 to 64 ASCII letters, digits, `-`
/// or `_`.
fn client_id(headers: &HeaderMap) -> Result<String, ServerError> {
    let id = headers
        .get(CLIENT_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(ServerError::MissingClient)?;
    let valid = !id.is_empty()
        && id.len() <= MAX_CLIENT_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(id.to_owned())
    } else {
        Err(ServerError::MissingClient)
    }
}

/// Persisted key for `path`, which must be a navigation entry.
fn record_key(state: &AppState, client: &str, path: &str) -> Result<String, ServerError> {
    let path = canonical_path(path);
    if state.site.snapshot().tree().find(&path).is_none() {
        return Err(ServerError::UnknownPage(path));
    }
    Ok(state.scroll_key(client, &path))
}

/// Handle GET /api/scroll/{path}.
pub(crate) async fn get_scroll(
    Path(path): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ScrollRecord>, ServerError> {
    let client = client_id(&headers)?;
    blocking(move || read(&state, &client, &path))
        .await?
        .map(Json)
}

/// Handle PUT /api/scroll/{path}.
pub(crate) async fn put_scroll(
    Path(path): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(record): Json<ScrollRecord>,
) -> Result<StatusCode, ServerError> {
    let client = client_id(&headers)?;
    let Some(offset) = record.offset else {
        return Ok(StatusCode::BAD_REQUEST);
    };
    blocking(move || write(&state, &client, &path, offset)).await?
}

/// Store failures read as "nothing saved".
fn read(state: &AppState, client: &str, path: &str) -> Result<ScrollRecord, ServerError> {
    let key = record_key(state, client, path)?;
    let offset = state.state.get_parsed(&key).unwrap_or_else(|e| {
        tracing::warn!(key = %key, error = %e, "Failed to read scroll record");
        None
    });
    Ok(ScrollRecord { offset })
}

fn write(
    state: &AppState,
    client: &str,
    path: &str,
    offset: u32,
) -> Result<StatusCode, ServerError> {
    let key = record_key(state, client, path)?;
    state.state.set_display(&key, &offset)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use pretty_assertions::assert_eq;

    use super::*;

    fn headers(id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CLIENT_HEADER, HeaderValue::from_str(id).unwrap());
        headers
    }

    #[test]
    fn test_client_id_accepted() {
        assert_eq!(client_id(&headers("tab-1_a")).unwrap(), "tab-1_a");
    }

    #[test]
    fn test_client_id_rejected() {
        assert!(matches!(
            client_id(&HeaderMap::new()),
            Err(ServerError::MissingClient)
        ));
        assert!(client_id(&headers("")).is_err());
        assert!(client_id(&headers("a:b")).is_err());
        assert!(client_id(&headers(&"x".repeat(65))).is_err());
    }
}
