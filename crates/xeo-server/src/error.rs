//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use xeo_storage::{StorageError, StorageErrorKind};

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Content path escapes the content root.
    #[error("Invalid content path: {0}")]
    InvalidPath(String),

    /// Nothing stored at the given content path.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Content path names a directory.
    #[error("Not a file: {0}")]
    NotAFile(String),

    /// Content store failure other than a miss.
    #[error("Storage error: {0}")]
    Storage(#[source] StorageError),

    /// Scroll request without a usable client id.
    #[error("Missing or invalid x-xeo-client header")]
    MissingClient,

    /// Scroll request for a path outside the navigation.
    #[error("Unknown page: {0}")]
    UnknownPage(String),

    /// Persisted key/value store failure.
    #[error("State store error: {0}")]
    State(#[from] xeo_kv::KvError),

    /// Response could not be encoded.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Listen address could not be parsed.
    #[error("Invalid listen address: {0}")]
    Address(#[from] std::net::AddrParseError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Blocking task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ServerError {
    /// Classify a content store error for `path`.
    pub(crate) fn from_storage(path: &str, err: StorageError) -> Self {
        match err.kind() {
            StorageErrorKind::InvalidPath => Self::InvalidPath(path.to_owned()),
            StorageErrorKind::NotFound => Self::FileNotFound(path.to_owned()),
            StorageErrorKind::NotAFile => Self::NotAFile(path.to_owned()),
            _ => Self::Storage(err),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::InvalidPath(path) => (
                StatusCode::BAD_REQUEST,
                json!({"error": "Invalid path", "path": path}),
            ),
            Self::FileNotFound(path) => (
                StatusCode::NOT_FOUND,
                json!({"error": "File not found", "path": path}),
            ),
            Self::NotAFile(path) => (
                StatusCode::BAD_REQUEST,
                json!({"error": "Not a file", "path": path}),
            ),
            Self::MissingClient => (
                StatusCode::BAD_REQUEST,
                json!({"error": self.to_string()}),
            ),
            Self::UnknownPage(path) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Unknown page", "path": path}),
            ),
            Self::Storage(e) => {
                tracing::warn!(error = %e, "Content store failure");
                (StatusCode::BAD_GATEWAY, json!({"error": e.to_string()}))
            }
            Self::State(_)
            | Self::Serialize(_)
            | Self::Address(_)
            | Self::Io(_)
            | Self::Join(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": self.to_string()}),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}
