//! HTTP content store.
//!
//! Fetches content files from a deployment origin that publishes them under
//! `/content/`. Used as a fallback where the content directory is not
//! reachable on the local filesystem (edge and serverless deployments).

use std::time::Duration;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use ureq::Agent;

use crate::storage::{ErrorStatus, Storage, StorageError, StorageErrorKind, clean_path};

/// Backend identifier for error messages.
const BACKEND: &str = "Http";

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 10;

/// Characters escaped inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Content store backed by `GET {origin}/content/{path}`.
pub struct HttpStorage {
    agent: Agent,
    origin: String,
}

impl HttpStorage {
    /// Create a store for the given origin (e.g., `https://docs.example.com`).
    #[must_use]
    pub fn new(origin: &str) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            origin: origin.trim_end_matches('/').to_owned(),
        }
    }

    /// Build the request URL for a physical path.
    fn url(&self, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
            .collect();
        format!("{}/content/{}", self.origin, encoded.join("/"))
    }
}

/// Map an HTTP status code to a storage error kind and retry guidance.
fn status_error(status: u16) -> (StorageErrorKind, ErrorStatus) {
    match status {
        404 | 410 => (StorageErrorKind::NotFound, ErrorStatus::Permanent),
        // The raw content route answers 400 for directories
        400 => (StorageErrorKind::NotAFile, ErrorStatus::Permanent),
        401 | 403 => (StorageErrorKind::PermissionDenied, ErrorStatus::Permanent),
        408 => (StorageErrorKind::Timeout, ErrorStatus::Temporary),
        429 => (StorageErrorKind::RateLimited, ErrorStatus::Persistent),
        500..=599 => (StorageErrorKind::Unavailable, ErrorStatus::Persistent),
        _ => (StorageErrorKind::Other, ErrorStatus::Permanent),
    }
}

impl Storage for HttpStorage {
    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let relative = clean_path(path).map_err(|e| e.with_backend(BACKEND))?;
        let url = self.url(relative);

        tracing::debug!(url = %url, "Fetching content");

        let response = self.agent.get(&url).call().map_err(|e| {
            StorageError::new(StorageErrorKind::Unavailable)
                .with_status(ErrorStatus::Temporary)
                .with_path(relative)
                .with_backend(BACKEND)
                .with_source(e)
        })?;

        let status = response.status().as_u16();
        if status >= 300 {
            let (kind, retry) = status_error(status);
            return Err(StorageError::new(kind)
                .with_status(retry)
                .with_path(relative)
                .with_backend(BACKEND));
        }

        response.into_body().read_to_vec().map_err(|e| {
            StorageError::new(StorageErrorKind::Other)
                .with_path(relative)
                .with_backend(BACKEND)
                .with_source(e)
        })
    }
}
