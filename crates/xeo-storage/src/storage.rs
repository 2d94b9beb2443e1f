//! Storage trait and error types.
//!
//! Provides the core [`Storage`] trait for probing and reading content files,
//! along with [`StorageError`] for unified error handling across backends.
//!
//! # Path Convention
//!
//! All path parameters are **physical paths** relative to the content root,
//! never logical page paths:
//! - `"README.md"` - root readme
//! - `"guide.md"` - standalone page
//! - `"domain/index.md"` - directory index
//! - `"images/logo.svg"` - any other asset
//!
//! A leading slash is tolerated and stripped. Paths with `..` segments are
//! rejected with [`StorageErrorKind::InvalidPath`].

use std::path::PathBuf;

/// Semantic error categories (inspired by Object Store + `OpenDAL`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// Resource does not exist.
    NotFound,
    /// Resource exists but is not a plain file (e.g., a directory).
    NotAFile,
    /// Permission denied.
    PermissionDenied,
    /// Invalid path or identifier.
    InvalidPath,
    /// Backend is temporarily unavailable.
    Unavailable,
    /// Too many requests.
    RateLimited,
    /// Operation timed out.
    Timeout,
    /// Other/unknown error category.
    Other,
}

/// Retry guidance (from `OpenDAL`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ErrorStatus {
    /// Don't retry (config error, not found, invalid path).
    #[default]
    Permanent,
    /// Retry immediately (timeout, connection reset).
    Temporary,
    /// Retry with backoff (rate limited, service unavailable).
    Persistent,
}

/// Storage error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StorageError {
    kind: StorageErrorKind,
    status: ErrorStatus,
    path: Option<PathBuf>,
    backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    /// Create a new storage error.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            status: ErrorStatus::Permanent,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set retry status.
    #[must_use]
    pub fn with_status(mut self, status: ErrorStatus) -> Self {
        self.status = status;
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Semantic error category.
    #[must_use]
    pub fn kind(&self) -> StorageErrorKind {
        self.kind
    }

    /// Retry guidance.
    #[must_use]
    pub fn status(&self) -> ErrorStatus {
        self.status
    }

    /// Path context, if any.
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        self.path.as_deref()
    }

    /// Backend identifier (e.g., "Fs", "Http", "Mock").
    #[must_use]
    pub fn backend(&self) -> Option<&'static str> {
        self.backend
    }

    /// True when the resource is simply absent (missing or not a plain file).
    ///
    /// Probing code treats these as ordinary misses rather than failures.
    #[must_use]
    pub fn is_miss(&self) -> bool {
        matches!(
            self.kind,
            StorageErrorKind::NotFound | StorageErrorKind::NotAFile
        )
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_path(path)
    }

    /// Create a storage error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StorageErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StorageErrorKind::PermissionDenied,
            std::io::ErrorKind::IsADirectory => StorageErrorKind::NotAFile,
            std::io::ErrorKind::TimedOut => StorageErrorKind::Timeout,
            _ => StorageErrorKind::Other,
        };
        let status = match err.kind() {
            std::io::ErrorKind::TimedOut => ErrorStatus::Temporary,
            _ => ErrorStatus::Permanent,
        };
        let mut error = Self::new(kind).with_status(status).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: /foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StorageErrorKind::NotFound => "Not found",
            StorageErrorKind::NotAFile => "Not a file",
            StorageErrorKind::PermissionDenied => "Permission denied",
            StorageErrorKind::InvalidPath => "Invalid path",
            StorageErrorKind::Unavailable => "Unavailable",
            StorageErrorKind::RateLimited => "Rate limited",
            StorageErrorKind::Timeout => "Timeout",
            StorageErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Normalize a physical path and reject traversal attempts.
///
/// Strips leading slashes and rejects any `..` segment or backslash-separated
/// traversal.
///
/// # Errors
///
/// Returns [`StorageErrorKind::InvalidPath`] if the path escapes the content root.
pub fn clean_path(path: &str) -> Result<&str, StorageError> {
    let trimmed = path.trim_start_matches('/');
    if trimmed.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(StorageError::new(StorageErrorKind::InvalidPath).with_path(path));
    }
    Ok(trimmed)
}

/// Content store abstraction.
///
/// The core never cares whether content lives on a local filesystem or
/// behind an HTTP origin; it only issues exact-path probes through this
/// trait, one at a time.
pub trait Storage: Send + Sync {
    /// Read raw bytes of a plain file.
    ///
    /// # Arguments
    ///
    /// * `path` - Physical path relative to the content root (e.g., "guide/index.md")
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::NotFound`] if nothing exists at `path`,
    /// [`StorageErrorKind::NotAFile`] if it is a directory, and other kinds
    /// for backend failures.
    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Read a plain file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Same as [`Storage::read_bytes`], plus [`StorageErrorKind::Other`] for
    /// invalid UTF-8.
    fn read(&self, path: &str) -> Result<String, StorageError> {
        let bytes = self.read_bytes(path)?;
        String::from_utf8(bytes).map_err(|e| {
            StorageError::new(StorageErrorKind::Other)
                .with_path(path)
                .with_source(e)
        })
    }

    /// Check if a plain file exists at the given path.
    ///
    /// Returns `false` on errors (treats errors as "doesn't exist").
    fn exists(&self, path: &str) -> bool {
        self.read_bytes(path).is_ok()
    }
}
