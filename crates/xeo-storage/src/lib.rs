//! Content store abstraction for the Xeo documentation viewer.
//!
//! This crate provides a [`Storage`] trait for probing and reading content
//! files independently of where they live. This enables:
//!
//! - **Unit testing** without touching the real filesystem
//! - **Backend flexibility** (local directory, HTTP origin, or both layered)
//! - **Clean separation** between path resolution logic and I/O
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `read_bytes()`, `read()`, and `exists()` methods
//! - [`FsStorage`] for a local content directory
//! - [`HttpStorage`] for content published under an origin's `/content/` route
//! - [`LayeredStorage`] to try a primary store before a fallback
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use xeo_storage::{FsStorage, Storage};
//!
//! let storage = FsStorage::new(PathBuf::from("content"));
//! let text = storage.read("guide/index.md")?;
//! ```

mod fs;
mod http;
mod layered;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod storage;

pub use fs::FsStorage;
pub use http::HttpStorage;
pub use layered::LayeredStorage;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockStorage;
pub use storage::{ErrorStatus, Storage, StorageError, StorageErrorKind, clean_path};
