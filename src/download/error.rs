//! Error types for the download module.
//!
//! [`DownloadError`] describes one failed product transfer and always names
//! either the product id or the destination file. [`EngineError`] is reserved
//! for failures that stop a whole batch before any transfer starts.

use std::path::PathBuf;

use thiserror::Error;

use crate::auth::AuthError;

/// Errors that fail a single product download.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The request could not be sent (DNS, connection refused, TLS, ...).
    #[error("network error requesting product {product_id}: {source}")]
    Network {
        /// Catalog product id.
        product_id: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The archive endpoint answered with a status other than 200.
    #[error("HTTP {status} downloading product {product_id}")]
    HttpStatus {
        /// Catalog product id.
        product_id: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The body stream failed part-way through.
    #[error("download failed for {path}: {source}")]
    Transfer {
        /// Destination file.
        path: PathBuf,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Creating or writing the destination file failed.
    #[error("download failed for {path}: {source}")]
    Io {
        /// Destination file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The product name cannot be used as a file name inside the output directory.
    #[error("product name '{name}' is not a plain file name")]
    InvalidName {
        /// The rejected product name.
        name: String,
    },

    /// The worker task panicked before reporting a result.
    #[error("download task for product {product_id} panicked: {message}")]
    TaskPanicked {
        /// Catalog product id.
        product_id: String,
        /// Panic or join failure description.
        message: String,
    },
}

impl DownloadError {
    /// Creates a request-level network error.
    pub fn network(product_id: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            product_id: product_id.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(product_id: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            product_id: product_id.into(),
            status,
        }
    }

    /// Creates a mid-stream transfer error.
    pub fn transfer(path: impl Into<PathBuf>, source: reqwest::Error) -> Self {
        Self::Transfer {
            path: path.into(),
            source,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true for 401/403 responses, typically an expired token.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::HttpStatus { status: 401 | 403, .. })
    }
}

/// Errors that abort a download batch before any product is fetched.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The batch token could not be obtained.
    #[error(transparent)]
    Authorization(#[from] AuthError),

    /// The destination directory could not be created.
    #[error("cannot prepare output directory {path}: {source}")]
    OutputDir {
        /// The destination directory.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,
}
