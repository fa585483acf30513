//! Crate-level error aggregating every module error.

use thiserror::Error;

use crate::auth::AuthError;
use crate::catalog::QueryError;
use crate::config::ConfigError;
use crate::download::{DownloadError, EngineError};
use crate::filter::FilterError;

/// Any error returned by [`DataspaceClient`](crate::DataspaceClient).
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Token exchange failed.
    #[error(transparent)]
    Authorization(#[from] AuthError),

    /// Catalog query failed.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Attribute filter rejected.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// A single download failed.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// A download batch could not start.
    #[error(transparent)]
    Batch(#[from] EngineError),
}
