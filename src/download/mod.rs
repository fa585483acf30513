//! Authenticated, concurrent download of product archives.
//!
//! This module streams product archives from the Dataspace archive endpoint
//! to disk, one file per product.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for multi-gigabyte archives)
//! - One bearer token per batch, shared read-only by every worker
//! - Bounded worker pool with per-product failure isolation
//! - Partial files removed when a transfer fails
//! - Optional progress observer (implemented for `indicatif::ProgressBar`)

mod client;
mod constants;
mod engine;
mod error;
mod progress;

pub use client::{ProductDownloader, archive_path, with_archive_extension};
pub use constants::{ARCHIVE_EXTENSION, CHUNK_SIZE};
pub use engine::{BatchReport, DownloadManager, DownloadOutcome, Workers};
pub use error::{DownloadError, EngineError};
pub use progress::{CountingProgress, ProgressObserver};
