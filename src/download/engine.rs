//! Download manager for concurrent, authenticated product batches.
//!
//! The manager obtains one bearer token per batch, then runs one task per
//! product on the Tokio runtime. A semaphore bounds how many transfers are in
//! flight, and dropping the batch future aborts the transfers still running. Every task reports its own outcome: a failed product never cancels
//! its siblings, and the batch always returns a [`BatchReport`] covering every
//! input record.
//!
//! # Example
//!
//! ```no_run
//! use dataspace_core::{ClientConfig, DataspaceClient, Mission, Workers};
//! use std::path::Path;
//!
//! # async fn example(records: Vec<dataspace_core::ProductRecord>) -> Result<(), Box<dyn std::error::Error>> {
//! let client = DataspaceClient::new(ClientConfig::from_env()?, Mission::SENTINEL_1)?;
//! let report = client
//!     .download_all(&records, Path::new("./products"), Workers::Auto, None)
//!     .await?;
//! println!("{} downloaded, {} failed", report.succeeded().count(), report.failed().count());
//! # Ok(())
//! # }
//! ```

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use super::client::{ProductDownloader, archive_path};
use super::error::{DownloadError, EngineError};
use super::progress::ProgressObserver;
use crate::auth::{AuthToken, Authenticator};
use crate::error::Error;
use crate::product::ProductRecord;

/// Worker pool sizing for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Workers {
    /// One worker per available CPU.
    #[default]
    Auto,
    /// An explicit number of workers.
    Fixed(NonZeroUsize),
}

impl Workers {
    /// Creates a fixed pool size, or `None` for zero.
    #[must_use]
    pub fn fixed(count: usize) -> Option<Self> {
        NonZeroUsize::new(count).map(Self::Fixed)
    }

    /// Pool size for `task_count` tasks, clamped to `1..=task_count`.
    #[must_use]
    pub fn resolve(self, task_count: usize) -> usize {
        let requested = match self {
            Self::Auto => std::thread::available_parallelism().map_or(1, NonZeroUsize::get),
            Self::Fixed(count) => count.get(),
        };
        requested.min(task_count).max(1)
    }
}

/// Result of one product transfer.
#[derive(Debug)]
pub struct DownloadOutcome {
    /// Catalog product id.
    pub product_id: String,
    /// Product name.
    pub name: String,
    /// Written file on success, the cause on failure.
    pub result: Result<PathBuf, DownloadError>,
}

impl DownloadOutcome {
    /// Returns true if the product was written to disk.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-product outcomes of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    outcomes: Vec<DownloadOutcome>,
}

impl BatchReport {
    /// All outcomes, in the order the records were given.
    #[must_use]
    pub fn outcomes(&self) -> &[DownloadOutcome] {
        &self.outcomes
    }

    /// Consumes the report, returning the outcomes.
    #[must_use]
    pub fn into_outcomes(self) -> Vec<DownloadOutcome> {
        self.outcomes
    }

    /// Successfully written files, with their outcome.
    pub fn succeeded(&self) -> impl Iterator<Item = (&DownloadOutcome, &Path)> {
        self.outcomes.iter().filter_map(|outcome| match &outcome.result {
            Ok(path) => Some((outcome, path.as_path())),
            Err(_) => None,
        })
    }

    /// Failed products, with their error.
    pub fn failed(&self) -> impl Iterator<Item = (&DownloadOutcome, &DownloadError)> {
        self.outcomes.iter().filter_map(|outcome| match &outcome.result {
            Ok(_) => None,
            Err(error) => Some((outcome, error)),
        })
    }

    /// Number of products attempted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns true for an empty batch.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Returns true if every product was written.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(DownloadOutcome::is_success)
    }
}

/// Coordinates token acquisition and concurrent product transfers.
#[derive(Debug, Clone)]
pub struct DownloadManager {
    authenticator: Authenticator,
    downloader: ProductDownloader,
}

impl DownloadManager {
    /// Creates a manager from an authenticator and a product downloader.
    #[must_use]
    pub fn new(authenticator: Authenticator, downloader: ProductDownloader) -> Self {
        Self {
            authenticator,
            downloader,
        }
    }

    /// Downloads every record into `output_dir` as `<name>.zip`.
    ///
    /// One token is acquired before any transfer starts and shared by all
    /// workers. The observer, when given, is advanced once per finished task.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Authorization`] if the token exchange fails and
    /// [`EngineError::OutputDir`] if `output_dir` cannot be created. Individual
    /// download failures do NOT fail the batch; they are reported in the
    /// returned [`BatchReport`].
    #[instrument(skip(self, records, progress), fields(output_dir = %output_dir.display(), records = records.len()))]
    pub async fn download_all(
        &self,
        records: &[ProductRecord],
        output_dir: &Path,
        workers: Workers,
        progress: Option<Arc<dyn ProgressObserver>>,
    ) -> Result<BatchReport, EngineError> {
        if records.is_empty() {
            debug!("no records selected, nothing to download");
            return Ok(BatchReport::default());
        }

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|source| EngineError::OutputDir {
                path: output_dir.to_path_buf(),
                source,
            })?;

        let token = Arc::new(self.authenticator.fetch_token().await?);
        let pool_size = workers.resolve(records.len());
        let semaphore = Arc::new(Semaphore::new(pool_size));
        info!(pool_size, "starting download batch");

        // Dropping the set aborts every transfer still in flight.
        let mut tasks = JoinSet::new();
        let mut results: Vec<Option<Result<PathBuf, DownloadError>>> =
            records.iter().map(|_| None).collect();

        for (index, record) in records.iter().enumerate() {
            let path = match archive_path(output_dir, record.name()) {
                Ok(path) => path,
                Err(error) => {
                    warn!(product_id = record.id(), error = %error, "skipping product");
                    if let Some(progress) = &progress {
                        progress.advance();
                    }
                    results[index] = Some(Err(error));
                    continue;
                }
            };

            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|_| EngineError::SemaphoreClosed)?;

            let downloader = self.downloader.clone();
            let token = Arc::clone(&token);
            let progress = progress.clone();
            let product_id = record.id().to_string();

            tasks.spawn(async move {
                let _permit = permit;
                let result = download_product(&downloader, &product_id, path, &token).await;
                if let Some(progress) = &progress {
                    progress.advance();
                }
                (index, result)
            });
        }

        debug!(task_count = tasks.len(), "waiting for downloads to complete");

        let mut panic_message = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(join_error) => {
                    warn!(error = %join_error, "download task panicked");
                    if let Some(progress) = &progress {
                        progress.advance();
                    }
                    panic_message = Some(join_error.to_string());
                }
            }
        }

        let outcomes = records
            .iter()
            .zip(results)
            .map(|(record, result)| DownloadOutcome {
                product_id: record.id().to_string(),
                name: record.name().to_string(),
                result: result.unwrap_or_else(|| {
                    Err(DownloadError::TaskPanicked {
                        product_id: record.id().to_string(),
                        message: panic_message
                            .clone()
                            .unwrap_or_else(|| "task did not report a result".to_string()),
                    })
                }),
            })
            .collect();

        let report = BatchReport { outcomes };
        info!(
            succeeded = report.succeeded().count(),
            failed = report.failed().count(),
            total = report.len(),
            "download batch complete"
        );
        Ok(report)
    }

    /// Downloads one product to exactly `path` with a freshly acquired token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authorization`] when the token cannot be obtained and
    /// [`Error::Download`] when the transfer fails.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn download_one(&self, product_id: &str, path: PathBuf) -> Result<PathBuf, Error> {
        let token = self.authenticator.fetch_token().await?;
        Ok(download_product(&self.downloader, product_id, path, &token).await?)
    }
}

async fn download_product(
    downloader: &ProductDownloader,
    product_id: &str,
    path: PathBuf,
    token: &AuthToken,
) -> Result<PathBuf, DownloadError> {
    match downloader.download(product_id, &path, token).await {
        Ok(_) => Ok(path),
        Err(error) => {
            if error.is_unauthorized() {
                warn!(product_id, error = %error, "download rejected, the batch token may have expired");
            } else {
                warn!(product_id, error = %error, "download failed");
            }
            Err(error)
        }
    }
}
