//! High-level client tying catalog search, filtering and downloads together.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::auth::Authenticator;
use crate::catalog::{CatalogClient, SearchCriteria};
use crate::config::ClientConfig;
use crate::download::{
    BatchReport, DownloadManager, ProductDownloader, ProgressObserver, Workers,
    with_archive_extension,
};
use crate::error::Error;
use crate::filter::FilterSet;
use crate::http::{Timeouts, build_http_client};
use crate::mission::Mission;
use crate::product::ProductRecord;

/// Client for one mission of the Copernicus Dataspace.
///
/// # Example
///
/// ```no_run
/// use chrono::NaiveDate;
/// use dataspace_core::{ClientConfig, DataspaceClient, FilterSet, Mission, Workers};
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = DataspaceClient::new(ClientConfig::from_env()?, Mission::SENTINEL_1)?;
/// let criteria = client
///     .criteria(
///         NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
///         NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
///     )
///     .product_type("GRDM")
///     .limit(10);
/// let filters = FilterSet::new().with("orbitDirection", ["ASCENDING"]);
/// let products = client.query_filtered(&criteria, &filters).await?;
/// let report = client
///     .download_all(&products, Path::new("./products"), Workers::Auto, None)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DataspaceClient {
    mission: Mission,
    catalog: CatalogClient,
    downloads: DownloadManager,
}

impl DataspaceClient {
    /// Validates the configuration and builds the HTTP clients.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid or an HTTP
    /// client cannot be built.
    #[instrument(level = "debug", skip(config, mission), fields(mission = %mission))]
    pub fn new(config: ClientConfig, mission: Mission) -> Result<Self, Error> {
        config.validate()?;

        let api_client = build_http_client(Timeouts::api(&config))?;
        let download_client = build_http_client(Timeouts::download(&config))?;

        let catalog = CatalogClient::new(api_client.clone(), config.endpoints.catalog.clone());
        let authenticator = Authenticator::new(
            api_client,
            config.endpoints.token.clone(),
            config.client_id.clone(),
            config.credentials.clone(),
        );
        let downloader = ProductDownloader::new(download_client, config.endpoints.download.clone());

        debug!(username = %config.credentials.username(), "dataspace client ready");
        Ok(Self {
            mission,
            catalog,
            downloads: DownloadManager::new(authenticator, downloader),
        })
    }

    /// Mission this client queries.
    #[must_use]
    pub fn mission(&self) -> Mission {
        self.mission
    }

    /// Starts search criteria for this client's mission over `[start, end)`.
    #[must_use]
    pub fn criteria(&self, start: chrono::NaiveDate, end: chrono::NaiveDate) -> SearchCriteria {
        SearchCriteria::new(self.mission, start, end)
    }

    /// Queries the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] if the request or response handling fails.
    pub async fn query(&self, criteria: &SearchCriteria) -> Result<Vec<ProductRecord>, Error> {
        Ok(self.catalog.query(criteria).await?)
    }

    /// Queries the catalog, then applies attribute filters to the result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] for query failures and [`Error::Filter`] for
    /// rejected filters.
    pub async fn query_filtered(
        &self,
        criteria: &SearchCriteria,
        filters: &FilterSet,
    ) -> Result<Vec<ProductRecord>, Error> {
        let records = self.catalog.query(criteria).await?;
        if filters.is_empty() {
            return Ok(records);
        }
        Ok(filters.apply(&records)?)
    }

    /// Applies attribute filters to already-fetched records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Filter`] for rejected filters.
    pub fn filter(
        &self,
        records: &[ProductRecord],
        filters: &FilterSet,
    ) -> Result<Vec<ProductRecord>, Error> {
        Ok(filters.apply(records)?)
    }

    /// Downloads one product to `<destination>.zip`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authorization`] if no token can be obtained and
    /// [`Error::Download`] if the transfer fails.
    pub async fn download_one(&self, product_id: &str, destination: &Path) -> Result<PathBuf, Error> {
        self.downloads
            .download_one(product_id, with_archive_extension(destination))
            .await
    }

    /// Downloads every record into `output_dir`, one `<name>.zip` per product.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Batch`] if the batch cannot start; individual product
    /// failures are reported in the [`BatchReport`].
    pub async fn download_all(
        &self,
        records: &[ProductRecord],
        output_dir: &Path,
        workers: Workers,
        progress: Option<Arc<dyn ProgressObserver>>,
    ) -> Result<BatchReport, Error> {
        Ok(self
            .downloads
            .download_all(records, output_dir, workers, progress)
            .await?)
    }
}
