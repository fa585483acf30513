//! Catalog search against the Dataspace OData `Products` endpoint.
//!
//! [`SearchCriteria`] builds the `$filter` query, [`CatalogClient::query`]
//! sends it and normalizes the response into
//! [`ProductRecord`](crate::ProductRecord)s.

mod error;
mod query;

pub use error::QueryError;
pub use query::{SearchCriteria, SortOrder};

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::product::{ProductRecord, normalize_products};

/// Sends catalog queries and normalizes the results.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    /// Creates a catalog client against an OData base URL.
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Runs a query and returns one record per matching product.
    ///
    /// An empty result for a product type the mission does not know is
    /// reported as an informational log line, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] on transport failure or timeout, on a non-success
    /// status, on an unparseable body, or when the body lacks the `value` array.
    #[instrument(skip(self, criteria), fields(mission = %criteria.mission()))]
    pub async fn query(&self, criteria: &SearchCriteria) -> Result<Vec<ProductRecord>, QueryError> {
        let url = criteria.to_url(&self.base_url);
        debug!(%url, "sending catalog query");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| QueryError::network(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueryError::http_status(&url, status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| QueryError::network(&url, e))?;
        let json: Value =
            serde_json::from_slice(&body).map_err(|source| QueryError::Decode { source })?;

        let records = normalize_products(&json)?;

        if let Some(notice) = empty_result_notice(criteria, records.len()) {
            info!(known = ?criteria.mission().product_types(), "{notice}");
        }

        debug!(count = records.len(), "catalog query complete");
        Ok(records)
    }
}

/// Notice for an empty result whose requested product type the mission does
/// not list.
fn empty_result_notice(criteria: &SearchCriteria, found: usize) -> Option<String> {
    if found > 0 {
        return None;
    }
    let requested = criteria.requested_product_type()?;
    if criteria.mission().recognizes_product_type(requested) {
        return None;
    }
    Some(format!(
        "No product found. '{requested}' may not be a valid product type for {}",
        criteria.mission()
    ))
}
