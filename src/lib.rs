//! Dataspace Core Library
//!
//! Client for the Copernicus Dataspace satellite-imagery catalog: search a
//! mission's products over a date range, narrow the results by attribute,
//! and download the selected archives concurrently with one bearer token per
//! batch.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`mission`] - Sentinel mission names and their known product types
//! - [`catalog`] - OData query builder and catalog client
//! - [`product`] - Flat product records normalized from catalog responses
//! - [`filter`] - Set-membership and `cloudCover` range filtering
//! - [`auth`] - Password-grant token exchange
//! - [`download`] - Streaming product downloads and the batch manager
//! - [`client`] - The [`DataspaceClient`] facade tying the above together
//! - [`config`] - Credentials, endpoints and timeouts

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod catalog;
pub mod client;
pub mod config;
pub mod download;
pub mod error;
pub mod filter;
mod http;
pub mod mission;
pub mod product;
mod user_agent;

// Re-export commonly used types
pub use auth::{AuthError, AuthToken, Authenticator};
pub use catalog::{CatalogClient, QueryError, SearchCriteria, SortOrder};
pub use client::DataspaceClient;
pub use config::{ClientConfig, ConfigError, Credentials, Endpoints};
pub use download::{
    BatchReport, CountingProgress, DownloadError, DownloadManager, DownloadOutcome, EngineError,
    ProductDownloader, ProgressObserver, Workers,
};
pub use error::Error;
pub use filter::{FilterError, FilterSet, RANGE_ATTRIBUTE, filter_records};
pub use mission::{Mission, UnknownMission};
pub use product::{AttributeValue, ProductRecord, normalize_products};
