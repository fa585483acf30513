//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

use dataspace_core::{AttributeValue, FilterSet, Mission, SearchCriteria, SortOrder};

/// Search and download Copernicus Dataspace satellite products.
///
/// Credentials are read from `COPERNICUS_USERNAME` and `COPERNICUS_PASSWORD`,
/// either from the environment or from a `.env` file.
#[derive(Parser, Debug)]
#[command(name = "dataspace")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/dataspace/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Query the catalog and print one JSON record per product
    Query(SearchArgs),
    /// Query the catalog and download every matching product
    Download(DownloadArgs),
}

/// Catalog search and filter options shared by all subcommands.
#[derive(ClapArgs, Debug)]
pub struct SearchArgs {
    /// Mission name or alias (S1, SENTINEL-2, sentinel5p, ...)
    #[arg(short, long)]
    pub mission: Option<String>,

    /// First acquisition day, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub start: NaiveDate,

    /// Last acquisition day, exclusive (YYYY-MM-DD)
    #[arg(long)]
    pub end: NaiveDate,

    /// Keep products whose name contains this product type
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub product_type: Option<String>,

    /// Drop products whose name contains this string
    #[arg(long)]
    pub exclude: Option<String>,

    /// Area of interest as WKT in EPSG:4326
    #[arg(long, value_name = "WKT")]
    pub footprint: Option<String>,

    /// Sort by acquisition start
    #[arg(long, value_enum)]
    pub order: Option<Order>,

    /// Maximum number of products returned by the catalog (1-1000)
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub limit: Option<u32>,

    /// Attribute filter KEY=V1,V2 (repeatable; cloudCover=MIN,MAX is a range)
    #[arg(short = 'f', long = "filter", value_name = "KEY=VALUES", value_parser = parse_filter)]
    pub filters: Vec<(String, Vec<AttributeValue>)>,
}

impl SearchArgs {
    /// Builds catalog criteria for `mission`.
    #[must_use]
    pub fn criteria(&self, mission: Mission) -> SearchCriteria {
        let mut criteria = SearchCriteria::new(mission, self.start, self.end);
        if let Some(product_type) = &self.product_type {
            criteria = criteria.product_type(product_type.clone());
        }
        if let Some(exclude) = &self.exclude {
            criteria = criteria.exclude(exclude.clone());
        }
        if let Some(footprint) = &self.footprint {
            criteria = criteria.footprint(footprint.clone());
        }
        if let Some(order) = self.order {
            criteria = criteria.order_by(order.into());
        }
        if let Some(limit) = self.limit {
            criteria = criteria.limit(limit);
        }
        criteria
    }

    /// Collects `--filter` flags in the order given.
    #[must_use]
    pub fn filter_set(&self) -> FilterSet {
        self.filters.iter().cloned().collect()
    }
}

/// Options for the `download` subcommand.
#[derive(ClapArgs, Debug)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub search: SearchArgs,

    /// Directory the product archives are written to
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Concurrent downloads (1-64, defaults to the number of CPUs)
    #[arg(short = 'w', long, value_parser = clap::value_parser!(u16).range(1..=64))]
    pub workers: Option<u16>,
}

/// Sort direction flag values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Order {
    Asc,
    Desc,
}

impl From<Order> for SortOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Asc => SortOrder::Ascending,
            Order::Desc => SortOrder::Descending,
        }
    }
}

/// Parses `KEY=V1,V2,...` into a filter predicate.
///
/// Each value becomes a bool for `true`/`false`, a number when it parses as
/// one, and a string otherwise.
fn parse_filter(raw: &str) -> Result<(String, Vec<AttributeValue>), String> {
    let (key, values) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUES, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing attribute name in '{raw}'"));
    }
    let values: Vec<AttributeValue> = values
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(parse_filter_value)
        .collect();
    if values.is_empty() {
        return Err(format!("no values given for '{key}'"));
    }
    Ok((key.to_string(), values))
}

fn parse_filter_value(raw: &str) -> AttributeValue {
    match raw {
        "true" => AttributeValue::Bool(true),
        "false" => AttributeValue::Bool(false),
        _ => raw
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .map_or_else(|| AttributeValue::from(raw), AttributeValue::Number),
    }
}
