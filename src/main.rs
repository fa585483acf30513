//! CLI entry point for the dataspace tool.

use std::io::{self, IsTerminal, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use dataspace_core::{
    BatchReport, ClientConfig, Credentials, DataspaceClient, Endpoints, Mission, ProductRecord,
    ProgressObserver, Workers,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

mod app_config;
mod cli;

use app_config::{FileConfig, load_file_config};
use cli::{Args, Command, DownloadArgs, SearchArgs};

/// Process outcome, mapped to the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessExit {
    Success,
    Partial,
    Failure,
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        match exit {
            ProcessExit::Success => ExitCode::SUCCESS,
            ProcessExit::Failure => ExitCode::from(1),
            ProcessExit::Partial => ExitCode::from(2),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "loaded environment file"),
        Err(error) if error.not_found() => {}
        Err(error) => warn!(error = %error, "ignoring unreadable .env file"),
    }

    let loaded = load_file_config(args.config.as_deref())?;
    if loaded.loaded_from_file {
        debug!(path = ?loaded.path, "loaded config file");
    }
    let file_config = loaded.config;

    let exit = match &args.command {
        Command::Query(search) => run_query(search, &file_config).await?,
        Command::Download(download) => run_download(download, &file_config, args.quiet).await?,
    };
    Ok(exit.into())
}

async fn run_query(search: &SearchArgs, file_config: &FileConfig) -> Result<ProcessExit> {
    let client = build_client(search, file_config)?;
    let records = fetch_records(&client, search).await?;

    let mut stdout = io::stdout().lock();
    for record in &records {
        let line = serde_json::to_string(record).context("Failed to serialize product record")?;
        writeln!(stdout, "{line}")?;
    }
    Ok(ProcessExit::Success)
}

async fn run_download(
    download: &DownloadArgs,
    file_config: &FileConfig,
    quiet: bool,
) -> Result<ProcessExit> {
    let client = build_client(&download.search, file_config)?;
    let records = fetch_records(&client, &download.search).await?;
    if records.is_empty() {
        info!("No products matched, nothing to download");
        return Ok(ProcessExit::Success);
    }

    let output_dir = download
        .output_dir
        .clone()
        .or_else(|| file_config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let workers = resolve_workers(download.workers, file_config.workers);

    let bar = progress_bar(records.len(), quiet);
    let progress: Arc<dyn ProgressObserver> = Arc::new(bar.clone());

    info!(
        products = records.len(),
        output_dir = %output_dir.display(),
        "Starting downloads"
    );
    let report = client
        .download_all(&records, &output_dir, workers, Some(progress))
        .await
        .context("Download batch aborted")?;
    bar.finish_and_clear();

    Ok(summarize(&report))
}

fn build_client(search: &SearchArgs, file_config: &FileConfig) -> Result<DataspaceClient> {
    let mission_name = search
        .mission
        .as_deref()
        .or(file_config.mission.as_deref())
        .context("No mission given; pass --mission or set `mission` in the config file")?;
    let mission = Mission::from_name(mission_name)?;

    let credentials = Credentials::from_env()
        .context("Set COPERNICUS_USERNAME and COPERNICUS_PASSWORD in the environment or a .env file")?;
    let config = client_config(credentials, file_config);

    DataspaceClient::new(config, mission).context("Invalid client configuration")
}

fn client_config(credentials: Credentials, file_config: &FileConfig) -> ClientConfig {
    let defaults = Endpoints::default();
    let endpoints = Endpoints {
        catalog: file_config.catalog_url.clone().unwrap_or(defaults.catalog),
        token: file_config.token_url.clone().unwrap_or(defaults.token),
        download: file_config.download_url.clone().unwrap_or(defaults.download),
    };

    let mut config = ClientConfig::new(credentials).with_endpoints(endpoints);
    if let Some(secs) = file_config.request_timeout_secs {
        config = config.with_request_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = file_config.connect_timeout_secs {
        config.connect_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = file_config.download_read_timeout_secs {
        config = config.with_download_read_timeout(Duration::from_secs(secs));
    }
    config
}

async fn fetch_records(client: &DataspaceClient, search: &SearchArgs) -> Result<Vec<ProductRecord>> {
    let criteria = search.criteria(client.mission());
    let filters = search.filter_set();
    let records = client
        .query_filtered(&criteria, &filters)
        .await
        .context("Catalog query failed")?;
    info!(products = records.len(), mission = %client.mission(), "Catalog query complete");
    Ok(records)
}

fn resolve_workers(cli: Option<u16>, file: Option<usize>) -> Workers {
    cli.map(usize::from)
        .or(file)
        .and_then(NonZeroUsize::new)
        .map_or(Workers::Auto, Workers::Fixed)
}

fn progress_bar(total: usize, quiet: bool) -> ProgressBar {
    if quiet || !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(u64::try_from(total).unwrap_or(u64::MAX));
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{pos}/{len}] {wide_bar} {elapsed_precise}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn summarize(report: &BatchReport) -> ProcessExit {
    for (outcome, path) in report.succeeded() {
        debug!(product = %outcome.name, path = %path.display(), "downloaded");
    }
    for (outcome, error) in report.failed() {
        warn!(product = %outcome.name, id = %outcome.product_id, error = %error, "download failed");
    }

    let completed = report.succeeded().count();
    let failed = report.failed().count();
    info!(completed, failed, total = report.len(), "Download complete");
    determine_exit_outcome(completed, failed)
}

fn determine_exit_outcome(completed: usize, failed: usize) -> ProcessExit {
    if failed == 0 {
        ProcessExit::Success
    } else if completed > 0 {
        ProcessExit::Partial
    } else {
        ProcessExit::Failure
    }
}
