//! Authenticated streaming transfer of one product archive.

use std::path::{Component, Path, PathBuf};

use futures_util::StreamExt;
use reqwest::Client;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};

use super::constants::{ARCHIVE_EXTENSION, CHUNK_SIZE};
use super::error::DownloadError;
use crate::auth::AuthToken;

/// Downloads product archives from the `Products(<id>)/$value` endpoint.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ProductDownloader {
    client: Client,
    base_url: String,
}

impl ProductDownloader {
    /// Creates a downloader against an archive base URL.
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// URL serving the archive of `product_id`.
    #[must_use]
    pub fn product_url(&self, product_id: &str) -> String {
        format!("{}/Products({product_id})/$value", self.base_url)
    }

    /// Streams the archive of `product_id` into `path`, returning bytes written.
    ///
    /// A partially written file is removed when the transfer fails.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Network`] if the request cannot be sent,
    /// [`DownloadError::HttpStatus`] for any status other than 200, and
    /// [`DownloadError::Transfer`] / [`DownloadError::Io`] for failures while
    /// streaming to disk.
    #[instrument(skip(self, token), fields(path = %path.display()))]
    pub async fn download(
        &self,
        product_id: &str,
        path: &Path,
        token: &AuthToken,
    ) -> Result<u64, DownloadError> {
        let url = self.product_url(product_id);
        debug!(%url, "requesting product archive");

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, token.bearer())
            .send()
            .await
            .map_err(|e| DownloadError::network(product_id, e))?;

        if response.status() != StatusCode::OK {
            return Err(DownloadError::http_status(
                product_id,
                response.status().as_u16(),
            ));
        }

        let file = File::create(path)
            .await
            .map_err(|e| DownloadError::io(path.to_path_buf(), e))?;

        let stream_result = stream_to_file(file, response, path).await;
        if stream_result.is_err() {
            debug!(path = %path.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(path).await;
        }
        let bytes = stream_result?;

        info!(path = %path.display(), bytes, "download complete");
        Ok(bytes)
    }
}

/// Destination of a product archive inside `output_dir`: `<dir>/<name>.zip`.
///
/// # Errors
///
/// Returns [`DownloadError::InvalidName`] if the name is not a single plain
/// file name, so that no archive is written outside `output_dir`.
pub fn archive_path(output_dir: &Path, product_name: &str) -> Result<PathBuf, DownloadError> {
    let mut components = Path::new(product_name).components();
    let single_file_name = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_file_name || product_name.contains(['/', '\\']) {
        return Err(DownloadError::InvalidName {
            name: product_name.to_string(),
        });
    }
    Ok(output_dir.join(format!("{product_name}.{ARCHIVE_EXTENSION}")))
}

/// Appends the archive extension to a caller-chosen path stem.
#[must_use]
pub fn with_archive_extension(path: &Path) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(".");
    raw.push(ARCHIVE_EXTENSION);
    PathBuf::from(raw)
}

async fn stream_to_file(
    file: File,
    response: reqwest::Response,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::transfer(file_path, e))?;
        if chunk.is_empty() {
            continue;
        }

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

    Ok(bytes_written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_url_format() {
        let downloader = ProductDownloader::new(
            Client::new(),
            "https://zipper.dataspace.copernicus.eu/odata/v1/",
        );
        assert_eq!(
            downloader.product_url("0a1b-2c3d"),
            "https://zipper.dataspace.copernicus.eu/odata/v1/Products(0a1b-2c3d)/$value"
        );
    }

    #[test]
    fn test_archive_path_keeps_dots_in_product_name() {
        let path = archive_path(Path::new("/data"), "S1A_IW_GRDH_1SDV_20230101.SAFE").unwrap();
        assert_eq!(path, PathBuf::from("/data/S1A_IW_GRDH_1SDV_20230101.SAFE.zip"));
    }

    #[test]
    fn test_archive_path_rejects_names_leaving_output_dir() {
        for name in ["../escape", "nested/S1A_IW", "/etc/passwd", "..", "", "dir\\S2B"] {
            let err = archive_path(Path::new("/data"), name).unwrap_err();
            assert!(matches!(err, DownloadError::InvalidName { .. }), "{name}: {err:?}");
        }
    }

    #[test]
    fn test_with_archive_extension_appends() {
        let path = with_archive_extension(Path::new("out/S2B_MSIL2A.SAFE"));
        assert_eq!(path, PathBuf::from("out/S2B_MSIL2A.SAFE.zip"));
    }
}
