//! End-to-end CLI tests for the dataspace binary.

// `Command::cargo_bin` is deprecated in assert_cmd >=2.0.17 in favor of
// `cargo::cargo_bin_cmd!` macro. Suppressed until migration to the new API.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

mod support;
use support::fixtures::{
    PASSWORD, USERNAME, catalog_body, mount_archive, mount_catalog, mount_token, product,
};
use support::socket_guard::start_mock_server_or_skip;

fn write_dataspace_config(config_home: &std::path::Path, contents: &str) {
    let config_dir = config_home.join("dataspace");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), contents).unwrap();
}

fn toml_path(path: &std::path::Path) -> String {
    path.to_string_lossy().replace('\\', "\\\\")
}

/// Binary invocation isolated from the developer's config, `.env` and credentials.
fn dataspace(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dataspace").unwrap();
    cmd.current_dir(home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env("HOME", home.path())
        .env_remove("COPERNICUS_USERNAME")
        .env_remove("COPERNICUS_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

fn endpoints_config(base: &str) -> String {
    format!(
        "catalog_url = \"{base}/odata/v1\"\ntoken_url = \"{base}/token\"\ndownload_url = \"{base}/odata/v1\"\n"
    )
}

#[test]
fn test_binary_help_lists_subcommands() {
    let home = TempDir::new().unwrap();
    dataspace(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("query"))
        .stdout(predicate::str::contains("download"));
}

#[test]
fn test_binary_version() {
    let home = TempDir::new().unwrap();
    dataspace(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_binary_invalid_date_is_usage_error() {
    let home = TempDir::new().unwrap();
    dataspace(&home)
        .args(["query", "-m", "S1", "--start", "2023-02-30", "--end", "2023-03-01"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--start"));
}

#[test]
fn test_binary_missing_credentials_fails() {
    let home = TempDir::new().unwrap();
    dataspace(&home)
        .args(["query", "-m", "S1", "--start", "2023-01-01", "--end", "2023-01-15"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("COPERNICUS_USERNAME"));
}

#[test]
fn test_binary_missing_mission_fails() {
    let home = TempDir::new().unwrap();
    dataspace(&home)
        .env("COPERNICUS_USERNAME", USERNAME)
        .env("COPERNICUS_PASSWORD", PASSWORD)
        .args(["query", "--start", "2023-01-01", "--end", "2023-01-15"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--mission"));
}

#[test]
fn test_binary_unknown_mission_fails() {
    let home = TempDir::new().unwrap();
    dataspace(&home)
        .env("COPERNICUS_USERNAME", USERNAME)
        .env("COPERNICUS_PASSWORD", PASSWORD)
        .args(["query", "-m", "LANDSAT-8", "--start", "2023-01-01", "--end", "2023-01-15"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("LANDSAT-8"));
}

#[test]
fn test_binary_invalid_config_file_fails() {
    let home = TempDir::new().unwrap();
    write_dataspace_config(home.path(), "workers = 0\n");
    dataspace(&home)
        .args(["query", "-m", "S1", "--start", "2023-01-01", "--end", "2023-01-15"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("workers"));
}

#[test]
fn test_binary_query_prints_json_lines() {
    let Some(mock_server) = tokio_test::block_on(start_mock_server_or_skip()) else {
        return;
    };
    tokio_test::block_on(mount_catalog(
        &mock_server,
        catalog_body(vec![
            product("a1", "S1A_IW_GRDH_20230103", &[("orbitDirection", json!("ASCENDING"))]),
            product("b2", "S1A_IW_GRDH_20230105", &[("orbitDirection", json!("DESCENDING"))]),
        ]),
    ));

    let home = TempDir::new().unwrap();
    write_dataspace_config(home.path(), &endpoints_config(&mock_server.uri()));

    let output = dataspace(&home)
        .env("COPERNICUS_USERNAME", USERNAME)
        .env("COPERNICUS_PASSWORD", PASSWORD)
        .args([
            "query",
            "-m",
            "S1",
            "--start",
            "2023-01-01",
            "--end",
            "2023-01-15",
            "-f",
            "orbitDirection=ASCENDING",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(output).unwrap();
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 1, "{stdout}");
    assert_eq!(lines[0]["id"], "a1");
    assert_eq!(lines[0]["fields"]["orbitDirection"], "ASCENDING");
}

#[test]
fn test_binary_download_partial_failure_exit_code() {
    let Some(mock_server) = tokio_test::block_on(start_mock_server_or_skip()) else {
        return;
    };
    tokio_test::block_on(async {
        mount_catalog(
            &mock_server,
            catalog_body(vec![
                product("a1", "S1A_IW_GRDH_20230103", &[]),
                product("b2", "S1A_IW_GRDH_20230105", &[]),
            ]),
        )
        .await;
        mount_token(&mock_server).await;
        mount_archive(&mock_server, "a1", 200, b"archive").await;
        mount_archive(&mock_server, "b2", 404, b"").await;
    });

    let home = TempDir::new().unwrap();
    let output_dir = home.path().join("products");
    write_dataspace_config(
        home.path(),
        &format!(
            "{}output_dir = \"{}\"\nworkers = 2\n",
            endpoints_config(&mock_server.uri()),
            toml_path(&output_dir)
        ),
    );

    dataspace(&home)
        .env("COPERNICUS_USERNAME", USERNAME)
        .env("COPERNICUS_PASSWORD", PASSWORD)
        .args(["download", "-m", "S1", "--start", "2023-01-01", "--end", "2023-01-15"])
        .assert()
        .code(2);

    assert!(output_dir.join("S1A_IW_GRDH_20230103.zip").is_file());
    assert!(!output_dir.join("S1A_IW_GRDH_20230105.zip").exists());
}

#[test]
fn test_binary_download_nothing_matched_succeeds() {
    let Some(mock_server) = tokio_test::block_on(start_mock_server_or_skip()) else {
        return;
    };
    tokio_test::block_on(mount_catalog(&mock_server, catalog_body(vec![])));

    let home = TempDir::new().unwrap();
    write_dataspace_config(home.path(), &endpoints_config(&mock_server.uri()));

    dataspace(&home)
        .env("COPERNICUS_USERNAME", USERNAME)
        .env("COPERNICUS_PASSWORD", PASSWORD)
        .args(["download", "-m", "S2", "--start", "2023-01-01", "--end", "2023-01-15"])
        .assert()
        .success()
        .stderr(predicate::str::contains("nothing to download"));
}
