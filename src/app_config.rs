//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// TOML-backed file configuration for `dataspace` defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Default mission when `--mission` is not given.
    pub mission: Option<String>,
    /// Default output directory for downloads.
    pub output_dir: Option<PathBuf>,
    /// Default number of download workers.
    pub workers: Option<usize>,
    /// Override for the catalog base URL.
    pub catalog_url: Option<String>,
    /// Override for the token endpoint.
    pub token_url: Option<String>,
    /// Override for the download base URL.
    pub download_url: Option<String>,
    /// Total timeout for token and catalog requests, in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Connect timeout for every request, in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// Optional idle-read timeout for downloads, in seconds.
    pub download_read_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(workers) = self.workers
            && !(1..=64).contains(&workers)
        {
            bail!("Invalid config value for `workers`: {workers}. Expected range: 1..=64");
        }
        if let Some(mission) = &self.mission {
            dataspace_core::Mission::from_name(mission)
                .context("Invalid config value for `mission`")?;
        }
        validate_timeout_secs("request_timeout_secs", self.request_timeout_secs)?;
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("download_read_timeout_secs", self.download_read_timeout_secs)?;
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Loaded config metadata.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config, or defaults when no file exists.
    pub config: FileConfig,
    /// Indicates whether configuration was loaded from disk.
    pub loaded_from_file: bool,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/dataspace/config.toml`
/// 2. `$HOME/.config/dataspace/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    resolve_config_path(env_var_non_empty_os("XDG_CONFIG_HOME"), env_var_non_empty_os("HOME"))
}

fn resolve_config_path(
    xdg_config_home: Option<std::ffi::OsString>,
    home: Option<std::ffi::OsString>,
) -> Option<PathBuf> {
    if let Some(xdg_config_home) = xdg_config_home {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("dataspace")
                .join("config.toml"),
        );
    }

    let home = home?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("dataspace")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from `explicit` when given, otherwise from the default path if present.
pub fn load_file_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        return Ok(LoadedConfig {
            path: Some(path.to_path_buf()),
            config: read_file_config(path)?,
            loaded_from_file: true,
        });
    }

    let path = resolve_default_config_path();
    match path.as_deref() {
        Some(path_ref) if path_ref.exists() => {
            let config = read_file_config(path_ref)?;
            Ok(LoadedConfig {
                path,
                config,
                loaded_from_file: true,
            })
        }
        _ => Ok(LoadedConfig {
            path,
            ..LoadedConfig::default()
        }),
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let config: FileConfig = toml::from_str(raw)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn test_parse_config_partial_fields() {
        let config = parse_config_str(
            r#"
            # defaults for the archive box
            mission = "S2"
            output_dir = "/data/sentinel"
            workers = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.mission.as_deref(), Some("S2"));
        assert_eq!(config.output_dir, Some(PathBuf::from("/data/sentinel")));
        assert_eq!(config.workers, Some(4));
        assert_eq!(config.catalog_url, None);
    }

    #[test]
    fn test_parse_config_empty_file_is_default() {
        assert_eq!(parse_config_str("").unwrap(), FileConfig::default());
    }

    #[test]
    fn test_parse_config_endpoints_and_timeouts() {
        let config = parse_config_str(
            r#"
            catalog_url = "http://localhost:8080/odata/v1"
            token_url = "http://localhost:8080/token"
            download_url = "http://localhost:8080/odata/v1"
            request_timeout_secs = 60
            connect_timeout_secs = 5
            download_read_timeout_secs = 300
            "#,
        )
        .unwrap();
        assert_eq!(config.token_url.as_deref(), Some("http://localhost:8080/token"));
        assert_eq!(config.request_timeout_secs, Some(60));
        assert_eq!(config.download_read_timeout_secs, Some(300));
    }

    #[test]
    fn test_parse_config_unknown_key_rejected() {
        let error = parse_config_str("concurrency = 4").unwrap_err();
        assert!(error.to_string().contains("concurrency"), "{error}");
    }

    #[test]
    fn test_parse_config_wrong_type_rejected() {
        assert!(parse_config_str("workers = \"four\"").is_err());
    }

    #[test]
    fn test_validate_workers_range() {
        assert!(parse_config_str("workers = 0").is_err());
        assert!(parse_config_str("workers = 65").is_err());
        assert!(parse_config_str("workers = 64").is_ok());
    }

    #[test]
    fn test_validate_timeout_range() {
        assert!(parse_config_str("request_timeout_secs = 0").is_err());
        assert!(parse_config_str("connect_timeout_secs = 3601").is_err());
    }

    #[test]
    fn test_validate_unknown_mission() {
        let error = parse_config_str("mission = \"LANDSAT-8\"").unwrap_err();
        assert!(format!("{error:#}").contains("LANDSAT-8"), "{error:#}");
    }

    #[test]
    fn test_resolve_config_path_prefers_xdg() {
        let path = resolve_config_path(
            Some(OsString::from("/xdg")),
            Some(OsString::from("/home/user")),
        );
        assert_eq!(path, Some(PathBuf::from("/xdg/dataspace/config.toml")));
    }

    #[test]
    fn test_resolve_config_path_falls_back_to_home() {
        let path = resolve_config_path(None, Some(OsString::from("/home/user")));
        assert_eq!(
            path,
            Some(PathBuf::from("/home/user/.config/dataspace/config.toml"))
        );
        assert_eq!(resolve_config_path(None, None), None);
    }

    #[test]
    fn test_load_explicit_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "workers = 2\n").unwrap();

        let loaded = load_file_config(Some(&path)).unwrap();
        assert!(loaded.loaded_from_file);
        assert_eq!(loaded.config.workers, Some(2));
        assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_load_explicit_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let error = load_file_config(Some(&path)).unwrap_err();
        assert!(error.to_string().contains("Failed to read config file"));
    }
}
