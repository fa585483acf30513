//! Shared HTTP client construction policy.
//!
//! Catalog queries and the token exchange share one client with a total
//! request timeout. Product downloads use a second client that only bounds
//! connection setup (and, when configured, idle reads), so large archives are
//! never cut off by a wall-clock limit.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Proxy};
use tracing::warn;

use crate::config::{ClientConfig, ConfigError};
use crate::user_agent;

/// Timeout profile for a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Timeouts {
    /// Connect timeout plus a total request timeout.
    Request {
        connect: Duration,
        total: Duration,
    },
    /// Connect timeout plus an optional idle-read timeout.
    Streaming {
        connect: Duration,
        read: Option<Duration>,
    },
}

impl Timeouts {
    pub(crate) fn api(config: &ClientConfig) -> Self {
        Self::Request {
            connect: config.connect_timeout,
            total: config.request_timeout,
        }
    }

    pub(crate) fn download(config: &ClientConfig) -> Self {
        Self::Streaming {
            connect: config.connect_timeout,
            read: config.download_read_timeout,
        }
    }
}

/// Builds an HTTP client with the project user agent and gzip support.
///
/// Some sandboxed environments panic when reqwest queries system proxy
/// settings; in that case the build is retried with proxies taken from the
/// environment only.
pub(crate) fn build_http_client(timeouts: Timeouts) -> Result<Client, ConfigError> {
    match try_build_client(timeouts, false) {
        Ok(client) => Ok(client),
        Err(BuildClientFailure::Panic) => {
            warn!("HTTP client builder panicked while loading system proxy settings; retrying with env-proxy fallback");
            match try_build_client(timeouts, true) {
                Ok(client) => Ok(client),
                Err(BuildClientFailure::Build(error)) => Err(ConfigError::HttpClient(error)),
                Err(BuildClientFailure::Panic) => {
                    // Fall back to a client without any proxy configuration.
                    base_builder(timeouts)
                        .no_proxy()
                        .build()
                        .map_err(ConfigError::HttpClient)
                }
            }
        }
        Err(BuildClientFailure::Build(error)) => Err(ConfigError::HttpClient(error)),
    }
}

enum BuildClientFailure {
    Panic,
    Build(reqwest::Error),
}

fn try_build_client(
    timeouts: Timeouts,
    disable_system_proxy_lookup: bool,
) -> Result<Client, BuildClientFailure> {
    catch_unwind(AssertUnwindSafe(move || {
        let mut builder = base_builder(timeouts);
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildClientFailure::Build)
    }))
    .map_err(|_| BuildClientFailure::Panic)?
}

fn base_builder(timeouts: Timeouts) -> ClientBuilder {
    let builder = Client::builder()
        .user_agent(user_agent::default_user_agent())
        .gzip(true);
    match timeouts {
        Timeouts::Request { connect, total } => builder.connect_timeout(connect).timeout(total),
        Timeouts::Streaming { connect, read } => {
            let builder = builder.connect_timeout(connect);
            match read {
                Some(read) => builder.read_timeout(read),
                None => builder,
            }
        }
    }
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = env_proxy_for_scheme("https")
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = env_proxy_for_scheme("http")
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn env_proxy_for_scheme(scheme: &str) -> Option<String> {
    match scheme {
        "https" => find_first_proxy_var(&["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"]),
        "http" => find_first_proxy_var(&["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"]),
        _ => None,
    }
}

fn find_first_proxy_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}
