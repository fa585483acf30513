//! Client configuration: credentials, service endpoints and network timeouts.
//!
//! Configuration is explicit. A [`ClientConfig`] is built by the caller (or
//! from the process environment with [`ClientConfig::from_env`]) and handed to
//! [`DataspaceClient::new`](crate::DataspaceClient::new), which validates it
//! once at construction.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default OData catalog base URL.
pub const DEFAULT_CATALOG_URL: &str = "https://catalogue.dataspace.copernicus.eu/odata/v1";

/// Default OpenID Connect token endpoint of the identity service.
pub const DEFAULT_TOKEN_URL: &str =
    "https://identity.dataspace.copernicus.eu/auth/realms/CDSE/protocol/openid-connect/token";

/// Default base URL serving product archives.
pub const DEFAULT_DOWNLOAD_URL: &str = "https://zipper.dataspace.copernicus.eu/odata/v1";

/// Public client identifier used for the password grant.
pub const DEFAULT_CLIENT_ID: &str = "cdse-public";

/// Environment variable holding the account user name.
pub const USERNAME_ENV: &str = "COPERNICUS_USERNAME";

/// Environment variable holding the account password.
pub const PASSWORD_ENV: &str = "COPERNICUS_PASSWORD";

/// Total timeout applied to the token exchange and to catalog queries.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 100;

/// Connect timeout applied to every client.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Errors raised while assembling or validating a [`ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A credential is missing or empty.
    #[error(
        "missing credential `{field}`: set {USERNAME_ENV} and {PASSWORD_ENV} (for example in a .env file)"
    )]
    MissingCredential {
        /// Which credential was missing.
        field: &'static str,
    },

    /// An endpoint is not an absolute http(s) URL.
    #[error("invalid {name} endpoint '{url}': {reason}")]
    InvalidEndpoint {
        /// Endpoint role (catalog, token, download).
        name: &'static str,
        /// The rejected value.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A timeout of zero seconds was configured.
    #[error("invalid {name} timeout: must be at least 1 second")]
    InvalidTimeout {
        /// Which timeout was invalid.
        name: &'static str,
    },

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Account credentials for the identity service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates credentials from a user name and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Reads credentials from `COPERNICUS_USERNAME` / `COPERNICUS_PASSWORD`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] when either variable is
    /// unset or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let username = env_non_empty(USERNAME_ENV).ok_or(ConfigError::MissingCredential {
            field: "username",
        })?;
        let password = env_non_empty(PASSWORD_ENV).ok_or(ConfigError::MissingCredential {
            field: "password",
        })?;
        Ok(Self { username, password })
    }

    /// Account user name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.username.trim().is_empty() {
            return Err(ConfigError::MissingCredential { field: "username" });
        }
        if self.password.is_empty() {
            return Err(ConfigError::MissingCredential { field: "password" });
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Remote service endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// OData catalog base; queries go to `<catalog>/Products`.
    pub catalog: String,
    /// Password-grant token endpoint.
    pub token: String,
    /// Archive base; products are fetched from `<download>/Products(<id>)/$value`.
    pub download: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            catalog: DEFAULT_CATALOG_URL.to_string(),
            token: DEFAULT_TOKEN_URL.to_string(),
            download: DEFAULT_DOWNLOAD_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Points all three endpoints at one base URL, as a mock server would serve them.
    ///
    /// Catalog and download use `<base>/odata/v1`, the token endpoint uses
    /// `<base>/token`.
    #[must_use]
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            catalog: format!("{base}/odata/v1"),
            token: format!("{base}/token"),
            download: format!("{base}/odata/v1"),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_endpoint("catalog", &self.catalog)?;
        validate_endpoint("token", &self.token)?;
        validate_endpoint("download", &self.download)?;
        Ok(())
    }
}

fn validate_endpoint(name: &'static str, raw: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(raw).map_err(|e| ConfigError::InvalidEndpoint {
        name,
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEndpoint {
            name,
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(())
}

/// Complete configuration for a [`DataspaceClient`](crate::DataspaceClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Account credentials.
    pub credentials: Credentials,
    /// Service endpoints.
    pub endpoints: Endpoints,
    /// OAuth client identifier sent with the password grant.
    pub client_id: String,
    /// Total timeout for the token exchange and catalog queries.
    pub request_timeout: Duration,
    /// Connect timeout for all requests.
    pub connect_timeout: Duration,
    /// Optional idle-read timeout for product downloads. `None` leaves downloads unbounded.
    pub download_read_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Creates a configuration with default endpoints and timeouts.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            endpoints: Endpoints::default(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            download_read_timeout: None,
        }
    }

    /// Creates a configuration with credentials read from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] when credentials are not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(Credentials::from_env()?))
    }

    /// Replaces the service endpoints.
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Replaces the request timeout used by token and catalog calls.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Enables an idle-read timeout on product downloads.
    #[must_use]
    pub fn with_download_read_timeout(mut self, timeout: Duration) -> Self {
        self.download_read_timeout = Some(timeout);
        self
    }

    /// Validates credentials, endpoints and timeouts.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.credentials.validate()?;
        self.endpoints.validate()?;
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout { name: "request" });
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout { name: "connect" });
        }
        if self.download_read_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::InvalidTimeout {
                name: "download read",
            });
        }
        Ok(())
    }
}
