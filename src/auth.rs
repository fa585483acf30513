//! Bearer token exchange against the identity service.
//!
//! Tokens are short-lived and never cached: every download batch performs one
//! password-grant exchange and shares the resulting [`AuthToken`] read-only
//! across its workers.

use std::fmt;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::Credentials;

/// Hint appended to every authorization failure.
const CREDENTIALS_HINT: &str =
    "Make sure your login credentials are correct for https://dataspace.copernicus.eu/";

/// Errors raised while obtaining a bearer token.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token request could not be sent or its body could not be read.
    #[error("access token creation failed: {source}\n  {CREDENTIALS_HINT}")]
    Network {
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The identity service rejected the request.
    #[error("access token creation failed: HTTP {status}{}\n  {CREDENTIALS_HINT}", describe(.detail))]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// OAuth error description, when the body carried one.
        detail: Option<String>,
    },

    /// The response body did not contain an `access_token`.
    #[error("access token creation failed: malformed token response: {reason}\n  {CREDENTIALS_HINT}")]
    MalformedResponse {
        /// What was wrong with the body.
        reason: String,
    },
}

fn describe(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

/// A bearer token for download requests.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wraps a raw token value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw token value.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

/// Exchanges account credentials for bearer tokens.
#[derive(Debug, Clone)]
pub struct Authenticator {
    client: Client,
    token_url: String,
    client_id: String,
    credentials: Credentials,
}

impl Authenticator {
    /// Creates an authenticator posting to `token_url`.
    pub fn new(
        client: Client,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        Self {
            client,
            token_url: token_url.into(),
            client_id: client_id.into(),
            credentials,
        }
    }

    /// Performs one password-grant exchange.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] on transport failure or timeout, on a non-2xx
    /// status, or when the body carries no `access_token`.
    #[instrument(skip(self), fields(token_url = %self.token_url, username = %self.credentials.username()))]
    pub async fn fetch_token(&self) -> Result<AuthToken, AuthError> {
        let form = [
            ("client_id", self.client_id.as_str()),
            ("username", self.credentials.username()),
            ("password", self.credentials.password()),
            ("grant_type", "password"),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|source| AuthError::Network { source })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| AuthError::Network { source })?;

        if !status.is_success() {
            let detail = serde_json::from_slice::<TokenErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error_description.or(e.error));
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let parsed: TokenResponse =
            serde_json::from_slice(&body).map_err(|e| AuthError::MalformedResponse {
                reason: e.to_string(),
            })?;
        let token = parsed
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AuthError::MalformedResponse {
                reason: "missing `access_token`".to_string(),
            })?;

        debug!("access token acquired");
        Ok(AuthToken(token))
    }
}
