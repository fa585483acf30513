//! Error types for catalog queries.
//!
//! Each message starts with a short failure kind (`Network`, `Timeout`,
//! `HttpStatus`, `Decode`, ...) followed by the underlying cause.

use thiserror::Error;

/// Errors that abort a catalog query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Transport failure (DNS, connection refused, TLS, truncated body).
    #[error("Network: query failed for {url}: {source}")]
    Network {
        /// Request URL.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The request exceeded the configured timeout.
    #[error("Timeout: query timed out for {url}")]
    Timeout {
        /// Request URL.
        url: String,
    },

    /// The catalog answered with a non-success status.
    #[error("HttpStatus: query failed with HTTP {status} for {url}")]
    HttpStatus {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The response body is not valid JSON.
    #[error("Decode: query response is not valid JSON: {source}")]
    Decode {
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The response has no top-level `value` array.
    #[error("MissingResults: query response has no `value` array")]
    MissingResults,

    /// A product object lacks a usable `Id` or `Name`.
    #[error("InvalidProduct: product at index {index} {reason}")]
    InvalidProduct {
        /// Position of the product in the `value` array.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },
}

impl QueryError {
    /// Creates a transport error, promoting reqwest timeouts to [`QueryError::Timeout`].
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an invalid-product error.
    pub fn invalid_product(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidProduct {
            index,
            reason: reason.into(),
        }
    }

    /// Short failure kind, the leading label of the message.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "Network",
            Self::Timeout { .. } => "Timeout",
            Self::HttpStatus { .. } => "HttpStatus",
            Self::Decode { .. } => "Decode",
            Self::MissingResults => "MissingResults",
            Self::InvalidProduct { .. } => "InvalidProduct",
        }
    }
}
