//! Client-specific error types.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Message shown when the service cannot be reached.
pub const NETWORK_ERROR: &str = "Unable to connect to Dataverse";
/// Message shown for 401/403 responses.
pub const AUTH_ERROR: &str = "Authentication required";
/// Message shown for 404 responses.
pub const NOT_FOUND: &str = "Entity not found";
/// Message shown for 5xx responses.
pub const SERVER_ERROR: &str = "Server error, please try again";
/// Message shown when a request exceeds its time budget.
pub const TIMEOUT: &str = "Request timeout";

/// Errors that can occur while talking to the metadata API.
///
/// The `Display` output of every variant is the human-readable message that
/// the loader keeps per resource key.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection refused, DNS failure, TLS failure and friends.
    #[error("{}", NETWORK_ERROR)]
    Network(#[source] reqwest::Error),

    /// 401 or 403.
    #[error("{}", AUTH_ERROR)]
    Unauthorized(StatusCode),

    /// 404.
    #[error("{}", NOT_FOUND)]
    NotFound,

    /// Any 5xx.
    #[error("{}", SERVER_ERROR)]
    Server(StatusCode),

    /// Request aborted by the timeout.
    #[error("{}", TIMEOUT)]
    Timeout,

    /// Non-success status outside the classified ranges.
    #[error("HTTP Error: {}", .0.as_u16())]
    Status(StatusCode),

    /// Response body was not the expected JSON shape.
    #[error("{0}")]
    Decode(String),

    /// Anything else, message passed through verbatim.
    #[error("{0}")]
    Other(String),
}

impl ClientError {
    /// Classify a non-success HTTP status.
    ///
    /// Returns `None` for success statuses.
    pub fn from_status(status: StatusCode) -> Option<Self> {
        if status.is_success() {
            return None;
        }
        Some(match status.as_u16() {
            401 | 403 => Self::Unauthorized(status),
            404 => Self::NotFound,
            500..=599 => Self::Server(status),
            _ => Self::Status(status),
        })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::from_status(status).unwrap_or_else(|| Self::Other(err.to_string()))
        } else if err.is_connect() || err.is_request() {
            Self::Network(err)
        } else {
            Self::Other(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
