//! Error types.
//!
//! [`ApiError`] covers the three backend calls and maps onto the recovery
//! rules the views apply: an unauthorized signal expires the session, every
//! other failure is logged and degrades to an empty result. [`Error`] covers
//! the application around the views (configuration, session storage, output).

use thiserror::Error;

/// Result type for application-level operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single backend call.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (connection, TLS, timeout).
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body was not the JSON shape we expected.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The backend rejected the session, by HTTP status or in-band `status: 401`.
    #[error("session rejected by backend")]
    Unauthorized,

    /// Any other non-success HTTP status.
    #[error("backend returned HTTP {0}")]
    Status(u16),

    /// The lookup succeeded but matched no record.
    #[error("no record matched {0}")]
    NotFound(String),
}

impl ApiError {
    /// Whether this failure means the session has expired.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

/// Application-level failure.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error("config file is not valid YAML: {0}")]
    ConfigYaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unrecognized route: {0}")]
    Route(String),
}
