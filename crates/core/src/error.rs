//! Error taxonomy shared by the catalog store and the Steam sync.

use thiserror::Error;

/// Convenience alias used throughout the core crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures surfaced by catalog and sync operations.
///
/// Every variant is terminal for the operation that raised it; nothing in
/// this crate retries on its own.
#[derive(Debug, Error)]
pub enum Error {
    /// The local database could not be opened, created, queried or written.
    #[error("storage error: {0}")]
    Storage(String),

    /// The Steam Web API could not be reached or answered with a failure status.
    #[error("network error: {0}")]
    Network(String),

    /// The Steam Web API answered, but not with the expected JSON shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Credentials were rejected before any request was made.
    #[error("invalid credentials: {0}")]
    Validation(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

// Request URLs carry the API key in their query string.
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.without_url().to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
