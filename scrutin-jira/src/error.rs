//! Error types for Jira operations

use thiserror::Error;

/// Result type for Jira operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during Jira operations
#[derive(Error, Debug)]
pub enum Error {
    /// Network or protocol failure
    #[error("Jira request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response for a ticket
    #[error("Jira returned {status} for {key}")]
    Status { key: String, status: u16 },

    /// Missing base URL, email or token
    #[error("Jira configuration error: {0}")]
    Config(String),

    /// Rejected input, or every ticket in a batch failed
    #[error("{0}")]
    Input(String),
}
