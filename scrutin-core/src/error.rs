//! Error types for Scrutin

use thiserror::Error;

/// Result type alias for Scrutin operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Scrutin operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or invalid credentials/endpoint, raised before any network call
    #[error("Configuration error: {0}")]
    Config(String),

    /// Non-2xx HTTP status or network failure
    #[error("{0}")]
    Transport(String),

    /// Response body did not have the expected shape
    #[error("{0}")]
    Format(String),

    /// Response was well-formed but missing required review sections
    #[error("{0}")]
    Validation(String),

    /// Caller-supplied input rejected without retry
    #[error("{0}")]
    Input(String),

    /// Requested file or directory does not exist
    #[error("File not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Whether the review generator may spend another attempt after this error
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::Format(_) | Error::Validation(_)
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Request URLs can carry the API key as a query parameter
        Error::Transport(err.without_url().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_variants() {
        assert!(Error::Transport("Gemini API error: Bad Gateway".into()).is_retryable());
        assert!(Error::Format("bad shape".into()).is_retryable());
        assert!(Error::Validation("missing".into()).is_retryable());
        assert!(!Error::Input("too big".into()).is_retryable());
        assert!(!Error::Config("no key".into()).is_retryable());
    }

    #[test]
    fn test_messages_surface_verbatim() {
        let err = Error::Input("Prompt too large".to_string());
        assert_eq!(err.to_string(), "Prompt too large");
    }
}
