//! Error types for GitHub operations

use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
#[derive(Error, Debug)]
pub enum Error {
    /// GitHub API error
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// Authentication error
    #[error("GitHub authentication error: {0}")]
    Auth(String),

    /// Pull request not found
    #[error("Pull request #{0} not found")]
    PrNotFound(u64),

    /// Invalid PR selection
    #[error("{0}")]
    Input(String),

    /// A selected repository failed; `repo` is the display form of its key
    #[error("{repo} PR Error: {message}")]
    Repo { repo: String, message: String },

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Wrap an error with the repository key it came from
    ///
    /// The key's first letter is upper-cased for display.
    pub fn for_repo(key: &str, err: impl std::fmt::Display) -> Self {
        let mut chars = key.chars();
        let repo = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        Error::Repo {
            repo,
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_error_capitalizes_key() {
        let err = Error::for_repo("frontend", "Pull request #7 not found");
        assert_eq!(err.to_string(), "Frontend PR Error: Pull request #7 not found");
    }

    #[test]
    fn test_repo_error_empty_key() {
        let err = Error::for_repo("", "boom");
        assert_eq!(err.to_string(), " PR Error: boom");
    }
}
