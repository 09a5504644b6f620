//! GitHub API client using octocrab

use crate::{Error, Result};
use octocrab::Octocrab;
use scrutin_core::Secrets;
use tracing::info;

/// GitHub API client, not bound to a single repository
#[derive(Clone)]
pub struct GitHubClient {
    client: Octocrab,
}

impl GitHubClient {
    /// Create a client authenticated with a personal access token
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.into())
            .build()
            .map_err(|e| Error::Auth(format!("Failed to create GitHub client: {}", e)))?;

        info!("Created GitHub client");

        Ok(Self { client })
    }

    /// Create a client from loaded secrets
    ///
    /// Token is taken from (in priority order):
    /// 1. GITHUB_TOKEN environment variable
    /// 2. ~/.config/scrutin/secrets.toml
    pub fn from_secrets(secrets: &Secrets) -> Result<Self> {
        let token = secrets.github_token().ok_or_else(|| {
            Error::Auth(
                "GitHub token is not configured. Set GITHUB_TOKEN or add [github] token \
                 to ~/.config/scrutin/secrets.toml"
                    .to_string(),
            )
        })?;
        Self::new(token)
    }

    /// Get the underlying octocrab client
    pub fn client(&self) -> &Octocrab {
        &self.client
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient").finish_non_exhaustive()
    }
}
