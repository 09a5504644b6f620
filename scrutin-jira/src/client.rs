//! Jira REST client

use scrutin_core::config::JiraConfig;
use scrutin_core::{Secrets, TicketRecord};
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct IssueResponse {
    key: String,
    fields: IssueFields,
}

#[derive(Debug, Deserialize)]
struct IssueFields {
    #[serde(default)]
    summary: String,
    description: Option<String>,
}

impl From<IssueResponse> for TicketRecord {
    fn from(issue: IssueResponse) -> Self {
        TicketRecord::new(
            issue.key,
            issue.fields.summary,
            issue.fields.description.unwrap_or_default(),
        )
    }
}

/// Jira API client for ticket lookups
#[derive(Clone)]
pub struct JiraClient {
    http: reqwest::Client,
    base_url: Url,
    email: String,
    token: String,
}

impl JiraClient {
    /// Create a client for the site at `base_url`
    pub fn new(base_url: &str, email: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| Error::Config(format!("Invalid Jira URL {}: {}", base_url, e)))?;

        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::Config("Jira API token is empty".to_string()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            email: email.into(),
            token,
        })
    }

    /// Create a client from `[jira]` config and the JIRA_API_TOKEN secret
    pub fn from_config(config: &JiraConfig, secrets: &Secrets) -> Result<Self> {
        let base_url = config.base_url.as_deref().ok_or_else(|| {
            Error::Config("Jira base URL is not set ([jira] base_url or SCRUTIN_JIRA_URL)".to_string())
        })?;
        let email = config.email.clone().ok_or_else(|| {
            Error::Config("Jira email is not set ([jira] email or SCRUTIN_JIRA_EMAIL)".to_string())
        })?;
        let token = secrets.jira_api_token().ok_or_else(|| {
            Error::Config(
                "Jira API token not found. Set JIRA_API_TOKEN or add [jira] api_token \
                 to ~/.config/scrutin/secrets.toml"
                    .to_string(),
            )
        })?;
        Self::new(base_url, email, token)
    }

    /// Issue endpoint with `key` encoded as a single path segment
    fn issue_url(&self, key: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Jira URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["rest", "api", "2", "issue", key]);
        Ok(url)
    }

    /// Fetch a single ticket
    pub async fn fetch_ticket(&self, key: &str) -> Result<TicketRecord> {
        debug!(key, "Fetching ticket");

        let response = self
            .http
            .get(self.issue_url(key)?)
            .basic_auth(&self.email, Some(&self.token))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                key: key.to_string(),
                status: status.as_u16(),
            });
        }

        let issue: IssueResponse = response.json().await?;
        let ticket = TicketRecord::from(issue);
        info!(key = %ticket.key, summary = %ticket.summary, "Fetched ticket");
        Ok(ticket)
    }
}

impl std::fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraClient")
            .field("base_url", &self.base_url.as_str())
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
