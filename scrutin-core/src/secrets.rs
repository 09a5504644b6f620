//! Secrets management for Scrutin
//!
//! Secrets are stored separately from configuration to avoid accidental sharing.
//! The secrets file is located at `~/.config/scrutin/secrets.toml` and must have
//! restrictive permissions (0600 on Unix).
//!
//! Loading priority:
//! 1. Environment variables (GEMINI_API_KEY, JIRA_API_TOKEN, GITHUB_TOKEN)
//! 2. Secrets file (~/.config/scrutin/secrets.toml)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Secrets structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    pub gemini: GeminiSecrets,
    pub jira: JiraSecrets,
    pub github: GitHubSecrets,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GeminiSecrets {
    /// Google AI Studio API key
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct JiraSecrets {
    /// Atlassian API token, paired with `[jira] email` in config
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubSecrets {
    /// GitHub Personal Access Token
    pub token: Option<String>,
}

fn trim_in_place(value: &mut Option<String>) {
    if let Some(v) = value {
        *v = v.trim().to_string();
    }
}

/// Env var wins over the file value; blanks count as unset
fn resolve(var: &str, file_value: Option<&String>) -> Option<String> {
    if let Ok(value) = std::env::var(var) {
        let value = value.trim().to_string();
        if !value.is_empty() {
            debug!(var, "Using secret from environment variable");
            return Some(value);
        }
    }

    match file_value {
        Some(value) if !value.is_empty() => {
            debug!(var, "Using secret from secrets file");
            Some(value.clone())
        }
        _ => None,
    }
}

impl Secrets {
    /// Load secrets from the default location
    ///
    /// Returns default (empty) secrets if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_secrets_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load secrets from a specific file with permission checking
    pub fn load_from_file(path: &Path) -> Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mode = std::fs::metadata(path)?.permissions().mode();

            if mode & 0o077 != 0 {
                return Err(Error::Config(format!(
                    "Secrets file {} has insecure permissions {:o}. \
                     Please run: chmod 600 {}",
                    path.display(),
                    mode & 0o777,
                    path.display()
                )));
            }

            debug!(path = %path.display(), mode = format!("{:o}", mode & 0o777), "Secrets file permissions OK");
        }

        let contents = std::fs::read_to_string(path)?;
        let mut secrets: Secrets = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse secrets: {}", e)))?;

        trim_in_place(&mut secrets.gemini.api_key);
        trim_in_place(&mut secrets.jira.api_token);
        trim_in_place(&mut secrets.github.token);

        Ok(secrets)
    }

    /// Get the default secrets file path
    ///
    /// Returns `~/.config/scrutin/secrets.toml` on Unix
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("scrutin").join("secrets.toml"))
    }

    /// Gemini API key; GEMINI_API_KEY overrides the file
    pub fn gemini_api_key(&self) -> Option<String> {
        resolve("GEMINI_API_KEY", self.gemini.api_key.as_ref())
    }

    /// Jira API token; JIRA_API_TOKEN overrides the file
    pub fn jira_api_token(&self) -> Option<String> {
        resolve("JIRA_API_TOKEN", self.jira.api_token.as_ref())
    }

    /// GitHub token; GITHUB_TOKEN overrides the file
    pub fn github_token(&self) -> Option<String> {
        resolve("GITHUB_TOKEN", self.github.token.as_ref())
    }

    /// Create a template secrets file at the default location
    ///
    /// Creates parent directories if needed and sets secure permissions
    pub fn create_template() -> Result<PathBuf> {
        let path = Self::default_secrets_path()
            .ok_or_else(|| Error::Config("Could not determine secrets path".to_string()))?;
        Self::create_template_at(&path)?;
        Ok(path)
    }

    /// Create a template secrets file at `path`, refusing to overwrite
    pub fn create_template_at(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if path.exists() {
            return Err(Error::Config(format!(
                "Secrets file already exists at {}",
                path.display()
            )));
        }

        let template = r#"# Scrutin Secrets
# This file contains sensitive credentials - do not share or commit to version control
#
# IMPORTANT: This file must have restrictive permissions (chmod 600)

[gemini]
# Google AI Studio key used for review generation
api_key = ""

[jira]
# Atlassian API token (https://id.atlassian.com/manage-profile/security/api-tokens)
api_token = ""

[github]
# GitHub Personal Access Token with read access to pull requests
token = ""
"#;

        std::fs::write(path, template)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        warn!(path = %path.display(), "Created secrets template - please edit and add your tokens");

        Ok(())
    }
}
