//! Configuration management for Scrutin
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (SCRUTIN_*)
//! 3. Config file (~/.config/scrutin/config.toml)
//! 4. Default values

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::{ReferenceKind, RepoRef};
use crate::prompt::Persona;
use crate::{Error, Result};

/// Text-generation service configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API root; requests go to `{base_url}/models/{model}:generateContent`
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-pro-exp-03-25".to_string(),
            timeout: Duration::from_secs(600),
        }
    }
}

/// Issue tracker configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct JiraConfig {
    /// Site root, e.g. `https://example.atlassian.net`
    pub base_url: Option<String>,

    /// Account email used for Basic auth alongside the API token
    pub email: Option<String>,
}

/// A repository the tool can fetch PRs from and read files out of
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RepoConfig {
    pub owner: String,
    pub name: String,

    /// Local checkout used by the file picker
    #[serde(default)]
    pub local_path: Option<PathBuf>,

    #[serde(default)]
    pub description: String,
}

impl RepoConfig {
    pub fn repo_ref(&self) -> RepoRef {
        RepoRef::new(&self.owner, &self.name)
    }
}

fn default_repos() -> BTreeMap<String, RepoConfig> {
    let mut repos = BTreeMap::new();
    repos.insert(
        "frontend".to_string(),
        RepoConfig {
            owner: "drjyounger".to_string(),
            name: "tempstars-app".to_string(),
            local_path: None,
            description: "Frontend (React/TypeScript)".to_string(),
        },
    );
    repos.insert(
        "backend".to_string(),
        RepoConfig {
            owner: "drjyounger".to_string(),
            name: "tempstars-api".to_string(),
            local_path: None,
            description: "Backend (Node.js)".to_string(),
        },
    );
    repos
}

/// Local file access
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Roots files may be read from; empty allows any path
    pub allowed_roots: Vec<PathBuf>,
}

/// One entry of the reference catalog
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReferenceEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ReferenceKind,
    pub name: String,
    pub path: PathBuf,
}

/// Hand-off store location
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file; defaults to `~/.cache/scrutin/handoff.db`
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    /// Configured path, or the default under the user cache directory
    pub fn resolved_path(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.path {
            return Ok(path.clone());
        }
        dirs::cache_dir()
            .map(|p| p.join("scrutin").join("handoff.db"))
            .ok_or_else(|| Error::Config("Could not determine cache directory".to_string()))
    }
}

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub jira: JiraConfig,
    pub repos: BTreeMap<String, RepoConfig>,
    pub files: FilesConfig,
    pub references: Vec<ReferenceEntry>,
    pub persona: Persona,
    pub store: StoreConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            jira: JiraConfig::default(),
            repos: default_repos(),
            files: FilesConfig::default(),
            references: Vec::new(),
            persona: Persona::default(),
            store: StoreConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    ///
    /// Relative `[[references]]` paths are taken relative to the file's directory.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;

        if let Some(base) = path.parent() {
            for entry in &mut config.references {
                if entry.path.is_relative() {
                    entry.path = base.join(&entry.path);
                }
            }
        }
        Ok(config)
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/scrutin/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("scrutin").join("config.toml"))
    }

    /// Look up a configured repository by key
    pub fn repo(&self, key: &str) -> Result<&RepoConfig> {
        self.repos
            .get(key)
            .ok_or_else(|| Error::Config(format!("Unknown repository key: {}", key)))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - SCRUTIN_LLM_BASE_URL, SCRUTIN_MODEL
    /// - SCRUTIN_JIRA_URL, SCRUTIN_JIRA_EMAIL
    /// - SCRUTIN_STORE_PATH
    /// - SCRUTIN_<REPO>_PATH: local checkout for a configured repo key
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("SCRUTIN_LLM_BASE_URL") {
            self.llm.base_url = url;
        }

        if let Ok(model) = std::env::var("SCRUTIN_MODEL") {
            self.llm.model = model;
        }

        if let Ok(url) = std::env::var("SCRUTIN_JIRA_URL") {
            self.jira.base_url = Some(url);
        }

        if let Ok(email) = std::env::var("SCRUTIN_JIRA_EMAIL") {
            self.jira.email = Some(email);
        }

        if let Ok(path) = std::env::var("SCRUTIN_STORE_PATH") {
            self.store.path = Some(PathBuf::from(path));
        }

        for (key, repo) in self.repos.iter_mut() {
            let var = format!("SCRUTIN_{}_PATH", key.to_uppercase().replace('-', "_"));
            if let Ok(path) = std::env::var(&var) {
                repo.local_path = Some(PathBuf::from(path));
            }
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, model: Option<String>, base_url: Option<String>) -> Self {
        if let Some(m) = model {
            self.llm.model = m;
        }

        if let Some(url) = base_url {
            self.llm.base_url = url;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(
        config_path: Option<&Path>,
        model: Option<String>,
        base_url: Option<String>,
    ) -> Result<Self> {
        let base = match config_path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };
        Ok(base.with_env_overrides().with_cli_overrides(model, base_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.llm.model, "gemini-2.5-pro-exp-03-25");
        assert_eq!(config.llm.timeout, Duration::from_secs(600));
        assert_eq!(config.repos.len(), 2);
        assert_eq!(config.repo("backend").unwrap().name, "tempstars-api");
        assert!(config.references.is_empty());
        assert_eq!(config.persona.organization, "TempStars");
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::default().with_cli_overrides(
            Some("gemini-exp".to_string()),
            Some("http://localhost:9000/v1".to_string()),
        );

        assert_eq!(config.llm.model, "gemini-exp");
        assert_eq!(config.llm.base_url, "http://localhost:9000/v1");
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[llm]
model = "gemini-1.5-pro"
timeout = "90s"

[jira]
base_url = "https://acme.atlassian.net"
email = "dev@acme.test"

[repos.service]
owner = "acme"
name = "service"
local_path = "/src/service"

[files]
allowed_roots = ["/src"]

[[references]]
id = "schema"
type = "schema"
name = "Database Schema"
path = "docs/schema.sql"

[persona]
organization = "Acme"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.llm.model, "gemini-1.5-pro");
        assert_eq!(config.llm.timeout, Duration::from_secs(90));
        assert_eq!(
            config.jira.base_url.as_deref(),
            Some("https://acme.atlassian.net")
        );

        // An explicit table replaces the default repo set
        assert_eq!(config.repos.len(), 1);
        let repo = config.repo("service").unwrap();
        assert_eq!(repo.repo_ref().to_string(), "acme/service");
        assert_eq!(repo.local_path, Some(PathBuf::from("/src/service")));

        assert_eq!(config.files.allowed_roots, vec![PathBuf::from("/src")]);
        assert_eq!(config.references[0].kind, ReferenceKind::Schema);
        assert_eq!(config.persona.organization, "Acme");
        assert_eq!(config.persona.product, Persona::default().product);
    }

    #[test]
    fn test_reference_paths_relative_to_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[[references]]
id = "schema"
type = "schema"
name = "Schema"
path = "docs/schema.sql"

[[references]]
id = "standards"
type = "coding-standard"
name = "Standards"
path = "/opt/standards.md"
"#,
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.references[0].path, dir.path().join("docs/schema.sql"));
        assert_eq!(config.references[1].path, PathBuf::from("/opt/standards.md"));
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[llm]
model = "other"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.llm.model, "other");
        assert_eq!(config.llm.base_url, LlmConfig::default().base_url);
        assert_eq!(config.repos.len(), 2);
    }

    #[test]
    fn test_unknown_repo_key() {
        let err = Config::default().repo("mobile").unwrap_err();
        assert!(err.to_string().contains("Unknown repository key: mobile"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[store]\npath = \"/tmp/handoff.db\"").unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(
            config.store.resolved_path().unwrap(),
            PathBuf::from("/tmp/handoff.db")
        );
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[llm\nmodel = ").unwrap();

        let err = Config::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
