//! Configuration management for Houndstooth.
//!
//! Parses `houndstooth.toml` with serde and discovers it in the current
//! directory or its parents. CLI flags override file values through
//! [`CliSettings`].
//!
//! ```toml
//! [github]
//! token = "${GITHUB_TOKEN}"
//! api_url = "https://api.github.com"
//! cache = true
//!
//! [repo]
//! owner = "octo"
//! repo = "site"
//! ref = "main"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields: `github.token`, `github.api_url`.

mod expand;

use std::path::{Path, PathBuf};

use ht_github::DEFAULT_API_URL;
use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "houndstooth.toml";

/// CLI settings that override configuration file values.
///
/// Only `Some` values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub token: Option<String>,
    pub api_url: Option<String>,
    pub cache: Option<bool>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub git_ref: Option<String>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API access.
    pub github: GitHubConfig,
    /// Repository scope.
    pub repo: RepoConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// `[github]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Personal access token. Requests are unauthenticated without one.
    pub token: Option<String>,
    /// API base URL (GitHub Enterprise: `https://host/api/v3`).
    pub api_url: String,
    /// Allow answers from HTTP caches.
    pub cache: bool,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: DEFAULT_API_URL.to_owned(),
            cache: true,
        }
    }
}

/// `[repo]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    pub owner: Option<String>,
    pub repo: Option<String>,
    /// Branch, tag or commit to read from; writes go to this branch.
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`github.token`").
        field: String,
        /// Error message (e.g., "${`GITHUB_TOKEN`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `houndstooth.toml` in the current directory and its parents, and
    /// falls back to defaults.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing or
    /// expansion fails, or the result is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_from(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Owner and repo, both required.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if either is missing.
    pub fn require_repo(&self) -> Result<(&str, &str), ConfigError> {
        let owner = self.repo.owner.as_deref().ok_or_else(|| {
            ConfigError::Validation("repo.owner is required (set it in [repo] or pass --owner)".into())
        })?;
        let repo = self.repo.repo.as_deref().ok_or_else(|| {
            ConfigError::Validation("repo.repo is required (set it in [repo] or pass --repo)".into())
        })?;
        Ok((owner, repo))
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.github.api_url, "github.api_url")?;
        require_http_url(&self.github.api_url, "github.api_url")?;

        if let Some(owner) = &self.repo.owner {
            require_non_empty(owner, "repo.owner")?;
        }
        if let Some(repo) = &self.repo.repo {
            require_non_empty(repo, "repo.repo")?;
        }
        if let Some(git_ref) = &self.repo.git_ref {
            require_non_empty(git_ref, "repo.ref")?;
        }
        Ok(())
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(token) = &settings.token {
            self.github.token = Some(token.clone());
        }
        if let Some(api_url) = &settings.api_url {
            self.github.api_url.clone_from(api_url);
        }
        if let Some(cache) = settings.cache {
            self.github.cache = cache;
        }
        if let Some(owner) = &settings.owner {
            self.repo.owner = Some(owner.clone());
        }
        if let Some(repo) = &settings.repo {
            self.repo.repo = Some(repo.clone());
        }
        if let Some(git_ref) = &settings.git_ref {
            self.repo.git_ref = Some(git_ref.clone());
        }
    }

    /// Search for the config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.github.api_url = expand::expand_env(&self.github.api_url, "github.api_url")?;
        if let Some(token) = &self.github.token {
            self.github.token = Some(expand::expand_env(token, "github.token")?);
        }
        Ok(())
    }
}
