//! Error types for the site model.

use ht_github::GitHubError;

/// Error from site, collection or item operations.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Remote access failed.
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    /// No `_config.yml`, `_config.yaml` or `_config.toml` at the repository root.
    #[error("No config file found in {0}")]
    ConfigNotFound(String),

    /// YAML content could not be parsed.
    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// TOML content could not be parsed.
    #[error("Invalid TOML in {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// Fields could not be dumped as YAML.
    #[error("Failed to serialize fields: {0}")]
    Serialize(#[source] serde_yaml::Error),

    /// No collection with this name is declared in the config.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// Item names are single path segments.
    #[error("Invalid item name: {0:?}")]
    InvalidName(String),

    /// The item was deleted and can no longer be mutated.
    #[error("Item has been deleted: {0}")]
    Deleted(String),

    /// The collection that owned the item no longer exists.
    #[error("Collection of {0} is no longer available")]
    CollectionDropped(String),
}

impl SiteError {
    /// Whether a write was rejected because of a stale or missing sha.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::GitHub(e) if e.is_conflict())
    }

    /// Whether the remote path does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::GitHub(e) if e.is_not_found())
    }
}
