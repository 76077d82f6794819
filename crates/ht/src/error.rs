//! CLI error types.

use ht_config::ConfigError;
use ht_github::GitHubError;
use ht_site::SiteError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    GitHub(#[from] GitHubError),

    #[error("{0}")]
    Site(#[from] SiteError),

    #[error("Failed to encode output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Item not found: {collection}/{name}")]
    ItemNotFound { collection: String, name: String },
}
