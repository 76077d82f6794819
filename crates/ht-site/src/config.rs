//! Jekyll site configuration.
//!
//! The config lives at the repository root as `_config.yml`, `_config.yaml`
//! or `_config.toml` (case-insensitive) and is parsed by extension.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::SiteError;

static CONFIG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^_config\.(ya?ml|toml)$").unwrap());

/// Whether `name` is a site config file name.
pub fn is_config_file(name: &str) -> bool {
    CONFIG_RE.is_match(name)
}

/// Declared collections: a map of name to settings, or a plain list of names.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CollectionsDecl {
    Map(BTreeMap<String, serde_yaml::Value>),
    List(Vec<String>),
}

/// Parsed site configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SiteConfig {
    /// Declared collections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collections: Option<CollectionsDecl>,
    /// Directory holding every collection directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collections_dir: Option<String>,
    /// Every other key.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl SiteConfig {
    /// Parse config text, picking the format from the file extension.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Yaml`] or [`SiteError::Toml`] for malformed content.
    pub fn parse(path: &str, content: &str) -> Result<Self, SiteError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        parse_structured(path, content)
    }

    /// Names of declared collections (no collections key yields none).
    pub fn collection_names(&self) -> Vec<String> {
        match &self.collections {
            Some(CollectionsDecl::Map(map)) => map.keys().cloned().collect(),
            Some(CollectionsDecl::List(names)) => names.clone(),
            None => Vec::new(),
        }
    }

    /// `collections_dir` with a trailing slash, or empty.
    pub fn collections_prefix(&self) -> String {
        match self.collections_dir.as_deref() {
            Some(dir) if !dir.trim().is_empty() => {
                if dir.ends_with('/') {
                    dir.to_owned()
                } else {
                    format!("{dir}/")
                }
            }
            _ => String::new(),
        }
    }

    /// Repository path of the collection `name`.
    pub fn collection_path(&self, name: &str) -> String {
        format!("{}_{name}", self.collections_prefix())
    }

    /// Look up any other top-level key.
    pub fn get(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.extra.get(key)
    }
}

/// Parse a YAML or TOML document (TOML when `path` ends in `toml`).
///
/// # Errors
///
/// Returns [`SiteError::Yaml`] or [`SiteError::Toml`] for malformed content.
pub fn parse_structured<T: serde::de::DeserializeOwned>(
    path: &str,
    content: &str,
) -> Result<T, SiteError> {
    if path.to_ascii_lowercase().ends_with("toml") {
        toml::from_str(content).map_err(|source| SiteError::Toml {
            path: path.to_owned(),
            source,
        })
    } else {
        serde_yaml::from_str(content).map_err(|source| SiteError::Yaml {
            path: path.to_owned(),
            source,
        })
    }
}
