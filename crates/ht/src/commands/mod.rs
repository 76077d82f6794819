//! CLI command implementations.

mod collections;
mod data;
mod files;
mod items;
mod list;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use ht_config::{CliSettings, Config};
use ht_github::{GitHub, HttpService, Params};
use ht_site::{Collection, Item, Site};
use tracing::info;

use crate::error::CliError;

pub(crate) use collections::CollectionsArgs;
pub(crate) use data::DataArgs;
pub(crate) use files::FilesArgs;
pub(crate) use items::{CreateArgs, DeleteArgs, ItemsArgs, RenameArgs, ShowArgs, UpdateArgs};
pub(crate) use list::ListArgs;

/// Options shared by every command.
#[derive(Args)]
pub(crate) struct GlobalArgs {
    /// Path to configuration file (default: auto-discover houndstooth.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Personal access token (overrides config).
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// API base URL (overrides config).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Repository owner (overrides config).
    #[arg(long, global = true)]
    pub(crate) owner: Option<String>,

    /// Repository name (overrides config).
    #[arg(long, global = true)]
    pub(crate) repo: Option<String>,

    /// Branch, tag or commit (overrides config).
    #[arg(long = "ref", global = true)]
    git_ref: Option<String>,

    /// Bypass HTTP caches for every request.
    #[arg(long, global = true)]
    pub(crate) no_cache: bool,

    /// Enable verbose output (log every remote call).
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,
}

impl GlobalArgs {
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            token: self.token.clone(),
            api_url: self.api_url.clone(),
            cache: self.no_cache.then_some(false),
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            git_ref: self.git_ref.clone(),
        }
    }

    /// Load the configuration and connect to the API.
    pub(crate) fn connect(&self) -> Result<Session, CliError> {
        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        if let Some(path) = &config.config_path {
            info!("Using config: {}", path.display());
        }

        let mut service = HttpService::new(&config.github.api_url);
        if let Some(token) = &config.github.token {
            service = service.with_token(token);
        }

        let mut defaults = Params::new();
        if let Some(owner) = &config.repo.owner {
            defaults = defaults.owner(owner);
        }
        if let Some(repo) = &config.repo.repo {
            defaults = defaults.repo(repo);
        }
        if let Some(git_ref) = &config.repo.git_ref {
            defaults = defaults.git_ref(git_ref);
        }

        let github = GitHub::new(Arc::new(service))
            .with_defaults(defaults)
            .with_cache(config.github.cache);
        Ok(Session { config, github })
    }
}

/// A configured connection to one repository.
pub(crate) struct Session {
    config: Config,
    github: GitHub,
}

impl Session {
    pub(crate) fn github(&self) -> &GitHub {
        &self.github
    }

    /// The site stored in the configured repository.
    pub(crate) fn site(&self) -> Result<Site, CliError> {
        self.config.require_repo()?;
        Ok(Site::new(self.github.clone())?)
    }
}

/// Arguments naming one item of a collection.
#[derive(Args)]
pub(crate) struct ItemRef {
    /// Collection name as declared in the site config.
    collection: String,

    /// Item file name (e.g. "2024-01-01-hello.md").
    name: String,
}

impl ItemRef {
    /// Find the item in its collection.
    ///
    /// The collection must stay alive while the item is used.
    fn resolve(&self, site: &Site, params: &Params) -> Result<(Collection, Item), CliError> {
        let collection = site.collection(&self.collection, params)?;
        let item = collection
            .items(params)?
            .into_iter()
            .find(|item| item.name() == self.name)
            .ok_or_else(|| CliError::ItemNotFound {
                collection: self.collection.clone(),
                name: self.name.clone(),
            })?;
        Ok((collection, item))
    }
}
