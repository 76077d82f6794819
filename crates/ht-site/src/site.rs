//! Jekyll site model.
//!
//! [`Site`] is the entry point of the content model: it finds the config at
//! the repository root, declares the collections it lists, and reads and
//! writes data files.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use ht_cache::Cache;
use ht_github::{FileEntry, FileCommit, GitHub, LoadOptions, Param, Params, PathContent};
use serde::Serialize;
use tracing::info;

use crate::collection::Collection;
use crate::config::{SiteConfig, is_config_file, parse_structured};
use crate::error::SiteError;

/// Cache key of the parsed config.
const CONFIG_KEY: &str = "config";

/// Cache key of the declared collections.
const COLLECTIONS_KEY: &str = "collections";

/// Default data directory.
pub const DATA_DIR: &str = "_data";

/// Contents of a data path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Data {
    /// Entries of a data directory (empty when it does not exist).
    Entries(Vec<FileEntry>),
    /// A data file and its parsed content.
    File {
        file: FileEntry,
        fields: serde_yaml::Value,
    },
}

#[derive(Debug, Clone)]
enum Cached {
    Config(SiteConfig),
    Collections(Vec<Collection>),
    Data(Data),
}

/// A Jekyll site stored in one repository.
#[derive(Debug)]
pub struct Site {
    github: GitHub,
    repo_path: String,
    cache: Cache<Cached>,
}

impl Site {
    /// Create a site over the repository named by the facade's defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ht_github::GitHubError::MissingParam`] if owner or repo are
    /// not among the defaults.
    pub fn new(github: GitHub) -> Result<Self, SiteError> {
        let owner = github.defaults().required(Param::Owner)?;
        let repo = github.defaults().required(Param::Repo)?;
        let repo_path = format!("{owner}/{repo}");

        Ok(Self {
            github,
            repo_path,
            cache: Cache::new(),
        })
    }

    /// `owner/repo`.
    pub fn repo_path(&self) -> &str {
        &self.repo_path
    }

    /// The repository facade.
    pub fn github(&self) -> &GitHub {
        &self.github
    }

    /// Load the root `_config.yml`, `_config.yaml` or `_config.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::ConfigNotFound`] if there is none, or a parse
    /// error if it is malformed.
    pub fn config(&self, params: &Params) -> Result<SiteConfig, SiteError> {
        if let Some(Cached::Config(config)) = self.cache.get(CONFIG_KEY) {
            return Ok(config);
        }

        info!("Loading jekyll config for: {}", self.repo_path);

        let root = self
            .github
            .files(&params.clone().path("."), LoadOptions::new())?
            .into_listing()
            .unwrap_or_default();
        let Some(config_entry) = root
            .into_iter()
            .map(|listed| listed.entry)
            .find(|entry| !entry.is_dir() && is_config_file(&entry.name))
        else {
            return Err(SiteError::ConfigNotFound(self.repo_path.clone()));
        };

        let file = self
            .github
            .contents(&params.clone().path(&config_entry.path))?
            .into_file()?;
        let config = SiteConfig::parse(&file.path, &file.decode_text()?)?;

        self.cache.insert(CONFIG_KEY, Cached::Config(config.clone()));
        Ok(config)
    }

    /// Collections declared in the config, sorted by name for a map
    /// declaration.
    ///
    /// # Errors
    ///
    /// Propagates every [`Site::config`] error.
    pub fn collections(&self, params: &Params) -> Result<Vec<Collection>, SiteError> {
        if let Some(Cached::Collections(collections)) = self.cache.get(COLLECTIONS_KEY) {
            return Ok(collections);
        }

        let config = self.config(params)?;
        info!("Loading jekyll collections for: {}", self.repo_path);

        let collections: Vec<Collection> = config
            .collection_names()
            .iter()
            .map(|name| Collection::new(self.github.clone(), name, &config.collection_path(name)))
            .collect();

        self.cache
            .insert(COLLECTIONS_KEY, Cached::Collections(collections.clone()));
        Ok(collections)
    }

    /// Look up a declared collection by name.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::CollectionNotFound`] if no collection has that
    /// name, or any [`Site::collections`] error.
    pub fn collection(&self, name: &str, params: &Params) -> Result<Collection, SiteError> {
        self.collections(params)?
            .into_iter()
            .find(|collection| collection.name() == name)
            .ok_or_else(|| SiteError::CollectionNotFound(name.to_owned()))
    }

    /// Read a data path (default `_data`).
    ///
    /// A directory yields its entries, a file its parsed content. A missing
    /// path yields no entries.
    ///
    /// # Errors
    ///
    /// Returns fetch errors other than not-found, or a parse error for a
    /// malformed data file.
    pub fn data(&self, params: &Params) -> Result<Data, SiteError> {
        let path = params.get(Param::Path).unwrap_or(DATA_DIR).to_owned();
        if let Some(Cached::Data(data)) = self.cache.get(&path) {
            return Ok(data);
        }

        info!("Loading jekyll data for: {} {path}", self.repo_path);

        let data = match self
            .github
            .files(&params.clone().path(&path), LoadOptions::new())
        {
            Ok(PathContent::File(file)) => {
                let fields = parse_structured(&file.path, &file.decode_text()?)?;
                Data::File { file, fields }
            }
            Ok(PathContent::Listing(listing)) => {
                Data::Entries(listing.into_iter().map(|listed| listed.entry).collect())
            }
            Ok(_) => Data::Entries(Vec::new()),
            Err(e) if e.is_not_found() => Data::Entries(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        self.cache.insert(path, Cached::Data(data.clone()));
        Ok(data)
    }

    /// Replace the data file at `params.path` with `data` dumped as YAML.
    ///
    /// # Errors
    ///
    /// Requires path, sha and message; a stale sha is a conflict.
    pub fn save_data(
        &self,
        data: &serde_yaml::Value,
        params: &Params,
    ) -> Result<FileCommit, SiteError> {
        let path = params.required(Param::Path)?;
        params.require(&[Param::Sha, Param::Message])?;

        info!("Saving jekyll data for: {} {path}", self.repo_path);

        let yaml = serde_yaml::to_string(data).map_err(SiteError::Serialize)?;
        let commit = self
            .github
            .update_file(&params.clone().content(BASE64_STANDARD.encode(yaml)))?;

        self.cache.invalidate(path);
        Ok(commit)
    }

    /// Drop one cached key (`config`, `collections` or a data path), or
    /// everything.
    pub fn clear_cache(&self, key: Option<&str>) {
        match key {
            Some(key) => {
                self.cache.invalidate(key);
            }
            None => self.cache.invalidate_all(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ht_github::{ContentService, GitHubError, MockService};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    const CONFIG: &str = "title: Blog\ncollections:\n  posts:\n    output: true\n  recipes: {}\n";

    fn site(service: &Arc<MockService>) -> Site {
        let github = GitHub::new(Arc::clone(service) as Arc<dyn ContentService>)
            .with_defaults(Params::new().owner("octo").repo("site"));
        Site::new(github).unwrap()
    }

    #[test]
    fn test_new_requires_repo() {
        let github = GitHub::new(Arc::new(MockService::new()) as Arc<dyn ContentService>)
            .with_defaults(Params::new().owner("octo"));

        let err = Site::new(github).unwrap_err();

        assert!(matches!(
            err,
            SiteError::GitHub(GitHubError::MissingParam(Param::Repo))
        ));
    }

    #[test]
    fn test_config_yaml() {
        let service = Arc::new(MockService::new().with_file("_config.yml", CONFIG));

        let config = site(&service).config(&Params::new()).unwrap();

        assert_eq!(config.collection_names(), vec!["posts", "recipes"]);
    }

    #[test]
    fn test_config_toml_any_case() {
        let service = Arc::new(
            MockService::new().with_file("_Config.TOML", "[collections.staff]\noutput = true\n"),
        );

        let config = site(&service).config(&Params::new()).unwrap();

        assert_eq!(config.collection_names(), vec!["staff"]);
    }

    #[test]
    fn test_config_is_cached() {
        let service = Arc::new(MockService::new().with_file("_config.yml", CONFIG));
        let site = site(&service);

        site.config(&Params::new()).unwrap();
        site.config(&Params::new()).unwrap();
        assert_eq!(service.request_count(), 2);

        site.clear_cache(Some("config"));
        site.config(&Params::new()).unwrap();
        assert_eq!(service.request_count(), 4);
    }

    #[test]
    fn test_missing_config_fails_config_and_collections() {
        let service = Arc::new(MockService::new().with_file("index.md", "hello"));
        let site = site(&service);

        assert!(matches!(
            site.config(&Params::new()),
            Err(SiteError::ConfigNotFound(_))
        ));
        assert!(matches!(
            site.collections(&Params::new()),
            Err(SiteError::ConfigNotFound(_))
        ));
    }

    #[test]
    fn test_malformed_config_is_error() {
        let service = Arc::new(MockService::new().with_file("_config.yml", "collections: [x\n"));

        let err = site(&service).config(&Params::new()).unwrap_err();

        assert!(matches!(err, SiteError::Yaml { .. }));
    }

    #[test]
    fn test_collections() {
        let service = Arc::new(MockService::new().with_file("_config.yml", CONFIG));

        let collections = site(&service).collections(&Params::new()).unwrap();

        let paths: Vec<_> = collections.iter().map(|c| (c.name(), c.path())).collect();
        assert_eq!(paths, vec![("posts", "_posts"), ("recipes", "_recipes")]);
    }

    #[test]
    fn test_collections_dir() {
        let service = Arc::new(MockService::new().with_file(
            "_config.yml",
            "collections_dir: content\ncollections:\n  - posts\n",
        ));

        let posts = site(&service).collection("posts", &Params::new()).unwrap();

        assert_eq!(posts.path(), "content/_posts");
    }

    #[test]
    fn test_no_collections_key_is_empty() {
        let service = Arc::new(MockService::new().with_file("_config.yml", "title: Blog\n"));

        assert!(site(&service).collections(&Params::new()).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_collection() {
        let service = Arc::new(MockService::new().with_file("_config.yml", CONFIG));

        let err = site(&service).collection("drafts", &Params::new()).unwrap_err();

        assert!(matches!(err, SiteError::CollectionNotFound(name) if name == "drafts"));
    }

    #[test]
    fn test_collection_items_through_site() {
        let service = Arc::new(
            MockService::new()
                .with_file("_config.yml", CONFIG)
                .with_file("_posts/hello.md", "---\ntitle: Hi\n---\nWorld\n"),
        );
        let site = site(&service);

        let mut items = site
            .collection("posts", &Params::new())
            .unwrap()
            .items(&Params::new())
            .unwrap();
        items[0].init(&Params::new()).unwrap();

        assert_eq!(items[0].body(), "World");
    }

    #[test]
    fn test_data_directory() {
        let service = Arc::new(
            MockService::new()
                .with_file("_data/authors.yml", "- name: Ann\n")
                .with_file("_data/nav.toml", "title = \"Home\"\n"),
        );

        let Data::Entries(entries) = site(&service).data(&Params::new()).unwrap() else {
            panic!("expected entries");
        };

        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["authors.yml", "nav.toml"]);
    }

    #[test]
    fn test_data_file() {
        let service = Arc::new(
            MockService::new()
                .with_file("_data/authors.yml", "- name: Ann\n")
                .with_file("_data/nav.toml", "title = \"Home\"\n"),
        );
        let site = site(&service);

        let Data::File { fields, .. } = site
            .data(&Params::new().path("_data/authors.yml"))
            .unwrap()
        else {
            panic!("expected a file");
        };
        assert_eq!(
            serde_json::to_value(&fields).unwrap(),
            json!([{ "name": "Ann" }])
        );

        let Data::File { fields, .. } = site.data(&Params::new().path("_data/nav.toml")).unwrap()
        else {
            panic!("expected a file");
        };
        assert_eq!(serde_json::to_value(&fields).unwrap(), json!({ "title": "Home" }));
    }

    #[test]
    fn test_missing_data_is_empty() {
        let service = Arc::new(MockService::new().with_file("_config.yml", CONFIG));
        let site = site(&service);

        assert_eq!(site.data(&Params::new()).unwrap(), Data::Entries(Vec::new()));
        assert_eq!(site.data(&Params::new()).unwrap(), Data::Entries(Vec::new()));
        assert_eq!(service.count("get", "_data"), 1);
    }

    #[test]
    fn test_data_propagates_server_errors() {
        let service = Arc::new(MockService::new().failing("_data"));

        let err = site(&service).data(&Params::new()).unwrap_err();

        assert!(matches!(err, SiteError::GitHub(_)));
    }

    #[test]
    fn test_save_data() {
        let service = Arc::new(MockService::new().with_file("_data/nav.yml", "title: Old\n"));
        let site = site(&service);
        let params = Params::new().path("_data/nav.yml");

        site.data(&params).unwrap();

        let value: serde_yaml::Value = serde_yaml::from_str("title: New").unwrap();
        let sha = service.sha_of("_data/nav.yml").unwrap();
        site.save_data(&value, &params.clone().sha(sha).message("Update nav"))
            .unwrap();

        assert_eq!(service.file_text("_data/nav.yml").as_deref(), Some("title: New\n"));
        let Data::File { fields, .. } = site.data(&params).unwrap() else {
            panic!("expected a file");
        };
        assert_eq!(fields, value);
    }

    #[test]
    fn test_save_data_requires_sha() {
        let service = Arc::new(MockService::new().with_file("_data/nav.yml", "title: Old\n"));

        let err = site(&service)
            .save_data(
                &serde_yaml::Value::Null,
                &Params::new().path("_data/nav.yml").message("m"),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            SiteError::GitHub(GitHubError::MissingParam(Param::Sha))
        ));
        assert_eq!(service.request_count(), 0);
    }
}
