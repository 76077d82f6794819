//! Collections of content items.
//!
//! A collection is a directory (`_posts`, `content/_recipes`) of front matter
//! files. Files whose name starts with `_` are not items; `_fields.md` holds
//! the defaults shared by new items.
//!
//! Parsed files and the item listing are cached per collection until a save or
//! delete through one of its items invalidates them.

use std::sync::{Arc, Weak};

use ht_cache::Cache;
use ht_github::{Contents, GitHub, Params};
use tracing::{info, warn};

use crate::error::SiteError;
use crate::front_matter::{self, Fields, FrontMatter};
use crate::item::Item;

/// Cache key of the item listing.
const ITEMS_KEY: &str = "items";

/// Defaults file inside the collection directory.
const DEFAULTS_FILE: &str = "_fields.md";

/// Prefix of entries that are not items.
const RESERVED_PREFIX: char = '_';

#[derive(Debug, Clone)]
enum Cached {
    Items(Vec<Item>),
    Parsed(FrontMatter),
}

#[derive(Debug)]
pub(crate) struct CollectionShared {
    github: GitHub,
    name: String,
    path: String,
    cache: Cache<Cached>,
}

/// A named set of items under one directory.
///
/// Clones share the cache. Items keep a weak handle to it, so they can only
/// be saved or deleted while a clone is alive.
#[derive(Debug, Clone)]
pub struct Collection {
    shared: Arc<CollectionShared>,
}

impl Collection {
    /// Create a collection `name` rooted at `path`.
    pub fn new(github: GitHub, name: &str, path: &str) -> Self {
        Self {
            shared: Arc::new(CollectionShared {
                github,
                name: name.to_owned(),
                path: path.trim_end_matches('/').to_owned(),
                cache: Cache::new(),
            }),
        }
    }

    pub(crate) fn from_handle(handle: &Weak<CollectionShared>) -> Option<Self> {
        handle.upgrade().map(|shared| Self { shared })
    }

    pub(crate) fn handle(&self) -> Weak<CollectionShared> {
        Arc::downgrade(&self.shared)
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Repository path of the collection directory.
    pub fn path(&self) -> &str {
        &self.shared.path
    }

    pub(crate) fn github(&self) -> &GitHub {
        &self.shared.github
    }

    /// Fetch and parse the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns the fetch error. Malformed front matter is not an error.
    pub fn parse_path(&self, path: &str, params: &Params) -> Result<FrontMatter, SiteError> {
        if let Some(Cached::Parsed(parsed)) = self.shared.cache.get(path) {
            return Ok(parsed);
        }

        info!("Parsing collection file: {path} (from: {})", self.name());

        let file = self
            .github()
            .contents(&params.clone().path(path))?
            .into_file()?;
        let parsed = match file.decode_text() {
            Ok(text) => front_matter::parse(&text),
            Err(e) => {
                warn!("Unreadable collection file {path}: {e}");
                FrontMatter::default()
            }
        };

        self.shared
            .cache
            .insert(path, Cached::Parsed(parsed.clone()));
        Ok(parsed)
    }

    /// Shared defaults from `_fields.md`. Empty when the file is missing.
    ///
    /// # Errors
    ///
    /// Returns fetch errors other than not-found.
    pub fn defaults(&self, params: &Params) -> Result<FrontMatter, SiteError> {
        let path = format!("{}/{DEFAULTS_FILE}", self.path());
        match self.parse_path(&path, params) {
            Err(e) if e.is_not_found() => {
                warn!("No defaults for collection {} at {path}", self.name());
                let empty = FrontMatter::default();
                self.shared
                    .cache
                    .insert(path, Cached::Parsed(empty.clone()));
                Ok(empty)
            }
            other => other,
        }
    }

    /// Default fields.
    ///
    /// # Errors
    ///
    /// See [`Collection::defaults`].
    pub fn fields(&self, params: &Params) -> Result<Fields, SiteError> {
        Ok(self.defaults(params)?.fields)
    }

    /// Default body.
    ///
    /// # Errors
    ///
    /// See [`Collection::defaults`].
    pub fn body(&self, params: &Params) -> Result<String, SiteError> {
        Ok(self.defaults(params)?.body)
    }

    /// List the items of the collection (not recursive).
    ///
    /// Fields and body are not loaded; see [`Item::init`].
    ///
    /// # Errors
    ///
    /// Returns the listing error.
    pub fn items(&self, params: &Params) -> Result<Vec<Item>, SiteError> {
        if let Some(Cached::Items(items)) = self.shared.cache.get(ITEMS_KEY) {
            return Ok(items);
        }

        info!("Loading items for collection: {}", self.path());

        let items = match self.github().contents(&params.clone().path(self.path()))? {
            Contents::Dir(entries) => entries
                .into_iter()
                .filter(|entry| !entry.name.starts_with(RESERVED_PREFIX))
                .map(|entry| Item::from_entry(self, entry))
                .collect(),
            Contents::File(_) => {
                warn!("Invalid collection items: {}", self.path());
                Vec::new()
            }
        };

        self.shared
            .cache
            .insert(ITEMS_KEY, Cached::Items(items.clone()));
        Ok(items)
    }

    /// Create a new item `name` with the given content.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::InvalidName`] for an empty name or one containing
    /// `/`, or the write error (a conflict if the file exists).
    pub fn create_item(
        &self,
        name: &str,
        content: FrontMatter,
        params: &Params,
    ) -> Result<Item, SiteError> {
        let mut item = Item::new(self, name)?;
        item.set_fields(content.fields)?;
        item.set_body(content.body)?;
        item.save(params)?;
        Ok(item)
    }

    /// Drop one cached key (a path or `items`), or everything.
    pub fn clear_cache(&self, key: Option<&str>) {
        match key {
            Some(key) => {
                self.shared.cache.invalidate(key);
            }
            None => self.shared.cache.invalidate_all(),
        }
    }

    /// Forget a written path and the listing that may contain it.
    pub(crate) fn invalidate_path(&self, path: &str) {
        self.shared.cache.invalidate(path);
        self.shared.cache.invalidate(ITEMS_KEY);
    }
}
