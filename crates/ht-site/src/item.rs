//! Content items and their sync state.
//!
//! ```text
//! Unsynced --save--> Synced --set_*--> Dirty --save--> Synced
//!                       \                 \
//!                        +-----delete------+--> Deleted
//! ```
//!
//! An item remembers the sha it last saw. Saves with a stale sha are rejected
//! by the service as conflicts and leave the item untouched.

use std::sync::Weak;

use ht_github::{FileEntry, Params};
use serde::Serialize;
use tracing::info;

use crate::collection::{Collection, CollectionShared};
use crate::error::SiteError;
use crate::front_matter::{Fields, FrontMatter};

/// Sync state of an [`Item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    /// Not yet written; no sha.
    Unsynced,
    /// The sha matches the last save or fetch.
    Synced,
    /// Fields or body changed since the last save.
    Dirty,
    /// Deleted; terminal.
    Deleted,
}

/// A single file of a collection.
#[derive(Debug, Clone, Serialize)]
pub struct Item {
    #[serde(skip)]
    collection: Weak<CollectionShared>,
    #[serde(skip)]
    entry: Option<FileEntry>,
    name: String,
    path: String,
    sha: Option<String>,
    state: ItemState,
    fields: Fields,
    body: String,
}

impl Item {
    /// A new, unsaved item `name` in `collection`.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::InvalidName`] for an empty name or one containing `/`.
    pub fn new(collection: &Collection, name: &str) -> Result<Self, SiteError> {
        validate_name(name)?;
        Ok(Self {
            collection: collection.handle(),
            entry: None,
            name: name.to_owned(),
            path: format!("{}/{name}", collection.path()),
            sha: None,
            state: ItemState::Unsynced,
            fields: Fields::new(),
            body: String::new(),
        })
    }

    pub(crate) fn from_entry(collection: &Collection, entry: FileEntry) -> Self {
        Self {
            collection: collection.handle(),
            name: entry.name.clone(),
            path: entry.path.clone(),
            sha: Some(entry.sha.clone()),
            entry: Some(entry),
            state: ItemState::Synced,
            fields: Fields::new(),
            body: String::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Sha of the last saved or fetched version.
    pub fn sha(&self) -> Option<&str> {
        self.sha.as_deref()
    }

    pub fn state(&self) -> ItemState {
        self.state
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Entry metadata from the last listing or reload.
    pub fn entry(&self) -> Option<&FileEntry> {
        self.entry.as_ref()
    }

    /// Owning collection.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::CollectionDropped`] once every clone of the
    /// collection is gone.
    pub fn collection(&self) -> Result<Collection, SiteError> {
        Collection::from_handle(&self.collection)
            .ok_or_else(|| SiteError::CollectionDropped(self.path.clone()))
    }

    /// Replace the fields.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Deleted`] on a deleted item.
    pub fn set_fields(&mut self, fields: Fields) -> Result<(), SiteError> {
        self.ensure_live()?;
        self.fields = fields;
        self.touch();
        Ok(())
    }

    /// Replace the body.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Deleted`] on a deleted item.
    pub fn set_body(&mut self, body: impl Into<String>) -> Result<(), SiteError> {
        self.ensure_live()?;
        self.body = body.into();
        self.touch();
        Ok(())
    }

    /// Load fields and body through the collection's parse cache.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub fn init(&mut self, params: &Params) -> Result<(), SiteError> {
        self.ensure_live()?;
        let parsed = self.collection()?.parse_path(&self.path, params)?;
        self.fields = parsed.fields;
        self.body = parsed.body;
        if self.sha.is_some() {
            self.state = ItemState::Synced;
        }
        Ok(())
    }

    /// Refresh entry metadata and sha from the service.
    ///
    /// Fields and body are kept as they are.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub fn reload(&mut self, params: &Params) -> Result<(), SiteError> {
        self.ensure_live()?;
        info!("Reloading collection item: {}", self.path);

        let collection = self.collection()?;
        let entry = collection
            .github()
            .contents(&params.clone().path(&self.path))?
            .into_file()?;

        self.sha = Some(entry.sha.clone());
        self.entry = Some(entry);
        self.state = ItemState::Synced;
        Ok(())
    }

    /// Current fields and body, rendered and base64-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Serialize`] if a field cannot be dumped.
    pub fn content_base64(&self) -> Result<String, SiteError> {
        FrontMatter::new(self.fields.clone(), self.body.clone()).to_base64()
    }

    /// Create the file (no sha) or update it (with the current sha), then
    /// reload to pick up the new sha.
    ///
    /// `params` must carry a commit message.
    ///
    /// # Errors
    ///
    /// Returns the write error; a stale sha is a conflict and leaves the item
    /// unchanged.
    pub fn save(&mut self, params: &Params) -> Result<(), SiteError> {
        self.ensure_live()?;
        let collection = self.collection()?;

        let write = params
            .clone()
            .path(&self.path)
            .content(self.content_base64()?);

        match &self.sha {
            Some(sha) => collection.github().update_file(&write.sha(sha))?,
            None => collection.github().create_file(&write)?,
        };

        info!("Updated item file: {}", self.path);
        collection.invalidate_path(&self.path);

        // The written version must not come back from an HTTP cache
        self.reload(&params.clone().cache(false))
    }

    /// Delete the file at the current sha.
    ///
    /// Fields and body are kept as they were.
    ///
    /// # Errors
    ///
    /// Returns [`ht_github::GitHubError::MissingParam`] for an unsaved item
    /// or the delete error; a stale sha is a conflict.
    pub fn delete(&mut self, params: &Params) -> Result<(), SiteError> {
        self.ensure_live()?;
        let collection = self.collection()?;

        let mut delete = params.clone().path(&self.path);
        delete.sha.clone_from(&self.sha);
        collection.github().delete_file(&delete)?;

        info!("Deleted item file: {}", self.path);
        collection.invalidate_path(&self.path);
        self.state = ItemState::Deleted;
        Ok(())
    }

    /// Move the item to `name` in the same collection.
    ///
    /// Deletes the current file, then creates the new one with the same fields
    /// and body. If the create fails the item stays deleted.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::InvalidName`] before any request, or the error of
    /// either step.
    pub fn rename(&mut self, name: &str, params: &Params) -> Result<(), SiteError> {
        self.ensure_live()?;
        validate_name(name)?;
        let collection = self.collection()?;

        self.delete(params)?;

        let mut renamed = Item::new(&collection, name)?;
        renamed.fields = self.fields.clone();
        renamed.body = self.body.clone();
        renamed.save(params)?;

        *self = renamed;
        Ok(())
    }

    fn ensure_live(&self) -> Result<(), SiteError> {
        if self.state == ItemState::Deleted {
            return Err(SiteError::Deleted(self.path.clone()));
        }
        Ok(())
    }

    fn touch(&mut self) {
        if self.state == ItemState::Synced {
            self.state = ItemState::Dirty;
        }
    }
}

fn validate_name(name: &str) -> Result<(), SiteError> {
    if name.trim().is_empty() || name.contains('/') {
        return Err(SiteError::InvalidName(name.to_owned()));
    }
    Ok(())
}
