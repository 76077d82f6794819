//! Recursive tree loader.
//!
//! Expands a repository path into one of the caller-facing shapes selected by
//! [`LoadOptions`]. Directories are expanded bottom-up into an internal node
//! tree first; the requested shape is produced from that tree in one pass at
//! the top level.
//!
//! | recursive | flatten | tree | directory result                              |
//! |-----------|---------|------|-----------------------------------------------|
//! | -         | no      | no   | `{files: [entry, ...]}`, nested `files` when recursive |
//! | -         | yes     | no   | `{path: entry}` for every entry               |
//! | -         | yes     | yes  | `{path: sha}` for every entry                 |
//! | no        | no      | yes  | `{path: sha}`                                 |
//! | yes       | no      | yes  | `{path: sha}`, directories nest `{path: ...}` |

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::info;

use crate::error::GitHubError;
use crate::service::{ContentService, GetContents};
use crate::types::{Contents, FileEntry};

/// Output shape toggles for [`TreeLoader::load_path`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Expand subdirectories.
    pub recursive: bool,
    /// Key every entry by its full path in a single map.
    pub flatten: bool,
    /// Use shas as values instead of entries.
    pub tree: bool,
}

impl LoadOptions {
    /// Raw listing, no recursion.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the recursion toggle.
    #[must_use]
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Set the flatten toggle.
    #[must_use]
    pub fn flatten(mut self, flatten: bool) -> Self {
        self.flatten = flatten;
        self
    }

    /// Set the tree toggle.
    #[must_use]
    pub fn tree(mut self, tree: bool) -> Self {
        self.tree = tree;
        self
    }
}

/// A directory entry in a raw listing, with its expanded children.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ListingEntry {
    #[serde(flatten)]
    pub entry: FileEntry,
    /// Children of an expanded directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<ListingEntry>>,
}

/// A value in a nested sha tree.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Sha of a file, or of a directory that was not expanded.
    Sha(String),
    /// An expanded directory, keyed by full path.
    Dir(BTreeMap<String, TreeNode>),
}

/// Result of [`TreeLoader::load_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathContent {
    /// A single file (`{file: entry}`).
    File(FileEntry),
    /// Sha of a single file (`{file: sha}`).
    FileSha(String),
    /// Raw directory listing (`{files: [...]}`).
    Listing(Vec<ListingEntry>),
    /// Flattened map of entries.
    Entries(BTreeMap<String, FileEntry>),
    /// Flattened map of shas.
    Shas(BTreeMap<String, String>),
    /// Nested tree of shas.
    Tree(BTreeMap<String, TreeNode>),
}

impl PathContent {
    /// The single file, if the path resolved to one without flattening.
    pub fn into_file(self) -> Option<FileEntry> {
        match self {
            Self::File(entry) => Some(entry),
            _ => None,
        }
    }

    /// Top-level entries of a raw listing.
    pub fn into_listing(self) -> Option<Vec<ListingEntry>> {
        match self {
            Self::Listing(entries) => Some(entries),
            _ => None,
        }
    }
}

impl Serialize for PathContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::File(entry) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("file", entry)?;
                map.end()
            }
            Self::FileSha(sha) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("file", sha)?;
                map.end()
            }
            Self::Listing(entries) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("files", entries)?;
                map.end()
            }
            Self::Entries(entries) => entries.serialize(serializer),
            Self::Shas(shas) => shas.serialize(serializer),
            Self::Tree(tree) => tree.serialize(serializer),
        }
    }
}

/// An entry with its children, if it was expanded.
#[derive(Debug)]
struct Loaded {
    entry: FileEntry,
    children: Option<Vec<Loaded>>,
}

/// Loads repository paths through a [`ContentService`].
pub struct TreeLoader<'a> {
    service: &'a dyn ContentService,
    owner: String,
    repo: String,
    git_ref: Option<String>,
    bypass_cache: bool,
}

impl<'a> TreeLoader<'a> {
    /// Create a loader for one repository at one ref.
    pub fn new(
        service: &'a dyn ContentService,
        owner: &str,
        repo: &str,
        git_ref: Option<&str>,
        bypass_cache: bool,
    ) -> Self {
        Self {
            service,
            owner: owner.to_owned(),
            repo: repo.to_owned(),
            git_ref: git_ref.map(str::to_owned),
            bypass_cache,
        }
    }

    /// Load `path` in the shape selected by `options`.
    ///
    /// Sibling subdirectories are fetched in parallel.
    ///
    /// # Errors
    ///
    /// Returns the first error of any request; nothing is returned for the
    /// entries that did load.
    pub fn load_path(&self, path: &str, options: LoadOptions) -> Result<PathContent, GitHubError> {
        info!("Loading path {path}");

        let entries = match self.fetch(path)? {
            Contents::File(entry) => return Ok(single_file(entry, options)),
            Contents::Dir(entries) => entries,
        };

        let nodes = self.expand(entries, options.recursive)?;

        Ok(match (options.flatten, options.tree) {
            (false, false) => PathContent::Listing(to_listing(nodes)),
            (true, false) => {
                let mut map = BTreeMap::new();
                flatten_entries(nodes, &mut map);
                PathContent::Entries(map)
            }
            (true, true) => {
                let mut map = BTreeMap::new();
                flatten_shas(nodes, &mut map);
                PathContent::Shas(map)
            }
            (false, true) => PathContent::Tree(to_tree(nodes)),
        })
    }

    fn fetch(&self, path: &str) -> Result<Contents, GitHubError> {
        self.service.get_contents(&GetContents {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            path: path.to_owned(),
            git_ref: self.git_ref.clone(),
            bypass_cache: self.bypass_cache,
        })
    }

    fn expand(&self, entries: Vec<FileEntry>, recursive: bool) -> Result<Vec<Loaded>, GitHubError> {
        entries
            .into_par_iter()
            .map(|entry| {
                let children = if recursive && entry.is_dir() {
                    let listing = self.fetch(&entry.path)?.into_dir()?;
                    Some(self.expand(listing, true)?)
                } else {
                    None
                };
                Ok(Loaded { entry, children })
            })
            .collect()
    }
}

fn single_file(entry: FileEntry, options: LoadOptions) -> PathContent {
    match (options.flatten, options.tree) {
        (true, true) => PathContent::Shas(BTreeMap::from([(entry.path.clone(), entry.sha)])),
        (true, false) => PathContent::Entries(BTreeMap::from([(entry.path.clone(), entry)])),
        (false, true) => PathContent::FileSha(entry.sha),
        (false, false) => PathContent::File(entry),
    }
}

fn to_listing(nodes: Vec<Loaded>) -> Vec<ListingEntry> {
    nodes
        .into_iter()
        .map(|node| ListingEntry {
            entry: node.entry,
            files: node.children.map(to_listing),
        })
        .collect()
}

fn flatten_entries(nodes: Vec<Loaded>, map: &mut BTreeMap<String, FileEntry>) {
    for node in nodes {
        map.insert(node.entry.path.clone(), node.entry);
        if let Some(children) = node.children {
            flatten_entries(children, map);
        }
    }
}

fn flatten_shas(nodes: Vec<Loaded>, map: &mut BTreeMap<String, String>) {
    for node in nodes {
        map.insert(node.entry.path, node.entry.sha);
        if let Some(children) = node.children {
            flatten_shas(children, map);
        }
    }
}

fn to_tree(nodes: Vec<Loaded>) -> BTreeMap<String, TreeNode> {
    nodes
        .into_iter()
        .map(|node| {
            let value = match node.children {
                Some(children) => TreeNode::Dir(to_tree(children)),
                None => TreeNode::Sha(node.entry.sha),
            };
            (node.entry.path, value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    use super::*;
    use crate::mock::MockService;

    /// `docs/` with one file and one subdirectory holding one file.
    fn fixture() -> MockService {
        MockService::new()
            .with_file("README.md", "root")
            .with_file("docs/a.md", "alpha")
            .with_file("docs/guide/b.md", "bravo")
    }

    fn load(service: &MockService, path: &str, options: LoadOptions) -> Value {
        let loader = TreeLoader::new(service, "octo", "site", None, false);
        serde_json::to_value(loader.load_path(path, options).unwrap()).unwrap()
    }

    fn options(recursive: bool, flatten: bool, tree: bool) -> LoadOptions {
        LoadOptions::new()
            .recursive(recursive)
            .flatten(flatten)
            .tree(tree)
    }

    fn sha(service: &MockService, path: &str) -> String {
        service.sha_of(path).unwrap()
    }

    fn guide_sha(service: &MockService) -> String {
        let listing = service
            .get_contents(&GetContents {
                owner: "octo".to_owned(),
                repo: "site".to_owned(),
                path: "docs".to_owned(),
                git_ref: None,
                bypass_cache: false,
            })
            .unwrap()
            .into_dir()
            .unwrap();
        listing
            .into_iter()
            .find(|e| e.path == "docs/guide")
            .unwrap()
            .sha
    }

    fn file_json(service: &MockService, path: &str, name: &str, size: u64) -> Value {
        json!({
            "path": path,
            "name": name,
            "type": "file",
            "sha": sha(service, path),
            "size": size,
        })
    }

    fn guide_json(service: &MockService) -> Value {
        json!({
            "path": "docs/guide",
            "name": "guide",
            "type": "dir",
            "sha": guide_sha(service),
        })
    }

    #[test]
    fn test_listing() {
        let service = fixture();

        let result = load(&service, "docs", options(false, false, false));

        assert_eq!(
            result,
            json!({ "files": [
                file_json(&service, "docs/a.md", "a.md", 5),
                guide_json(&service),
            ]})
        );
    }

    #[test]
    fn test_listing_recursive() {
        let service = fixture();

        let result = load(&service, "docs", options(true, false, false));

        let mut guide = guide_json(&service);
        guide["files"] = json!([file_json(&service, "docs/guide/b.md", "b.md", 5)]);
        assert_eq!(
            result,
            json!({ "files": [file_json(&service, "docs/a.md", "a.md", 5), guide] })
        );
    }

    #[test]
    fn test_flatten() {
        let service = fixture();

        let result = load(&service, "docs", options(false, true, false));

        assert_eq!(
            result,
            json!({
                "docs/a.md": file_json(&service, "docs/a.md", "a.md", 5),
                "docs/guide": guide_json(&service),
            })
        );
    }

    #[test]
    fn test_flatten_recursive() {
        let service = fixture();

        let result = load(&service, "docs", options(true, true, false));

        assert_eq!(
            result,
            json!({
                "docs/a.md": file_json(&service, "docs/a.md", "a.md", 5),
                "docs/guide": guide_json(&service),
                "docs/guide/b.md": file_json(&service, "docs/guide/b.md", "b.md", 5),
            })
        );
    }

    #[test]
    fn test_tree() {
        let service = fixture();

        let result = load(&service, "docs", options(false, false, true));

        assert_eq!(
            result,
            json!({
                "docs/a.md": sha(&service, "docs/a.md"),
                "docs/guide": guide_sha(&service),
            })
        );
    }

    #[test]
    fn test_tree_recursive() {
        let service = fixture();

        let result = load(&service, "docs", options(true, false, true));

        assert_eq!(
            result,
            json!({
                "docs/a.md": sha(&service, "docs/a.md"),
                "docs/guide": { "docs/guide/b.md": sha(&service, "docs/guide/b.md") },
            })
        );
    }

    #[test]
    fn test_flatten_tree() {
        let service = fixture();

        let result = load(&service, "docs", options(false, true, true));

        assert_eq!(
            result,
            json!({
                "docs/a.md": sha(&service, "docs/a.md"),
                "docs/guide": guide_sha(&service),
            })
        );
    }

    #[test]
    fn test_flatten_tree_recursive() {
        let service = fixture();

        let result = load(&service, "docs", options(true, true, true));

        assert_eq!(
            result,
            json!({
                "docs/a.md": sha(&service, "docs/a.md"),
                "docs/guide": guide_sha(&service),
                "docs/guide/b.md": sha(&service, "docs/guide/b.md"),
            })
        );
    }

    #[test]
    fn test_single_file_shapes() {
        let service = fixture();
        let a_sha = sha(&service, "docs/a.md");

        let loader = TreeLoader::new(&service, "octo", "site", None, false);
        let file = loader
            .load_path("docs/a.md", options(false, false, false))
            .unwrap()
            .into_file()
            .unwrap();
        assert_eq!(file.decode_text().unwrap(), "alpha");

        assert_eq!(
            load(&service, "docs/a.md", options(true, false, true)),
            json!({ "file": a_sha })
        );
        assert_eq!(
            load(&service, "docs/a.md", options(false, true, true)),
            json!({ "docs/a.md": a_sha })
        );

        let flat = load(&service, "docs/a.md", options(false, true, false));
        assert_eq!(flat["docs/a.md"]["sha"], json!(a_sha));
    }

    #[test]
    fn test_root_listing() {
        let service = fixture();

        let result = load(&service, ".", options(true, true, true));

        assert_eq!(result.as_object().unwrap().len(), 5);
        assert_eq!(result["docs/guide/b.md"], json!(sha(&service, "docs/guide/b.md")));
    }

    #[test]
    fn test_non_recursive_issues_one_request() {
        let service = fixture();

        load(&service, "docs", options(false, false, true));

        assert_eq!(service.request_count(), 1);
    }

    #[test]
    fn test_subdirectory_failure_fails_whole_load() {
        let service = fixture().failing("docs/guide");
        let loader = TreeLoader::new(&service, "octo", "site", None, false);

        let err = loader
            .load_path("docs", options(true, false, true))
            .unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert!(loader.load_path("docs", options(false, false, true)).is_ok());
    }

    #[test]
    fn test_missing_path_is_not_found() {
        let service = fixture();
        let loader = TreeLoader::new(&service, "octo", "site", None, false);

        let err = loader.load_path("nope", LoadOptions::new()).unwrap_err();

        assert!(err.is_not_found());
    }

    #[test]
    fn test_bypass_cache_reaches_every_request() {
        let service = fixture();
        let loader = TreeLoader::new(&service, "octo", "site", None, true);

        loader
            .load_path("docs", options(true, false, false))
            .unwrap();

        let requests = service.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.bypass_cache));
    }
}
