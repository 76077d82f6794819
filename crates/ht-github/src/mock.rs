//! Mock content service for testing.
//!
//! Provides [`MockService`], an in-memory single-repository implementation
//! of [`ContentService`] that behaves like the GitHub contents API where it
//! matters to callers: git blob shas, sha conflict checks, directory
//! listings derived from file paths, and `Link`-header pagination.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Mutex, RwLock};

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use serde_json::{Value, json};
use sha1::{Digest, Sha1};

use crate::error::GitHubError;
use crate::link::build_link_header;
use crate::service::{
    ContentService, DeleteFile, GetContents, ListKind, ListRequest, Resource, WriteFile,
};
use crate::types::{CommitRef, Contents, EntryType, FileCommit, FileEntry, Page};

/// Default page size of the listing endpoints.
const DEFAULT_PER_PAGE: u32 = 30;

/// A request observed by [`MockService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRequest {
    /// Operation name (`get`, `create`, `update`, `delete`, `list`, `resource`).
    pub operation: &'static str,
    /// Path, listing kind or resource the request addressed.
    pub target: String,
    /// Whether the request carried a cache-bypass directive.
    pub bypass_cache: bool,
}

#[derive(Debug, Default)]
struct MockState {
    files: BTreeMap<String, Vec<u8>>,
    lists: HashMap<ListKind, Vec<Value>>,
    user: Option<Value>,
    failing: HashSet<String>,
    commits: u64,
}

/// In-memory repository for testing.
///
/// Owner, repo and ref are accepted but ignored: the mock holds exactly one
/// tree.
///
/// # Example
///
/// ```ignore
/// use ht_github::{MockService, ContentService};
///
/// let service = MockService::new()
///     .with_file("_config.yml", "collections:\n  posts: {}\n")
///     .with_file("_posts/hello.md", "---\ntitle: Hi\n---\nWorld\n");
///
/// assert_eq!(service.request_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct MockService {
    state: RwLock<MockState>,
    requests: Mutex<Vec<MockRequest>>,
}

impl MockService {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text file.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: &str, content: impl Into<String>) -> Self {
        self.state
            .write()
            .unwrap()
            .files
            .insert(normalize(path), content.into().into_bytes());
        self
    }

    /// Set the items returned by a listing endpoint.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_list(self, kind: ListKind, items: Vec<Value>) -> Self {
        self.state.write().unwrap().lists.insert(kind, items);
        self
    }

    /// Set the authenticated user.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_user(self, user: Value) -> Self {
        self.state.write().unwrap().user = Some(user);
        self
    }

    /// Make every contents lookup of `path` fail with a server error.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn failing(self, path: &str) -> Self {
        self.state.write().unwrap().failing.insert(normalize(path));
        self
    }

    /// Current text of a file.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn file_text(&self, path: &str) -> Option<String> {
        self.state
            .read()
            .unwrap()
            .files
            .get(&normalize(path))
            .map(|c| String::from_utf8_lossy(c).into_owned())
    }

    /// Current blob sha of a file.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn sha_of(&self, path: &str) -> Option<String> {
        self.state
            .read()
            .unwrap()
            .files
            .get(&normalize(path))
            .map(|c| blob_sha(c))
    }

    /// All requests received so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Number of requests of `operation` that addressed `target`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn count(&self, operation: &str, target: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.operation == operation && r.target == target)
            .count()
    }

    /// Forget the recorded requests.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn reset_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn record(&self, operation: &'static str, target: impl Into<String>, bypass_cache: bool) {
        self.requests.lock().unwrap().push(MockRequest {
            operation,
            target: target.into(),
            bypass_cache,
        });
    }

    fn next_commit(state: &mut MockState, message: &str) -> CommitRef {
        state.commits += 1;
        let mut hasher = Sha1::new();
        hasher.update(format!("commit {} {message}", state.commits).as_bytes());
        CommitRef {
            sha: hex::encode(hasher.finalize()),
            message: Some(message.to_owned()),
        }
    }
}

impl ContentService for MockService {
    fn get_contents(&self, request: &GetContents) -> Result<Contents, GitHubError> {
        let path = normalize(&request.path);
        self.record("get", path.clone(), request.bypass_cache);

        let state = self.state.read().unwrap();
        if state.failing.contains(&path) {
            return Err(http(500, format!("simulated failure for {path}")));
        }

        if let Some(content) = state.files.get(&path) {
            let mut entry = file_entry(&path, content);
            entry.content = Some(wrap_base64(content));
            entry.encoding = Some("base64".to_owned());
            return Ok(Contents::File(entry));
        }

        let children = list_children(&state.files, &path);
        if children.is_empty() && !path.is_empty() {
            return Err(http(404, "Not Found"));
        }
        Ok(Contents::Dir(children))
    }

    fn create_file(&self, request: &WriteFile) -> Result<FileCommit, GitHubError> {
        let path = normalize(&request.path);
        self.record("create", path.clone(), false);

        let content = decode(&request.content)?;
        let mut state = self.state.write().unwrap();
        if state.files.contains_key(&path) {
            return Err(http(422, "Invalid request. \"sha\" wasn't supplied."));
        }

        let entry = file_entry(&path, &content);
        state.files.insert(path, content);
        let commit = Self::next_commit(&mut state, &request.message);
        Ok(FileCommit {
            content: Some(entry),
            commit,
        })
    }

    fn update_file(&self, request: &WriteFile) -> Result<FileCommit, GitHubError> {
        let path = normalize(&request.path);
        self.record("update", path.clone(), false);

        let content = decode(&request.content)?;
        let mut state = self.state.write().unwrap();
        let Some(current) = state.files.get(&path) else {
            return Err(http(404, "Not Found"));
        };
        if request.sha.as_deref() != Some(blob_sha(current).as_str()) {
            return Err(http(409, format!("{path} does not match the given sha")));
        }

        let entry = file_entry(&path, &content);
        state.files.insert(path, content);
        let commit = Self::next_commit(&mut state, &request.message);
        Ok(FileCommit {
            content: Some(entry),
            commit,
        })
    }

    fn delete_file(&self, request: &DeleteFile) -> Result<FileCommit, GitHubError> {
        let path = normalize(&request.path);
        self.record("delete", path.clone(), false);

        let mut state = self.state.write().unwrap();
        let Some(current) = state.files.get(&path) else {
            return Err(http(404, "Not Found"));
        };
        if blob_sha(current) != request.sha {
            return Err(http(409, format!("{path} does not match the given sha")));
        }

        state.files.remove(&path);
        let commit = Self::next_commit(&mut state, &request.message);
        Ok(FileCommit {
            content: None,
            commit,
        })
    }

    fn list(&self, request: &ListRequest) -> Result<Page<Value>, GitHubError> {
        self.record("list", request.kind.as_str(), request.bypass_cache);

        if request.kind.needs_repo() && request.repo.is_none() {
            return Err(http(404, "Not Found"));
        }

        let state = self.state.read().unwrap();
        let all = state.lists.get(&request.kind).cloned().unwrap_or_default();

        let per_page = request.per_page.unwrap_or(DEFAULT_PER_PAGE).max(1);
        let page = request.page.unwrap_or(1).max(1);
        let total = u32::try_from(all.len()).unwrap_or(u32::MAX);
        let last = total.div_ceil(per_page).max(1);
        let start = ((page - 1) * per_page) as usize;
        let items = all
            .into_iter()
            .skip(start)
            .take(per_page as usize)
            .collect();

        let base_url = format!("https://api.github.com/{}", request.kind.as_str());
        Ok(Page {
            items,
            link: build_link_header(&base_url, page, last, per_page),
        })
    }

    fn get_resource(&self, resource: &Resource, bypass_cache: bool) -> Result<Value, GitHubError> {
        let state = self.state.read().unwrap();
        match resource {
            Resource::User => {
                self.record("resource", "user", bypass_cache);
                state.user.clone().ok_or_else(|| http(401, "Requires authentication"))
            }
            Resource::Repo { owner, repo } => {
                self.record("resource", format!("{owner}/{repo}"), bypass_cache);
                Ok(json!({
                    "name": repo,
                    "full_name": format!("{owner}/{repo}"),
                    "owner": { "login": owner },
                }))
            }
            Resource::Branch {
                owner,
                repo,
                branch,
            } => {
                self.record("resource", format!("{owner}/{repo}@{branch}"), bypass_cache);
                state
                    .lists
                    .get(&ListKind::Branches)
                    .and_then(|branches| {
                        branches
                            .iter()
                            .find(|b| b["name"] == branch.as_str())
                            .cloned()
                    })
                    .ok_or_else(|| http(404, "Branch not found"))
            }
        }
    }
}

/// Strip leading/trailing slashes; `.` addresses the root.
fn normalize(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed == "." {
        String::new()
    } else {
        trimmed.to_owned()
    }
}

fn http(status: u16, body: impl Into<String>) -> GitHubError {
    GitHubError::Http {
        status,
        body: body.into(),
    }
}

fn decode(content: &str) -> Result<Vec<u8>, GitHubError> {
    BASE64_STANDARD
        .decode(content)
        .map_err(|e| http(400, format!("content is not valid Base64: {e}")))
}

/// Git blob sha of `content`.
fn blob_sha(content: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("blob {}\0", content.len()).as_bytes());
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// Base64 wrapped at 60 columns, as the contents API returns it.
fn wrap_base64(content: &[u8]) -> String {
    let encoded = BASE64_STANDARD.encode(content);
    let mut wrapped = String::with_capacity(encoded.len() + encoded.len() / 60 + 1);
    for chunk in encoded.as_bytes().chunks(60) {
        wrapped.push_str(&String::from_utf8_lossy(chunk));
        wrapped.push('\n');
    }
    wrapped
}

fn name_of(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_owned()
}

fn file_entry(path: &str, content: &[u8]) -> FileEntry {
    FileEntry {
        path: path.to_owned(),
        name: name_of(path),
        entry_type: EntryType::File,
        sha: blob_sha(content),
        size: Some(content.len() as u64),
        content: None,
        encoding: None,
    }
}

/// Immediate children of `dir`, directories derived from deeper file paths.
fn list_children(files: &BTreeMap<String, Vec<u8>>, dir: &str) -> Vec<FileEntry> {
    let prefix = if dir.is_empty() {
        String::new()
    } else {
        format!("{dir}/")
    };

    let mut entries = Vec::new();
    let mut seen_dirs = BTreeSet::new();

    for (path, content) in files.range(prefix.clone()..) {
        let Some(rest) = path.strip_prefix(&prefix) else {
            break;
        };
        match rest.split_once('/') {
            None => entries.push(file_entry(path, content)),
            Some((child, _)) => {
                if seen_dirs.insert(child.to_owned()) {
                    let child_path = format!("{prefix}{child}");
                    let mut hasher = Sha1::new();
                    hasher.update(b"tree ");
                    for (p, c) in files.range(format!("{child_path}/")..) {
                        if !p.starts_with(&format!("{child_path}/")) {
                            break;
                        }
                        hasher.update(p.as_bytes());
                        hasher.update(blob_sha(c).as_bytes());
                    }
                    entries.push(FileEntry {
                        path: child_path,
                        name: child.to_owned(),
                        entry_type: EntryType::Dir,
                        sha: hex::encode(hasher.finalize()),
                        size: None,
                        content: None,
                        encoding: None,
                    });
                }
            }
        }
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}
