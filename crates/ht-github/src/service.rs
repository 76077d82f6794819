//! Remote content service abstraction.
//!
//! [`ContentService`] is the seam between the model layers and the remote
//! repository host. [`HttpService`](crate::HttpService) talks to the GitHub
//! REST API; [`MockService`](crate::MockService) keeps a repository in memory
//! for tests.
//!
//! Requests are plain structs built from validated [`Params`](crate::Params);
//! implementations never see a missing required field.

use serde_json::Value;

use crate::error::GitHubError;
use crate::types::{Contents, FileCommit, Page};

/// Fetch a file or list a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetContents {
    pub owner: String,
    pub repo: String,
    /// Repository path; `.` or empty for the root.
    pub path: String,
    pub git_ref: Option<String>,
    pub bypass_cache: bool,
}

/// Create a file (`sha == None`) or update an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFile {
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub message: String,
    /// Base64-encoded content.
    pub content: String,
    pub sha: Option<String>,
    pub branch: Option<String>,
}

/// Delete a file at a known sha.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFile {
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub message: String,
    pub sha: String,
    pub branch: Option<String>,
}

/// Paginated listing endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    /// Organizations of the authenticated user.
    Orgs,
    /// Repositories of the authenticated user.
    Repos,
    /// Contributors of a repository.
    Contributors,
    /// Collaborators of a repository.
    Collaborators,
    /// Branches of a repository.
    Branches,
}

impl ListKind {
    /// Whether the listing is scoped to a repository.
    pub fn needs_repo(self) -> bool {
        matches!(
            self,
            Self::Contributors | Self::Collaborators | Self::Branches
        )
    }

    /// Short name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Orgs => "orgs",
            Self::Repos => "repos",
            Self::Contributors => "contributors",
            Self::Collaborators => "collaborators",
            Self::Branches => "branches",
        }
    }
}

/// A page of a listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub kind: ListKind,
    /// Repository scope (`Some` iff [`ListKind::needs_repo`]).
    pub repo: Option<(String, String)>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub bypass_cache: bool,
}

/// Single-resource endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    /// The authenticated user.
    User,
    /// A repository.
    Repo { owner: String, repo: String },
    /// A branch of a repository.
    Branch {
        owner: String,
        repo: String,
        branch: String,
    },
}

/// Remote version-controlled file store.
///
/// Implementations must be shareable across threads: the tree loader expands
/// sibling directories in parallel.
pub trait ContentService: Send + Sync {
    /// Fetch a single file (with content) or a directory listing (without).
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::Http`] with status 404 if the path does not exist.
    fn get_contents(&self, request: &GetContents) -> Result<Contents, GitHubError>;

    /// Create a new file.
    ///
    /// # Errors
    ///
    /// Returns a conflict error (422) if the path already exists.
    fn create_file(&self, request: &WriteFile) -> Result<FileCommit, GitHubError>;

    /// Replace an existing file. `request.sha` must match the current blob.
    ///
    /// # Errors
    ///
    /// Returns a conflict error (409) if the sha is stale.
    fn update_file(&self, request: &WriteFile) -> Result<FileCommit, GitHubError>;

    /// Delete a file. `request.sha` must match the current blob.
    ///
    /// # Errors
    ///
    /// Returns a conflict error (409) if the sha is stale.
    fn delete_file(&self, request: &DeleteFile) -> Result<FileCommit, GitHubError>;

    /// Fetch one page of a listing endpoint.
    fn list(&self, request: &ListRequest) -> Result<Page<Value>, GitHubError>;

    /// Fetch a single resource.
    fn get_resource(&self, resource: &Resource, bypass_cache: bool) -> Result<Value, GitHubError>;
}
