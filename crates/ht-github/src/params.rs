//! Typed parameter bag for GitHub operations.
//!
//! Every operation takes a [`Params`] value that is merged over the
//! instance-level defaults of the object performing the call:
//!
//! 1. instance defaults (usually `owner`, `repo` and `ref`)
//! 2. call-site overrides (any field set on the caller's `Params`)
//!
//! Fields set in a later layer win. After merging, each operation checks
//! its own list of required [`Param`]s with [`Params::require`] before any
//! request is dispatched.

use std::fmt;

use crate::error::GitHubError;

/// Name of a string parameter that an operation may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    Owner,
    Repo,
    Ref,
    Branch,
    Path,
    Message,
    Content,
    Sha,
}

impl Param {
    /// Wire name of the parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Repo => "repo",
            Self::Ref => "ref",
            Self::Branch => "branch",
            Self::Path => "path",
            Self::Message => "message",
            Self::Content => "content",
            Self::Sha => "sha",
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for a single GitHub operation.
///
/// All fields are optional; see the module docs for the merge order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    /// Repository owner (user or organization).
    pub owner: Option<String>,
    /// Repository name.
    pub repo: Option<String>,
    /// Git ref (branch, tag or commit) to read from or write to.
    pub git_ref: Option<String>,
    /// Branch name (branch lookups, and the write target when set explicitly).
    pub branch: Option<String>,
    /// Repository path, relative to the root.
    pub path: Option<String>,
    /// Commit message for writes.
    pub message: Option<String>,
    /// Base64-encoded file content for writes.
    pub content: Option<String>,
    /// Current sha of the file being updated or deleted.
    pub sha: Option<String>,
    /// Page number for paginated listings.
    pub page: Option<u32>,
    /// Page size for paginated listings. `0` fetches every page.
    pub per_page: Option<u32>,
    /// Per-call override of the client-level HTTP cache switch.
    pub cache: Option<bool>,
}

impl Params {
    /// Create an empty parameter bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the repository owner.
    #[must_use]
    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Set the repository name.
    #[must_use]
    pub fn repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = Some(repo.into());
        self
    }

    /// Set the git ref.
    #[must_use]
    pub fn git_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = Some(git_ref.into());
        self
    }

    /// Set the branch name.
    #[must_use]
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Set the repository path.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the commit message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the base64 content.
    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set the current sha.
    #[must_use]
    pub fn sha(mut self, sha: impl Into<String>) -> Self {
        self.sha = Some(sha.into());
        self
    }

    /// Set the page number.
    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the page size (`0` fetches all pages).
    #[must_use]
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Override the HTTP cache switch for this call.
    #[must_use]
    pub fn cache(mut self, cache: bool) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Merge `overrides` on top of `self`.
    ///
    /// Every field set in `overrides` replaces the value in `self`.
    #[must_use]
    pub fn merge(&self, overrides: &Params) -> Params {
        fn pick(base: Option<&String>, over: Option<&String>) -> Option<String> {
            over.or(base).cloned()
        }

        Params {
            owner: pick(self.owner.as_ref(), overrides.owner.as_ref()),
            repo: pick(self.repo.as_ref(), overrides.repo.as_ref()),
            git_ref: pick(self.git_ref.as_ref(), overrides.git_ref.as_ref()),
            branch: pick(self.branch.as_ref(), overrides.branch.as_ref()),
            path: pick(self.path.as_ref(), overrides.path.as_ref()),
            message: pick(self.message.as_ref(), overrides.message.as_ref()),
            content: pick(self.content.as_ref(), overrides.content.as_ref()),
            sha: pick(self.sha.as_ref(), overrides.sha.as_ref()),
            page: overrides.page.or(self.page),
            per_page: overrides.per_page.or(self.per_page),
            cache: overrides.cache.or(self.cache),
        }
    }

    /// Get a string parameter by name. Empty strings count as unset.
    pub fn get(&self, param: Param) -> Option<&str> {
        let value = match param {
            Param::Owner => &self.owner,
            Param::Repo => &self.repo,
            Param::Ref => &self.git_ref,
            Param::Branch => &self.branch,
            Param::Path => &self.path,
            Param::Message => &self.message,
            Param::Content => &self.content,
            Param::Sha => &self.sha,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    /// Check that every parameter in `required` is set.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::MissingParam`] naming the first missing parameter.
    pub fn require(&self, required: &[Param]) -> Result<(), GitHubError> {
        match required.iter().find(|p| self.get(**p).is_none()) {
            Some(missing) => Err(GitHubError::MissingParam(*missing)),
            None => Ok(()),
        }
    }

    /// Get a required string parameter.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::MissingParam`] if the parameter is unset.
    pub fn required(&self, param: Param) -> Result<&str, GitHubError> {
        self.get(param).ok_or(GitHubError::MissingParam(param))
    }

    /// Branch that a write should target: explicit `branch`, else `ref`.
    pub fn write_branch(&self) -> Option<&str> {
        self.get(Param::Branch).or_else(|| self.get(Param::Ref))
    }
}
