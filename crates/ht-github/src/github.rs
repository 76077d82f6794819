//! GitHub facade.
//!
//! [`GitHub`] merges per-call [`Params`] over instance defaults, checks the
//! required keys of each operation before any request, and dispatches to a
//! [`ContentService`].

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::GitHubError;
use crate::paginate::paginate;
use crate::params::{Param, Params};
use crate::service::{ContentService, DeleteFile, GetContents, ListKind, ListRequest, Resource, WriteFile};
use crate::tree::{LoadOptions, PathContent, TreeLoader};
use crate::types::{Contents, FileCommit, Paginated};

/// Root of the repository, used when no path is given.
const ROOT: &str = ".";

/// Entry point for repository access.
#[derive(Clone)]
pub struct GitHub {
    service: Arc<dyn ContentService>,
    defaults: Params,
    cache: bool,
}

impl GitHub {
    /// Create a facade over `service` with HTTP caching enabled.
    pub fn new(service: Arc<dyn ContentService>) -> Self {
        Self {
            service,
            defaults: Params::default(),
            cache: true,
        }
    }

    /// Set the instance-level defaults (typically owner, repo and ref).
    #[must_use]
    pub fn with_defaults(mut self, defaults: Params) -> Self {
        self.defaults = defaults;
        self
    }

    /// Enable or disable HTTP caching for calls that don't override it.
    #[must_use]
    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    /// Instance-level defaults.
    pub fn defaults(&self) -> &Params {
        &self.defaults
    }

    /// Underlying service.
    pub fn service(&self) -> &Arc<dyn ContentService> {
        &self.service
    }

    /// Whether a call with `params` may be answered from an HTTP cache.
    pub fn use_cache(&self, params: &Params) -> bool {
        params.cache.unwrap_or(self.cache)
    }

    fn params(&self, overrides: &Params) -> Params {
        self.defaults.merge(overrides)
    }

    /// Load a path in the shape selected by `options`. The path defaults to
    /// the repository root.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::MissingParam`] without owner or repo, or the
    /// first request error.
    pub fn files(&self, params: &Params, options: LoadOptions) -> Result<PathContent, GitHubError> {
        let params = self.params(params);
        params.require(&[Param::Owner, Param::Repo])?;

        let loader = TreeLoader::new(
            self.service.as_ref(),
            params.required(Param::Owner)?,
            params.required(Param::Repo)?,
            params.get(Param::Ref),
            !self.use_cache(&params),
        );
        loader.load_path(params.get(Param::Path).unwrap_or(ROOT), options)
    }

    /// Fetch a single file or directory listing as the service returns it.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::MissingParam`] without owner, repo or path.
    pub fn contents(&self, params: &Params) -> Result<Contents, GitHubError> {
        let params = self.params(params);
        params.require(&[Param::Owner, Param::Repo, Param::Path])?;

        self.service.get_contents(&GetContents {
            owner: params.required(Param::Owner)?.to_owned(),
            repo: params.required(Param::Repo)?.to_owned(),
            path: params.required(Param::Path)?.to_owned(),
            git_ref: params.get(Param::Ref).map(str::to_owned),
            bypass_cache: !self.use_cache(&params),
        })
    }

    /// Create a file.
    ///
    /// # Errors
    ///
    /// Requires owner, repo, path, message and content. Fails with a
    /// conflict if the path exists.
    pub fn create_file(&self, params: &Params) -> Result<FileCommit, GitHubError> {
        let params = self.params(params);
        params.require(&[
            Param::Owner,
            Param::Repo,
            Param::Path,
            Param::Message,
            Param::Content,
        ])?;

        self.service.create_file(&write_request(&params, None)?)
    }

    /// Update a file at a known sha.
    ///
    /// # Errors
    ///
    /// Requires owner, repo, path, message, content and sha. Fails with a
    /// conflict if the sha is stale.
    pub fn update_file(&self, params: &Params) -> Result<FileCommit, GitHubError> {
        let params = self.params(params);
        params.require(&[
            Param::Owner,
            Param::Repo,
            Param::Path,
            Param::Message,
            Param::Content,
            Param::Sha,
        ])?;

        let sha = params.required(Param::Sha)?.to_owned();
        self.service.update_file(&write_request(&params, Some(sha))?)
    }

    /// Delete a file at a known sha.
    ///
    /// # Errors
    ///
    /// Requires owner, repo, path, message and sha. Fails with a conflict if
    /// the sha is stale.
    pub fn delete_file(&self, params: &Params) -> Result<FileCommit, GitHubError> {
        let params = self.params(params);
        params.require(&[
            Param::Owner,
            Param::Repo,
            Param::Path,
            Param::Message,
            Param::Sha,
        ])?;

        self.service.delete_file(&DeleteFile {
            owner: params.required(Param::Owner)?.to_owned(),
            repo: params.required(Param::Repo)?.to_owned(),
            path: params.required(Param::Path)?.to_owned(),
            message: params.required(Param::Message)?.to_owned(),
            sha: params.required(Param::Sha)?.to_owned(),
            branch: params.write_branch().map(str::to_owned),
        })
    }

    /// Organizations of the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns the first failing page.
    pub fn orgs(&self, params: &Params) -> Result<Paginated<Value>, GitHubError> {
        self.listing(ListKind::Orgs, params)
    }

    /// Repositories of the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns the first failing page.
    pub fn repos(&self, params: &Params) -> Result<Paginated<Value>, GitHubError> {
        self.listing(ListKind::Repos, params)
    }

    /// Contributors of a repository.
    ///
    /// # Errors
    ///
    /// Requires owner and repo. Returns the first failing page.
    pub fn contributors(&self, params: &Params) -> Result<Paginated<Value>, GitHubError> {
        self.listing(ListKind::Contributors, params)
    }

    /// Collaborators of a repository.
    ///
    /// # Errors
    ///
    /// Requires owner and repo. Returns the first failing page.
    pub fn collaborators(&self, params: &Params) -> Result<Paginated<Value>, GitHubError> {
        self.listing(ListKind::Collaborators, params)
    }

    /// Branches of a repository.
    ///
    /// # Errors
    ///
    /// Requires owner and repo. Returns the first failing page.
    pub fn branches(&self, params: &Params) -> Result<Paginated<Value>, GitHubError> {
        self.listing(ListKind::Branches, params)
    }

    /// The authenticated user.
    ///
    /// # Errors
    ///
    /// Returns the request error.
    pub fn user(&self, params: &Params) -> Result<Value, GitHubError> {
        let params = self.params(params);
        self.service
            .get_resource(&Resource::User, !self.use_cache(&params))
    }

    /// A repository.
    ///
    /// # Errors
    ///
    /// Requires owner and repo.
    pub fn repo(&self, params: &Params) -> Result<Value, GitHubError> {
        let params = self.params(params);
        params.require(&[Param::Owner, Param::Repo])?;

        let resource = Resource::Repo {
            owner: params.required(Param::Owner)?.to_owned(),
            repo: params.required(Param::Repo)?.to_owned(),
        };
        self.service
            .get_resource(&resource, !self.use_cache(&params))
    }

    /// A branch of a repository.
    ///
    /// # Errors
    ///
    /// Requires owner, repo and branch.
    pub fn branch(&self, params: &Params) -> Result<Value, GitHubError> {
        let params = self.params(params);
        params.require(&[Param::Owner, Param::Repo, Param::Branch])?;

        let resource = Resource::Branch {
            owner: params.required(Param::Owner)?.to_owned(),
            repo: params.required(Param::Repo)?.to_owned(),
            branch: params.required(Param::Branch)?.to_owned(),
        };
        self.service
            .get_resource(&resource, !self.use_cache(&params))
    }

    fn listing(&self, kind: ListKind, params: &Params) -> Result<Paginated<Value>, GitHubError> {
        let params = self.params(params);

        let repo = if kind.needs_repo() {
            params.require(&[Param::Owner, Param::Repo])?;
            Some((
                params.required(Param::Owner)?.to_owned(),
                params.required(Param::Repo)?.to_owned(),
            ))
        } else {
            None
        };

        paginate(
            kind.as_str(),
            params.page,
            params.per_page,
            self.use_cache(&params),
            |page| {
                self.service.list(&ListRequest {
                    kind,
                    repo: repo.clone(),
                    page: page.page,
                    per_page: page.per_page,
                    bypass_cache: page.bypass_cache,
                })
            },
        )
    }
}

impl fmt::Debug for GitHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHub")
            .field("defaults", &self.defaults)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

fn write_request(params: &Params, sha: Option<String>) -> Result<WriteFile, GitHubError> {
    Ok(WriteFile {
        owner: params.required(Param::Owner)?.to_owned(),
        repo: params.required(Param::Repo)?.to_owned(),
        path: params.required(Param::Path)?.to_owned(),
        message: params.required(Param::Message)?.to_owned(),
        content: params.required(Param::Content)?.to_owned(),
        sha,
        branch: params.write_branch().map(str::to_owned),
    })
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::prelude::BASE64_STANDARD;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::mock::MockService;
    use crate::paginate::FETCH_ALL;
    use crate::types::PageInfo;

    fn github(service: &Arc<MockService>) -> GitHub {
        GitHub::new(Arc::clone(service) as Arc<dyn ContentService>)
            .with_defaults(Params::new().owner("octo").repo("site"))
    }

    #[test]
    fn test_missing_param_fails_before_request() {
        let service = Arc::new(MockService::new());
        let gh = GitHub::new(Arc::clone(&service) as Arc<dyn ContentService>);

        let err = gh.files(&Params::new().owner("octo"), LoadOptions::new()).unwrap_err();
        assert!(matches!(err, GitHubError::MissingParam(Param::Repo)));

        let err = github(&service)
            .update_file(&Params::new().path("a.md").message("m").content("YQ=="))
            .unwrap_err();
        assert!(matches!(err, GitHubError::MissingParam(Param::Sha)));

        assert_eq!(service.request_count(), 0);
    }

    #[test]
    fn test_files_defaults_to_root() {
        let service = Arc::new(MockService::new().with_file("_config.yml", "title: x"));

        let listing = github(&service)
            .files(&Params::new(), LoadOptions::new())
            .unwrap()
            .into_listing()
            .unwrap();

        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].entry.name, "_config.yml");
        assert_eq!(service.count("get", ""), 1);
    }

    #[test]
    fn test_call_params_override_defaults() {
        let service = Arc::new(MockService::new().with_file("a.md", "a"));
        let gh = github(&service);

        gh.contents(&Params::new().path("a.md").repo("other")).unwrap();

        assert_eq!(gh.defaults().get(Param::Repo), Some("site"));
    }

    #[test]
    fn test_create_update_delete() {
        let service = Arc::new(MockService::new());
        let gh = github(&service);
        let params = Params::new().path("posts/a.md").message("write");

        let created = gh
            .create_file(&params.clone().content(BASE64_STANDARD.encode("one")))
            .unwrap();
        let first_sha = created.content.unwrap().sha;

        let updated = gh
            .update_file(
                &params
                    .clone()
                    .content(BASE64_STANDARD.encode("two"))
                    .sha(&first_sha),
            )
            .unwrap();
        let second_sha = updated.content.unwrap().sha;
        assert_ne!(first_sha, second_sha);
        assert_eq!(service.file_text("posts/a.md").as_deref(), Some("two"));

        let err = gh.delete_file(&params.clone().sha(&first_sha)).unwrap_err();
        assert!(err.is_conflict());

        gh.delete_file(&params.sha(&second_sha)).unwrap();
        assert_eq!(service.file_text("posts/a.md"), None);
    }

    #[test]
    fn test_fetch_all_drains_pages() {
        let orgs = (0..250).map(|i| json!({ "id": i })).collect();
        let service = Arc::new(MockService::new().with_list(ListKind::Orgs, orgs));

        let result = github(&service)
            .orgs(&Params::new().per_page(FETCH_ALL))
            .unwrap();

        assert_eq!(result.items.len(), 250);
        assert_eq!(result.items[249], json!({ "id": 249 }));
        assert_eq!(result.page_info, None);
        assert_eq!(service.count("list", "orgs"), 3);
    }

    #[test]
    fn test_single_page_returns_page_info() {
        let branches = (0..5).map(|i| json!({ "name": format!("b{i}") })).collect();
        let service = Arc::new(MockService::new().with_list(ListKind::Branches, branches));

        let result = github(&service)
            .branches(&Params::new().page(2).per_page(2))
            .unwrap();

        assert_eq!(result.items.len(), 2);
        assert_eq!(
            result.page_info,
            Some(PageInfo {
                first: Some(1),
                prev: Some(1),
                next: Some(3),
                last: Some(3),
            })
        );
    }

    #[test]
    fn test_repo_listing_requires_repo() {
        let service = Arc::new(MockService::new());
        let gh = GitHub::new(Arc::clone(&service) as Arc<dyn ContentService>);

        let err = gh.contributors(&Params::new().owner("octo")).unwrap_err();

        assert!(err.is_validation());
        assert!(gh.orgs(&Params::new()).is_ok());
    }

    #[test]
    fn test_cache_switch() {
        let service = Arc::new(MockService::new().with_file("a.md", "a"));
        let gh = github(&service).with_cache(false);

        gh.contents(&Params::new().path("a.md")).unwrap();
        gh.contents(&Params::new().path("a.md").cache(true)).unwrap();

        let bypass: Vec<_> = service.requests().iter().map(|r| r.bypass_cache).collect();
        assert_eq!(bypass, vec![true, false]);
    }

    #[test]
    fn test_branch_lookup() {
        let service = Arc::new(
            MockService::new().with_list(ListKind::Branches, vec![json!({ "name": "main" })]),
        );
        let gh = github(&service);

        assert_eq!(
            gh.branch(&Params::new().branch("main")).unwrap(),
            json!({ "name": "main" })
        );
        assert!(gh.branch(&Params::new().branch("gone")).unwrap_err().is_not_found());
        assert!(gh.branch(&Params::new()).unwrap_err().is_validation());
    }

    #[test]
    fn test_repo_and_user() {
        let service = Arc::new(MockService::new().with_user(json!({ "login": "octo" })));
        let gh = github(&service);

        assert_eq!(gh.repo(&Params::new()).unwrap()["full_name"], "octo/site");
        assert_eq!(gh.user(&Params::new()).unwrap()["login"], "octo");
    }
}
