//! Account and repository listings for GitHub API.

use serde_json::Value;
use tracing::info;

use super::{HttpService, encode_segment, read_response};
use crate::error::GitHubError;
use crate::params::Param;
use crate::service::{ListKind, ListRequest, Resource};
use crate::types::Page;

impl HttpService {
    /// Get one page of a listing endpoint.
    pub(crate) fn fetch_page(&self, request: &ListRequest) -> Result<Page<Value>, GitHubError> {
        let url = match (request.kind, &request.repo) {
            (ListKind::Orgs, _) => format!("{}/user/orgs", self.api_url),
            (ListKind::Repos, _) => format!("{}/user/repos", self.api_url),
            (kind, Some((owner, repo))) => {
                format!("{}/{}", self.repo_url(owner, repo), kind.as_str())
            }
            (_, None) => return Err(GitHubError::MissingParam(Param::Owner)),
        };

        info!(
            "Listing {} (page {:?}, per_page {:?})",
            request.kind.as_str(),
            request.page,
            request.per_page
        );

        let mut builder = self.prepare(self.agent.get(&url), request.bypass_cache);
        if let Some(page) = request.page {
            builder = builder.query("page", page.to_string());
        }
        if let Some(per_page) = request.per_page {
            builder = builder.query("per_page", per_page.to_string());
        }

        let (items, link) = read_response::<Vec<Value>>(builder.call()?)?;
        Ok(Page { items, link })
    }

    /// Get a single resource.
    pub(crate) fn fetch_resource(
        &self,
        resource: &Resource,
        bypass_cache: bool,
    ) -> Result<Value, GitHubError> {
        let url = match resource {
            Resource::User => format!("{}/user", self.api_url),
            Resource::Repo { owner, repo } => self.repo_url(owner, repo),
            Resource::Branch {
                owner,
                repo,
                branch,
            } => format!(
                "{}/branches/{}",
                self.repo_url(owner, repo),
                encode_segment(branch)
            ),
        };

        info!("Getting {url}");

        let builder = self.prepare(self.agent.get(&url), bypass_cache);
        let (value, _) = read_response(builder.call()?)?;
        Ok(value)
    }
}
