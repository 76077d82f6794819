//! GitHub REST API client.
//!
//! Provides a sync HTTP implementation of [`ContentService`] on top of a
//! shared `ureq` agent, with optional token authentication.

mod contents;
mod listings;

use std::time::Duration;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use ureq::http::Response;
use ureq::{Agent, RequestBuilder};

use crate::error::GitHubError;
use crate::service::{
    ContentService, DeleteFile, GetContents, ListRequest, Resource, WriteFile,
};
use crate::types::{Contents, FileCommit, Page};

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Media type requested from the API.
const ACCEPT: &str = "application/vnd.github+json";

/// User agent sent with every request (required by GitHub).
const USER_AGENT: &str = concat!("houndstooth/", env!("CARGO_PKG_VERSION"));

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Characters escaped inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// GitHub REST API client.
pub struct HttpService {
    agent: Agent,
    api_url: String,
    token: Option<String>,
}

impl HttpService {
    /// Create an unauthenticated client against `api_url`.
    #[must_use]
    pub fn new(api_url: &str) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            api_url: api_url.trim_end_matches('/').to_owned(),
            token: None,
        }
    }

    /// Create a client against the public GitHub API.
    #[must_use]
    pub fn github() -> Self {
        Self::new(DEFAULT_API_URL)
    }

    /// Authenticate every request with a personal access token.
    ///
    /// An empty token leaves the client unauthenticated.
    #[must_use]
    pub fn with_token(mut self, token: &str) -> Self {
        if !token.is_empty() {
            self.token = Some(token.to_owned());
        }
        self
    }

    /// Get the API base URL.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Build `/repos/{owner}/{repo}` for the given repository.
    fn repo_url(&self, owner: &str, repo: &str) -> String {
        format!(
            "{}/repos/{}/{}",
            self.api_url,
            encode_segment(owner),
            encode_segment(repo)
        )
    }

    /// Authorization header value, if authenticated.
    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("token {t}"))
    }

    /// Attach the headers shared by every request.
    ///
    /// With `bypass_cache`, an empty `If-None-Match` keeps intermediate HTTP
    /// caches from answering with a stale representation.
    fn prepare<B>(&self, request: RequestBuilder<B>, bypass_cache: bool) -> RequestBuilder<B> {
        let mut request = request
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT);
        if let Some(auth) = self.auth_header() {
            request = request.header("Authorization", &auth);
        }
        if bypass_cache {
            request = request.header("If-None-Match", "");
        }
        request
    }
}

impl ContentService for HttpService {
    fn get_contents(&self, request: &GetContents) -> Result<Contents, GitHubError> {
        self.fetch_contents(request)
    }

    fn create_file(&self, request: &WriteFile) -> Result<FileCommit, GitHubError> {
        self.put_file(request)
    }

    fn update_file(&self, request: &WriteFile) -> Result<FileCommit, GitHubError> {
        self.put_file(request)
    }

    fn delete_file(&self, request: &DeleteFile) -> Result<FileCommit, GitHubError> {
        self.remove_file(request)
    }

    fn list(&self, request: &ListRequest) -> Result<Page<Value>, GitHubError> {
        self.fetch_page(request)
    }

    fn get_resource(&self, resource: &Resource, bypass_cache: bool) -> Result<Value, GitHubError> {
        self.fetch_resource(resource, bypass_cache)
    }
}

/// Percent-encode a single path segment.
fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Percent-encode a repository path, keeping `/` separators.
///
/// `.` and the empty string both address the repository root.
fn encode_repo_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() || trimmed == "." {
        return String::new();
    }
    trimmed
        .split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}

/// Read a JSON response, mapping error statuses to [`GitHubError::Http`].
///
/// Returns the parsed body and the raw `Link` header.
fn read_response<T: DeserializeOwned>(
    response: Response<ureq::Body>,
) -> Result<(T, Option<String>), GitHubError> {
    let status = response.status().as_u16();
    let link = response
        .headers()
        .get("link")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let mut body_reader = response.into_body();

    if status >= 400 {
        let error_body = body_reader
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(GitHubError::Http {
            status,
            body: error_body,
        });
    }

    Ok((body_reader.read_json()?, link))
}
