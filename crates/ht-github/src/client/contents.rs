//! Contents operations for GitHub API.

use serde_json::json;
use tracing::info;

use super::{HttpService, encode_repo_path, read_response};
use crate::error::GitHubError;
use crate::service::{DeleteFile, GetContents, WriteFile};
use crate::types::{Contents, FileCommit};

impl HttpService {
    /// Get a file or directory listing.
    pub(crate) fn fetch_contents(&self, request: &GetContents) -> Result<Contents, GitHubError> {
        let url = format!(
            "{}/contents/{}",
            self.repo_url(&request.owner, &request.repo),
            encode_repo_path(&request.path)
        );

        info!("Getting contents of {}", request.path);

        let mut builder = self.prepare(self.agent.get(&url), request.bypass_cache);
        if let Some(git_ref) = &request.git_ref {
            builder = builder.query("ref", git_ref);
        }

        let (contents, _) = read_response(builder.call()?)?;
        Ok(contents)
    }

    /// Create or update a file (create when `sha` is absent).
    pub(crate) fn put_file(&self, request: &WriteFile) -> Result<FileCommit, GitHubError> {
        let url = format!(
            "{}/contents/{}",
            self.repo_url(&request.owner, &request.repo),
            encode_repo_path(&request.path)
        );

        let mut payload = json!({
            "message": request.message,
            "content": request.content,
        });
        if let Some(sha) = &request.sha {
            payload["sha"] = json!(sha);
        }
        if let Some(branch) = &request.branch {
            payload["branch"] = json!(branch);
        }

        info!(
            "{} file {}",
            if request.sha.is_some() {
                "Updating"
            } else {
                "Creating"
            },
            request.path
        );

        let payload_bytes = serde_json::to_vec(&payload)?;

        let response = self
            .prepare(self.agent.put(&url), false)
            .header("Content-Type", "application/json")
            .send(&payload_bytes[..])?;

        let (commit, _) = read_response::<FileCommit>(response)?;
        info!("Wrote {} in commit {}", request.path, commit.commit.sha);
        Ok(commit)
    }

    /// Delete a file.
    pub(crate) fn remove_file(&self, request: &DeleteFile) -> Result<FileCommit, GitHubError> {
        let url = format!(
            "{}/contents/{}",
            self.repo_url(&request.owner, &request.repo),
            encode_repo_path(&request.path)
        );

        let mut payload = json!({
            "message": request.message,
            "sha": request.sha,
        });
        if let Some(branch) = &request.branch {
            payload["branch"] = json!(branch);
        }

        info!("Deleting file {}", request.path);

        let payload_bytes = serde_json::to_vec(&payload)?;

        // The contents API takes the sha and message in a DELETE body
        let response = self
            .prepare(self.agent.delete(&url).force_send_body(), false)
            .header("Content-Type", "application/json")
            .send(&payload_bytes[..])?;

        let (commit, _) = read_response(response)?;
        Ok(commit)
    }
}
