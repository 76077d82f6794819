//! Error types for the GitHub access layer.

use crate::params::Param;

/// Error from GitHub operations.
#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    /// A required parameter was not supplied. Raised before any request is sent.
    #[error("missing required parameter: {0}")]
    MissingParam(Param),

    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// Base64 payload could not be decoded.
    #[error("invalid base64 content")]
    Base64(#[from] base64::DecodeError),

    /// Decoded content is not valid UTF-8.
    #[error("content is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Response had an unexpected shape (e.g. a directory where a file was expected).
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl GitHubError {
    /// HTTP status of the failed response, if the service answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the remote path does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Whether the request carried a stale or missing sha.
    ///
    /// GitHub reports sha mismatches as `409 Conflict`, and as
    /// `422 Unprocessable Entity` when the sha is missing for an existing file.
    pub fn is_conflict(&self) -> bool {
        matches!(self.status(), Some(409 | 422))
    }

    /// Whether the error was raised by parameter validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MissingParam(_))
    }
}
