//! GitHub contents API types.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::GitHubError;

/// Kind of a repository entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Dir,
    Symlink,
    Submodule,
}

/// A file or directory in the repository tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FileEntry {
    /// Path relative to the repository root.
    pub path: String,
    /// Last path segment.
    pub name: String,
    /// Entry kind.
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Opacity token of the blob or tree.
    pub sha: String,
    /// Size in bytes (files only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Encoded content. Only present when a single file is fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Content encoding (always `base64` when present).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

impl FileEntry {
    /// Whether this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.entry_type == EntryType::Dir
    }

    /// Decode the base64 content into raw bytes.
    ///
    /// The service wraps base64 payloads at 60 columns, so whitespace is
    /// stripped before decoding. A missing payload decodes to an empty buffer.
    pub fn decode_content(&self) -> Result<Vec<u8>, GitHubError> {
        let Some(content) = &self.content else {
            return Ok(Vec::new());
        };
        let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
        Ok(BASE64_STANDARD.decode(compact)?)
    }

    /// Decode the base64 content as UTF-8 text.
    pub fn decode_text(&self) -> Result<String, GitHubError> {
        Ok(String::from_utf8(self.decode_content()?)?)
    }
}

/// Response of a contents lookup: one file or a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Contents {
    Dir(Vec<FileEntry>),
    File(FileEntry),
}

impl Contents {
    /// Return the file, or an error if the path is a directory.
    pub fn into_file(self) -> Result<FileEntry, GitHubError> {
        match self {
            Self::File(entry) => Ok(entry),
            Self::Dir(_) => Err(GitHubError::UnexpectedResponse(
                "expected a file, found a directory".to_owned(),
            )),
        }
    }

    /// Return the directory listing, or an error if the path is a file.
    pub fn into_dir(self) -> Result<Vec<FileEntry>, GitHubError> {
        match self {
            Self::Dir(entries) => Ok(entries),
            Self::File(_) => Err(GitHubError::UnexpectedResponse(
                "expected a directory, found a file".to_owned(),
            )),
        }
    }
}

/// Commit created by a write.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CommitRef {
    /// Commit sha.
    pub sha: String,
    /// Commit message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response of a create, update or delete.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FileCommit {
    /// The written file (`None` after a delete).
    #[serde(default)]
    pub content: Option<FileEntry>,
    /// The commit recording the change.
    pub commit: CommitRef,
}

/// One page of a paginated listing, as returned by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Raw `Link` header, if the service sent one.
    pub link: Option<String>,
}

/// Page numbers advertised by a `Link` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub first: Option<u32>,
    pub prev: Option<u32>,
    pub next: Option<u32>,
    pub last: Option<u32>,
}

/// Result of a paginated operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    /// Items in arrival order.
    pub items: Vec<T>,
    /// Pagination metadata. `None` when every page was drained, or when the
    /// service sent no `Link` header.
    pub page_info: Option<PageInfo>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn file(content: Option<&str>) -> FileEntry {
        FileEntry {
            path: "posts/hello.md".to_owned(),
            name: "hello.md".to_owned(),
            entry_type: EntryType::File,
            sha: "abc".to_owned(),
            size: None,
            content: content.map(str::to_owned),
            encoding: content.map(|_| "base64".to_owned()),
        }
    }

    #[test]
    fn test_decode_wrapped_content() {
        // "Hello world, this is wrapped" split across lines
        let entry = file(Some("SGVsbG8gd29ybGQsIHRo\naXMgaXMgd3JhcHBlZA==\n"));

        assert_eq!(entry.decode_text().unwrap(), "Hello world, this is wrapped");
    }

    #[test]
    fn test_decode_missing_content_is_empty() {
        assert_eq!(file(None).decode_content().unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_decode_invalid_base64() {
        let err = file(Some("not base64!")).decode_content().unwrap_err();
        assert!(matches!(err, GitHubError::Base64(_)));
    }

    #[test]
    fn test_deserialize_file_contents() {
        let json = r#"{
            "type": "file",
            "encoding": "base64",
            "size": 5,
            "name": "hello.md",
            "path": "posts/hello.md",
            "content": "SGVsbG8=",
            "sha": "b6fc4c620b67d95f953a5c1c1230aaab5db5a1b0",
            "url": "https://api.github.com/repos/octo/site/contents/posts/hello.md"
        }"#;

        let contents: Contents = serde_json::from_str(json).unwrap();
        let entry = contents.into_file().unwrap();

        assert_eq!(entry.entry_type, EntryType::File);
        assert_eq!(entry.decode_text().unwrap(), "Hello");
    }

    #[test]
    fn test_deserialize_dir_contents() {
        let json = r#"[
            {"type": "file", "name": "a.md", "path": "posts/a.md", "sha": "1"},
            {"type": "dir", "name": "drafts", "path": "posts/drafts", "sha": "2"}
        ]"#;

        let contents: Contents = serde_json::from_str(json).unwrap();
        let entries = contents.into_dir().unwrap();

        assert_eq!(entries.len(), 2);
        assert!(!entries[0].is_dir());
        assert!(entries[1].is_dir());
    }

    #[test]
    fn test_into_file_rejects_dir() {
        let err = Contents::Dir(Vec::new()).into_file().unwrap_err();
        assert!(matches!(err, GitHubError::UnexpectedResponse(_)));
    }

    #[test]
    fn test_deserialize_delete_commit() {
        let json = r#"{"content": null, "commit": {"sha": "c0ffee", "message": "Deleted"}}"#;

        let commit: FileCommit = serde_json::from_str(json).unwrap();

        assert_eq!(commit.content, None);
        assert_eq!(commit.commit.sha, "c0ffee");
    }
}
