//! GitHub contents access layer for Houndstooth.
//!
//! This crate wraps the GitHub REST API behind a [`ContentService`] trait and
//! layers repository-level operations on top of it:
//!
//! - [`paginate`] drains listing endpoints, or passes one page through with
//!   its [`PageInfo`]
//! - [`TreeLoader`] expands a path into a raw listing, a flattened map or a
//!   nested sha tree, fetching sibling subdirectories in parallel
//! - [`GitHub`] merges call [`Params`] over instance defaults and validates
//!   required keys before dispatch
//!
//! [`HttpService`] is the `ureq` implementation. [`MockService`] keeps a
//! repository in memory (behind the `mock` feature flag).
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ht_github::{GitHub, HttpService, LoadOptions, Params};
//!
//! let service = HttpService::github().with_token(&token);
//! let github = GitHub::new(Arc::new(service))
//!     .with_defaults(Params::new().owner("octo").repo("site"));
//!
//! let tree = github.files(&Params::new().path("_posts"), LoadOptions::new().tree(true))?;
//! ```

mod client;
mod error;
mod github;
mod link;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod paginate;
mod params;
mod service;
mod tree;
mod types;

pub use client::{DEFAULT_API_URL, HttpService};
pub use error::GitHubError;
pub use github::GitHub;
pub use link::{build_link_header, parse_link_header};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockRequest, MockService};
pub use paginate::{FETCH_ALL, MAX_PER_PAGE, PageRequest, paginate};
pub use params::{Param, Params};
pub use service::{
    ContentService, DeleteFile, GetContents, ListKind, ListRequest, Resource, WriteFile,
};
pub use tree::{ListingEntry, LoadOptions, PathContent, TreeLoader, TreeNode};
pub use types::{
    CommitRef, Contents, EntryType, FileCommit, FileEntry, Page, PageInfo, Paginated,
};
