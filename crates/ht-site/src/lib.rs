//! Jekyll site model over a GitHub repository.
//!
//! - [`Site`]: config discovery, collections and data files
//! - [`Collection`]: items under one directory, with `_fields.md` defaults
//! - [`Item`]: one front matter file and its sync state
//!
//! Every read is cached on the object that made it; saves and deletes
//! invalidate the paths they touch.
//!
//! # Example
//!
//! ```ignore
//! use ht_github::Params;
//! use ht_site::{FrontMatter, Site};
//!
//! let site = Site::new(github)?;
//! let posts = site.collection("posts", &Params::new())?;
//!
//! let mut item = posts.items(&Params::new())?.remove(0);
//! item.init(&Params::new())?;
//! item.set_body("Updated")?;
//! item.save(&Params::new().message("Update post"))?;
//! ```

mod collection;
mod config;
mod error;
pub mod front_matter;
mod item;
mod site;

pub use collection::Collection;
pub use config::{CollectionsDecl, SiteConfig, is_config_file};
pub use error::SiteError;
pub use front_matter::{Fields, FrontMatter};
pub use item::{Item, ItemState};
pub use site::{DATA_DIR, Data, Site};
