//! Item commands: `ht items`, `show`, `create`, `update`, `delete`, `rename`.

use std::path::{Path, PathBuf};

use clap::Args;
use ht_github::Params;
use ht_site::{FrontMatter, front_matter};

use super::{GlobalArgs, ItemRef};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the items command.
#[derive(Args)]
pub(crate) struct ItemsArgs {
    /// Collection name.
    collection: String,

    /// Load fields and body of every item.
    #[arg(long)]
    full: bool,

    /// Print the collection defaults (`_fields.md`) instead of its items.
    #[arg(long, conflicts_with = "full")]
    defaults: bool,
}

impl ItemsArgs {
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let site = global.connect()?.site()?;
        let params = Params::new();
        let collection = site.collection(&self.collection, &params)?;

        if self.defaults {
            return output.json(&collection.defaults(&params)?);
        }

        let mut items = collection.items(&params)?;
        if self.full {
            for item in &mut items {
                item.init(&params)?;
            }
        }
        output.json(&items)
    }
}

/// Arguments for the show command.
#[derive(Args)]
pub(crate) struct ShowArgs {
    #[command(flatten)]
    item: ItemRef,
}

impl ShowArgs {
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let site = global.connect()?.site()?;
        let params = Params::new();

        let (_collection, mut item) = self.item.resolve(&site, &params)?;
        item.init(&params)?;
        output.json(&item)
    }
}

/// Arguments for the create command.
#[derive(Args)]
pub(crate) struct CreateArgs {
    /// Collection name.
    collection: String,

    /// New item file name.
    name: String,

    /// Front matter file with the initial content (default: collection defaults).
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Commit message.
    #[arg(short, long)]
    message: String,
}

impl CreateArgs {
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let site = global.connect()?.site()?;
        let params = Params::new();
        let collection = site.collection(&self.collection, &params)?;

        let content = match &self.file {
            Some(path) => read_front_matter(path)?,
            None => collection.defaults(&params)?,
        };

        let item = collection.create_item(&self.name, content, &params.message(self.message))?;
        output.success(&format!("Created {}", item.path()));
        output.json(&item)
    }
}

/// Arguments for the update command.
#[derive(Args)]
pub(crate) struct UpdateArgs {
    #[command(flatten)]
    item: ItemRef,

    /// Front matter file with the new content.
    #[arg(short, long)]
    file: PathBuf,

    /// Commit message.
    #[arg(short, long)]
    message: String,
}

impl UpdateArgs {
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let site = global.connect()?.site()?;
        let params = Params::new();
        let content = read_front_matter(&self.file)?;

        let (_collection, mut item) = self.item.resolve(&site, &params)?;
        item.set_fields(content.fields)?;
        item.set_body(content.body)?;
        item.save(&params.message(self.message))?;

        output.success(&format!("Updated {}", item.path()));
        output.json(&item)
    }
}

/// Arguments for the delete command.
#[derive(Args)]
pub(crate) struct DeleteArgs {
    #[command(flatten)]
    item: ItemRef,

    /// Commit message.
    #[arg(short, long)]
    message: String,
}

impl DeleteArgs {
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let site = global.connect()?.site()?;
        let params = Params::new();

        let (_collection, mut item) = self.item.resolve(&site, &params)?;
        item.delete(&params.message(self.message))?;

        output.success(&format!("Deleted {}", item.path()));
        output.json(&item)
    }
}

/// Arguments for the rename command.
#[derive(Args)]
pub(crate) struct RenameArgs {
    #[command(flatten)]
    item: ItemRef,

    /// New item file name.
    new_name: String,

    /// Commit message used for both the delete and the create.
    #[arg(short, long)]
    message: String,
}

impl RenameArgs {
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let site = global.connect()?.site()?;
        let params = Params::new();

        let (_collection, mut item) = self.item.resolve(&site, &params)?;
        let old_path = item.path().to_owned();
        item.init(&params)?;
        item.rename(&self.new_name, &params.message(self.message))?;

        output.success(&format!("Renamed {old_path} to {}", item.path()));
        output.json(&item)
    }
}

fn read_front_matter(path: &Path) -> Result<FrontMatter, CliError> {
    let text = std::fs::read_to_string(path)?;
    Ok(front_matter::parse(&text))
}
