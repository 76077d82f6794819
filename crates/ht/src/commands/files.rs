//! `ht files` command implementation.

use clap::Args;
use ht_github::{LoadOptions, Params};

use super::GlobalArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the files command.
#[derive(Args)]
pub(crate) struct FilesArgs {
    /// Repository path (default: root).
    #[arg(default_value = ".")]
    path: String,

    /// Expand subdirectories.
    #[arg(short, long)]
    recursive: bool,

    /// Key every entry by its full path.
    #[arg(short, long)]
    flatten: bool,

    /// Print shas instead of entries.
    #[arg(short, long)]
    tree: bool,
}

impl FilesArgs {
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let session = global.connect()?;
        let options = LoadOptions::new()
            .recursive(self.recursive)
            .flatten(self.flatten)
            .tree(self.tree);

        let content = session
            .github()
            .files(&Params::new().path(self.path), options)?;
        output.json(&content)
    }
}
