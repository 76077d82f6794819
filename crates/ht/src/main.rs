//! Houndstooth CLI - Jekyll content stored on GitHub.
//!
//! Provides commands for:
//! - `files`, `list`: raw repository access
//! - `collections`, `items`, `show`: reading the site model
//! - `create`, `update`, `delete`, `rename`: editing collection items
//! - `data`: reading and replacing `_data` files
//!
//! Every command prints its result as JSON on stdout.

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{
    CollectionsArgs, CreateArgs, DataArgs, DeleteArgs, FilesArgs, GlobalArgs, ItemsArgs, ListArgs,
    RenameArgs, ShowArgs, UpdateArgs,
};
use error::CliError;
use output::Output;

/// Houndstooth - Jekyll content stored on GitHub.
#[derive(Parser)]
#[command(name = "ht", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a repository path as a listing, flat map or sha tree.
    Files(FilesArgs),
    /// List orgs, repos, contributors, collaborators or branches.
    List(ListArgs),
    /// List the collections declared in the site config.
    Collections(CollectionsArgs),
    /// List the items of a collection.
    Items(ItemsArgs),
    /// Show one item with its fields and body.
    Show(ShowArgs),
    /// Create an item from a front matter file.
    Create(CreateArgs),
    /// Replace an item's fields and body from a front matter file.
    Update(UpdateArgs),
    /// Delete an item.
    Delete(DeleteArgs),
    /// Rename an item.
    Rename(RenameArgs),
    /// Read or replace a data file.
    Data(DataArgs),
}

impl Commands {
    fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        match self {
            Self::Files(args) => args.execute(global, output),
            Self::List(args) => args.execute(global, output),
            Self::Collections(args) => args.execute(global, output),
            Self::Items(args) => args.execute(global, output),
            Self::Show(args) => args.execute(global, output),
            Self::Create(args) => args.execute(global, output),
            Self::Update(args) => args.execute(global, output),
            Self::Delete(args) => args.execute(global, output),
            Self::Rename(args) => args.execute(global, output),
            Self::Data(args) => args.execute(global, output),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.global.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = cli.command.execute(&cli.global, &output) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
