//! `ht list` command implementation.

use clap::{Args, ValueEnum};
use ht_github::{FETCH_ALL, Params};

use super::GlobalArgs;
use crate::error::CliError;
use crate::output::Output;

/// Listing to fetch.
#[derive(Clone, Copy, ValueEnum)]
enum Listing {
    /// Organizations of the authenticated user.
    Orgs,
    /// Repositories of the authenticated user.
    Repos,
    /// Contributors of the configured repository.
    Contributors,
    /// Collaborators of the configured repository.
    Collaborators,
    /// Branches of the configured repository.
    Branches,
}

/// Arguments for the list command.
#[derive(Args)]
pub(crate) struct ListArgs {
    #[arg(value_enum)]
    listing: Listing,

    /// Page to fetch (ignored when fetching all pages).
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Items per page; 0 fetches every page.
    #[arg(long, default_value_t = FETCH_ALL)]
    per_page: u32,
}

impl ListArgs {
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let session = global.connect()?;
        let github = session.github();
        let params = Params::new().page(self.page).per_page(self.per_page);

        let listing = match self.listing {
            Listing::Orgs => github.orgs(&params)?,
            Listing::Repos => github.repos(&params)?,
            Listing::Contributors => github.contributors(&params)?,
            Listing::Collaborators => github.collaborators(&params)?,
            Listing::Branches => github.branches(&params)?,
        };
        output.json(&listing)
    }
}
