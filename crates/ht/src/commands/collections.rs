//! `ht collections` command implementation.

use clap::Args;
use ht_github::Params;
use serde::Serialize;

use super::GlobalArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the collections command.
#[derive(Args)]
pub(crate) struct CollectionsArgs {
    /// Print the parsed site config instead of the collections.
    #[arg(long)]
    site_config: bool,
}

#[derive(Serialize)]
struct CollectionSummary<'a> {
    name: &'a str,
    path: &'a str,
}

impl CollectionsArgs {
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let site = global.connect()?.site()?;
        let params = Params::new();

        if self.site_config {
            return output.json(&site.config(&params)?);
        }

        let collections = site.collections(&params)?;
        let summaries: Vec<CollectionSummary<'_>> = collections
            .iter()
            .map(|collection| CollectionSummary {
                name: collection.name(),
                path: collection.path(),
            })
            .collect();
        output.json(&summaries)
    }
}
