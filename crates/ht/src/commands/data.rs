//! `ht data` command implementation.

use std::path::PathBuf;

use clap::Args;
use ht_github::Params;
use ht_site::DATA_DIR;

use super::GlobalArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the data command.
#[derive(Args)]
pub(crate) struct DataArgs {
    /// Data directory or file.
    #[arg(default_value = DATA_DIR)]
    path: String,

    /// Replace the data file with the YAML document in this local file.
    #[arg(short, long, requires_all = ["sha", "message"])]
    write: Option<PathBuf>,

    /// Current sha of the data file (required with --write).
    #[arg(long)]
    sha: Option<String>,

    /// Commit message (required with --write).
    #[arg(short, long)]
    message: Option<String>,
}

impl DataArgs {
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let site = global.connect()?.site()?;
        let mut params = Params::new().path(&self.path);

        let Some(file) = &self.write else {
            return output.json(&site.data(&params)?);
        };

        let text = std::fs::read_to_string(file)?;
        let data: serde_yaml::Value =
            serde_yaml::from_str(&text).map_err(|source| CliError::Yaml {
                path: file.display().to_string(),
                source,
            })?;

        params.sha = self.sha;
        params.message = self.message;
        let commit = site.save_data(&data, &params)?;

        output.success(&format!("Saved {}", self.path));
        output.json(&commit)
    }
}
