//! Validate command implementation.
//!
//! A file is checked in two stages: it must deserialize into a
//! [`Config`], and the result must pass [`ConfigValidator`]. Either
//! failure exits with status 1 after naming the stage on stderr.

use crate::error::CliError;
use crate::utils::GlobalOptions;
use clap::Args;
use std::path::PathBuf;
use ward::config::{ConfigLoader, ConfigValidator};
use ward::Config;

/// Check a ward configuration file without applying it.
#[derive(Args)]
pub struct ValidateCommand {
    /// Configuration file to check
    #[arg(value_name = "CONFIG_PATH")]
    pub config_path: PathBuf,
}

impl ValidateCommand {
    /// Execute the validate command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        if !self.config_path.is_file() {
            return Err(CliError::InvalidArguments(format!(
                "no such configuration file: {}",
                self.config_path.display()
            )));
        }

        let shown = self.config_path.display();
        let config: Config = ConfigLoader::load_file(&self.config_path).map_err(|e| {
            eprintln!("{shown}: cannot parse: {e}");
            CliError::SemanticFailure(format!("{shown} is not a ward configuration file"))
        })?;

        ConfigValidator::validate(&config).map_err(|e| {
            eprintln!("{shown}: invalid: {e}");
            CliError::SemanticFailure(format!("{shown} failed validation"))
        })?;

        if !global.quiet {
            println!("{shown}: ok");
        }
        Ok(())
    }
}
