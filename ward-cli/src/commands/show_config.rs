//! Command to show the merged configuration.

use crate::error::CliError;
use crate::utils::{load_configuration, GlobalOptions};
use clap::Args;

/// Show the configuration after files, environment and options are merged.
#[derive(Args)]
pub struct ShowConfigCommand {}

impl ShowConfigCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let mut config = load_configuration(global, None)?;
        if config.state_dir.is_none() {
            config.state_dir = Some(config.state_dir()?);
        }

        let yaml = serde_yaml::to_string(&config).map_err(|e| CliError::Config(e.to_string()))?;
        print!("{yaml}");
        Ok(())
    }
}
