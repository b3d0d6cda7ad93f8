//! Command to show the canonical form of a path.

use crate::error::CliError;
use crate::utils::{load_configuration, print_json, resolve_cwd, GlobalOptions, OutputFormat};
use clap::Args;
use serde_json::json;
use std::path::PathBuf;
use ward::path::{Canonicalizer, OsProbe};

/// Show the canonical path the decision engine would judge.
#[derive(Args)]
pub struct CanonicalizeCommand {
    /// Path to canonicalize
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Working directory for relative paths
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text", ignore_case = true)]
    pub format: OutputFormat,
}

impl CanonicalizeCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global, None)?;
        let probe = OsProbe::new();
        let canonicalizer = Canonicalizer::new(&probe).with_max_hops(config.max_reparse_hops());

        let cwd = canonicalizer
            .canonicalize(&resolve_cwd(self.cwd)?, None)
            .map_err(ward::Error::from)?;
        let path = canonicalizer
            .canonicalize(&self.path, Some(&cwd))
            .map_err(ward::Error::from)?;

        match self.format {
            OutputFormat::Json => print_json(&json!({
                "path": path.to_string(),
                "class": path.class().to_string(),
            }))?,
            OutputFormat::Text if global.verbose => println!("{path} ({})", path.class()),
            OutputFormat::Text => println!("{path}"),
        }
        Ok(())
    }
}
