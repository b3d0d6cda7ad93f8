//! Roots command implementation.
//!
//! Shows the writable and read-only roots a policy resolves to for a
//! working directory, after variable expansion and canonicalization.
//! Roots that could not be resolved are dropped and do not appear.

use crate::error::CliError;
use crate::utils::{load_configuration, open_sandbox, print_json, resolve_cwd, GlobalOptions, OutputFormat};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use ward::path::OsProbe;

/// List the roots a policy resolves to.
#[derive(Args)]
pub struct RootsCommand {
    /// Policy preset name or JSON policy document
    #[arg(long, value_name = "POLICY")]
    pub policy: Option<String>,

    /// Working directory to resolve against
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text", ignore_case = true)]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct RootEntry {
    path: String,
    mode: String,
    source: String,
}

#[derive(Serialize)]
struct RootsReport {
    policy: String,
    cwd: String,
    implicit_cwd: bool,
    roots: Vec<RootEntry>,
}

impl RootsCommand {
    /// Execute the roots command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global, self.policy.as_deref())?;
        let cwd = resolve_cwd(self.cwd)?;
        let probe = OsProbe::new();
        let sandbox = open_sandbox(&config, &cwd, &probe)?;
        let roots = sandbox.roots();

        let report = RootsReport {
            policy: sandbox.policy().mode().to_string(),
            cwd: roots.cwd().to_string(),
            implicit_cwd: roots.implicit_cwd(),
            roots: roots
                .roots()
                .iter()
                .map(|root| RootEntry {
                    path: root.path().to_string(),
                    mode: root.mode().to_string(),
                    source: root.source().to_string(),
                })
                .collect(),
        };

        match self.format {
            OutputFormat::Json => print_json(&report)?,
            OutputFormat::Text => {
                if report.roots.is_empty() && !global.quiet {
                    eprintln!("No writable roots under policy {}", report.policy);
                }
                for root in &report.roots {
                    println!("{}\t{}\t{}", root.mode, root.source, root.path);
                }
            }
        }
        Ok(())
    }
}
