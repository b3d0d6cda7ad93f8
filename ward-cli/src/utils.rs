//! Plumbing shared by the subcommands.

use crate::error::CliError;
use clap::ValueEnum;
use serde::Serialize;
use std::env;
use std::path::PathBuf;
use ward::config::PolicySetting;
use ward::path::OsProbe;
use ward::{Config, ConfigBuilder, Sandbox};

/// Options every subcommand sees.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub verbose: bool,
    pub quiet: bool,
    pub state_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Output format shared by the inspection commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON, one document per invocation
    Json,
}

/// The working directory decisions are made against, as text.
///
/// Uses the process working directory when none is given.
pub fn resolve_cwd(cwd: Option<PathBuf>) -> Result<String, CliError> {
    let cwd = match cwd {
        Some(dir) => dir,
        None => env::current_dir()?,
    };
    cwd.to_str().map(str::to_owned).ok_or_else(|| {
        CliError::InvalidArguments(format!(
            "working directory is not valid UTF-8: {}",
            cwd.display()
        ))
    })
}

/// Merge configuration for one invocation.
///
/// A `--policy` argument is layered over everything else, including
/// `WARD_POLICY`.
pub fn load_configuration(
    global: &GlobalOptions,
    policy: Option<&str>,
) -> Result<Config, CliError> {
    let mut builder = ConfigBuilder::new();
    if let Some(ref dir) = global.state_dir {
        builder = builder.with_state_dir(dir);
    }
    if let Some(ref file) = global.config {
        builder = builder.with_config_file(file);
    }
    if let Some(policy) = policy {
        builder = builder.with_config(Config {
            policy: Some(PolicySetting::Preset(policy.to_string())),
            ..Config::default()
        });
    }

    builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))
}

/// Build a sandbox over the host filesystem.
pub fn open_sandbox<'p>(
    config: &Config,
    cwd: &str,
    probe: &'p OsProbe,
) -> Result<Sandbox<'p, OsProbe>, CliError> {
    Sandbox::from_config(config, cwd, probe).map_err(CliError::from)
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    println!("{text}");
    Ok(())
}
