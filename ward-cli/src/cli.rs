//! Argument grammar for `ward`.

use crate::commands::{
    CanonicalizeCommand, CheckCommand, CompletionsCommand, RootsCommand, ShowConfigCommand,
    ValidateCommand,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level arguments.
#[derive(Parser)]
#[command(name = "ward")]
#[command(version, about = "Inspect sandbox filesystem decisions", long_about = None)]
pub struct Cli {
    /// Log why operations are denied
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Print nothing but requested output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Sandbox state directory, always protected
    #[arg(long, value_name = "PATH", global = true, env = "WARD_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Extra configuration file, merged over the defaults
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Decide whether a filesystem operation would be allowed
    Check(CheckCommand),

    /// Show the canonical form of a path
    Canonicalize(CanonicalizeCommand),

    /// List the roots a policy resolves to
    Roots(RootsCommand),

    /// Check a configuration file
    Validate(ValidateCommand),

    /// Print the merged configuration
    ShowConfig(ShowConfigCommand),

    /// Print a shell completion script
    Completions(CompletionsCommand),
}
