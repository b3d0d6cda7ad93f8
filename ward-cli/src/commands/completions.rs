//! Shell completion scripts.

use crate::cli::Cli;
use crate::error::CliError;
use crate::utils::GlobalOptions;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::io;

/// Print a completion script for a shell.
#[derive(Args)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsCommand {
    pub fn execute(&self, global: &GlobalOptions) -> Result<(), CliError> {
        if !global.quiet {
            let hint = match self.shell {
                Shell::Bash => Some("eval \"$(ward completions bash)\""),
                Shell::Zsh => Some("ward completions zsh > \"${fpath[1]}/_ward\""),
                Shell::Fish => Some("ward completions fish | source"),
                Shell::PowerShell => Some("ward completions powershell | Out-String | Invoke-Expression"),
                _ => None,
            };
            if let Some(hint) = hint {
                eprintln!("# enable with: {hint}");
            }
        }

        let mut cmd = Cli::command();
        generate(self.shell, &mut cmd, "ward", &mut io::stdout());
        Ok(())
    }
}
