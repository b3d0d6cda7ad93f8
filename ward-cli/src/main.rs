//! `ward`: ask the sandbox decision engine about the host filesystem.

mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;
use utils::GlobalOptions;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = ward::init_logger(cli.verbose, cli.quiet).install() {
        eprintln!("ward: warning: {e}");
    }

    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        state_dir: cli.state_dir,
        config: cli.config,
    };

    let result = match cli.command {
        cli::Command::Check(cmd) => cmd.execute(&global),
        cli::Command::Canonicalize(cmd) => cmd.execute(&global),
        cli::Command::Roots(cmd) => cmd.execute(&global),
        cli::Command::Validate(cmd) => cmd.execute(&global),
        cli::Command::ShowConfig(cmd) => cmd.execute(&global),
        cli::Command::Completions(cmd) => cmd.execute(&global),
    };

    if let Err(e) = result {
        if !(global.quiet && e.is_denial()) {
            eprintln!("ward: {e}");
        }
        std::process::exit(e.exit_code());
    }
}
