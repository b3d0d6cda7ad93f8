//! One module per `ward` subcommand.

pub mod canonicalize;
pub mod check;
pub mod completions;
pub mod roots;
pub mod show_config;
pub mod validate;

pub use canonicalize::CanonicalizeCommand;
pub use check::CheckCommand;
pub use completions::CompletionsCommand;
pub use roots::RootsCommand;
pub use show_config::ShowConfigCommand;
pub use validate::ValidateCommand;
