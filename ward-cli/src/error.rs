//! Errors surfaced by the `ward` binary and the exit status each maps to.
//!
//! | status | meaning                                        |
//! |--------|------------------------------------------------|
//! | 0      | allowed, or the command succeeded              |
//! | 1      | denied, or a checked file was rejected         |
//! | 2      | usage error reported by clap                   |
//! | 4      | arguments clap accepted but ward cannot use    |
//! | 5      | host I/O failed                                |
//! | 6      | any other library failure                      |
//! | 7      | configuration or policy could not be loaded    |

use std::fmt;
use std::io;
use ward::{AccessDenied, Error as LibError};

/// Exit statuses.
pub mod status {
    pub const DENIED: i32 = 1;
    pub const BAD_ARGUMENTS: i32 = 4;
    pub const IO: i32 = 5;
    pub const LIBRARY: i32 = 6;
    pub const CONFIG: i32 = 7;
}

/// Failure of a `ward` command.
#[derive(Debug)]
pub enum CliError {
    /// A library call failed for a reason other than a deny.
    Library(LibError),

    /// The operation under test was refused.
    Denied(AccessDenied),

    /// Argument combination the command cannot act on.
    InvalidArguments(String),

    Io(io::Error),

    /// Configuration could not be loaded or merged.
    Config(String),

    /// The input was examined and rejected; details already went to stderr.
    SemanticFailure(String),
}

impl CliError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Denied(_) | Self::SemanticFailure(_) => status::DENIED,
            Self::InvalidArguments(_) => status::BAD_ARGUMENTS,
            Self::Io(_) => status::IO,
            Self::Config(_) => status::CONFIG,
            Self::Library(LibError::Denied(_)) => status::DENIED,
            Self::Library(
                LibError::InvalidPolicy { .. }
                | LibError::Validation { .. }
                | LibError::Configuration(_),
            ) => status::CONFIG,
            Self::Library(_) => status::LIBRARY,
        }
    }

    /// Whether `--quiet` should also silence the stderr report.
    pub fn is_denial(&self) -> bool {
        matches!(self, Self::Denied(_) | Self::Library(LibError::Denied(_)))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Library(e) => e.fmt(f),
            Self::Denied(denied) => denied.fmt(f),
            Self::InvalidArguments(msg) => write!(f, "bad arguments: {msg}"),
            Self::Io(e) => write!(f, "host filesystem: {e}"),
            Self::Config(msg) => write!(f, "cannot load configuration: {msg}"),
            Self::SemanticFailure(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Library(e) => Some(e),
            Self::Denied(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::InvalidArguments(_) | Self::Config(_) | Self::SemanticFailure(_) => None,
        }
    }
}

impl From<LibError> for CliError {
    fn from(e: LibError) -> Self {
        if let LibError::Denied(denied) = e {
            Self::Denied(denied)
        } else {
            Self::Library(e)
        }
    }
}

impl From<AccessDenied> for CliError {
    fn from(e: AccessDenied) -> Self {
        Self::Denied(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
