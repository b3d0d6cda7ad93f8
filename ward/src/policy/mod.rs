//! Sandbox policies.
//!
//! A [`Policy`] is the compiled form of whatever the caller supplied: one of
//! the presets (`read-only`, `workspace-write`) or a JSON
//! [`PolicyDocument`]. Both go through one compilation step, so the decision
//! engine only ever sees the tagged variant.
//!
//! # Examples
//!
//! ```
//! use ward::policy::Policy;
//!
//! assert_eq!(Policy::parse("read-only").unwrap(), Policy::ReadOnly);
//!
//! let policy = Policy::parse(r#"{"mode":"workspace-write","workspace_roots":["C:\\ws"]}"#).unwrap();
//! assert!(policy.allows_writes());
//!
//! assert!(Policy::parse("danger-full-access").is_err());
//! ```

pub mod document;

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

pub use document::PolicyDocument;

/// Preset name of the read-only policy.
pub const READ_ONLY: &str = "read-only";
/// Preset name of the workspace-write policy.
pub const WORKSPACE_WRITE: &str = "workspace-write";
/// Preset name of the unconfined mode, which is always rejected.
pub const DANGER_FULL_ACCESS: &str = "danger-full-access";

/// Settings of a workspace-write policy.
///
/// Root entries are kept as written; they are resolved into a
/// [`RootSet`](crate::roots::RootSet) against a working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceWritePolicy {
    /// Writable root entries.
    pub writable_roots: Vec<String>,
    /// Read-only carve-outs.
    pub read_only_roots: Vec<String>,
    /// Whether `TEMP`/`TMP` become writable roots.
    pub include_temp: bool,
    /// Whether the working directory is an implicit writable root.
    pub implicit_cwd: bool,
    /// Whether the launch layer should permit network access.
    pub network_access: bool,
}

impl Default for WorkspaceWritePolicy {
    fn default() -> Self {
        Self {
            writable_roots: Vec::new(),
            read_only_roots: Vec::new(),
            include_temp: true,
            implicit_cwd: true,
            network_access: false,
        }
    }
}

/// A compiled sandbox policy. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Policy {
    /// No writes anywhere.
    ReadOnly,
    /// Writes inside the resolved roots only.
    WorkspaceWrite(WorkspaceWritePolicy),
    /// A document named a mode this engine does not know; every write is
    /// denied.
    FailClosed {
        /// The unrecognized mode.
        mode: String,
    },
}

impl Policy {
    /// The workspace-write preset: the working directory plus `TEMP`.
    #[must_use]
    pub fn workspace_write() -> Self {
        Self::WorkspaceWrite(WorkspaceWritePolicy::default())
    }

    /// Parse a preset name or a JSON policy document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPolicy`] for `danger-full-access` and for text
    /// that is neither a preset nor a valid document.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim() {
            READ_ONLY => Ok(Self::ReadOnly),
            WORKSPACE_WRITE => Ok(Self::workspace_write()),
            DANGER_FULL_ACCESS => Err(Error::InvalidPolicy {
                reason: "danger-full-access is not supported for sandboxing".to_string(),
            }),
            other => {
                let document: PolicyDocument =
                    serde_json::from_str(other).map_err(|e| Error::InvalidPolicy {
                        reason: format!("not a preset or a valid policy document: {e}"),
                    })?;
                document.compile()
            }
        }
    }

    /// The mode name.
    #[must_use]
    pub fn mode(&self) -> &str {
        match self {
            Self::ReadOnly => READ_ONLY,
            Self::WorkspaceWrite(_) => WORKSPACE_WRITE,
            Self::FailClosed { mode } => mode,
        }
    }

    /// Whether any write can ever be allowed under this policy.
    #[must_use]
    pub fn allows_writes(&self) -> bool {
        matches!(self, Self::WorkspaceWrite(_))
    }

    /// The workspace-write settings, if this is a workspace-write policy.
    #[must_use]
    pub fn workspace(&self) -> Option<&WorkspaceWritePolicy> {
        match self {
            Self::WorkspaceWrite(ws) => Some(ws),
            _ => None,
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mode())
    }
}

impl FromStr for Policy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
