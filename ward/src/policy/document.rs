//! The JSON policy document.
//!
//! A document is the generalized form of a policy: a mode plus root lists.
//! [`PolicyDocument::compile`] turns it into the same [`Policy`] value the
//! presets produce.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::policy::{Policy, WorkspaceWritePolicy, DANGER_FULL_ACCESS, READ_ONLY, WORKSPACE_WRITE};

fn default_true() -> bool {
    true
}

/// A policy document as written by a policy author.
///
/// # Examples
///
/// ```
/// use ward::policy::{Policy, PolicyDocument};
///
/// let doc: PolicyDocument =
///     serde_json::from_str(r#"{"mode":"workspace-write","workspace_roots":[".\\allowed"]}"#).unwrap();
/// assert!(doc.implicit_cwd);
///
/// let policy = doc.compile().unwrap();
/// assert_eq!(policy.mode(), "workspace-write");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PolicyDocument {
    /// `read-only`, `workspace-write`, or anything else (fails closed).
    #[serde(alias = "type")]
    pub mode: String,

    /// Writable roots; relative entries resolve against the working
    /// directory.
    #[serde(default, alias = "writable_roots")]
    pub workspace_roots: Vec<String>,

    /// Read-only carve-outs inside writable roots.
    #[serde(default)]
    pub read_only_roots: Vec<String>,

    /// Add `TEMP`/`TMP` as roots under workspace-write.
    #[serde(default = "default_true")]
    pub include_temp: bool,

    /// Keep the working directory writable even when roots are listed.
    #[serde(default = "default_true")]
    pub implicit_cwd: bool,

    /// Carried for the launch layer; not enforced by the engine.
    #[serde(default)]
    pub network_access: bool,
}

impl PolicyDocument {
    /// A document with the given mode and defaults for everything else.
    #[must_use]
    pub fn new(mode: impl Into<String>) -> Self {
        Self {
            mode: mode.into(),
            workspace_roots: Vec::new(),
            read_only_roots: Vec::new(),
            include_temp: true,
            implicit_cwd: true,
            network_access: false,
        }
    }

    /// Compile into a [`Policy`].
    ///
    /// Unknown modes compile to [`Policy::FailClosed`] rather than failing,
    /// so a typo in a mode can never widen access.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPolicy`] for `danger-full-access`.
    pub fn compile(&self) -> Result<Policy> {
        match self.mode.as_str() {
            READ_ONLY => {
                if !self.workspace_roots.is_empty() {
                    log::warn!(
                        "read-only policy ignores {} workspace root(s)",
                        self.workspace_roots.len()
                    );
                }
                Ok(Policy::ReadOnly)
            }
            WORKSPACE_WRITE => Ok(Policy::WorkspaceWrite(WorkspaceWritePolicy {
                writable_roots: self.workspace_roots.clone(),
                read_only_roots: self.read_only_roots.clone(),
                include_temp: self.include_temp,
                implicit_cwd: self.implicit_cwd,
                network_access: self.network_access,
            })),
            DANGER_FULL_ACCESS => Err(Error::InvalidPolicy {
                reason: "danger-full-access is not supported for sandboxing".to_string(),
            }),
            other => {
                log::warn!("unrecognized policy mode {other:?}; denying all writes");
                Ok(Policy::FailClosed {
                    mode: other.to_string(),
                })
            }
        }
    }
}

impl From<&Policy> for PolicyDocument {
    fn from(policy: &Policy) -> Self {
        match policy {
            Policy::ReadOnly => Self::new(READ_ONLY),
            Policy::WorkspaceWrite(ws) => Self {
                mode: WORKSPACE_WRITE.to_string(),
                workspace_roots: ws.writable_roots.clone(),
                read_only_roots: ws.read_only_roots.clone(),
                include_temp: ws.include_temp,
                implicit_cwd: ws.implicit_cwd,
                network_access: ws.network_access,
            },
            Policy::FailClosed { mode } => Self::new(mode.clone()),
        }
    }
}
