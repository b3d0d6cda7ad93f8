//! Configuration schema definitions.
//!
//! A configuration selects the policy, the protected state directory and
//! the engine's limits. Every field is optional so that files, environment
//! and programmatic values can be layered.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::engine::DecisionEngine;
use crate::error::{Error, Result};
use crate::path::MAX_REPARSE_HOPS;
use crate::policy::{Policy, PolicyDocument};

/// Name of the configuration file looked up in the state directory.
pub const CONFIG_FILE_NAME: &str = "ward.yaml";

/// Name of the default state directory under the home directory.
pub const STATE_DIR_NAME: &str = ".ward";

/// Complete configuration structure.
///
/// # Examples
///
/// ```
/// use ward::config::{Config, PolicySetting};
///
/// let config: Config = serde_yaml::from_str(
///     "policy:\n  mode: workspace-write\n  workspace_roots: ['C:\\ws']\nmax_reparse_hops: 8\n",
/// )
/// .unwrap();
/// assert!(matches!(config.policy, Some(PolicySetting::Document(_))));
/// assert_eq!(config.max_reparse_hops(), 8);
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// The sandbox policy, as a preset name or a document.
    pub policy: Option<PolicySetting>,

    /// The sandbox's own state directory; always protected.
    pub state_dir: Option<PathBuf>,

    /// Component names protected in addition to the built-in ones.
    pub extra_protected_names: Option<Vec<String>>,

    /// Bound on reparse points followed per path.
    pub max_reparse_hops: Option<usize>,
}

/// A policy given either by preset name or as a full document.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PolicySetting {
    /// `read-only`, `workspace-write`, or a JSON document as text.
    Preset(String),
    /// An inline policy document.
    Document(PolicyDocument),
}

impl PolicySetting {
    /// Compile into a [`Policy`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPolicy`] if the setting cannot be compiled.
    pub fn compile(&self) -> Result<Policy> {
        match self {
            Self::Preset(value) => Policy::parse(value),
            Self::Document(document) => document.compile(),
        }
    }
}

impl Config {
    /// The configured policy, defaulting to workspace-write.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured policy cannot be compiled.
    pub fn policy(&self) -> Result<Policy> {
        self.policy
            .as_ref()
            .map_or_else(|| Ok(Policy::workspace_write()), PolicySetting::compile)
    }

    /// The state directory, defaulting to `~/.ward`.
    ///
    /// # Errors
    ///
    /// Returns an error if no state directory is configured and the home
    /// directory cannot be determined.
    pub fn state_dir(&self) -> Result<PathBuf> {
        match &self.state_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_state_dir(),
        }
    }

    /// The reparse hop limit in effect.
    #[must_use]
    pub fn max_reparse_hops(&self) -> usize {
        self.max_reparse_hops.unwrap_or(MAX_REPARSE_HOPS)
    }

    /// Build the decision engine this configuration describes.
    ///
    /// # Errors
    ///
    /// Returns an error if the state directory cannot be determined.
    pub fn engine(&self) -> Result<DecisionEngine> {
        let state_dir = self.state_dir()?;
        let extra = self.extra_protected_names.iter().flatten().map(String::as_str);
        Ok(DecisionEngine::new()
            .with_protected_names(extra)
            .with_state_dir(state_dir.to_string_lossy().into_owned())
            .with_max_hops(self.max_reparse_hops()))
    }
}

/// The default state directory, `~/.ward`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_state_dir() -> Result<PathBuf> {
    let home = home::home_dir().ok_or_else(|| Error::Validation {
        field: "home_directory".into(),
        message: "Cannot determine home directory".into(),
    })?;
    Ok(home.join(STATE_DIR_NAME))
}
