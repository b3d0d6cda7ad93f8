//! Layered configuration assembly.

use std::env;
use std::path::{Path, PathBuf};

use crate::config::environment::{EnvironmentConfig, STATE_DIR_VAR};
use crate::config::loader::ConfigLoader;
use crate::config::merger::ConfigMerger;
use crate::config::schema::Config;
use crate::config::validator::ConfigValidator;
use crate::error::Result;

/// Builds a [`Config`] from files, environment and programmatic values.
///
/// # Examples
///
/// ```
/// use ward::config::{Config, ConfigBuilder};
///
/// let config = ConfigBuilder::new()
///     .skip_files()
///     .skip_env()
///     .with_config(Config { max_reparse_hops: Some(8), ..Default::default() })
///     .build()
///     .unwrap();
/// assert_eq!(config.max_reparse_hops(), 8);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    state_dir: Option<PathBuf>,
    config_file: Option<PathBuf>,
    overrides: Option<Config>,
    skip_files: bool,
    skip_env: bool,
}

impl ConfigBuilder {
    /// A builder that loads files and environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `dir` as the state directory, both for finding `ward.yaml` and
    /// as the protected state directory.
    #[must_use]
    pub fn with_state_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.state_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Load this file on top of the state directory's `ward.yaml`.
    #[must_use]
    pub fn with_config_file(mut self, path: impl AsRef<Path>) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Apply programmatic values with the highest precedence.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.overrides = Some(config);
        self
    }

    /// Do not read configuration files.
    #[must_use]
    pub fn skip_files(mut self) -> Self {
        self.skip_files = true;
        self
    }

    /// Do not read `WARD_*` environment variables.
    #[must_use]
    pub fn skip_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Merge all sources and validate the result.
    ///
    /// Precedence, highest first: programmatic values, the explicit state
    /// directory, environment, the explicit file, the state directory's
    /// `ward.yaml`, defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be loaded, an environment value is
    /// invalid, or the merged configuration fails validation.
    pub fn build(self) -> Result<Config> {
        let mut config = Config::default();

        if !self.skip_files {
            let state_dir = self.state_dir.clone().or_else(|| {
                if self.skip_env {
                    None
                } else {
                    env::var_os(STATE_DIR_VAR).map(PathBuf::from)
                }
            });
            let sources = ConfigLoader::load_all(state_dir.as_deref(), self.config_file.as_deref())?;
            config = ConfigMerger::merge(sources);
        }

        if !self.skip_env {
            EnvironmentConfig::apply_overrides(&mut config)?;
        }

        if let Some(dir) = self.state_dir {
            config.state_dir = Some(dir);
        }

        if let Some(ref overrides) = self.overrides {
            ConfigMerger::merge_into(&mut config, overrides);
        }

        ConfigValidator::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{PolicySetting, CONFIG_FILE_NAME};
    use crate::policy::Policy;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_only() {
        let config = ConfigBuilder::new().skip_files().skip_env().build().unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_state_dir_file_is_loaded() {
        let state = TempDir::new().unwrap();
        fs::write(state.path().join(CONFIG_FILE_NAME), "policy: read-only\n").unwrap();

        let config = ConfigBuilder::new()
            .skip_env()
            .with_state_dir(state.path())
            .build()
            .unwrap();
        assert_eq!(config.policy().unwrap(), Policy::ReadOnly);
        assert_eq!(config.state_dir.as_deref(), Some(state.path()));
    }

    #[test]
    fn test_explicit_file_overrides_state_file() {
        let state = TempDir::new().unwrap();
        fs::write(state.path().join(CONFIG_FILE_NAME), "policy: read-only\nmax_reparse_hops: 8\n").unwrap();
        let explicit = state.path().join("explicit.yaml");
        fs::write(&explicit, "policy: workspace-write\n").unwrap();

        let config = ConfigBuilder::new()
            .skip_env()
            .with_state_dir(state.path())
            .with_config_file(&explicit)
            .build()
            .unwrap();
        assert_eq!(config.policy, Some(PolicySetting::Preset("workspace-write".into())));
        assert_eq!(config.max_reparse_hops, Some(8));
    }

    #[test]
    fn test_programmatic_wins() {
        let state = TempDir::new().unwrap();
        fs::write(state.path().join(CONFIG_FILE_NAME), "max_reparse_hops: 8\n").unwrap();

        let config = ConfigBuilder::new()
            .skip_env()
            .with_state_dir(state.path())
            .with_config(Config {
                max_reparse_hops: Some(2),
                ..Default::default()
            })
            .build()
            .unwrap();
        assert_eq!(config.max_reparse_hops, Some(2));
    }

    #[test]
    fn test_invalid_merged_config_is_rejected() {
        let result = ConfigBuilder::new()
            .skip_files()
            .skip_env()
            .with_config(Config {
                max_reparse_hops: Some(0),
                ..Default::default()
            })
            .build();
        assert!(result.is_err());
    }
}
