//! Finding and reading `ward.yaml` files.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::config::schema::{default_state_dir, Config, CONFIG_FILE_NAME};
use crate::error::{Error, Result};

/// One parsed configuration file.
///
/// When two files set the same field, the one with the larger
/// `precedence` wins.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Where the file was read from.
    pub path: PathBuf,
    /// Rank among the loaded files.
    pub precedence: u8,
    /// What the file contained.
    pub config: Config,
}

/// Reads configuration files from disk.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use ward::config::ConfigLoader;
///
/// let sources = ConfigLoader::load_all(Some(Path::new("/var/lib/ward")), None).unwrap();
/// for source in &sources {
///     println!("{} (precedence {})", source.path.display(), source.precedence);
/// }
/// ```
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load every configuration file that applies.
    ///
    /// 1. `ward.yaml` in the state directory, if present (precedence 1)
    /// 2. The explicitly requested file, which must exist (precedence 2)
    ///
    /// `state_dir` overrides the default `~/.ward`.
    ///
    /// # Errors
    ///
    /// Returns an error if a file exists but cannot be read or parsed, or
    /// if the explicit file is missing.
    pub fn load_all(state_dir: Option<&Path>, explicit: Option<&Path>) -> Result<Vec<ConfigSource>> {
        let mut sources = Vec::with_capacity(2);

        let state_dir = match state_dir {
            Some(dir) => dir.to_path_buf(),
            None => default_state_dir()?,
        };
        let state_config = state_dir.join(CONFIG_FILE_NAME);
        if state_config.exists() {
            sources.push(ConfigSource {
                config: Self::load_file(&state_config)?,
                path: state_config,
                precedence: 1,
            });
        }

        if let Some(path) = explicit {
            sources.push(ConfigSource {
                path: path.to_path_buf(),
                precedence: 2,
                config: Self::load_file(path)?,
            });
        }

        for source in &sources {
            debug!("loaded configuration from {}", source.path.display());
        }
        sources.sort_by_key(|source| source.precedence);
        Ok(sources)
    }

    /// Parse one YAML file. Unknown fields are rejected.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] naming the file when it cannot be read or
    /// does not deserialize.
    pub fn load_file(path: &Path) -> Result<Config> {
        let field = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|e| Error::Validation {
            field: field.clone(),
            message: format!("cannot read: {e}"),
        })?;
        serde_yaml::from_str(&text).map_err(|e| Error::Validation {
            field,
            message: format!("not a ward configuration: {e}"),
        })
    }
}
