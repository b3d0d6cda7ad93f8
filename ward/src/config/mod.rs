//! Layered configuration for ward.
//!
//! A [`Config`] is assembled from, highest priority first:
//!
//! 1. values passed to [`ConfigBuilder::with_config`]
//! 2. `WARD_*` environment variables
//! 3. a file named on the command line
//! 4. `ward.yaml` in the state directory (`~/.ward` unless overridden)
//! 5. defaults: the `workspace-write` policy and a hop limit of 32
//!
//! The merged result is validated before it is returned; a policy that
//! cannot be compiled is an error here, not a deny later.
//!
//! # Examples
//!
//! ```
//! use ward::config::{Config, ConfigBuilder, PolicySetting};
//! use ward::policy::Policy;
//!
//! let custom = Config {
//!     policy: Some(PolicySetting::Preset("read-only".to_string())),
//!     ..Default::default()
//! };
//!
//! let config = ConfigBuilder::new()
//!     .skip_files()
//!     .skip_env()
//!     .with_config(custom)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.policy().unwrap(), Policy::ReadOnly);
//! ```

pub mod builder;
pub mod environment;
pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

pub use builder::ConfigBuilder;
pub use environment::EnvironmentConfig;
pub use loader::{ConfigLoader, ConfigSource};
pub use merger::ConfigMerger;
pub use schema::{default_state_dir, Config, PolicySetting, CONFIG_FILE_NAME, STATE_DIR_NAME};
pub use validator::ConfigValidator;
