//! Configuration validation.

use crate::config::schema::{Config, PolicySetting};
use crate::error::{Error, Result};
use crate::path::normalize::strip_trailing_dots_and_spaces;
use crate::path::MAX_REPARSE_HOPS;

/// Validates configuration values.
///
/// # Examples
///
/// ```
/// use ward::config::{Config, ConfigValidator};
///
/// ConfigValidator::validate(&Config::default()).unwrap();
///
/// let loose = Config { max_reparse_hops: Some(1000), ..Default::default() };
/// assert!(ConfigValidator::validate(&loose).is_err());
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first offending field.
    pub fn validate(config: &Config) -> Result<()> {
        if let Some(ref policy) = config.policy {
            Self::validate_policy(policy)?;
        }

        if let Some(ref dir) = config.state_dir {
            Self::validate_path_text("state_dir", &dir.to_string_lossy())?;
        }

        if let Some(hops) = config.max_reparse_hops {
            if hops == 0 || hops > MAX_REPARSE_HOPS {
                return Err(Error::Validation {
                    field: "max_reparse_hops".into(),
                    message: format!("Must be between 1 and {MAX_REPARSE_HOPS}"),
                });
            }
        }

        if let Some(ref names) = config.extra_protected_names {
            for name in names {
                Self::validate_protected_name(name)?;
            }
        }

        Ok(())
    }

    fn validate_policy(policy: &PolicySetting) -> Result<()> {
        if let PolicySetting::Document(document) = policy {
            for root in &document.workspace_roots {
                Self::validate_path_text("policy.workspace_roots", root)?;
            }
            for root in &document.read_only_roots {
                Self::validate_path_text("policy.read_only_roots", root)?;
            }
        }
        policy.compile().map(|_| ()).map_err(|e| Error::Validation {
            field: "policy".into(),
            message: e.to_string(),
        })
    }

    /// Checks that a path entry is non-empty and has no NUL bytes.
    fn validate_path_text(field: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(Error::Validation {
                field: field.into(),
                message: "Cannot be empty".into(),
            });
        }
        if value.contains('\0') {
            return Err(Error::Validation {
                field: field.into(),
                message: "Cannot contain null bytes".into(),
            });
        }
        Ok(())
    }

    /// A protected name is a single component.
    fn validate_protected_name(name: &str) -> Result<()> {
        Self::validate_path_text("extra_protected_names", name)?;
        if strip_trailing_dots_and_spaces(name).is_empty() || name.contains(['\\', '/', ':']) {
            return Err(Error::Validation {
                field: "extra_protected_names".into(),
                message: format!("'{name}' is not a single path component"),
            });
        }
        Ok(())
    }
}
