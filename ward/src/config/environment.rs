//! Environment variable handling for configuration overrides.
//!
//! `WARD_*` variables override configuration file values.

use std::env;
use std::path::PathBuf;

use crate::config::schema::{Config, PolicySetting};
use crate::error::{Error, Result};
use crate::policy::PolicyDocument;

/// Policy preset name or JSON document.
pub const POLICY_VAR: &str = "WARD_POLICY";
/// State directory.
pub const STATE_DIR_VAR: &str = "WARD_STATE_DIR";
/// Reparse hop limit.
pub const MAX_REPARSE_HOPS_VAR: &str = "WARD_MAX_REPARSE_HOPS";
/// Comma-separated extra protected names.
pub const PROTECTED_NAMES_VAR: &str = "WARD_PROTECTED_NAMES";

/// Handles environment variable overrides for configuration.
///
/// # Examples
///
/// ```no_run
/// use ward::config::{Config, EnvironmentConfig};
///
/// let mut config = Config::default();
/// EnvironmentConfig::apply_overrides(&mut config).unwrap();
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Apply environment variable overrides to config.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable holds an invalid value (a malformed
    /// JSON policy or a non-numeric hop limit).
    pub fn apply_overrides(config: &mut Config) -> Result<()> {
        if let Ok(policy) = env::var(POLICY_VAR) {
            config.policy = Some(Self::parse_policy(&policy)?);
        }

        if let Some(dir) = env::var_os(STATE_DIR_VAR) {
            config.state_dir = Some(PathBuf::from(dir));
        }

        if let Ok(hops) = env::var(MAX_REPARSE_HOPS_VAR) {
            config.max_reparse_hops =
                Some(hops.trim().parse().map_err(|_| Error::Validation {
                    field: MAX_REPARSE_HOPS_VAR.into(),
                    message: "Must be a positive integer".into(),
                })?);
        }

        if let Ok(names) = env::var(PROTECTED_NAMES_VAR) {
            let names = Self::parse_list(&names);
            match &mut config.extra_protected_names {
                Some(existing) => existing.extend(names),
                None => config.extra_protected_names = Some(names),
            }
        }

        Ok(())
    }

    /// A JSON object is an inline document; anything else a preset name.
    fn parse_policy(value: &str) -> Result<PolicySetting> {
        let trimmed = value.trim();
        if !trimmed.starts_with('{') {
            return Ok(PolicySetting::Preset(trimmed.to_string()));
        }
        let document: PolicyDocument =
            serde_json::from_str(trimmed).map_err(|e| Error::Validation {
                field: POLICY_VAR.into(),
                message: format!("Invalid policy document: {e}"),
            })?;
        Ok(PolicySetting::Document(document))
    }

    fn parse_list(s: &str) -> Vec<String> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(ToString::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear() {
        for var in [POLICY_VAR, STATE_DIR_VAR, MAX_REPARSE_HOPS_VAR, PROTECTED_NAMES_VAR] {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_parse_policy_preset() {
        assert_eq!(
            EnvironmentConfig::parse_policy(" read-only ").unwrap(),
            PolicySetting::Preset("read-only".into())
        );
    }

    #[test]
    fn test_parse_policy_document() {
        let setting =
            EnvironmentConfig::parse_policy(r#"{"mode":"workspace-write","workspace_roots":["a"]}"#)
                .unwrap();
        let PolicySetting::Document(document) = setting else {
            panic!("expected a document");
        };
        assert_eq!(document.workspace_roots, vec!["a".to_string()]);
    }

    #[test]
    fn test_parse_policy_invalid_document() {
        assert!(EnvironmentConfig::parse_policy(r#"{"mode":"#).is_err());
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(
            EnvironmentConfig::parse_list(" .hg, ,.svn "),
            vec![".hg".to_string(), ".svn".to_string()]
        );
        assert!(EnvironmentConfig::parse_list("").is_empty());
    }

    #[test]
    #[serial]
    fn test_apply_overrides() {
        clear();
        env::set_var(POLICY_VAR, "read-only");
        env::set_var(STATE_DIR_VAR, "/var/ward");
        env::set_var(MAX_REPARSE_HOPS_VAR, "8");
        env::set_var(PROTECTED_NAMES_VAR, ".svn");

        let mut config = Config {
            extra_protected_names: Some(vec![".hg".into()]),
            ..Default::default()
        };
        let result = EnvironmentConfig::apply_overrides(&mut config);
        clear();
        result.unwrap();

        assert_eq!(config.policy, Some(PolicySetting::Preset("read-only".into())));
        assert_eq!(config.state_dir, Some(PathBuf::from("/var/ward")));
        assert_eq!(config.max_reparse_hops, Some(8));
        assert_eq!(
            config.extra_protected_names,
            Some(vec![".hg".to_string(), ".svn".to_string()])
        );
    }

    #[test]
    #[serial]
    fn test_invalid_hop_limit() {
        clear();
        env::set_var(MAX_REPARSE_HOPS_VAR, "many");
        let result = EnvironmentConfig::apply_overrides(&mut Config::default());
        clear();
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[test]
    #[serial]
    fn test_no_variables_leaves_config_alone() {
        clear();
        let mut config = Config::default();
        EnvironmentConfig::apply_overrides(&mut config).unwrap();
        assert_eq!(config, Config::default());
    }
}
