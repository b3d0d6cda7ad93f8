//! Folding configuration layers together.

use crate::config::loader::ConfigSource;
use crate::config::schema::Config;

/// Applies higher-priority layers over lower ones.
///
/// # Examples
///
/// ```
/// use ward::config::{Config, ConfigMerger};
///
/// let low = Config { max_reparse_hops: Some(16), ..Default::default() };
/// let high = Config { max_reparse_hops: Some(8), ..Default::default() };
///
/// let mut result = low;
/// ConfigMerger::merge_into(&mut result, &high);
/// assert_eq!(result.max_reparse_hops, Some(8));
/// ```
pub struct ConfigMerger;

impl ConfigMerger {
    /// Merge sources given from lowest to highest precedence.
    #[must_use]
    pub fn merge(sources: Vec<ConfigSource>) -> Config {
        let mut result = Config::default();
        for source in sources {
            Self::merge_into(&mut result, &source.config);
        }
        result
    }

    /// Overlay `source` on `target`.
    ///
    /// Fields set in `source` replace those in `target`; a policy is never
    /// merged field by field. `extra_protected_names` is the exception: the
    /// lists are unioned, since a lower layer's protected name must stay
    /// protected.
    pub fn merge_into(target: &mut Config, source: &Config) {
        if source.policy.is_some() {
            target.policy.clone_from(&source.policy);
        }

        if source.state_dir.is_some() {
            target.state_dir.clone_from(&source.state_dir);
        }

        if source.max_reparse_hops.is_some() {
            target.max_reparse_hops = source.max_reparse_hops;
        }

        if let Some(ref names) = source.extra_protected_names {
            let merged = target.extra_protected_names.get_or_insert_with(Vec::new);
            for name in names {
                if !merged.contains(name) {
                    merged.push(name.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::PolicySetting;
    use std::path::PathBuf;

    #[test]
    fn test_merge_simple_fields() {
        let mut target = Config {
            policy: Some(PolicySetting::Preset("workspace-write".into())),
            state_dir: Some(PathBuf::from("/low")),
            ..Default::default()
        };
        let source = Config {
            policy: Some(PolicySetting::Preset("read-only".into())),
            ..Default::default()
        };
        ConfigMerger::merge_into(&mut target, &source);
        assert_eq!(target.policy, Some(PolicySetting::Preset("read-only".into())));
        assert_eq!(target.state_dir, Some(PathBuf::from("/low")));
    }

    #[test]
    fn test_protected_names_accumulate() {
        let mut target = Config {
            extra_protected_names: Some(vec![".hg".into()]),
            ..Default::default()
        };
        let source = Config {
            extra_protected_names: Some(vec![".svn".into(), ".hg".into()]),
            ..Default::default()
        };
        ConfigMerger::merge_into(&mut target, &source);
        assert_eq!(
            target.extra_protected_names,
            Some(vec![".hg".to_string(), ".svn".to_string()])
        );
    }

    #[test]
    fn test_merge_sources_in_order() {
        let sources = vec![
            ConfigSource {
                path: PathBuf::from("a.yaml"),
                precedence: 1,
                config: Config {
                    max_reparse_hops: Some(16),
                    ..Default::default()
                },
            },
            ConfigSource {
                path: PathBuf::from("b.yaml"),
                precedence: 2,
                config: Config {
                    max_reparse_hops: Some(4),
                    ..Default::default()
                },
            },
        ];
        assert_eq!(ConfigMerger::merge(sources).max_reparse_hops, Some(4));
    }
}
