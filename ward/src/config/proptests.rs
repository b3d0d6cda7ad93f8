//! Property-based tests for the configuration system.

use super::merger::ConfigMerger;
use super::schema::{Config, PolicySetting};
use super::validator::ConfigValidator;
use crate::path::MAX_REPARSE_HOPS;
use proptest::prelude::*;

fn preset_strategy() -> impl Strategy<Value = PolicySetting> {
    prop_oneof![
        Just(PolicySetting::Preset("read-only".into())),
        Just(PolicySetting::Preset("workspace-write".into())),
    ]
}

fn names_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("\\.[a-z]{1,8}", 0..4)
}

fn config_strategy() -> impl Strategy<Value = Config> {
    (
        prop::option::of(preset_strategy()),
        prop::option::of(1usize..=MAX_REPARSE_HOPS),
        prop::option::of(names_strategy()),
    )
        .prop_map(|(policy, max_reparse_hops, extra_protected_names)| Config {
            policy,
            max_reparse_hops,
            extra_protected_names,
            ..Default::default()
        })
}

proptest! {
    // Higher precedence values win where present
    #[test]
    fn merge_higher_precedence_wins(low in config_strategy(), high in config_strategy()) {
        let mut result = low.clone();
        ConfigMerger::merge_into(&mut result, &high);

        prop_assert_eq!(result.policy, high.policy.or(low.policy));
        prop_assert_eq!(result.max_reparse_hops, high.max_reparse_hops.or(low.max_reparse_hops));
    }

    // Protected names from both sides survive a merge
    #[test]
    fn merge_keeps_all_protected_names(low in config_strategy(), high in config_strategy()) {
        let mut result = low.clone();
        ConfigMerger::merge_into(&mut result, &high);

        let merged = result.extra_protected_names.unwrap_or_default();
        for name in low.extra_protected_names.iter().chain(high.extra_protected_names.iter()).flatten() {
            prop_assert!(merged.contains(name));
        }
    }

    // Merging a config into itself changes nothing
    #[test]
    fn merge_is_idempotent(config in config_strategy()) {
        let mut once = config.clone();
        ConfigMerger::merge_into(&mut once, &config);
        let mut twice = once.clone();
        ConfigMerger::merge_into(&mut twice, &config);
        prop_assert_eq!(once, twice);
    }

    // Generated configs are valid, and the hop limit can only be lowered
    #[test]
    fn validator_bounds_hops(config in config_strategy(), extra in 1usize..1000) {
        prop_assert!(ConfigValidator::validate(&config).is_ok());
        let loose = Config { max_reparse_hops: Some(MAX_REPARSE_HOPS + extra), ..config };
        prop_assert!(ConfigValidator::validate(&loose).is_err());
    }
}
