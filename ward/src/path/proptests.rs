//! Property-based tests for path handling.
//!
//! These exercise the lexical normalizer and the canonicalizer with
//! generated spellings of the same location.

use super::canonicalize::canonicalize;
use super::memory::MemoryProbe;
use super::normalize::{fold_key, is_reserved_device_name, LexicalPath};
use super::types::{CanonicalPath, PathClass, PathPrefix};
use proptest::prelude::*;

fn component_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9_-]{1,12}"
}

fn components_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(component_strategy(), 1..6)
}

/// Re-spell a component with random case.
fn respell(name: &str, mask: u64) -> String {
    name.chars()
        .enumerate()
        .map(|(i, c)| {
            if mask & (1 << (i % 64)) == 0 {
                c.to_ascii_lowercase()
            } else {
                c.to_ascii_uppercase()
            }
        })
        .collect()
}

fn base() -> CanonicalPath {
    CanonicalPath::from_names(PathPrefix::disk('C'), ["ws"], PathClass::Regular)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // Normalization is idempotent: parsing the display form yields the same path
    #[test]
    fn lexical_normalization_idempotent(parts in components_strategy()) {
        let raw = format!(r"C:\{}", parts.join(r"\"));
        let once = LexicalPath::parse(&raw, None).unwrap().into_unresolved();
        let twice = LexicalPath::parse(&once.to_string(), None).unwrap().into_unresolved();
        prop_assert_eq!(once, twice);
    }

    // Normalized paths never contain "." or ".." components
    #[test]
    fn normalized_paths_no_dot_components(
        parts in prop::collection::vec(prop_oneof![
            component_strategy(),
            Just(".".to_string()),
            Just("..".to_string()),
        ], 0..10)
    ) {
        let raw = format!(r"C:\ws\{}", parts.join(r"\"));
        let path = LexicalPath::parse(&raw, None).unwrap();
        prop_assert!(path.names().iter().all(|n| n != "." && n != ".."));
    }

    // Parent references never escape the drive
    #[test]
    fn parent_references_stay_on_prefix(ups in 0usize..10, tail in component_strategy()) {
        let raw = format!(r"{}{}", r"..\".repeat(ups), tail);
        let path = LexicalPath::parse(&raw, Some(&base())).unwrap();
        prop_assert_eq!(path.prefix(), &PathPrefix::Disk('C'));
        prop_assert_eq!(path.names().last(), Some(&tail));
    }

    // Case and separator spelling never change the canonical path
    #[test]
    fn spelling_does_not_change_identity(parts in components_strategy(), mask in any::<u64>(), slash in any::<bool>()) {
        prop_assume!(!parts.iter().any(|p| is_reserved_device_name(p)));
        let probe = MemoryProbe::new();
        let plain = format!(r"C:\{}", parts.join(r"\"));
        probe.mkdir_all(&plain).unwrap();

        let separator = if slash { "/" } else { r"\" };
        let spelled: Vec<String> = parts.iter().map(|p| respell(p, mask)).collect();
        let variant = format!("c:{separator}{}", spelled.join(separator));

        let a = canonicalize(&probe, &plain, None).unwrap();
        let b = canonicalize(&probe, &variant, None).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.to_string(), b.to_string());
    }

    // Folding ignores ASCII case
    #[test]
    fn fold_key_ignores_case(name in "[a-zA-Z._ -]{1,16}") {
        prop_assert_eq!(fold_key(&name.to_uppercase()), fold_key(&name.to_lowercase()));
    }
}
