//! Names that may never be modified from inside the sandbox.

use std::collections::BTreeSet;

use crate::path::normalize::protected_key;
use crate::path::Component;

/// Names protected by default: version control metadata and the
/// sandbox's own trust state.
pub const DEFAULT_PROTECTED_NAMES: [&str; 3] = [".git", ".codex", ".ward"];

/// A case-normalized set of protected component names.
///
/// Matching folds case and ignores the trailing dots and spaces Win32
/// strips, so `.GIT.` matches `.git`.
///
/// # Examples
///
/// ```
/// use ward::engine::ProtectedNames;
/// use ward::path::Component;
///
/// let names = ProtectedNames::default();
/// assert!(names.matches(&Component::new(".GiT")));
/// assert!(!names.matches(&Component::new("src")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedNames {
    keys: BTreeSet<String>,
}

impl ProtectedNames {
    /// An empty set.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            keys: BTreeSet::new(),
        }
    }

    /// Add a name. Returns false for names that fold to nothing or were
    /// already present.
    pub fn insert(&mut self, name: &str) -> bool {
        let key = protected_key(name);
        if key.is_empty() {
            return false;
        }
        self.keys.insert(key)
    }

    /// Whether `component` is protected.
    #[must_use]
    pub fn matches(&self, component: &Component) -> bool {
        self.keys.contains(&protected_key(component.name()))
    }

    /// The first protected component in `components`, if any.
    pub fn find<'a>(&self, components: &'a [Component]) -> Option<&'a Component> {
        components.iter().find(|c| self.matches(c))
    }

    /// The folded keys.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Number of names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Default for ProtectedNames {
    fn default() -> Self {
        let mut names = Self::empty();
        for name in DEFAULT_PROTECTED_NAMES {
            names.insert(name);
        }
        names
    }
}

impl<'a> Extend<&'a str> for ProtectedNames {
    fn extend<I: IntoIterator<Item = &'a str>>(&mut self, iter: I) {
        for name in iter {
            self.insert(name);
        }
    }
}
