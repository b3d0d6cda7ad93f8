//! Path relationship checking.
//!
//! Relationships are computed component-wise on canonical paths, so
//! `C:\workspace-extra` is unrelated to `C:\workspace` even though one
//! spelling is a textual prefix of the other.

use crate::path::types::CanonicalPath;

/// Relationship between two canonical paths.
///
/// # Examples
///
/// ```
/// use ward::path::{CanonicalPath, PathClass, PathPrefix, PathRelationship};
///
/// let root = CanonicalPath::from_names(PathPrefix::disk('C'), ["ws"], PathClass::Regular);
/// let file = root.join("f.txt");
///
/// assert_eq!(PathRelationship::between(&root, &file), PathRelationship::Ancestor);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathRelationship {
    /// The first path is an ancestor of the second.
    Ancestor,

    /// The first path is a descendant of the second.
    Descendant,

    /// The paths name the same object.
    Same,

    /// Neither path contains the other.
    Unrelated,
}

impl PathRelationship {
    /// Determine the relationship between two paths.
    ///
    /// # Examples
    ///
    /// ```
    /// use ward::path::{CanonicalPath, PathClass, PathPrefix, PathRelationship};
    ///
    /// let ws = CanonicalPath::from_names(PathPrefix::disk('C'), ["workspace"], PathClass::Regular);
    /// let extra = CanonicalPath::from_names(PathPrefix::disk('C'), ["workspace-extra"], PathClass::Regular);
    /// let upper = CanonicalPath::from_names(PathPrefix::disk('c'), ["WORKSPACE"], PathClass::Regular);
    ///
    /// assert_eq!(PathRelationship::between(&ws, &extra), PathRelationship::Unrelated);
    /// assert_eq!(PathRelationship::between(&ws, &upper), PathRelationship::Same);
    /// assert_eq!(PathRelationship::between(&ws.join("x"), &ws), PathRelationship::Descendant);
    /// ```
    #[must_use]
    pub fn between(path1: &CanonicalPath, path2: &CanonicalPath) -> Self {
        if path1 == path2 {
            return Self::Same;
        }
        if path2.starts_with(path1) {
            return Self::Ancestor;
        }
        if path1.starts_with(path2) {
            return Self::Descendant;
        }
        Self::Unrelated
    }

    /// Whether the relationship is not `Unrelated`.
    #[must_use]
    pub fn is_hierarchical(&self) -> bool {
        matches!(self, Self::Ancestor | Self::Descendant | Self::Same)
    }

    /// Whether `path` is `directory` or lies below it.
    #[must_use]
    pub fn is_within(path: &CanonicalPath, directory: &CanonicalPath) -> bool {
        matches!(Self::between(path, directory), Self::Descendant | Self::Same)
    }

    /// Whether `path` lies strictly below `directory`.
    #[must_use]
    pub fn is_strictly_within(path: &CanonicalPath, directory: &CanonicalPath) -> bool {
        Self::between(path, directory) == Self::Descendant
    }

    /// A human-readable description of the relationship.
    #[must_use]
    pub fn description(&self, path1: &CanonicalPath, path2: &CanonicalPath) -> String {
        match self {
            Self::Ancestor => format!("{path1} is an ancestor of {path2}"),
            Self::Descendant => format!("{path1} is a descendant of {path2}"),
            Self::Same => format!("{path1} and {path2} are the same path"),
            Self::Unrelated => format!("{path1} and {path2} are unrelated paths"),
        }
    }
}
