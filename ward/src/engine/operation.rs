//! Filesystem operations submitted for a decision.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The kind of mutating operation requested.
///
/// Read access is not gated by the engine, so every kind here mutates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Create a new file.
    Create,
    /// Overwrite or truncate a file.
    Write,
    /// Append to a file.
    Append,
    /// Move a file or directory; the operation carries a destination.
    Rename,
    /// Remove a file or directory.
    Delete,
    /// Create a directory.
    Mkdir,
}

impl OperationKind {
    /// Every operation kind.
    pub const ALL: [Self; 6] = [
        Self::Create,
        Self::Write,
        Self::Append,
        Self::Rename,
        Self::Delete,
        Self::Mkdir,
    ];

    /// Whether the operation removes or moves its target entry. Such a
    /// target is judged without following a final link, and must not be a
    /// root that nothing else covers.
    #[must_use]
    pub fn removes_target(self) -> bool {
        matches!(self, Self::Rename | Self::Delete)
    }

    /// The lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Write => "write",
            Self::Append => "append",
            Self::Rename => "rename",
            Self::Delete => "delete",
            Self::Mkdir => "mkdir",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::Validation {
                field: "operation".into(),
                message: format!("unknown operation {s:?}"),
            })
    }
}

/// A requested operation: a kind, a raw target path and, for renames, a
/// raw destination.
///
/// Paths are kept as the caller spelled them; they are canonicalized
/// afresh for every decision.
///
/// # Examples
///
/// ```
/// use ward::engine::{Operation, OperationKind};
///
/// let op = Operation::rename(r"C:\ws\a.txt", r"C:\ws\b.txt");
/// assert_eq!(op.kind(), OperationKind::Rename);
/// assert_eq!(op.destination(), Some(r"C:\ws\b.txt"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    kind: OperationKind,
    target: String,
    destination: Option<String>,
}

impl Operation {
    /// An operation on a single target.
    #[must_use]
    pub fn new(kind: OperationKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            destination: None,
        }
    }

    /// Create a file.
    #[must_use]
    pub fn create(target: impl Into<String>) -> Self {
        Self::new(OperationKind::Create, target)
    }

    /// Write a file.
    #[must_use]
    pub fn write(target: impl Into<String>) -> Self {
        Self::new(OperationKind::Write, target)
    }

    /// Append to a file.
    #[must_use]
    pub fn append(target: impl Into<String>) -> Self {
        Self::new(OperationKind::Append, target)
    }

    /// Delete a file or directory.
    #[must_use]
    pub fn delete(target: impl Into<String>) -> Self {
        Self::new(OperationKind::Delete, target)
    }

    /// Create a directory.
    #[must_use]
    pub fn mkdir(target: impl Into<String>) -> Self {
        Self::new(OperationKind::Mkdir, target)
    }

    /// Move `from` to `to`.
    #[must_use]
    pub fn rename(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            kind: OperationKind::Rename,
            target: from.into(),
            destination: Some(to.into()),
        }
    }

    /// Attach a destination.
    #[must_use]
    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// The operation kind.
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// The raw target path.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The raw destination path, for renames.
    #[must_use]
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.target)?;
        if let Some(destination) = &self.destination {
            write!(f, " -> {destination}")?;
        }
        Ok(())
    }
}
