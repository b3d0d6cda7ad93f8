//! Decision values.

use std::fmt;

use crate::path::CanonicalPath;

/// Why an operation was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenyReason {
    /// The target is not inside any writable root.
    OutsideRoots,
    /// The target is a device or a named pipe.
    DeviceOrPipe,
    /// The target names an alternate data stream.
    AlternateStream,
    /// The target is, or lies inside, a protected name or the state
    /// directory.
    ProtectedPathName,
    /// The policy, or the matching root, is read-only.
    ReadOnlyMode,
    /// The matching root no longer resolves to the directory it named, or
    /// the operation would delete or move a root no other root covers.
    RootItselfUnsafe,
    /// The policy named a mode this engine does not know.
    UnrecognizedPolicy,
    /// The target could not be canonicalized.
    Unresolvable,
    /// The target's ancestry changed between decision and commit.
    AncestryChanged,
}

impl DenyReason {
    /// The kebab-case reason code.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::OutsideRoots => "outside-roots",
            Self::DeviceOrPipe => "device-or-pipe",
            Self::AlternateStream => "alternate-stream",
            Self::ProtectedPathName => "protected-path-name",
            Self::ReadOnlyMode => "read-only-mode",
            Self::RootItselfUnsafe => "root-itself-unsafe",
            Self::UnrecognizedPolicy => "unrecognized-policy",
            Self::Unresolvable => "unresolvable",
            Self::AncestryChanged => "ancestry-changed",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The outcome of a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// The operation may proceed to commit.
    Allow,
    /// The operation is refused.
    Deny(DenyReason),
}

impl Decision {
    /// Whether this is `Allow`.
    #[must_use]
    pub fn is_allow(self) -> bool {
        self == Self::Allow
    }

    /// The deny reason, if any.
    #[must_use]
    pub fn reason(self) -> Option<DenyReason> {
        match self {
            Self::Allow => None,
            Self::Deny(reason) => Some(reason),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => f.write_str("allow"),
            Self::Deny(reason) => write!(f, "deny ({reason})"),
        }
    }
}

/// A decision together with the canonical paths it was made on.
///
/// The paths are what [`commit`](crate::engine::DecisionEngine::commit)
/// compares fresh resolution against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    decision: Decision,
    target: Option<CanonicalPath>,
    destination: Option<CanonicalPath>,
}

impl Verdict {
    pub(crate) fn new(
        decision: Decision,
        target: Option<CanonicalPath>,
        destination: Option<CanonicalPath>,
    ) -> Self {
        Self {
            decision,
            target,
            destination,
        }
    }

    /// The decision.
    #[must_use]
    pub fn decision(&self) -> Decision {
        self.decision
    }

    /// Whether the decision is `Allow`.
    #[must_use]
    pub fn is_allow(&self) -> bool {
        self.decision.is_allow()
    }

    /// The canonical target, if it could be resolved.
    #[must_use]
    pub fn target(&self) -> Option<&CanonicalPath> {
        self.target.as_ref()
    }

    /// The canonical rename destination, if any was resolved.
    #[must_use]
    pub fn destination(&self) -> Option<&CanonicalPath> {
        self.destination.as_ref()
    }
}
