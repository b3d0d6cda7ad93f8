//! Error types for the ward library.
//!
//! Resolution failures are [`PathError`]s, filesystem probe failures are
//! [`ProbeError`]s and policy refusals are [`AccessDenied`]. The decision
//! engine never surfaces a `PathError` as anything other than a deny.

use std::io;

use thiserror::Error;

use crate::engine::DenyReason;

/// Result type alias for operations that may fail with a ward error.
///
/// # Examples
///
/// ```
/// use ward::{Error, Result};
///
/// fn example_operation() -> Result<usize> {
///     Ok(32)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the ward library.
#[derive(Debug, Error)]
pub enum Error {
    /// A path could not be resolved.
    #[error(transparent)]
    Path(#[from] PathError),

    /// The filesystem probe failed.
    #[error(transparent)]
    Probe(#[from] ProbeError),

    /// An operation was refused by policy.
    #[error(transparent)]
    Denied(#[from] AccessDenied),

    /// A policy string or document could not be compiled.
    #[error("invalid policy: {reason}")]
    InvalidPolicy {
        /// Why the policy was rejected.
        reason: String,
    },

    /// A configuration error occurred.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A validation error occurred.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },
}

impl Error {
    /// Whether this error is a policy refusal rather than a failure.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied(_))
    }
}

/// A failure to resolve a path to canonical form.
///
/// Every variant is treated as a deny by the decision engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// Reparse resolution exceeded the hop limit (usually a cycle).
    #[error("unresolved reparse point at {path} after {hops} hops")]
    UnresolvedReparsePoint {
        /// The path at which resolution gave up.
        path: String,
        /// The number of hops followed.
        hops: usize,
    },

    /// An intermediate component could not be examined.
    #[error("inaccessible path {path}: {reason}")]
    Inaccessible {
        /// The component that could not be examined.
        path: String,
        /// What went wrong.
        reason: String,
    },

    /// The path text is not a valid path.
    #[error("malformed path {path:?}: {reason}")]
    Malformed {
        /// The raw path text.
        path: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// A failure reported by a [`FilesystemProbe`](crate::path::FilesystemProbe).
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Access to the object was refused.
    #[error("permission denied: {path}")]
    PermissionDenied {
        /// The object that could not be accessed.
        path: String,
    },

    /// The object does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// The missing object.
        path: String,
    },

    /// A directory was required but the object is not one.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The offending object.
        path: String,
    },

    /// A handle-relative open reached a reparse point.
    #[error("refusing to traverse reparse point: {path}")]
    ReparsePoint {
        /// The reparse point.
        path: String,
    },

    /// The path cannot be represented on this host.
    #[error("path not representable on this host: {path}")]
    Unsupported {
        /// The unrepresentable path.
        path: String,
    },

    /// Any other I/O failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The object being accessed.
        path: String,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
}

impl ProbeError {
    /// Classify an I/O error raised while accessing `path`.
    #[must_use]
    pub fn from_io(path: impl Into<String>, err: io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source: err },
        }
    }
}

/// A policy-driven refusal carrying the reason code.
///
/// # Examples
///
/// ```
/// use std::io;
/// use ward::engine::DenyReason;
/// use ward::AccessDenied;
///
/// let denied = AccessDenied::new(DenyReason::OutsideRoots, r"C:\other\f.txt");
/// assert_eq!(denied.to_io_error().kind(), io::ErrorKind::PermissionDenied);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("access denied ({reason}): {path}")]
pub struct AccessDenied {
    /// Why access was refused.
    pub reason: DenyReason,
    /// The path the refusal concerns, as resolved (or as requested when it
    /// could not be resolved).
    pub path: String,
}

impl AccessDenied {
    /// Create a refusal.
    #[must_use]
    pub fn new(reason: DenyReason, path: impl Into<String>) -> Self {
        Self {
            reason,
            path: path.into(),
        }
    }

    /// The OS-level error a sandboxed caller should observe.
    ///
    /// On Windows this is `ERROR_ACCESS_DENIED` (5); elsewhere an error of
    /// kind [`io::ErrorKind::PermissionDenied`].
    #[must_use]
    pub fn to_io_error(&self) -> io::Error {
        if cfg!(windows) {
            io::Error::from_raw_os_error(5)
        } else {
            io::Error::new(io::ErrorKind::PermissionDenied, self.to_string())
        }
    }
}

impl From<AccessDenied> for io::Error {
    fn from(denied: AccessDenied) -> Self {
        denied.to_io_error()
    }
}
