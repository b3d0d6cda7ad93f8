//! The filesystem capability the canonicalizer and the commit check consume.
//!
//! A [`FilesystemProbe`] answers three questions about the live filesystem:
//! what is at a path (without following a final reparse point), where a
//! reparse point redirects to, and which directory a handle-relative open
//! reaches. Everything ward knows about the filesystem flows through it.

use std::fmt;
use std::sync::Arc;

use crate::error::ProbeError;
use crate::path::types::CanonicalPath;

/// The flavour of a reparse point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReparseKind {
    /// A symbolic link (file or directory).
    Symlink,
    /// An NTFS directory junction.
    Junction,
    /// A volume mount point.
    MountPoint,
}

impl fmt::Display for ReparseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symlink => write!(f, "symlink"),
            Self::Junction => write!(f, "junction"),
            Self::MountPoint => write!(f, "mount point"),
        }
    }
}

/// What kind of object a path names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// A directory.
    Directory,
    /// A regular file.
    File,
    /// A reparse point that redirects elsewhere.
    Reparse(ReparseKind),
}

/// Metadata for a single object, as observed without following it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// The object kind.
    pub kind: FileKind,
    /// The object's on-disk name: true case, long form.
    pub name: String,
    /// A stable identity for the object, when the filesystem reports one.
    pub file_id: Option<u64>,
}

impl Metadata {
    /// Whether this object is a plain directory.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }

    /// Whether this object is a reparse point.
    #[must_use]
    pub fn is_reparse(&self) -> bool {
        matches!(self.kind, FileKind::Reparse(_))
    }
}

/// An open directory, used for handle-relative traversal.
///
/// The `native` handle is present when the probe is backed by the host
/// filesystem; in-memory probes identify directories by `file_id` alone.
#[derive(Debug, Clone)]
pub struct DirHandle {
    path: CanonicalPath,
    file_id: Option<u64>,
    native: Option<Arc<cap_std::fs::Dir>>,
}

impl DirHandle {
    /// Create a handle with no native directory attached.
    #[must_use]
    pub fn new(path: CanonicalPath, file_id: Option<u64>) -> Self {
        Self {
            path,
            file_id,
            native: None,
        }
    }

    /// Attach an open host directory.
    #[must_use]
    pub fn with_native(mut self, dir: cap_std::fs::Dir) -> Self {
        self.native = Some(Arc::new(dir));
        self
    }

    /// The path this handle was opened at.
    #[must_use]
    pub fn path(&self) -> &CanonicalPath {
        &self.path
    }

    /// The identity of the opened directory.
    #[must_use]
    pub fn file_id(&self) -> Option<u64> {
        self.file_id
    }

    /// The open host directory, if any.
    #[must_use]
    pub fn native(&self) -> Option<&cap_std::fs::Dir> {
        self.native.as_deref()
    }
}

/// Access to the live filesystem.
///
/// Implementations must be safe to share across threads: decisions run
/// concurrently against one probe.
pub trait FilesystemProbe: Send + Sync {
    /// Describe the object at `path` without following a final reparse
    /// point. `Ok(None)` means nothing exists there.
    ///
    /// # Errors
    ///
    /// Returns an error if the object exists but cannot be examined.
    fn stat(&self, path: &CanonicalPath) -> Result<Option<Metadata>, ProbeError>;

    /// The raw target text of the reparse point at `path`, or `None` if
    /// `path` is not a reparse point.
    ///
    /// # Errors
    ///
    /// Returns an error if the reparse data cannot be read.
    fn read_reparse_target(&self, path: &CanonicalPath) -> Result<Option<String>, ProbeError>;

    /// Open the directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is missing, is not a directory, or is a
    /// reparse point.
    fn open_dir(&self, path: &CanonicalPath) -> Result<DirHandle, ProbeError>;

    /// Open the child directory `name` of `parent` relative to the handle,
    /// refusing to traverse a reparse point.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::ReparsePoint`] if `name` is a reparse point,
    /// [`ProbeError::NotFound`] if it does not exist, and
    /// [`ProbeError::NotADirectory`] if it is a file.
    fn open_relative(&self, parent: &DirHandle, name: &str) -> Result<DirHandle, ProbeError>;
}

impl<P: FilesystemProbe + ?Sized> FilesystemProbe for &P {
    fn stat(&self, path: &CanonicalPath) -> Result<Option<Metadata>, ProbeError> {
        (**self).stat(path)
    }

    fn read_reparse_target(&self, path: &CanonicalPath) -> Result<Option<String>, ProbeError> {
        (**self).read_reparse_target(path)
    }

    fn open_dir(&self, path: &CanonicalPath) -> Result<DirHandle, ProbeError> {
        (**self).open_dir(path)
    }

    fn open_relative(&self, parent: &DirHandle, name: &str) -> Result<DirHandle, ProbeError> {
        (**self).open_relative(parent, name)
    }
}

impl<P: FilesystemProbe + ?Sized> FilesystemProbe for Arc<P> {
    fn stat(&self, path: &CanonicalPath) -> Result<Option<Metadata>, ProbeError> {
        (**self).stat(path)
    }

    fn read_reparse_target(&self, path: &CanonicalPath) -> Result<Option<String>, ProbeError> {
        (**self).read_reparse_target(path)
    }

    fn open_dir(&self, path: &CanonicalPath) -> Result<DirHandle, ProbeError> {
        (**self).open_dir(path)
    }

    fn open_relative(&self, parent: &DirHandle, name: &str) -> Result<DirHandle, ProbeError> {
        (**self).open_relative(parent, name)
    }
}
