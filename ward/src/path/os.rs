//! The host filesystem as a [`FilesystemProbe`].
//!
//! Lookups go through `std::fs` without following a final symlink;
//! handle-relative traversal uses `cap-std` directories so that a commit
//! check walks from an open root rather than re-resolving path text. Each
//! step of that walk is a single no-follow open, and directory ids come from
//! the opened handle rather than from a second lookup by path.
//!
//! Only canonical paths that have a native form on this host can be probed
//! (drive and UNC paths on Windows, the `/` root elsewhere); anything else
//! reports [`ProbeError::Unsupported`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cap_fs_ext::DirExt;
use cap_std::fs::Dir;

use crate::error::ProbeError;
use crate::path::probe::{DirHandle, FileKind, FilesystemProbe, Metadata, ReparseKind};
use crate::path::types::CanonicalPath;

/// Probe backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsProbe;

impl OsProbe {
    /// Create a host filesystem probe.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn native(path: &CanonicalPath) -> Result<PathBuf, ProbeError> {
    path.to_native().ok_or_else(|| ProbeError::Unsupported {
        path: path.to_string(),
    })
}

#[cfg(unix)]
fn file_id(meta: &fs::Metadata) -> Option<u64> {
    use std::os::unix::fs::MetadataExt;
    Some(meta.ino())
}

#[cfg(not(unix))]
fn file_id(_meta: &fs::Metadata) -> Option<u64> {
    None
}

/// The id of the directory `dir` has open.
fn handle_id(dir: &Dir) -> Option<u64> {
    let file = dir.try_clone().ok()?.into_std_file();
    file.metadata().ok().as_ref().and_then(file_id)
}

/// Why a no-follow open of `name` failed. The lookup only labels the
/// failure; it never leads to an open.
fn refused(dir: &Dir, name: &str, child: &CanonicalPath, err: io::Error) -> ProbeError {
    match dir.symlink_metadata(name) {
        Ok(meta) if meta.file_type().is_symlink() => ProbeError::ReparsePoint {
            path: child.to_string(),
        },
        Ok(meta) if !meta.is_dir() => ProbeError::NotADirectory {
            path: child.to_string(),
        },
        _ => ProbeError::from_io(child.to_string(), err),
    }
}

fn kind_of(file_type: fs::FileType) -> FileKind {
    if file_type.is_symlink() {
        FileKind::Reparse(ReparseKind::Symlink)
    } else if file_type.is_dir() {
        FileKind::Directory
    } else {
        FileKind::File
    }
}

fn file_name(native: &Path) -> String {
    native
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl FilesystemProbe for OsProbe {
    fn stat(&self, path: &CanonicalPath) -> Result<Option<Metadata>, ProbeError> {
        let native = native(path)?;
        match fs::symlink_metadata(&native) {
            Ok(meta) => Ok(Some(Metadata {
                kind: kind_of(meta.file_type()),
                name: file_name(&native),
                file_id: file_id(&meta),
            })),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ProbeError::from_io(path.to_string(), e)),
        }
    }

    fn read_reparse_target(&self, path: &CanonicalPath) -> Result<Option<String>, ProbeError> {
        let native = native(path)?;
        match fs::read_link(&native) {
            Ok(target) => Ok(Some(target.to_string_lossy().into_owned())),
            Err(e) if matches!(e.kind(), io::ErrorKind::InvalidInput | io::ErrorKind::NotFound) => {
                Ok(None)
            }
            Err(e) => Err(ProbeError::from_io(path.to_string(), e)),
        }
    }

    fn open_dir(&self, path: &CanonicalPath) -> Result<DirHandle, ProbeError> {
        let native = native(path)?;
        let meta =
            fs::symlink_metadata(&native).map_err(|e| ProbeError::from_io(path.to_string(), e))?;
        match kind_of(meta.file_type()) {
            FileKind::Reparse(_) => {
                return Err(ProbeError::ReparsePoint {
                    path: path.to_string(),
                })
            }
            FileKind::File => {
                return Err(ProbeError::NotADirectory {
                    path: path.to_string(),
                })
            }
            FileKind::Directory => {}
        }
        let dir = Dir::open_ambient_dir(&native, cap_std::ambient_authority())
            .map_err(|e| ProbeError::from_io(path.to_string(), e))?;
        let id = handle_id(&dir).or_else(|| file_id(&meta));
        Ok(DirHandle::new(path.clone(), id).with_native(dir))
    }

    fn open_relative(&self, parent: &DirHandle, name: &str) -> Result<DirHandle, ProbeError> {
        let child = parent.path().join(name);
        let dir = parent.native().ok_or_else(|| ProbeError::Unsupported {
            path: parent.path().to_string(),
        })?;

        let opened = dir
            .open_dir_nofollow(name)
            .map_err(|e| refused(dir, name, &child, e))?;
        let id = handle_id(&opened);
        Ok(DirHandle::new(child, id).with_native(opened))
    }
}
