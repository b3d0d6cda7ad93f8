//! An in-memory filesystem with Windows lookup semantics.
//!
//! [`MemoryProbe`] models exactly what the canonicalizer and the commit
//! check need: case-insensitive lookup, 8.3 short-name aliases, symlinks,
//! junctions, mount points, entries that cannot be examined, and object
//! identities that change when an entry is replaced. It is safe to mutate
//! from one thread while decisions run on another.
//!
//! # Examples
//!
//! ```
//! use ward::path::{Canonicalizer, MemoryProbe};
//!
//! let probe = MemoryProbe::new();
//! probe.mkdir_all(r"C:\Program Files\Tool").unwrap();
//! probe.set_short_name(r"C:\Program Files", "PROGRA~1").unwrap();
//!
//! let canonicalizer = Canonicalizer::new(&probe);
//! let path = canonicalizer.canonicalize(r"c:\progra~1\TOOL", None).unwrap();
//! assert_eq!(path.to_string(), r"C:\Program Files\Tool");
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{PathError, ProbeError};
use crate::path::normalize::LexicalPath;
use crate::path::probe::{DirHandle, FileKind, FilesystemProbe, Metadata, ReparseKind};
use crate::path::types::{CanonicalPath, Component};

/// Identity reported for every prefix root.
const ROOT_ID: u64 = 0;

#[derive(Debug, Clone)]
enum EntryKind {
    Directory,
    File,
    Reparse(ReparseKind, String),
}

#[derive(Debug, Clone)]
struct Entry {
    kind: EntryKind,
    name: String,
    id: u64,
    inaccessible: bool,
}

#[derive(Debug, Default)]
struct State {
    entries: HashMap<CanonicalPath, Entry>,
    /// Short-name path to long name of the same entry.
    aliases: HashMap<CanonicalPath, String>,
}

impl State {
    /// Find the stored path for `path`, following a short-name alias in
    /// the final component.
    fn locate(&self, path: &CanonicalPath) -> Option<(CanonicalPath, &Entry)> {
        if let Some(entry) = self.entries.get(path) {
            return Some((path.clone(), entry));
        }
        let long = self.aliases.get(path)?;
        let full = path.parent()?.join(long);
        let entry = self.entries.get(&full)?;
        Some((full, entry))
    }
}

/// An in-memory [`FilesystemProbe`].
#[derive(Debug)]
pub struct MemoryProbe {
    state: RwLock<State>,
    next_id: AtomicU64,
}

impl Default for MemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe {
    /// Create an empty filesystem. Every prefix root (`C:\`, `/`, shares)
    /// exists implicitly.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
            next_id: AtomicU64::new(ROOT_ID + 1),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn fresh_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn entry(&self, kind: EntryKind, path: &CanonicalPath) -> Entry {
        Entry {
            kind,
            name: path
                .file_name()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            id: self.fresh_id(),
            inaccessible: false,
        }
    }

    fn parse(raw: &str) -> Result<CanonicalPath, PathError> {
        Ok(LexicalPath::parse(raw, None)?.into_unresolved())
    }

    fn create_dirs(&self, state: &mut State, path: &CanonicalPath) {
        let mut current = CanonicalPath::root(path.prefix().clone(), path.class());
        for component in path.components() {
            current.push(component.clone());
            if !state.entries.contains_key(&current) {
                let entry = self.entry(EntryKind::Directory, &current);
                state.entries.insert(current.clone(), entry);
            }
        }
    }

    fn insert(&self, path: &CanonicalPath, kind: EntryKind) {
        let mut state = self.write();
        if let Some(parent) = path.parent() {
            self.create_dirs(&mut state, &parent);
        }
        let entry = self.entry(kind, path);
        state.entries.insert(path.clone(), entry);
    }

    /// Create a directory and all of its missing ancestors.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not an absolute path.
    pub fn mkdir_all(&self, raw: &str) -> Result<(), PathError> {
        let path = Self::parse(raw)?;
        let mut state = self.write();
        self.create_dirs(&mut state, &path);
        Ok(())
    }

    /// Create (or replace) a regular file, creating missing ancestors.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not an absolute path.
    pub fn add_file(&self, raw: &str) -> Result<(), PathError> {
        let path = Self::parse(raw)?;
        self.insert(&path, EntryKind::File);
        Ok(())
    }

    /// Create a symbolic link at `raw` pointing to `target`. Relative
    /// targets resolve against the link's parent.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not an absolute path.
    pub fn add_symlink(&self, raw: &str, target: &str) -> Result<(), PathError> {
        self.add_reparse(raw, ReparseKind::Symlink, target)
    }

    /// Create a directory junction at `raw` pointing to `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not an absolute path.
    pub fn add_junction(&self, raw: &str, target: &str) -> Result<(), PathError> {
        self.add_reparse(raw, ReparseKind::Junction, target)
    }

    /// Create a volume mount point at `raw` pointing to `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not an absolute path.
    pub fn add_mount_point(&self, raw: &str, target: &str) -> Result<(), PathError> {
        self.add_reparse(raw, ReparseKind::MountPoint, target)
    }

    fn add_reparse(&self, raw: &str, kind: ReparseKind, target: &str) -> Result<(), PathError> {
        let path = Self::parse(raw)?;
        self.insert(&path, EntryKind::Reparse(kind, target.to_string()));
        Ok(())
    }

    /// Register `short` as the 8.3 alias of the entry at `raw`.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not an absolute path or is a root.
    pub fn set_short_name(&self, raw: &str, short: &str) -> Result<(), PathError> {
        let path = Self::parse(raw)?;
        let (Some(parent), Some(long)) = (path.parent(), path.file_name()) else {
            return Err(PathError::Malformed {
                path: raw.to_string(),
                reason: "a root has no short name".to_string(),
            });
        };
        let long = long.name().to_string();
        self.write().aliases.insert(parent.join(short), long);
        Ok(())
    }

    /// Make the entry at `raw` refuse examination, creating it as a
    /// directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not an absolute path.
    pub fn set_inaccessible(&self, raw: &str) -> Result<(), PathError> {
        let path = Self::parse(raw)?;
        let mut state = self.write();
        self.create_dirs(&mut state, &path);
        if let Some(entry) = state.entries.get_mut(&path) {
            entry.inaccessible = true;
        }
        Ok(())
    }

    /// Remove the entry at `raw` and everything below it.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not an absolute path.
    pub fn remove(&self, raw: &str) -> Result<(), PathError> {
        let path = Self::parse(raw)?;
        let mut state = self.write();
        state.entries.retain(|existing, _| !existing.starts_with(&path));
        Ok(())
    }

    /// Atomically replace whatever is at `raw` with a junction to `target`.
    ///
    /// This is the classic swap used to race a decision: the directory a
    /// verdict was made on becomes a redirection elsewhere.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not an absolute path.
    pub fn replace_with_junction(&self, raw: &str, target: &str) -> Result<(), PathError> {
        let path = Self::parse(raw)?;
        let mut state = self.write();
        state.entries.retain(|existing, _| !existing.starts_with(&path));
        if let Some(parent) = path.parent() {
            self.create_dirs(&mut state, &parent);
        }
        let entry = self.entry(
            EntryKind::Reparse(ReparseKind::Junction, target.to_string()),
            &path,
        );
        state.entries.insert(path, entry);
        Ok(())
    }

    /// Whether an entry exists at `raw` (without following it).
    #[must_use]
    pub fn exists(&self, raw: &str) -> bool {
        Self::parse(raw).is_ok_and(|path| path.is_root() || self.read().locate(&path).is_some())
    }

    fn open(&self, path: &CanonicalPath) -> Result<DirHandle, ProbeError> {
        if path.is_root() {
            return Ok(DirHandle::new(path.clone(), Some(ROOT_ID)));
        }
        let state = self.read();
        let (stored, entry) = state.locate(path).ok_or_else(|| ProbeError::NotFound {
            path: path.to_string(),
        })?;
        if entry.inaccessible {
            return Err(ProbeError::PermissionDenied {
                path: stored.to_string(),
            });
        }
        match entry.kind {
            EntryKind::Directory => {
                let mut opened = stored.clone();
                opened.pop();
                opened.push(Component::new(entry.name.clone()));
                Ok(DirHandle::new(opened, Some(entry.id)))
            }
            EntryKind::File => Err(ProbeError::NotADirectory {
                path: stored.to_string(),
            }),
            EntryKind::Reparse(..) => Err(ProbeError::ReparsePoint {
                path: stored.to_string(),
            }),
        }
    }
}

impl FilesystemProbe for MemoryProbe {
    fn stat(&self, path: &CanonicalPath) -> Result<Option<Metadata>, ProbeError> {
        if path.is_root() {
            return Ok(Some(Metadata {
                kind: FileKind::Directory,
                name: String::new(),
                file_id: Some(ROOT_ID),
            }));
        }
        let state = self.read();
        let Some((stored, entry)) = state.locate(path) else {
            return Ok(None);
        };
        if entry.inaccessible {
            return Err(ProbeError::PermissionDenied {
                path: stored.to_string(),
            });
        }
        let kind = match entry.kind {
            EntryKind::Directory => FileKind::Directory,
            EntryKind::File => FileKind::File,
            EntryKind::Reparse(kind, _) => FileKind::Reparse(kind),
        };
        Ok(Some(Metadata {
            kind,
            name: entry.name.clone(),
            file_id: Some(entry.id),
        }))
    }

    fn read_reparse_target(&self, path: &CanonicalPath) -> Result<Option<String>, ProbeError> {
        let state = self.read();
        match state.locate(path) {
            Some((stored, entry)) if entry.inaccessible => Err(ProbeError::PermissionDenied {
                path: stored.to_string(),
            }),
            Some((_, Entry {
                kind: EntryKind::Reparse(_, target),
                ..
            })) => Ok(Some(target.clone())),
            _ => Ok(None),
        }
    }

    fn open_dir(&self, path: &CanonicalPath) -> Result<DirHandle, ProbeError> {
        self.open(path)
    }

    fn open_relative(&self, parent: &DirHandle, name: &str) -> Result<DirHandle, ProbeError> {
        // A handle keeps referring to the directory it opened; if that
        // directory has since been replaced, the child is unreachable.
        if !parent.path().is_root() {
            let state = self.read();
            let current = state.locate(parent.path()).map(|(_, entry)| entry);
            match current {
                Some(entry) if Some(entry.id) == parent.file_id() => {}
                Some(Entry {
                    kind: EntryKind::Reparse(..),
                    ..
                }) => {
                    return Err(ProbeError::ReparsePoint {
                        path: parent.path().to_string(),
                    })
                }
                _ => {
                    return Err(ProbeError::NotFound {
                        path: parent.path().join(name).to_string(),
                    })
                }
            }
        }
        self.open(&parent.path().join(name))
    }
}
