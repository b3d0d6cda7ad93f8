//! Path canonicalization against the live filesystem.
//!
//! Canonicalization walks a lexically normalized path one component at a
//! time through a [`FilesystemProbe`]:
//! - Existing directories contribute their on-disk spelling, which resolves
//!   case differences and 8.3 short names
//! - Reparse points (symlinks, junctions, mount points) are followed, with a
//!   bounded hop count so cycles fail instead of hanging
//! - Components past the first missing one are appended lexically, so paths
//!   that are about to be created still canonicalize
//!
//! The entry forms ([`Canonicalizer::canonicalize_entry`]) stop short of a
//! reparse point in the final position and name the link itself, which is
//! what deleting or renaming a path acts on.
//!
//! Device, pipe and stream paths are classified from their syntax and
//! returned without touching the filesystem.

use std::collections::VecDeque;

use crate::error::{PathError, ProbeError};
use crate::path::normalize::LexicalPath;
use crate::path::probe::{FileKind, FilesystemProbe};
use crate::path::types::{CanonicalPath, Component, PathClass};

/// The default bound on reparse points followed while resolving one path.
pub const MAX_REPARSE_HOPS: usize = 32;

/// Resolves raw paths to [`CanonicalPath`]s through a probe.
///
/// A canonicalizer holds no state between calls; every call observes the
/// filesystem afresh.
///
/// # Examples
///
/// ```
/// use ward::path::{Canonicalizer, MemoryProbe};
///
/// let probe = MemoryProbe::new();
/// probe.mkdir_all(r"C:\ws").unwrap();
/// probe.add_junction(r"C:\ws\out", r"C:\outside").unwrap();
///
/// let canonicalizer = Canonicalizer::new(&probe);
/// let cwd = canonicalizer.canonicalize(r"C:\WS", None).unwrap();
/// let target = canonicalizer.canonicalize(r"out\f.txt", Some(&cwd)).unwrap();
/// assert_eq!(target.to_string(), r"C:\outside\f.txt");
/// ```
#[derive(Debug)]
pub struct Canonicalizer<'p, P: ?Sized> {
    probe: &'p P,
    max_hops: usize,
}

impl<'p, P: FilesystemProbe + ?Sized> Canonicalizer<'p, P> {
    /// Create a canonicalizer with the default hop limit.
    #[must_use]
    pub fn new(probe: &'p P) -> Self {
        Self {
            probe,
            max_hops: MAX_REPARSE_HOPS,
        }
    }

    /// Use a different reparse hop limit.
    #[must_use]
    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    /// The probe this canonicalizer observes the filesystem through.
    #[must_use]
    pub fn probe(&self) -> &'p P {
        self.probe
    }

    /// The reparse hop limit in effect.
    #[must_use]
    pub fn max_hops(&self) -> usize {
        self.max_hops
    }

    /// Canonicalize `raw`, resolving relative forms against `cwd`.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::Malformed`] for invalid syntax,
    /// [`PathError::UnresolvedReparsePoint`] when the hop limit is exceeded,
    /// and [`PathError::Inaccessible`] when a component cannot be examined
    /// or a file is traversed as a directory.
    pub fn canonicalize(
        &self,
        raw: &str,
        cwd: Option<&CanonicalPath>,
    ) -> Result<CanonicalPath, PathError> {
        self.resolve(LexicalPath::parse(raw, cwd)?, true)
    }

    /// Canonicalize `raw` as a directory entry: every ancestor is resolved,
    /// but a reparse point in the final position is named rather than
    /// followed.
    ///
    /// # Errors
    ///
    /// As for [`canonicalize`](Self::canonicalize).
    pub fn canonicalize_entry(
        &self,
        raw: &str,
        cwd: Option<&CanonicalPath>,
    ) -> Result<CanonicalPath, PathError> {
        self.resolve(LexicalPath::parse(raw, cwd)?, false)
    }

    /// Resolve an already canonical path again, observing the filesystem as
    /// it is now. A result different from `path` means something along the
    /// path was replaced.
    ///
    /// # Errors
    ///
    /// As for [`canonicalize`](Self::canonicalize).
    pub fn recanonicalize(&self, path: &CanonicalPath) -> Result<CanonicalPath, PathError> {
        self.resolve(LexicalPath::from_canonical(path), true)
    }

    /// [`recanonicalize`](Self::recanonicalize) for a path produced by
    /// [`canonicalize_entry`](Self::canonicalize_entry).
    ///
    /// # Errors
    ///
    /// As for [`canonicalize`](Self::canonicalize).
    pub fn recanonicalize_entry(&self, path: &CanonicalPath) -> Result<CanonicalPath, PathError> {
        self.resolve(LexicalPath::from_canonical(path), false)
    }

    fn resolve(
        &self,
        lexical: LexicalPath,
        follow_final: bool,
    ) -> Result<CanonicalPath, PathError> {
        if lexical.class().is_never_permitted() {
            return Ok(lexical.into_unresolved());
        }

        let (prefix, names, stream, mut class) = lexical.into_parts();
        let mut resolved = CanonicalPath::root(prefix, class);
        let mut pending: VecDeque<String> = names.into();
        let mut hops = 0;

        while let Some(name) = pending.pop_front() {
            let candidate = resolved.join(&name);
            let meta = self
                .probe
                .stat(&candidate)
                .map_err(|e| inaccessible(&candidate, &e))?;

            let Some(meta) = meta else {
                resolved.push(Component::new(name));
                for rest in pending.drain(..) {
                    resolved.push(Component::new(rest));
                }
                break;
            };
            let spelled = if meta.name.is_empty() { name } else { meta.name };

            match meta.kind {
                FileKind::Directory => resolved.push(Component::new(spelled)),
                FileKind::File => {
                    if !pending.is_empty() {
                        return Err(PathError::Inaccessible {
                            path: candidate.to_string(),
                            reason: "not a directory".to_string(),
                        });
                    }
                    resolved.push(Component::new(spelled));
                }
                FileKind::Reparse(_) if pending.is_empty() && !follow_final => {
                    resolved.push(Component::new(spelled));
                }
                FileKind::Reparse(kind) => {
                    hops += 1;
                    if hops > self.max_hops {
                        return Err(PathError::UnresolvedReparsePoint {
                            path: candidate.to_string(),
                            hops,
                        });
                    }

                    let target = self
                        .probe
                        .read_reparse_target(&candidate)
                        .map_err(|e| inaccessible(&candidate, &e))?
                        .ok_or_else(|| PathError::Inaccessible {
                            path: candidate.to_string(),
                            reason: format!("{kind} has no target"),
                        })?;

                    // Relative targets resolve against the link's parent.
                    let redirected = LexicalPath::parse(&target, Some(&resolved)).map_err(|e| {
                        PathError::Inaccessible {
                            path: candidate.to_string(),
                            reason: format!("{kind} target is invalid: {e}"),
                        }
                    })?;

                    if redirected.class() != PathClass::Regular {
                        class = redirected.class();
                    }
                    if class.is_never_permitted() {
                        let mut escaped = redirected.into_unresolved().with_class(class);
                        for rest in pending.drain(..) {
                            escaped.push(Component::new(rest));
                        }
                        return Ok(escaped);
                    }

                    let (prefix, names, _, _) = redirected.into_parts();
                    resolved = CanonicalPath::root(prefix, class);
                    for rest in names.into_iter().rev() {
                        pending.push_front(rest);
                    }
                }
            }
        }

        Ok(resolved.with_class(class).with_stream(stream))
    }
}

fn inaccessible(path: &CanonicalPath, err: &ProbeError) -> PathError {
    PathError::Inaccessible {
        path: path.to_string(),
        reason: err.to_string(),
    }
}

/// Canonicalize `raw` through `probe` with the default hop limit.
///
/// # Errors
///
/// As for [`Canonicalizer::canonicalize`].
pub fn canonicalize<P: FilesystemProbe + ?Sized>(
    probe: &P,
    raw: &str,
    cwd: Option<&CanonicalPath>,
) -> Result<CanonicalPath, PathError> {
    Canonicalizer::new(probe).canonicalize(raw, cwd)
}
