//! The set of roots a policy designates writable.
//!
//! Roots are canonicalized once when the set is built and re-validated on
//! every decision: a root that has since been replaced by a reparse point,
//! removed, or turned into a file is unsafe and is never trusted.

use std::collections::HashMap;
use std::fmt;

use log::{debug, warn};

use crate::error::Result;
use crate::path::normalize::{expand_env_vars, expand_tilde};
use crate::path::{CanonicalPath, Canonicalizer, FilesystemProbe};
use crate::policy::Policy;

/// Environment variables naming temporary directories.
pub const TEMP_VARS: [&str; 2] = ["TEMP", "TMP"];

/// What a root permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    /// Nothing below this root may be modified.
    ReadOnly,
    /// Paths below this root may be modified.
    ReadWrite,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly => write!(f, "read-only"),
            Self::ReadWrite => write!(f, "read-write"),
        }
    }
}

/// Where a root came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootSource {
    /// Listed in the policy's workspace roots.
    Workspace,
    /// The implicit working-directory root.
    Cwd,
    /// `TEMP` or `TMP`.
    Temp,
    /// Listed in the policy's read-only roots.
    ReadOnlyCarveOut,
}

impl fmt::Display for RootSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Workspace => write!(f, "workspace"),
            Self::Cwd => write!(f, "cwd"),
            Self::Temp => write!(f, "temp"),
            Self::ReadOnlyCarveOut => write!(f, "read-only carve-out"),
        }
    }
}

/// A canonical directory plus the access it grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root {
    path: CanonicalPath,
    mode: AccessMode,
    source: RootSource,
}

impl Root {
    /// Create a root.
    #[must_use]
    pub fn new(path: CanonicalPath, mode: AccessMode, source: RootSource) -> Self {
        Self { path, mode, source }
    }

    /// The canonical path resolved when the set was built.
    #[must_use]
    pub fn path(&self) -> &CanonicalPath {
        &self.path
    }

    /// The access this root grants.
    #[must_use]
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Where this root came from.
    #[must_use]
    pub fn source(&self) -> RootSource {
        self.source
    }

    /// Whether the root still names the same directory.
    ///
    /// The stored path is resolved again through `canonicalizer`; the root
    /// is safe only if resolution yields the same canonical path and that
    /// path is still a plain directory.
    #[must_use]
    pub fn is_still_valid<P: FilesystemProbe + ?Sized>(
        &self,
        canonicalizer: &Canonicalizer<'_, P>,
    ) -> bool {
        match canonicalizer.recanonicalize(&self.path) {
            Ok(fresh) if fresh == self.path => {}
            Ok(fresh) => {
                debug!("root {} now resolves to {fresh}", self.path);
                return false;
            }
            Err(e) => {
                debug!("root {} no longer resolves: {e}", self.path);
                return false;
            }
        }
        matches!(canonicalizer.probe().stat(&self.path), Ok(Some(meta)) if meta.is_dir())
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.path, self.mode, self.source)
    }
}

/// The resolved roots of one policy, for one working directory.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use ward::path::{Canonicalizer, MemoryProbe};
/// use ward::policy::Policy;
/// use ward::roots::RootSet;
///
/// let probe = MemoryProbe::new();
/// probe.mkdir_all(r"C:\ws\allowed").unwrap();
///
/// let policy = Policy::parse(r#"{"mode":"workspace-write","workspace_roots":[".\\allowed"]}"#).unwrap();
/// let roots = RootSet::resolve(&policy, r"C:\ws", &Canonicalizer::new(&probe), &HashMap::new()).unwrap();
///
/// assert_eq!(roots.len(), 2);
/// assert!(roots.implicit_cwd());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootSet {
    roots: Vec<Root>,
    implicit_cwd: bool,
    cwd: CanonicalPath,
}

impl RootSet {
    /// Resolve the roots `policy` designates, against working directory
    /// `cwd`, expanding `%VAR%` references from `env`.
    ///
    /// Entries that cannot be resolved, do not exist as directories, or
    /// name a device, pipe or stream are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if `cwd` itself cannot be canonicalized.
    pub fn resolve<P: FilesystemProbe + ?Sized>(
        policy: &Policy,
        cwd: &str,
        canonicalizer: &Canonicalizer<'_, P>,
        env: &HashMap<String, String>,
    ) -> Result<Self> {
        let cwd = canonicalizer.canonicalize(cwd, None)?;
        let mut set = Self {
            roots: Vec::new(),
            implicit_cwd: false,
            cwd,
        };

        let Some(ws) = policy.workspace() else {
            return Ok(set);
        };

        for entry in &ws.writable_roots {
            set.add_entry(entry, AccessMode::ReadWrite, RootSource::Workspace, canonicalizer, env);
        }
        if ws.implicit_cwd {
            let cwd = set.cwd.clone();
            set.implicit_cwd = set.add(cwd, AccessMode::ReadWrite, RootSource::Cwd, canonicalizer);
        }
        if ws.include_temp {
            for var in TEMP_VARS {
                if let Some(value) = lookup(env, var) {
                    let value = value.to_string();
                    set.add_entry(&value, AccessMode::ReadWrite, RootSource::Temp, canonicalizer, env);
                }
            }
        }
        for entry in &ws.read_only_roots {
            set.add_entry(
                entry,
                AccessMode::ReadOnly,
                RootSource::ReadOnlyCarveOut,
                canonicalizer,
                env,
            );
        }

        Ok(set)
    }

    fn add_entry<P: FilesystemProbe + ?Sized>(
        &mut self,
        entry: &str,
        mode: AccessMode,
        source: RootSource,
        canonicalizer: &Canonicalizer<'_, P>,
        env: &HashMap<String, String>,
    ) {
        let resolved = expand_tilde(entry)
            .and_then(|expanded| expand_env_vars(&expanded, env))
            .and_then(|expanded| canonicalizer.canonicalize(&expanded, Some(&self.cwd)));
        match resolved {
            Ok(path) => {
                self.add(path, mode, source, canonicalizer);
            }
            Err(e) => warn!("skipping {source} root {entry:?}: {e}"),
        }
    }

    /// Add a root, returning whether the set now contains it.
    fn add<P: FilesystemProbe + ?Sized>(
        &mut self,
        path: CanonicalPath,
        mode: AccessMode,
        source: RootSource,
        canonicalizer: &Canonicalizer<'_, P>,
    ) -> bool {
        if path.class().is_never_permitted() {
            warn!("skipping {source} root {path}: {} paths cannot be roots", path.class());
            return false;
        }
        match canonicalizer.probe().stat(&path) {
            Ok(Some(meta)) if meta.is_dir() => {}
            Ok(_) => {
                warn!("skipping {source} root {path}: not an existing directory");
                return false;
            }
            Err(e) => {
                warn!("skipping {source} root {path}: {e}");
                return false;
            }
        }

        if let Some(existing) = self.roots.iter_mut().find(|r| r.path == path) {
            // A carve-out naming an existing root makes it read-only.
            if mode == AccessMode::ReadOnly {
                existing.mode = AccessMode::ReadOnly;
                existing.source = source;
            }
            return true;
        }

        debug!("root {path} ({mode}, {source})");
        self.roots.push(Root::new(path, mode, source));
        true
    }

    /// Build a set directly from already canonical roots.
    #[must_use]
    pub fn from_roots(cwd: CanonicalPath, roots: Vec<Root>) -> Self {
        let implicit_cwd = roots.iter().any(|r| r.source == RootSource::Cwd);
        Self {
            roots,
            implicit_cwd,
            cwd,
        }
    }

    /// The roots in resolution order.
    #[must_use]
    pub fn roots(&self) -> &[Root] {
        &self.roots
    }

    /// Number of roots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Whether no root was resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Whether the working directory was added as an implicit root.
    ///
    /// Under workspace-write the working directory stays writable even when
    /// an explicit root list is given, unless the policy sets
    /// `implicit_cwd: false`.
    #[must_use]
    pub fn implicit_cwd(&self) -> bool {
        self.implicit_cwd
    }

    /// The canonical working directory relative paths resolve against.
    #[must_use]
    pub fn cwd(&self) -> &CanonicalPath {
        &self.cwd
    }

    /// The root with the most components that contains `target`.
    #[must_use]
    pub fn longest_match(&self, target: &CanonicalPath) -> Option<&Root> {
        self.roots
            .iter()
            .filter(|root| target.starts_with(&root.path))
            .max_by_key(|root| root.path.components().len())
    }
}

fn lookup<'a>(env: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    env.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Resolve the roots of `policy` against `cwd` using the process
/// environment and the default hop limit.
///
/// # Errors
///
/// Returns an error if `cwd` cannot be canonicalized.
pub fn resolve_roots<P: FilesystemProbe + ?Sized>(
    policy: &Policy,
    cwd: &str,
    probe: &P,
) -> Result<RootSet> {
    let env: HashMap<String, String> = std::env::vars().collect();
    RootSet::resolve(policy, cwd, &Canonicalizer::new(probe), &env)
}
