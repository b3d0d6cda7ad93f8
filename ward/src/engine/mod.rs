//! The decision engine.
//!
//! A decision canonicalizes the requested path through the live
//! filesystem, rejects device, pipe and stream classes outright, and then
//! requires the canonical path to lie inside a writable root without
//! touching a protected name. Nothing is cached between decisions: roots
//! are re-validated and paths re-resolved every time.
//!
//! Allowing is a two-phase protocol. [`DecisionEngine::evaluate`] produces a
//! [`Verdict`]; [`DecisionEngine::commit`] re-checks it immediately before
//! the filesystem call and refuses if anything along the way has moved.

mod commit;
mod decision;
mod operation;
mod protected;

pub use decision::{Decision, DenyReason, Verdict};
pub use operation::{Operation, OperationKind};
pub use protected::{ProtectedNames, DEFAULT_PROTECTED_NAMES};

use log::debug;

use crate::path::normalize::expand_tilde;
use crate::path::{
    CanonicalPath, Canonicalizer, FilesystemProbe, PathClass, MAX_REPARSE_HOPS,
};
use crate::policy::Policy;
use crate::roots::{AccessMode, RootSet};

/// Decides whether mutating operations may proceed.
///
/// The engine carries only configuration; the policy, root set and probe
/// are passed to every call, so one engine serves any number of threads.
///
/// # Examples
///
/// ```
/// use ward::engine::{Decision, DecisionEngine, DenyReason, Operation};
/// use ward::path::MemoryProbe;
/// use ward::policy::Policy;
/// use ward::roots::resolve_roots;
///
/// let probe = MemoryProbe::new();
/// probe.mkdir_all(r"C:\ws\.git").unwrap();
///
/// let policy = Policy::workspace_write();
/// let roots = resolve_roots(&policy, r"C:\ws", &probe).unwrap();
/// let engine = DecisionEngine::new();
///
/// let ok = engine.decide(&Operation::write(r"src\main.rs"), &policy, &roots, &probe);
/// assert_eq!(ok, Decision::Allow);
///
/// let hook = engine.decide(&Operation::write(r".GIT\hooks\pre-commit"), &policy, &roots, &probe);
/// assert_eq!(hook, Decision::Deny(DenyReason::ProtectedPathName));
/// ```
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    protected: ProtectedNames,
    state_dirs: Vec<String>,
    max_hops: usize,
}

impl DecisionEngine {
    /// An engine protecting the default names, with no state directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            protected: ProtectedNames::default(),
            state_dirs: Vec::new(),
            max_hops: MAX_REPARSE_HOPS,
        }
    }

    /// Protect additional component names.
    #[must_use]
    pub fn with_protected_names<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.protected.extend(names);
        self
    }

    /// Protect everything inside `dir`.
    ///
    /// The directory is re-canonicalized on every decision, so it stays
    /// protected when reached through a link created later.
    #[must_use]
    pub fn with_state_dir(mut self, dir: impl Into<String>) -> Self {
        self.state_dirs.push(dir.into());
        self
    }

    /// Bound the reparse points followed per path.
    #[must_use]
    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    /// The protected names.
    #[must_use]
    pub fn protected_names(&self) -> &ProtectedNames {
        &self.protected
    }

    /// The protected state directories, as configured.
    #[must_use]
    pub fn state_dirs(&self) -> &[String] {
        &self.state_dirs
    }

    /// The reparse hop limit.
    #[must_use]
    pub fn max_hops(&self) -> usize {
        self.max_hops
    }

    /// A canonicalizer over `probe` using this engine's hop limit.
    pub fn canonicalizer<'p, P: FilesystemProbe + ?Sized>(
        &self,
        probe: &'p P,
    ) -> Canonicalizer<'p, P> {
        Canonicalizer::new(probe).with_max_hops(self.max_hops)
    }

    /// Decide `op`.
    #[must_use]
    pub fn decide<P: FilesystemProbe + ?Sized>(
        &self,
        op: &Operation,
        policy: &Policy,
        roots: &RootSet,
        probe: &P,
    ) -> Decision {
        self.evaluate(op, policy, roots, probe).decision()
    }

    /// Decide `op`, keeping the canonical paths the decision was made on.
    ///
    /// Every failure to resolve a path is a deny with
    /// [`DenyReason::Unresolvable`]; nothing here errors or panics.
    #[must_use]
    pub fn evaluate<P: FilesystemProbe + ?Sized>(
        &self,
        op: &Operation,
        policy: &Policy,
        roots: &RootSet,
        probe: &P,
    ) -> Verdict {
        let canonicalizer = self.canonicalizer(probe);

        // Delete and rename act on the entry itself; a link in the final
        // position is judged where it lives, not where it points.
        let resolved = if op.kind().removes_target() {
            canonicalizer.canonicalize_entry(op.target(), Some(roots.cwd()))
        } else {
            canonicalizer.canonicalize(op.target(), Some(roots.cwd()))
        };
        let target = match resolved {
            Ok(path) => path,
            Err(e) => {
                debug!("deny {} {:?}: unresolvable: {e}", op.kind(), op.target());
                return Verdict::new(Decision::Deny(DenyReason::Unresolvable), None, None);
            }
        };
        let decision = self.check(op, op.target(), &target, policy, roots, &canonicalizer);
        if !decision.is_allow() || op.kind() != OperationKind::Rename {
            return Verdict::new(decision, Some(target), None);
        }

        let Some(raw) = op.destination() else {
            debug!("deny {op:?}: rename without a destination");
            return Verdict::new(Decision::Deny(DenyReason::Unresolvable), Some(target), None);
        };
        let destination = match canonicalizer.canonicalize_entry(raw, Some(roots.cwd())) {
            Ok(path) => path,
            Err(e) => {
                debug!("deny {} destination {raw:?}: unresolvable: {e}", op.kind());
                return Verdict::new(Decision::Deny(DenyReason::Unresolvable), Some(target), None);
            }
        };
        let decision = self.check(op, raw, &destination, policy, roots, &canonicalizer);
        Verdict::new(decision, Some(target), Some(destination))
    }

    fn check<P: FilesystemProbe + ?Sized>(
        &self,
        op: &Operation,
        raw: &str,
        path: &CanonicalPath,
        policy: &Policy,
        roots: &RootSet,
        canonicalizer: &Canonicalizer<'_, P>,
    ) -> Decision {
        match self.deny_reason(op.kind(), path, policy, roots, canonicalizer) {
            Some(reason) => {
                debug!("deny {} {raw:?} ({path}): {reason}", op.kind());
                Decision::Deny(reason)
            }
            None => Decision::Allow,
        }
    }

    fn deny_reason<P: FilesystemProbe + ?Sized>(
        &self,
        kind: OperationKind,
        path: &CanonicalPath,
        policy: &Policy,
        roots: &RootSet,
        canonicalizer: &Canonicalizer<'_, P>,
    ) -> Option<DenyReason> {
        match path.class() {
            PathClass::Device | PathClass::NamedPipe => return Some(DenyReason::DeviceOrPipe),
            PathClass::AlternateDataStream => return Some(DenyReason::AlternateStream),
            PathClass::Regular | PathClass::UncShare | PathClass::LongPathEscape => {}
        }

        match policy {
            Policy::ReadOnly => return Some(DenyReason::ReadOnlyMode),
            Policy::FailClosed { .. } => return Some(DenyReason::UnrecognizedPolicy),
            Policy::WorkspaceWrite(_) => {}
        }

        let Some(root) = roots.longest_match(path) else {
            return Some(DenyReason::OutsideRoots);
        };
        // A root may only be removed when an enclosing root covers it.
        if kind.removes_target()
            && root.path() == path
            && !roots
                .roots()
                .iter()
                .any(|r| r.path() != path && path.starts_with(r.path()))
        {
            return Some(DenyReason::RootItselfUnsafe);
        }
        if !root.is_still_valid(canonicalizer) {
            return Some(DenyReason::RootItselfUnsafe);
        }
        if root.mode() == AccessMode::ReadOnly {
            return Some(DenyReason::ReadOnlyMode);
        }

        let below = path.strip_prefix(root.path()).unwrap_or_default();
        if self.protected.find(below).is_some() {
            return Some(DenyReason::ProtectedPathName);
        }
        if self.touches_state_dir(kind, path, roots, canonicalizer) {
            return Some(DenyReason::ProtectedPathName);
        }
        None
    }

    fn touches_state_dir<P: FilesystemProbe + ?Sized>(
        &self,
        kind: OperationKind,
        path: &CanonicalPath,
        roots: &RootSet,
        canonicalizer: &Canonicalizer<'_, P>,
    ) -> bool {
        self.state_dirs.iter().any(|raw| {
            let state = match expand_tilde(raw)
                .and_then(|dir| canonicalizer.canonicalize(&dir, Some(roots.cwd())))
            {
                Ok(state) => state,
                Err(e) => {
                    debug!("state directory {raw:?} does not resolve: {e}");
                    return false;
                }
            };
            path.starts_with(&state) || (kind.removes_target() && state.starts_with(path))
        })
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Decide `op` with a default engine.
#[must_use]
pub fn decide<P: FilesystemProbe + ?Sized>(
    op: &Operation,
    policy: &Policy,
    roots: &RootSet,
    probe: &P,
) -> Decision {
    DecisionEngine::new().decide(op, policy, roots, probe)
}
