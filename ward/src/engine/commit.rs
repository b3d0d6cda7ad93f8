//! The commit-time re-check.

use std::fmt;

use log::debug;

use crate::engine::{Decision, DecisionEngine, DenyReason, Operation, Verdict};
use crate::error::{AccessDenied, ProbeError};
use crate::path::{CanonicalPath, FilesystemProbe};
use crate::policy::Policy;
use crate::roots::RootSet;

impl DecisionEngine {
    /// Re-check an allowed verdict immediately before the filesystem call.
    ///
    /// The operation is decided again from scratch, its canonical paths are
    /// compared with the ones `verdict` was made on, and the parent of each
    /// path is reached by walking open directory handles down from its root,
    /// refusing to cross any reparse point. Components that do not exist yet
    /// end the walk; the call that creates them fails on its own if they
    /// appear in the meantime.
    ///
    /// This narrows the window for a swap but cannot close it: the caller
    /// must issue the filesystem call right after a successful commit and
    /// must call `commit` again for every retry.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied`] with the verdict's own reason when `verdict`
    /// is a deny, with the fresh reason when the new decision denies, and
    /// with [`DenyReason::AncestryChanged`] when resolution or the handle
    /// walk disagrees with the verdict.
    pub fn commit<P: FilesystemProbe + ?Sized>(
        &self,
        op: &Operation,
        verdict: &Verdict,
        policy: &Policy,
        roots: &RootSet,
        probe: &P,
    ) -> Result<(), AccessDenied> {
        let shown = verdict
            .target()
            .map_or_else(|| op.target().to_string(), ToString::to_string);
        if let Decision::Deny(reason) = verdict.decision() {
            return Err(AccessDenied::new(reason, shown));
        }

        let fresh = self.evaluate(op, policy, roots, probe);
        if let Decision::Deny(reason) = fresh.decision() {
            debug!("commit of {op} refused: now {reason}");
            return Err(AccessDenied::new(reason, shown));
        }
        if fresh.target() != verdict.target() || fresh.destination() != verdict.destination() {
            debug!(
                "commit of {op} refused: resolved to {} instead of {shown}",
                fresh
                    .target()
                    .map_or_else(String::new, ToString::to_string)
            );
            return Err(AccessDenied::new(DenyReason::AncestryChanged, shown));
        }

        for path in [fresh.target(), fresh.destination()].into_iter().flatten() {
            verify_ancestry(path, roots, probe)?;
        }
        Ok(())
    }
}

fn changed(path: &CanonicalPath, detail: &dyn fmt::Display) -> AccessDenied {
    debug!("ancestry of {path} changed: {detail}");
    AccessDenied::new(DenyReason::AncestryChanged, path.to_string())
}

/// Walk from the root containing `path` down to its parent through open
/// handles, then check that the parent's path still names the directory
/// the walk opened.
fn verify_ancestry<P: FilesystemProbe + ?Sized>(
    path: &CanonicalPath,
    roots: &RootSet,
    probe: &P,
) -> Result<(), AccessDenied> {
    let Some(root) = roots.longest_match(path) else {
        return Err(AccessDenied::new(DenyReason::OutsideRoots, path.to_string()));
    };
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    // The path is the root itself; its own validity was just re-checked.
    let Some(walk) = parent.strip_prefix(root.path()) else {
        return Ok(());
    };

    let mut handle = probe
        .open_dir(root.path())
        .map_err(|e| changed(path, &e))?;
    for component in walk {
        match probe.open_relative(&handle, component.name()) {
            Ok(next) => handle = next,
            Err(ProbeError::NotFound { .. }) => return Ok(()),
            Err(e) => return Err(changed(path, &e)),
        }
    }

    // The directory the handles reached must still be the one the parent's
    // path names.
    let named = probe.stat(&parent).map_err(|e| changed(path, &e))?;
    match (handle.file_id(), named.and_then(|meta| meta.file_id)) {
        (Some(held), Some(now)) if held != now => Err(changed(
            path,
            &format!("{parent} is now a different directory ({held} opened, {now} named)"),
        )),
        _ => Ok(()),
    }
}
