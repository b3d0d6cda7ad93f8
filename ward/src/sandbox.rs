//! A policy, its resolved roots and an engine, bundled for one working
//! directory.

use std::collections::HashMap;
use std::io;

use crate::config::Config;
use crate::engine::{Decision, DecisionEngine, Operation, Verdict};
use crate::error::{AccessDenied, Result};
use crate::path::FilesystemProbe;
use crate::policy::Policy;
use crate::roots::RootSet;

/// Gatekeeper for the filesystem calls of one sandboxed process.
///
/// The root set is resolved once, when the sandbox is created; every
/// decision still re-validates it against the live filesystem.
///
/// # Examples
///
/// ```
/// use ward::engine::{DenyReason, Operation};
/// use ward::path::MemoryProbe;
/// use ward::policy::Policy;
/// use ward::Sandbox;
///
/// let probe = MemoryProbe::new();
/// probe.mkdir_all(r"C:\ws").unwrap();
/// let sandbox = Sandbox::new(Policy::workspace_write(), r"C:\ws", &probe).unwrap();
///
/// let written = sandbox.perform(&Operation::write(r"C:\ws\out.txt"), |_| Ok(42)).unwrap();
/// assert_eq!(written, 42);
///
/// let err = sandbox
///     .perform(&Operation::write(r"C:\Windows\evil.dll"), |_| Ok(()))
///     .unwrap_err();
/// assert!(err.is_denied());
/// ```
#[derive(Debug)]
pub struct Sandbox<'p, P: ?Sized> {
    policy: Policy,
    roots: RootSet,
    engine: DecisionEngine,
    probe: &'p P,
}

impl<'p, P: FilesystemProbe + ?Sized> Sandbox<'p, P> {
    /// A sandbox with a default engine, resolving roots against `cwd` and
    /// the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `cwd` cannot be canonicalized.
    pub fn new(policy: Policy, cwd: &str, probe: &'p P) -> Result<Self> {
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::with_engine(policy, DecisionEngine::new(), cwd, probe, &env)
    }

    /// A sandbox with an explicit engine and environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `cwd` cannot be canonicalized.
    pub fn with_engine(
        policy: Policy,
        engine: DecisionEngine,
        cwd: &str,
        probe: &'p P,
        env: &HashMap<String, String>,
    ) -> Result<Self> {
        let roots = RootSet::resolve(&policy, cwd, &engine.canonicalizer(probe), env)?;
        Ok(Self {
            policy,
            roots,
            engine,
            probe,
        })
    }

    /// A sandbox as `config` describes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured policy does not compile, the
    /// state directory cannot be determined, or `cwd` cannot be
    /// canonicalized.
    pub fn from_config(config: &Config, cwd: &str, probe: &'p P) -> Result<Self> {
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::with_engine(config.policy()?, config.engine()?, cwd, probe, &env)
    }

    /// The compiled policy.
    #[must_use]
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// The resolved roots.
    #[must_use]
    pub fn roots(&self) -> &RootSet {
        &self.roots
    }

    /// The decision engine.
    #[must_use]
    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    /// Decide `op`.
    #[must_use]
    pub fn decide(&self, op: &Operation) -> Decision {
        self.check(op).decision()
    }

    /// Decide `op`, keeping the canonical paths for [`commit`](Self::commit).
    #[must_use]
    pub fn check(&self, op: &Operation) -> Verdict {
        self.engine
            .evaluate(op, &self.policy, &self.roots, self.probe)
    }

    /// Re-check `verdict` immediately before the filesystem call.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied`] if the verdict denies or no longer holds.
    pub fn commit(&self, op: &Operation, verdict: &Verdict) -> std::result::Result<(), AccessDenied> {
        self.engine
            .commit(op, verdict, &self.policy, &self.roots, self.probe)
    }

    /// Decide, commit, and only then run `action`.
    ///
    /// `action` receives the verdict, whose canonical target is the path the
    /// call should use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Denied`](crate::Error::Denied) if the operation is
    /// refused at either phase, and [`Error::Io`](crate::Error::Io) if
    /// `action` fails.
    pub fn perform<T, F>(&self, op: &Operation, action: F) -> Result<T>
    where
        F: FnOnce(&Verdict) -> io::Result<T>,
    {
        let verdict = self.check(op);
        self.commit(op, &verdict)?;
        Ok(action(&verdict)?)
    }
}
