//! Common test utilities for integration tests.
//!
//! Scenarios run against an in-memory host laid out like the Windows
//! smoke-test machine: a workspace, a directory outside it, and a TEMP
//! directory under the user profile.

use std::collections::HashMap;

use ward::path::MemoryProbe;
use ward::{DecisionEngine, Policy, Sandbox};

/// The workspace the sandboxed command runs in.
pub const WS: &str = r"C:\sbx_ws";

/// A directory outside every root.
pub const OUTSIDE: &str = r"C:\Users\me\sbx_ws_outside";

/// The user's temporary directory.
pub const TEMP: &str = r"C:\Users\me\AppData\Local\Temp";

/// A fresh host filesystem.
#[allow(dead_code)]
pub fn host() -> MemoryProbe {
    let probe = MemoryProbe::new();
    for dir in [WS, OUTSIDE, TEMP] {
        probe.mkdir_all(dir).unwrap();
    }
    probe.mkdir_all(&format!(r"{WS}\allowed")).unwrap();
    probe
}

/// The environment the sandboxed command sees.
#[allow(dead_code)]
pub fn env() -> HashMap<String, String> {
    HashMap::from([
        ("TEMP".to_string(), TEMP.to_string()),
        ("TMP".to_string(), TEMP.to_string()),
        ("USERPROFILE".to_string(), r"C:\Users\me".to_string()),
    ])
}

/// A sandbox for `policy` (preset or JSON) running in [`WS`].
#[allow(dead_code)]
pub fn sandbox<'p>(policy: &str, probe: &'p MemoryProbe) -> Sandbox<'p, MemoryProbe> {
    sandbox_with(policy, DecisionEngine::new(), probe)
}

/// A sandbox with a custom engine.
#[allow(dead_code)]
pub fn sandbox_with<'p>(
    policy: &str,
    engine: DecisionEngine,
    probe: &'p MemoryProbe,
) -> Sandbox<'p, MemoryProbe> {
    let policy = Policy::parse(policy).unwrap();
    Sandbox::with_engine(policy, engine, WS, probe, &env()).unwrap()
}

/// `name` joined onto `dir`.
#[allow(dead_code)]
pub fn under(dir: &str, name: &str) -> String {
    format!(r"{dir}\{name}")
}
