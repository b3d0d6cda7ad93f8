//! Scenario suite mirroring the Windows sandbox smoke tests.
//!
//! Each case runs the decide-then-commit protocol for the filesystem call a
//! command would make, and checks that the call goes ahead exactly when
//! the sandbox should let it.

mod common;

use common::{host, sandbox, under, OUTSIDE, TEMP, WS};
use ward::engine::{Decision, DenyReason, Operation};
use ward::path::MemoryProbe;
use ward::{Error, Sandbox};

const JSON_ALLOWED: &str = r#"{"mode":"workspace-write","workspace_roots":[".\\allowed"]}"#;

/// Run `op` through decide and commit; create the target on success.
fn attempt(sandbox: &Sandbox<'_, MemoryProbe>, probe: &MemoryProbe, op: &Operation) -> Result<(), Error> {
    sandbox.perform(op, |verdict| {
        if let Some(target) = verdict.target() {
            probe.add_file(&target.to_string()).unwrap();
        }
        Ok(())
    })
}

fn denied_with(result: Result<(), Error>) -> Option<DenyReason> {
    match result {
        Err(Error::Denied(denied)) => Some(denied.reason),
        _ => None,
    }
}

#[test]
fn read_only_write_in_cwd_denied() {
    let probe = host();
    let sbx = sandbox("read-only", &probe);
    let target = under(WS, "ro_should_fail.txt");
    let result = attempt(&sbx, &probe, &Operation::create(&target));
    assert_eq!(denied_with(result), Some(DenyReason::ReadOnlyMode));
    assert!(!probe.exists(&target));
}

#[test]
fn workspace_write_in_cwd_allowed() {
    let probe = host();
    let sbx = sandbox("workspace-write", &probe);
    let target = under(WS, "ws_ok.txt");
    attempt(&sbx, &probe, &Operation::create(&target)).unwrap();
    assert!(probe.exists(&target));
}

#[test]
fn workspace_write_outside_workspace_denied() {
    let probe = host();
    let sbx = sandbox("workspace-write", &probe);
    let target = under(OUTSIDE, "blocked.txt");
    let result = attempt(&sbx, &probe, &Operation::create(&target));
    assert_eq!(denied_with(result), Some(DenyReason::OutsideRoots));
    assert!(!probe.exists(&target));
}

#[test]
fn workspace_write_temp_allowed() {
    let probe = host();
    let sbx = sandbox("workspace-write", &probe);
    attempt(&sbx, &probe, &Operation::create(under(TEMP, "ws_temp_ok.txt"))).unwrap();
}

#[test]
fn read_only_temp_denied() {
    let probe = host();
    let sbx = sandbox("read-only", &probe);
    let result = attempt(&sbx, &probe, &Operation::create(under(TEMP, "ro_tmpfail.txt")));
    assert_eq!(denied_with(result), Some(DenyReason::ReadOnlyMode));
}

#[test]
fn append_follows_policy() {
    let probe = host();
    let target = under(WS, "append.txt");
    probe.add_file(&target).unwrap();

    let ws = sandbox("workspace-write", &probe);
    assert!(ws.perform(&Operation::append(&target), |_| Ok(())).is_ok());

    let ro = sandbox("read-only", &probe);
    let result = ro.perform(&Operation::append(&target), |_| Ok(()));
    assert_eq!(denied_with(result), Some(DenyReason::ReadOnlyMode));
}

#[test]
fn mkdir_and_write_allowed() {
    let probe = host();
    let sbx = sandbox("workspace-write", &probe);
    sbx.perform(&Operation::mkdir(under(WS, "sub")), |_| Ok(()))
        .unwrap();
    probe.mkdir_all(&under(WS, "sub")).unwrap();
    attempt(&sbx, &probe, &Operation::create(under(WS, r"sub\in_sub.txt"))).unwrap();
    assert!(probe.exists(&under(WS, r"sub\in_sub.txt")));
}

#[test]
fn deep_mkdir_and_write_allowed() {
    let probe = host();
    let sbx = sandbox("workspace-write", &probe);
    assert_eq!(sbx.decide(&Operation::mkdir(r"deep\nest")), Decision::Allow);
    attempt(&sbx, &probe, &Operation::create(r"deep\nest\f.txt")).unwrap();
    assert!(probe.exists(&under(WS, r"deep\nest\f.txt")));
}

#[test]
fn rename_and_move_inside_workspace_allowed() {
    let probe = host();
    probe.add_file(&under(WS, "r.txt")).unwrap();
    let sbx = sandbox("workspace-write", &probe);
    let rename = Operation::rename("r.txt", "r2.txt");
    assert!(sbx.perform(&rename, |_| Ok(())).is_ok());

    let to_outside = Operation::rename("r.txt", under(OUTSIDE, "r.txt"));
    assert_eq!(
        sbx.decide(&to_outside),
        Decision::Deny(DenyReason::OutsideRoots)
    );
}

#[test]
fn delete_inside_workspace_allowed() {
    let probe = host();
    probe.add_file(&under(WS, "delme.txt")).unwrap();
    let sbx = sandbox("workspace-write", &probe);
    assert!(sbx.perform(&Operation::delete("delme.txt"), |_| Ok(())).is_ok());

    let ro = sandbox("read-only", &probe);
    assert_eq!(
        ro.decide(&Operation::delete("delme.txt")),
        Decision::Deny(DenyReason::ReadOnlyMode)
    );
}

#[test]
fn json_policy_allows_listed_root() {
    let probe = host();
    let sbx = sandbox(JSON_ALLOWED, &probe);
    let target = under(WS, r"allowed\in_allowed.txt");
    attempt(&sbx, &probe, &Operation::create(&target)).unwrap();
    assert!(probe.exists(&target));
}

#[test]
fn json_policy_denies_outside() {
    let probe = host();
    let sbx = sandbox(JSON_ALLOWED, &probe);
    let target = under(OUTSIDE, "json_blocked.txt");
    let result = attempt(&sbx, &probe, &Operation::create(&target));
    assert_eq!(denied_with(result), Some(DenyReason::OutsideRoots));
}

#[test]
fn json_policy_still_allows_cwd() {
    // The working directory stays writable when explicit roots are listed.
    let probe = host();
    let sbx = sandbox(JSON_ALLOWED, &probe);
    assert!(sbx.roots().implicit_cwd());

    let target = under(WS, "cwd_ok_under_json.txt");
    attempt(&sbx, &probe, &Operation::create(&target)).unwrap();
    assert!(probe.exists(&target));
}

#[test]
fn json_policy_without_implicit_cwd_confines_to_root() {
    let probe = host();
    let sbx = sandbox(
        r#"{"mode":"workspace-write","workspace_roots":[".\\allowed"],"implicit_cwd":false}"#,
        &probe,
    );
    assert!(!sbx.roots().implicit_cwd());
    assert_eq!(
        sbx.decide(&Operation::create("cwd_blocked.txt")),
        Decision::Deny(DenyReason::OutsideRoots)
    );
    assert_eq!(
        sbx.decide(&Operation::create(r"allowed\ok.txt")),
        Decision::Allow
    );
}

#[test]
fn json_unknown_mode_fails_closed() {
    let probe = host();
    let sbx = sandbox(r#"{"mode":"everything-goes"}"#, &probe);
    assert_eq!(
        sbx.decide(&Operation::create("f.txt")),
        Decision::Deny(DenyReason::UnrecognizedPolicy)
    );
}

#[test]
fn cmd_redirection_denied_under_read_only() {
    let probe = host();
    let sbx = sandbox("read-only", &probe);
    for op in [
        Operation::write("cmd_fail.txt"),
        Operation::mkdir("dir_fail"),
        Operation::rename("a.txt", "b.txt"),
    ] {
        assert_eq!(sbx.decide(&op), Decision::Deny(DenyReason::ReadOnlyMode), "{op}");
    }
}

#[test]
fn denied_call_maps_to_access_denied() {
    let probe = host();
    let sbx = sandbox("workspace-write", &probe);
    let err = attempt(&sbx, &probe, &Operation::write(under(OUTSIDE, "x"))).unwrap_err();
    let Error::Denied(denied) = err else {
        panic!("expected a denial");
    };
    let io = denied.to_io_error();
    assert_eq!(io.kind(), std::io::ErrorKind::PermissionDenied);
}
