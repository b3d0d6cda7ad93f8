//! Integration tests for `ward check` on the host filesystem.
//!
//! Exit status is the decision: 0 allowed, 1 denied. Usage mistakes
//! that clap does not catch exit with 4, bad policies with 7.

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_write_inside_workspace_is_allowed() {
    let env = TestEnv::new();
    let target = env.ws_path("new.txt");
    env.check("create", &target)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("allow: create"))
        .stdout(predicate::str::contains(target.to_string_lossy().into_owned()));
}

#[test]
fn test_write_outside_workspace_is_denied() {
    let env = TestEnv::new();
    let outside = env.create_dir("outside");
    env.check("create", &outside.join("f.txt"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("deny (outside-roots)"))
        .stderr(predicate::str::contains("access denied (outside-roots)"));
}

#[test]
fn test_relative_path_resolves_against_cwd() {
    let env = TestEnv::new();
    env.command()
        .args(["check", "write", "sub/../f.txt", "--cwd"])
        .arg(&env.ws)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            env.ws_path("f.txt").to_string_lossy().into_owned(),
        ));
}

#[test]
fn test_read_only_policy_denies_everything() {
    let env = TestEnv::new();
    env.check("mkdir", &env.ws_path("build"))
        .args(["--policy", "read-only"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("read-only-mode"));
}

#[test]
fn test_git_directory_is_protected() {
    let env = TestEnv::new();
    env.check("write", &env.ws_path(".git/config"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("protected-path-name"));
}

#[test]
fn test_state_directory_is_protected() {
    let env = TestEnv::new();
    let state = env.state_dir.clone();
    let json = format!(
        r#"{{"mode":"workspace-write","workspace_roots":[{:?}],"include_temp":false}}"#,
        env.temp_path.to_string_lossy()
    );
    env.check("create", &state.join("session.json"))
        .args(["--policy", &json])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("protected-path-name"));
}

#[test]
fn test_reserved_device_name_is_denied() {
    let env = TestEnv::new();
    env.check("write", &env.ws_path("NUL"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("device-or-pipe"));
}

#[test]
fn test_alternate_stream_is_denied() {
    let env = TestEnv::new();
    env.check("write", &env.ws_path("f.txt:hidden"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("alternate-stream"));
}

#[test]
fn test_json_policy_limits_roots() {
    let env = TestEnv::new();
    let allowed = env.ws_path("allowed");
    std::fs::create_dir_all(&allowed).unwrap();
    let json = format!(
        r#"{{"mode":"workspace-write","workspace_roots":[{:?}],"implicit_cwd":false,"include_temp":false}}"#,
        allowed.to_string_lossy()
    );

    env.check("create", &allowed.join("f.txt"))
        .args(["--policy", &json])
        .assert()
        .success();
    env.check("create", &env.ws_path("f.txt"))
        .args(["--policy", &json])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("outside-roots"));
}

#[test]
fn test_json_output() {
    let env = TestEnv::new();
    let output = env
        .check("append", &env.ws_path("log.txt"))
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["operation"], "append");
    assert_eq!(report["decision"], "allow");
    assert!(report["reason"].is_null());
    assert_eq!(
        report["target"],
        env.ws_path("log.txt").to_string_lossy().into_owned()
    );
}

#[test]
fn test_json_output_on_deny() {
    let env = TestEnv::new();
    let output = env
        .check("write", &env.temp_path.join("elsewhere.txt"))
        .args(["--format", "json"])
        .env_remove("TEMP")
        .env_remove("TMP")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["decision"], "deny");
    assert_eq!(report["reason"], "outside-roots");
}

#[test]
fn test_deleting_the_workspace_root_is_denied() {
    let env = TestEnv::new();
    let output = env
        .check("delete", &env.ws)
        .args(["--format", "json"])
        .env_remove("TEMP")
        .env_remove("TMP")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["reason"], "root-itself-unsafe");
}

#[test]
fn test_rename_checks_both_ends() {
    let env = TestEnv::new();
    let outside = env.create_dir("outside");
    env.command()
        .arg("check")
        .arg("rename")
        .arg(env.ws_path("a.txt"))
        .arg(env.ws_path("b.txt"))
        .arg("--cwd")
        .arg(&env.ws)
        .assert()
        .success()
        .stdout(predicate::str::contains(" -> "));

    env.command()
        .arg("check")
        .arg("rename")
        .arg(env.ws_path("a.txt"))
        .arg(outside.join("b.txt"))
        .arg("--cwd")
        .arg(&env.ws)
        .assert()
        .code(1);
}

#[test]
fn test_rename_requires_destination() {
    let env = TestEnv::new();
    env.check("rename", &env.ws_path("a.txt"))
        .assert()
        .code(4)
        .stderr(predicate::str::contains("DESTINATION"));
}

#[test]
fn test_destination_only_for_rename() {
    let env = TestEnv::new();
    env.check("write", &env.ws_path("a.txt"))
        .arg(env.ws_path("b.txt"))
        .assert()
        .code(4);
}

#[test]
fn test_invalid_policy_is_a_configuration_error() {
    let env = TestEnv::new();
    env.check("write", &env.ws_path("a.txt"))
        .args(["--policy", "danger-full-access"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("cannot load configuration"));
}

#[test]
fn test_unknown_mode_fails_closed() {
    let env = TestEnv::new();
    env.check("write", &env.ws_path("a.txt"))
        .args(["--policy", r#"{"mode":"workspace-write-plus"}"#])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("unrecognized-policy"));
}

#[test]
fn test_commit_flag_on_allowed_operation() {
    let env = TestEnv::new();
    std::fs::create_dir_all(env.ws_path("src/deep")).unwrap();
    env.check("create", &env.ws_path("src/deep/f.rs"))
        .arg("--commit")
        .assert()
        .success();
}

#[test]
fn test_quiet_deny_prints_nothing() {
    let env = TestEnv::new();
    let outside = env.create_dir("outside");
    env.check("create", &outside.join("f.txt"))
        .arg("--quiet")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_policy_from_environment() {
    let env = TestEnv::new();
    env.check("create", &env.ws_path("f.txt"))
        .env("WARD_POLICY", "read-only")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("read-only-mode"));
}

#[cfg(unix)]
#[test]
fn test_symlink_escape_is_denied() {
    let env = TestEnv::new();
    let outside = env.create_dir("outside");
    std::os::unix::fs::symlink(&outside, env.ws_path("escape")).unwrap();

    env.check("create", &env.ws_path("escape/f.txt"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("outside-roots"))
        .stdout(predicate::str::contains(
            outside.join("f.txt").to_string_lossy().into_owned(),
        ));
}
