//! Integration tests for `roots`, `canonicalize` and `show-config`.

mod common;

use common::TestEnv;
use predicates::prelude::*;

fn lossy(path: &std::path::Path) -> String {
    path.to_string_lossy().into_owned()
}

#[test]
fn test_roots_include_implicit_cwd() {
    let env = TestEnv::new();
    let output = env
        .command()
        .args(["roots", "--format", "json", "--cwd"])
        .arg(&env.ws)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["policy"], "workspace-write");
    assert_eq!(report["implicit_cwd"], true);
    let roots = report["roots"].as_array().unwrap();
    assert!(roots
        .iter()
        .any(|r| r["path"] == lossy(&env.ws).as_str() && r["source"] == "cwd"));
}

#[test]
fn test_roots_from_json_policy() {
    let env = TestEnv::new();
    let allowed = env.ws_path("allowed");
    std::fs::create_dir_all(allowed.join("vendor")).unwrap();
    let json = format!(
        r#"{{"mode":"workspace-write","workspace_roots":[{:?}],"read_only_roots":[{:?}],"implicit_cwd":false,"include_temp":false}}"#,
        lossy(&allowed),
        lossy(&allowed.join("vendor"))
    );

    env.command()
        .args(["roots", "--policy", &json, "--cwd"])
        .arg(&env.ws)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "read-write\tworkspace\t{}",
            lossy(&allowed)
        )))
        .stdout(predicate::str::contains("read-only\tread-only carve-out"))
        .stdout(predicate::str::contains("\tcwd\t").not());
}

#[test]
fn test_roots_under_read_only_policy() {
    let env = TestEnv::new();
    env.command()
        .args(["roots", "--policy", "read-only", "--cwd"])
        .arg(&env.ws)
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("No writable roots"));
}

#[test]
fn test_canonicalize_removes_dots() {
    let env = TestEnv::new();
    env.command()
        .args(["canonicalize", "./a/../b/./c.txt", "--cwd"])
        .arg(&env.ws)
        .assert()
        .success()
        .stdout(predicate::str::diff(format!(
            "{}\n",
            lossy(&env.ws_path("b/c.txt"))
        )));
}

#[test]
fn test_canonicalize_reports_class() {
    let env = TestEnv::new();
    let output = env
        .command()
        .args(["canonicalize", "COM1", "--format", "json", "--cwd"])
        .arg(&env.ws)
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["class"], "device");
}

#[cfg(unix)]
#[test]
fn test_canonicalize_follows_symlinks() {
    let env = TestEnv::new();
    let real = env.create_dir("real");
    std::os::unix::fs::symlink(&real, env.ws_path("link")).unwrap();

    env.command()
        .args(["canonicalize", "link/f.txt", "--verbose", "--cwd"])
        .arg(&env.ws)
        .assert()
        .success()
        .stdout(predicate::str::contains(lossy(&real.join("f.txt"))))
        .stdout(predicate::str::contains("(regular)"));
}

#[test]
fn test_canonicalize_invalid_path() {
    let env = TestEnv::new();
    env.command()
        .args(["canonicalize", "//server", "--cwd"])
        .arg(&env.ws)
        .assert()
        .code(6)
        .stderr(predicate::str::contains("malformed"));
}

#[test]
fn test_show_config_merges_file_and_options() {
    let env = TestEnv::new();
    let file = env.write_file(
        "extra.yaml",
        "policy: read-only\nextra_protected_names: [secrets]\nmax_reparse_hops: 4\n",
    );

    env.command()
        .arg("--config")
        .arg(&file)
        .arg("show-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("policy: read-only"))
        .stdout(predicate::str::contains("- secrets"))
        .stdout(predicate::str::contains("max_reparse_hops: 4"))
        .stdout(predicate::str::contains(lossy(&env.state_dir)));
}

#[test]
fn test_state_dir_config_file_is_loaded() {
    let env = TestEnv::new();
    std::fs::write(env.state_dir.join("ward.yaml"), "policy: read-only\n").unwrap();

    env.check("create", &env.ws_path("f.txt"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("read-only-mode"));
}
