//! Scratch workspace and `ward` command builders for the CLI tests.

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Environment variables that would leak the caller's configuration.
const ISOLATED_VARS: [&str; 5] = [
    "WARD_POLICY",
    "WARD_STATE_DIR",
    "WARD_MAX_REPARSE_HOPS",
    "WARD_PROTECTED_NAMES",
    "WARD_LOG_MODE",
];

/// A temporary tree holding `ws/` (with `.git/`) and `state/`.
pub struct TestEnv {
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Resolved path of the temporary directory
    pub temp_path: PathBuf,
    /// The workspace commands run in
    pub ws: PathBuf,
    /// The sandbox state directory
    pub state_dir: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        // Symlinked temp roots (macOS /var) would show up in canonical output
        let temp_path = temp_dir
            .path()
            .canonicalize()
            .expect("canonical tempdir");
        let ws = temp_path.join("ws");
        let state_dir = temp_path.join("state");
        std::fs::create_dir_all(ws.join(".git")).expect("create ws/.git");
        std::fs::create_dir_all(&state_dir).expect("create state dir");

        Self {
            temp_dir,
            temp_path,
            ws,
            state_dir,
        }
    }

    /// A command with no flags and the `WARD_*` environment cleared.
    pub fn command_bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("ward").expect("ward binary");
        for var in ISOLATED_VARS {
            cmd.env_remove(var);
        }
        cmd
    }

    /// [`Self::command_bare`] plus `--state-dir`.
    pub fn command(&self) -> Command {
        let mut cmd = self.command_bare();
        cmd.arg("--state-dir").arg(&self.state_dir);
        cmd
    }

    /// A `check` command for `op` on `path`, run in the workspace.
    pub fn check(&self, op: &str, path: &Path) -> Command {
        let mut cmd = self.command();
        cmd.arg("check")
            .arg(op)
            .arg(path)
            .arg("--cwd")
            .arg(&self.ws);
        cmd
    }

    /// `rel` inside the workspace.
    pub fn ws_path(&self, rel: &str) -> PathBuf {
        self.ws.join(rel)
    }

    /// `mkdir -p` under the temporary root.
    pub fn create_dir(&self, name: &str) -> PathBuf {
        let path = self.temp_path.join(name);
        std::fs::create_dir_all(&path).expect("create dir");
        path
    }

    /// Write `contents` to `name` under the temporary root.
    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_path.join(name);
        std::fs::write(&path, contents).expect("write file");
        path
    }
}
