//! Shared fixtures for CLI specs

use assert_cmd::Command;
use std::ffi::OsStr;
use std::path::Path;
use tempfile::TempDir;

/// A temporary operation log directory
pub struct Store {
    dir: TempDir,
}

impl Store {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// `oplog` scoped to this store, with a clean environment
    pub fn oplog(&self) -> CliBuilder {
        self.oplog_bare().args_os(&[OsStr::new("--dir"), self.path().as_os_str()])
    }

    /// `oplog` with no `--dir`, so the directory comes from env or config
    pub fn oplog_bare(&self) -> CliBuilder {
        let mut cmd = Command::cargo_bin("oplog").unwrap();
        cmd.env_remove("OPLOG_DIR").env_remove("RUST_LOG");
        CliBuilder { cmd }
    }

    /// Log an operation on `plan` at `timestamp`
    pub fn log(&self, id: &str, plan: &str, timestamp: i64) {
        self.oplog()
            .args(&[
                "log",
                "update",
                "--id",
                id,
                "--plan",
                plan,
                "--timestamp",
                &timestamp.to_string(),
            ])
            .passes();
    }

    pub fn file(&self, name: &str, content: &str) {
        std::fs::write(self.path().join(name), content).unwrap();
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.path().join(name)).unwrap()
    }
}

pub struct CliBuilder {
    cmd: Command,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn args_os(mut self, args: &[&OsStr]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn passes(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert::from(output);
        assert!(
            run.success,
            "expected success, got failure\nstdout:\n{}\nstderr:\n{}",
            run.stdout, run.stderr
        );
        run
    }

    pub fn fails(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert::from(output);
        assert!(
            !run.success,
            "expected failure, got success\nstdout:\n{}",
            run.stdout
        );
        run
    }
}

pub struct RunAssert {
    success: bool,
    stdout: String,
    stderr: String,
}

impl From<std::process::Output> for RunAssert {
    fn from(output: std::process::Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl RunAssert {
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout, expected);
        self
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(
            self.stdout.contains(needle),
            "stdout missing {needle:?}\nstdout:\n{}",
            self.stdout
        );
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        assert!(
            !self.stdout.contains(needle),
            "stdout unexpectedly has {needle:?}\nstdout:\n{}",
            self.stdout
        );
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(
            self.stderr.contains(needle),
            "stderr missing {needle:?}\nstderr:\n{}",
            self.stderr
        );
        self
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout).unwrap()
    }

    /// Ids of operations printed as a JSON array
    pub fn json_ids(&self) -> Vec<String> {
        self.json()
            .as_array()
            .unwrap()
            .iter()
            .map(|op| op["id"].as_str().unwrap().to_string())
            .collect()
    }
}
