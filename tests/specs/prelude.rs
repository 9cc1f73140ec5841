//! Shared helpers for CLI specs

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Output;
use tempfile::TempDir;

/// Entrypoint used by most specs
pub const HELLO_FIXTURE: &str = "#!/bin/sh\necho \"Hello Fixture\" >&2\n";

/// Config that keeps `consume --once` from long-polling an empty queue
pub const QUICK_CONFIG: &str = "receive_wait = \"100ms\"\n";

/// Scratch area holding a spool, payload sources and a config file
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        let project = Self {
            dir: TempDir::new().unwrap(),
        };
        project.file("gantry.toml", QUICK_CONFIG);
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn queue_dir(&self) -> PathBuf {
        self.path().join("queue")
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("gantry.toml")
    }

    /// Write a file relative to the project, creating parents
    pub fn file(&self, rel: &str, contents: &str) {
        let path = self.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    /// Write a file and set its permission bits
    pub fn file_with_mode(&self, rel: &str, contents: &str, mode: u32) {
        self.file(rel, contents);
        fs::set_permissions(self.path().join(rel), fs::Permissions::from_mode(mode)).unwrap();
    }

    /// Write an executable script
    pub fn script(&self, rel: &str, contents: &str) {
        self.file_with_mode(rel, contents, 0o755);
    }

    /// Number of messages left in the spool
    pub fn queued(&self) -> usize {
        let Ok(entries) = fs::read_dir(self.queue_dir().join("messages")) else {
            return 0;
        };
        entries
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().is_some_and(|x| x == "json"))
            .count()
    }

    /// `gantry` pointed at this project's spool and config
    pub fn gantry(&self) -> CliBuilder {
        let mut cmd = gantry_bare();
        cmd.current_dir(self.path())
            .arg("--queue-dir")
            .arg(self.queue_dir())
            .arg("--config")
            .arg(self.config_path());
        CliBuilder { cmd }
    }

    /// Publish `rel` with the given bindings and return the message id
    pub fn publish(&self, rel: &str, env: &[&str]) -> String {
        let mut args = vec!["publish", "--dir", rel];
        for binding in env {
            args.push("-e");
            args.push(binding);
        }
        let out = self.gantry().args(&args).passes().stdout();
        out.trim()
            .strip_prefix("Published: ")
            .unwrap_or_else(|| panic!("unexpected publish output: {out:?}"))
            .to_string()
    }
}

fn gantry_bare() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("gantry").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

/// `gantry` with no project
pub fn cli() -> CliBuilder {
    CliBuilder { cmd: gantry_bare() }
}

pub struct CliBuilder {
    cmd: assert_cmd::Command,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn passes(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert { output };
        assert!(
            run.output.status.success(),
            "expected success, got {:?}\nstdout:\n{}\nstderr:\n{}",
            run.output.status,
            run.stdout(),
            run.stderr()
        );
        run
    }

    pub fn fails(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert { output };
        assert!(
            !run.output.status.success(),
            "expected failure\nstdout:\n{}\nstderr:\n{}",
            run.stdout(),
            run.stderr()
        );
        run
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout(), expected);
        self
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(needle), "stdout lacks {needle:?}:\n{stdout}");
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        let stderr = self.stderr();
        assert!(stderr.contains(needle), "stderr lacks {needle:?}:\n{stderr}");
        self
    }

    pub fn stderr_lacks(self, needle: &str) -> Self {
        let stderr = self.stderr();
        assert!(!stderr.contains(needle), "stderr has {needle:?}:\n{stderr}");
        self
    }
}
