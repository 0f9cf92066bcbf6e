//! TestWorld pattern for declarative test setup.
//!
//! Lays out a project log directory the way the assistant does:
//!
//! ```text
//! <tmp>/projects/-test-project/<session>.jsonl
//! <tmp>/projects/-test-project/<session>/subagents/agent-<id>.jsonl
//! <tmp>/projects/-test-project/agent-<id>.jsonl        (legacy)
//! ```

use anyhow::Result;
use assert_cmd::Command;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::fixtures::{SESSION_ID, to_jsonl};

/// Isolated temp directory with one session log.
///
/// # Example
/// ```no_run
/// use logweave_testing::{TestWorld, fixtures};
///
/// let world = TestWorld::new().with_session(&[fixtures::user_text("hi", 1)]);
/// assert!(world.session_path().exists());
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    project_dir: PathBuf,
    session_path: PathBuf,
    config_path: PathBuf,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    /// Create a new isolated test environment.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let project_dir = temp_dir.path().join("projects").join("-test-project");
        std::fs::create_dir_all(&project_dir).expect("Failed to create project dir");

        Self {
            session_path: project_dir.join(format!("{}.jsonl", SESSION_ID)),
            config_path: temp_dir.path().join("config.toml"),
            project_dir,
            temp_dir,
        }
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn session_path(&self) -> &Path {
        &self.session_path
    }

    /// Config file handed to the CLI; it only exists after `with_config`.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Write the session log from records.
    pub fn with_session(self, records: &[Value]) -> Self {
        self.with_raw_session(&to_jsonl(records))
    }

    /// Write the session log verbatim (for malformed-line tests).
    pub fn with_raw_session(self, text: &str) -> Self {
        std::fs::write(&self.session_path, text).expect("Failed to write session log");
        self
    }

    /// Write a side file under `<session>/subagents/`.
    pub fn with_subagent(self, agent_id: &str, records: &[Value]) -> Self {
        let dir = self.project_dir.join(SESSION_ID).join("subagents");
        std::fs::create_dir_all(&dir).expect("Failed to create subagents dir");
        self.write_side_file(&dir, agent_id, records)
    }

    /// Write a legacy side file next to the session log.
    pub fn with_legacy_subagent(self, agent_id: &str, records: &[Value]) -> Self {
        let dir = self.project_dir.clone();
        self.write_side_file(&dir, agent_id, records)
    }

    fn write_side_file(self, dir: &Path, agent_id: &str, records: &[Value]) -> Self {
        let path = dir.join(format!("agent-{}.jsonl", agent_id));
        std::fs::write(path, to_jsonl(records)).expect("Failed to write side file");
        self
    }

    pub fn with_config(self, toml: &str) -> Self {
        std::fs::write(&self.config_path, toml).expect("Failed to write config");
        self
    }

    /// Configure a CLI command with this test environment's settings.
    ///
    /// The caller provides the base command (e.g. `cargo_bin_cmd!("logweave")`).
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.env("LOGWEAVE_CONFIG", &self.config_path)
            .env_remove("RUST_LOG")
            .current_dir(self.temp_dir.path());
        cmd
    }

    /// Run `cmd` with `args` and capture its output.
    pub fn run(&self, mut cmd: Command, args: &[&str]) -> Result<CliResult> {
        self.configure_command(&mut cmd);
        let output = cmd.args(args).output()?;

        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Parse stdout as JSON.
    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_str(&self.stdout)?)
    }
}
