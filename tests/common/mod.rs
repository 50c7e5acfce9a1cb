//! Common utilities for integration tests
//!
//! Every command runs against its own temporary workspace selected through
//! `SKILLSPRINT_DIR`, with `HOME` pointed away from the real home directory.

#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

pub const TEST_USER: &str = "tester";

/// A `sprint` command bound to the workspace at `dir`
pub fn sprint_command(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sprint"));
    cmd.current_dir(dir)
        .env("SKILLSPRINT_DIR", dir)
        .env("SKILLSPRINT_USER", TEST_USER)
        .env("HOME", "/nonexistent")
        .env("USERPROFILE", "/nonexistent")
        .env_remove("RUST_LOG")
        .env_remove("SPRINT_LOG_FILE");
    cmd
}

/// Create a temporary directory with an initialized workspace
pub fn setup_workspace() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    sprint_command(temp_dir.path())
        .args(["init", "--format", "json"])
        .assert()
        .success();
    temp_dir
}

/// Run a command with `--format json` and parse its stdout
pub fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = sprint_command(dir)
        .args(args)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "command {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

pub fn add_project(dir: &Path, name: &str) -> String {
    let project = run_json(dir, &["project", "add", name]);
    project["id"].as_str().unwrap().to_string()
}

pub fn add_task(dir: &Path, project: &str, title: &str, due: &str) -> String {
    let task = run_json(dir, &["task", "add", title, "-p", project, "--due", due]);
    task["id"].as_str().unwrap().to_string()
}

/// Task titles of a JSON task array, in order
pub fn titles(tasks: &Value) -> Vec<String> {
    tasks
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect()
}
