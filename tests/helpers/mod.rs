#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use gw::exec::{ToolExecutor, ToolPrograms};
use gw::security::{ExecutionContext, Prompter, ProtectedResourceSet, Registry, SafetyGate};
use gw::Pipeline;

fn git(repo_path: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Helper to create a test git repository with `main` checked out
pub fn create_test_repo() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let repo_path = temp_dir.path().to_path_buf();

    git(&repo_path, &["init", "-q"]);
    git(&repo_path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(&repo_path, &["config", "user.name", "Test User"]);
    git(&repo_path, &["config", "user.email", "test@example.com"]);
    git(&repo_path, &["config", "commit.gpgsign", "false"]);

    (temp_dir, repo_path)
}

/// Helper to create a commit
pub fn create_commit(repo_path: &Path, file: &str, content: &str, message: &str) {
    fs::write(repo_path.join(file), content).expect("Failed to write file");
    git(repo_path, &["add", file]);
    git(repo_path, &["commit", "-q", "-m", message]);
}

/// Prompter that answers from a fixed script and counts how often it was asked
pub struct ScriptedPrompter {
    pub answer: bool,
    pub asked: usize,
}

impl ScriptedPrompter {
    pub fn answering(answer: bool) -> Self {
        Self { answer, asked: 0 }
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, _prompt: &str) -> std::io::Result<bool> {
        self.asked += 1;
        Ok(self.answer)
    }
}

/// Pipeline over real git, a gh that cannot be found, and default protection
pub fn pipeline_in(repo_path: &Path, interactive: bool, answer: bool) -> Pipeline<ScriptedPrompter> {
    pipeline_with_gh(repo_path, "gw-test-missing-gh", interactive, answer)
}

/// Same, with `gh` pointing at `gh_program`
pub fn pipeline_with_gh(repo_path: &Path, gh_program: &str, interactive: bool, answer: bool) -> Pipeline<ScriptedPrompter> {
    let executor = ToolExecutor::new(repo_path).with_programs(ToolPrograms {
        git: "git".to_string(),
        gh: gh_program.to_string(),
    });

    Pipeline::new(
        SafetyGate::new(Registry::new(), ProtectedResourceSet::default()),
        executor,
        ExecutionContext::new(interactive, 100),
        ScriptedPrompter::answering(answer),
    )
}

/// Quota reported by [`write_stub_gh`]
pub const STUB_REMAINING: u64 = 42;

/// Write a shell script standing in for gh. `gh api rate_limit` reports
/// [`STUB_REMAINING`] requests left; anything else echoes its arguments.
#[cfg(unix)]
pub fn write_stub_gh(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("gh-stub");
    let script = format!(
        r#"#!/bin/sh
if [ "$1" = "api" ] && [ "$2" = "rate_limit" ]; then
  echo '{{"resources":{{"core":{{"limit":5000,"remaining":{},"reset":1700000000}}}}}}'
  exit 0
fi
echo "stub gh $*"
"#,
        STUB_REMAINING
    );
    fs::write(&path, script).expect("Failed to write gh stub");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("Failed to chmod gh stub");
    path
}
