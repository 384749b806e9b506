use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::security::{Action, Decision, Tier, Verdict};

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024; // 10MB

/// Append-only record of gate decisions and executions
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    /// Create an AuditLogger writing to `path`
    pub fn with_path<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let log_path = path.as_ref().to_path_buf();

        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(Self { log_path })
    }

    /// Log the gate's decision for an action
    pub fn log_decision(
        &self,
        action: &Action,
        tier: Tier,
        decision: &Decision,
        working_dir: &Path,
    ) -> std::io::Result<()> {
        let outcome = match decision {
            Decision::Deny(reason) => format!("deny:{}", reason),
            other => other.as_str().to_string(),
        };

        self.append(&format!(
            "[{}] [{}] [{}] [GATE] [{}] {} -> {}",
            Utc::now().to_rfc3339(),
            current_user(),
            working_dir.display(),
            tier,
            action,
            outcome
        ))
    }

    /// Log how a confirmation was resolved
    pub fn log_confirmation(&self, action: &Action, verdict: &Verdict, working_dir: &Path) -> std::io::Result<()> {
        let outcome = match verdict {
            Verdict::Allow => "confirmed".to_string(),
            Verdict::Deny(reason) => format!("refused:{}", reason),
        };

        self.append(&format!(
            "[{}] [{}] [{}] [CONFIRM] {} -> {}",
            Utc::now().to_rfc3339(),
            current_user(),
            working_dir.display(),
            action,
            outcome
        ))
    }

    /// Log a command execution
    pub fn log_command(&self, command: &str, working_dir: &Path, exit_code: Option<i32>) -> std::io::Result<()> {
        let exit = exit_code
            .map(|code| code.to_string())
            .unwrap_or_else(|| "none".to_string());

        self.append(&format!(
            "[{}] [{}] [{}] [exit:{}] {}",
            Utc::now().to_rfc3339(),
            current_user(),
            working_dir.display(),
            exit,
            command
        ))
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        self.rotate_if_needed()?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;

        writeln!(file, "{}", line)?;
        file.flush()
    }

    /// Rotate log file if it exceeds MAX_LOG_SIZE
    fn rotate_if_needed(&self) -> std::io::Result<()> {
        if !self.log_path.exists() {
            return Ok(());
        }

        let metadata = fs::metadata(&self.log_path)?;
        if metadata.len() > MAX_LOG_SIZE {
            // Rotate: history.log -> history.log.1
            let backup_path = self.log_path.with_extension("log.1");
            fs::rename(&self.log_path, backup_path)?;
        }

        Ok(())
    }

    /// Get the path to the log file
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

fn current_user() -> String {
    std::env::var("USER").unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::{DenyReason, GitOp};
    use tempfile::TempDir;

    #[test]
    fn test_create_logger() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("nested").join("history.log");

        let logger = AuditLogger::with_path(&log_path).unwrap();
        assert_eq!(logger.log_path(), log_path);
        assert!(log_path.parent().unwrap().exists());
    }

    #[test]
    fn test_log_command() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("history.log");

        let logger = AuditLogger::with_path(&log_path).unwrap();
        logger.log_command("git status", Path::new("/test/repo"), Some(0)).unwrap();
        logger.log_command("gh run watch 1", Path::new("/test/repo"), None).unwrap();

        let content = fs::read_to_string(&log_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("git status"));
        assert!(lines[0].contains("/test/repo"));
        assert!(lines[0].contains("exit:0"));
        assert!(lines[1].contains("exit:none"));
    }

    #[test]
    fn test_log_decision() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("history.log");
        let logger = AuditLogger::with_path(&log_path).unwrap();

        let action = Action::git(GitOp::ForcePush).with_target("main");
        let decision = Decision::Deny(DenyReason::ProtectedResource {
            resource: "main".to_string(),
        });
        logger
            .log_decision(&action, Tier::Protected, &decision, Path::new("/test/repo"))
            .unwrap();

        let content = fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("[GATE]"));
        assert!(content.contains("[PROTECTED]"));
        assert!(content.contains("git force-push (main)"));
        assert!(content.contains("deny:protected resource"));
    }

    #[test]
    fn test_log_confirmation() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("history.log");
        let logger = AuditLogger::with_path(&log_path).unwrap();

        let action = Action::git(GitOp::Rebase);
        logger
            .log_confirmation(&action, &Verdict::Deny(DenyReason::UserDeclined), Path::new("/r"))
            .unwrap();

        let content = fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("[CONFIRM]"));
        assert!(content.contains("refused:user declined"));
    }

    #[test]
    fn test_log_rotation() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("history.log");

        let logger = AuditLogger::with_path(&log_path).unwrap();
        let repo_path = Path::new("/test/repo");

        let large_command = "git ".to_string() + &"x".repeat(MAX_LOG_SIZE as usize);
        logger.log_command(&large_command, repo_path, Some(0)).unwrap();

        // Second entry triggers rotation
        logger.log_command("git status", repo_path, Some(0)).unwrap();

        let backup_path = log_path.with_extension("log.1");
        assert!(backup_path.exists());

        let metadata = fs::metadata(&log_path).unwrap();
        assert!(metadata.len() < MAX_LOG_SIZE);
    }
}
