use std::fmt;
use std::io;
use thiserror::Error;

use crate::config::settings::ConfigError;
use crate::security::DenyReason;

/// Closed set of failure kinds callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    PolicyDenied,
    ToolUnavailable,
    ExecutionFailed,
    ParseFailed,
    /// Informational only; never produced as a failure
    RateLimited,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::PolicyDenied => "policy_denied",
            ErrorKind::ToolUnavailable => "tool_unavailable",
            ErrorKind::ExecutionFailed => "execution_failed",
            ErrorKind::ParseFailed => "parse_failed",
            ErrorKind::RateLimited => "rate_limited",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error for a gated invocation
///
/// The first four variants map one-to-one onto [`ErrorKind`]. The rest are
/// ambient failures (bad config, I/O) that happen before any action is
/// evaluated.
#[derive(Debug, Error)]
pub enum GwError {
    #[error("Safety check failed: {reason}")]
    PolicyDenied { reason: DenyReason },

    #[error("{tool} is not available: {detail}")]
    ToolUnavailable { tool: String, detail: String },

    #[error("Command '{command}' failed{}: {}", exit_suffix(.exit_code), .stderr.trim())]
    ExecutionFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to parse {tool} output: {detail}")]
    ParseFailed { tool: String, detail: String },

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn exit_suffix(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!(" with exit code {}", code),
        None => String::new(),
    }
}

impl GwError {
    pub fn denied(reason: DenyReason) -> Self {
        GwError::PolicyDenied { reason }
    }

    /// Taxonomy kind, if this is one of the gated-operation failures.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            GwError::PolicyDenied { .. } => Some(ErrorKind::PolicyDenied),
            GwError::ToolUnavailable { .. } => Some(ErrorKind::ToolUnavailable),
            GwError::ExecutionFailed { .. } => Some(ErrorKind::ExecutionFailed),
            GwError::ParseFailed { .. } => Some(ErrorKind::ParseFailed),
            GwError::InvalidAction(_) | GwError::Config(_) | GwError::Io(_) => None,
        }
    }

    /// Short message without the "Safety check failed" style prefix, as put
    /// in the `error` field of JSON output.
    pub fn message(&self) -> String {
        match self {
            GwError::PolicyDenied { reason } => reason.message().to_string(),
            other => other.to_string(),
        }
    }

    pub fn suggestion(&self) -> Option<String> {
        match self {
            GwError::PolicyDenied { reason } => reason.suggestion(),
            GwError::ToolUnavailable { tool, .. } => Some(match tool.as_str() {
                "gh" => "Install the GitHub CLI: https://cli.github.com".to_string(),
                "git" => "Install git: https://git-scm.com/downloads".to_string(),
                other => format!("Check that '{}' is installed and on PATH", other),
            }),
            GwError::ParseFailed { .. } => Some(
                "The operation may have succeeded; verify its result before retrying".to_string(),
            ),
            GwError::Config(_) => Some("Check your config file at ~/.config/gw/config.toml".to_string()),
            GwError::InvalidAction(_) => Some("Run 'gw tiers' to list known actions".to_string()),
            GwError::ExecutionFailed { .. } | GwError::Io(_) => None,
        }
    }
}

/// Result type for gated operations
pub type GwResult<T> = std::result::Result<T, GwError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            GwError::denied(DenyReason::UserDeclined).kind(),
            Some(ErrorKind::PolicyDenied)
        );
        assert_eq!(
            GwError::ToolUnavailable {
                tool: "gh".to_string(),
                detail: "not found".to_string()
            }
            .kind(),
            Some(ErrorKind::ToolUnavailable)
        );
        assert_eq!(GwError::InvalidAction("x".to_string()).kind(), None);
    }

    #[test]
    fn test_execution_failed_display() {
        let err = GwError::ExecutionFailed {
            command: "git push".to_string(),
            exit_code: Some(1),
            stderr: "rejected\n".to_string(),
        };
        assert_eq!(err.to_string(), "Command 'git push' failed with exit code 1: rejected");

        let killed = GwError::ExecutionFailed {
            command: "gh run watch 1".to_string(),
            exit_code: None,
            stderr: String::new(),
        };
        assert_eq!(killed.to_string(), "Command 'gh run watch 1' failed: ");
    }

    #[test]
    fn test_denied_message_and_suggestion() {
        let err = GwError::denied(DenyReason::WriteFlagRequired);
        assert_eq!(err.message(), "write flag required");
        assert_eq!(err.to_string(), "Safety check failed: write flag required");
        assert!(err.suggestion().unwrap().contains("--write"));
    }
}
