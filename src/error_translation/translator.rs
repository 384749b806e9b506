use crate::error::{ErrorKind, GwError};
use crate::exec::{ExecutionResult, Failure};

#[derive(Debug, Clone)]
pub struct UserFriendlyError {
    pub kind: Option<ErrorKind>,
    pub simple_message: String,
    pub suggestion: Option<String>,
    pub raw_error: String,
}

pub struct ErrorTranslator;

impl ErrorTranslator {
    /// Classify an execution outcome. `None` means it succeeded.
    ///
    /// A non-zero exit is always a failure, whatever the `succeeded` flag
    /// says.
    pub fn translate(result: &ExecutionResult) -> Option<ErrorKind> {
        match &result.failure {
            Some(Failure::Unavailable(_)) => Some(ErrorKind::ToolUnavailable),
            Some(Failure::Exited) | Some(Failure::TimedOut(_)) | Some(Failure::Interrupted(_)) => {
                Some(ErrorKind::ExecutionFailed)
            }
            Some(Failure::Unparsable(_)) => Some(ErrorKind::ParseFailed),
            None if !result.succeeded => Some(ErrorKind::ExecutionFailed),
            None => match result.exit_code {
                Some(0) => None,
                _ => Some(ErrorKind::ExecutionFailed),
            },
        }
    }

    /// Convert a failed result into the matching `GwError`
    pub fn into_error(result: &ExecutionResult) -> Option<GwError> {
        let kind = Self::translate(result)?;

        let error = match kind {
            ErrorKind::ToolUnavailable => GwError::ToolUnavailable {
                tool: result.program.clone(),
                detail: match &result.failure {
                    Some(Failure::Unavailable(detail)) => detail.clone(),
                    _ => "could not be started".to_string(),
                },
            },
            ErrorKind::ParseFailed => GwError::ParseFailed {
                tool: result.program.clone(),
                detail: match &result.failure {
                    Some(Failure::Unparsable(detail)) => detail.clone(),
                    _ => "unexpected output".to_string(),
                },
            },
            _ => GwError::ExecutionFailed {
                command: result.command.clone(),
                exit_code: result.exit_code,
                stderr: match &result.failure {
                    Some(Failure::TimedOut(limit)) => {
                        format!("timed out after {}s", limit.as_secs())
                    }
                    Some(Failure::Interrupted(detail)) => detail.clone(),
                    _ => result.stderr.clone(),
                },
            },
        };

        Some(error)
    }

    /// Translate a GwError into a user-friendly error message
    pub fn explain(error: &GwError) -> UserFriendlyError {
        let raw_error = error.to_string();

        let (simple_message, suggestion) = match error {
            GwError::ExecutionFailed { stderr, .. } => {
                Self::match_error_patterns(stderr).unwrap_or_else(|| (raw_error.clone(), None))
            }
            other => (other.message(), other.suggestion()),
        };

        UserFriendlyError {
            kind: error.kind(),
            simple_message,
            suggestion,
            raw_error,
        }
    }

    /// Match common git and gh error patterns
    fn match_error_patterns(error_text: &str) -> Option<(String, Option<String>)> {
        let lower = error_text.to_lowercase();

        // gh: not logged in
        if lower.contains("gh auth login") || lower.contains("not logged into") {
            return Some((
                "GitHub CLI is not authenticated.".to_string(),
                Some("Run: gh auth login".to_string()),
            ));
        }

        // gh: rate limited by the API
        if lower.contains("api rate limit exceeded") || lower.contains("secondary rate limit") {
            return Some((
                "GitHub API rate limit exceeded.".to_string(),
                Some("Wait for the quota to reset. Check it with: gw gh rate-limit".to_string()),
            ));
        }

        // gh: resource missing
        if lower.contains("http 404") || lower.contains("could not resolve to") {
            return Some((
                "GitHub resource not found.".to_string(),
                Some("Check the number or ID, and the repository (github.repo in config)".to_string()),
            ));
        }

        // No upstream branch
        if lower.contains("no upstream") || lower.contains("does not have an upstream") {
            return Some((
                "No remote branch is configured for tracking.".to_string(),
                Some("Try: gw git push --write --set-upstream".to_string()),
            ));
        }

        // Merge conflicts
        if lower.contains("merge conflict") || lower.contains("conflict") {
            return Some((
                "Merge has conflicts that need to be resolved.".to_string(),
                Some("Fix conflicts in the listed files, then add and commit them.".to_string()),
            ));
        }

        // Nothing to commit
        if lower.contains("nothing to commit") || lower.contains("working tree clean") {
            return Some(("No changes to commit - working directory is clean.".to_string(), None));
        }

        // Pathspec did not match
        if lower.contains("pathspec") && lower.contains("did not match") {
            return Some((
                "File path not found in the repository.".to_string(),
                Some("Check the file path and try again. Use 'gw git status' to see available files.".to_string()),
            ));
        }

        // Branch already exists
        if lower.contains("already exists") && (lower.contains("branch") || lower.contains("ref")) {
            return Some((
                "A branch with that name already exists.".to_string(),
                Some("Use a different name.".to_string()),
            ));
        }

        // Not a git repository
        if lower.contains("not a git repository") {
            return Some((
                "Current directory is not a git repository.".to_string(),
                Some("Run gw from inside a repository.".to_string()),
            ));
        }

        // Authentication failed
        if lower.contains("authentication failed") || lower.contains("permission denied") {
            return Some((
                "Authentication failed - check your credentials.".to_string(),
                Some("Verify your SSH keys or personal access token.".to_string()),
            ));
        }

        // Uncommitted changes
        if lower.contains("uncommitted changes") || lower.contains("would be overwritten") {
            return Some((
                "Operation would overwrite uncommitted changes.".to_string(),
                Some("Commit or stash your changes first: gw git stash --write".to_string()),
            ));
        }

        // Divergent branches
        if lower.contains("diverged") || (lower.contains("rejected") && lower.contains("non-fast-forward")) {
            return Some((
                "Local and remote branches have diverged.".to_string(),
                Some("Pull changes first: gw git pull --write".to_string()),
            ));
        }

        // Stale lease on force-push
        if lower.contains("stale info") {
            return Some((
                "The remote branch moved since you last fetched it.".to_string(),
                Some("Fetch and review the remote changes before force-pushing again.".to_string()),
            ));
        }

        // Rebase in progress
        if lower.contains("rebase in progress") || lower.contains("rebase-merge") {
            return Some((
                "A rebase operation is currently in progress.".to_string(),
                Some("Finish it with 'git rebase --continue' or abort with 'git rebase --abort'.".to_string()),
            ));
        }

        // Bad revision
        if lower.contains("unknown revision") || lower.contains("bad revision") {
            return Some((
                "Revision not found.".to_string(),
                Some("Check the commit, branch or tag name with: gw git log".to_string()),
            ));
        }

        None
    }
}
