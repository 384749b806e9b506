//! One gated invocation, end to end:
//! classify → gate → (confirm) → execute → translate.

use std::path::Path;
use tracing::{debug, info, instrument, warn};

use crate::audit::AuditLogger;
use crate::config::Config;
use crate::error::{GwError, GwResult};
use crate::error_translation::ErrorTranslator;
use crate::exec::{ExecutionResult, Invocation, ToolExecutor};
use crate::security::{
    Action, ConfirmationBroker, Decision, Domain, Evaluation, ExecutionContext, GithubOp, Intent,
    Operation, Prompter, RateLimitMonitor, RateQuota, Registry, SafetyGate, Tier, Verdict, Warning,
};

/// What the caller wants done
#[derive(Debug, Clone)]
pub struct Request {
    pub action: Action,
    pub intent: Intent,
    pub invocation: Invocation,
}

/// A successful, gated execution
#[derive(Debug, Clone)]
pub struct Completed {
    pub action: Action,
    pub tier: Tier,
    pub warnings: Vec<Warning>,
    pub result: ExecutionResult,
}

pub struct Pipeline<P: Prompter> {
    gate: SafetyGate,
    broker: ConfirmationBroker<P>,
    executor: ToolExecutor,
    context: ExecutionContext,
    monitor: RateLimitMonitor,
    audit: Option<AuditLogger>,
    /// Warnings from the most recent `run`, kept for callers that only see the error
    warnings: Vec<Warning>,
}

impl<P: Prompter> Pipeline<P> {
    pub fn new(gate: SafetyGate, executor: ToolExecutor, context: ExecutionContext, prompter: P) -> Self {
        Self {
            gate,
            broker: ConfirmationBroker::new(context.interactive, prompter),
            executor,
            context,
            monitor: RateLimitMonitor::new(),
            audit: None,
            warnings: Vec::new(),
        }
    }

    /// Build everything from the loaded config, including the audit log
    /// when it is enabled.
    pub fn from_config(config: &Config, working_dir: &Path, context: ExecutionContext, prompter: P) -> Self {
        let gate = SafetyGate::new(Registry::new(), config.protected_set());
        let executor = ToolExecutor::new(working_dir)
            .with_programs(config.tool_programs())
            .with_timeout(config.timeout());

        let mut pipeline = Self::new(gate, executor, context, prompter);

        if let Some(path) = config.audit_log_path() {
            match AuditLogger::with_path(&path) {
                Ok(logger) => pipeline.audit = Some(logger),
                Err(e) => warn!(path = %path.display(), err = %e, "audit log unavailable"),
            }
        }

        pipeline
    }

    pub fn with_audit(mut self, logger: AuditLogger) -> Self {
        self.audit = Some(logger);
        self
    }

    pub fn gate(&self) -> &SafetyGate {
        &self.gate
    }

    pub fn executor(&self) -> &ToolExecutor {
        &self.executor
    }

    pub fn monitor(&self) -> &RateLimitMonitor {
        &self.monitor
    }

    pub fn prompter(&self) -> &P {
        self.broker.prompter()
    }

    /// Warnings attached to the last gated action, whether it succeeded or not.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Judge an action against the current context without running it.
    pub fn evaluate(&self, action: &Action, intent: &Intent) -> Evaluation {
        let context = self
            .context
            .with_rate_limit_remaining(self.monitor.remaining());
        self.gate.evaluate(action, intent, &context)
    }

    #[instrument(skip_all, fields(action = %request.action))]
    pub fn run(&mut self, request: Request) -> GwResult<Completed> {
        let Request {
            action,
            intent,
            invocation,
        } = request;

        if action.domain() == Domain::Github && !is_rate_limit_query(&action) {
            self.refresh_rate_limit();
        }

        let evaluation = self.evaluate(&action, &intent);
        self.audit(|log, dir| log.log_decision(&action, evaluation.tier, &evaluation.decision, dir));

        for warning in &evaluation.warnings {
            info!(%warning, "attached to decision");
        }
        self.warnings = evaluation.warnings.clone();

        let verdict = if evaluation.decision == Decision::RequireConfirmation {
            let prompt = self.confirmation_prompt(&action, evaluation.tier, &invocation);
            let verdict = self.broker.resolve(&evaluation.decision, &prompt);
            self.audit(|log, dir| log.log_confirmation(&action, &verdict, dir));
            verdict
        } else {
            self.broker.resolve(&evaluation.decision, "")
        };

        if let Verdict::Deny(reason) = verdict {
            debug!(reason = %reason, "denied");
            return Err(GwError::denied(reason));
        }

        let result = self.executor.execute(&action, &invocation);
        self.audit(|log, dir| log.log_command(&result.command, dir, result.exit_code));

        if let Some(err) = ErrorTranslator::into_error(&result) {
            return Err(err);
        }

        if is_rate_limit_query(&action) {
            self.record_rate_limit(&result.stdout);
        }

        Ok(Completed {
            action,
            tier: evaluation.tier,
            warnings: evaluation.warnings,
            result,
        })
    }

    /// Ask gh for the current quota, through the gate like any other read.
    /// Best-effort: failures leave the monitor as it was.
    pub fn refresh_rate_limit(&mut self) -> Option<&RateQuota> {
        let action = Action::github(GithubOp::RateLimit);
        let evaluation = self.evaluate(&action, &Intent::read_only());
        if !evaluation.decision.is_allow() {
            return None;
        }

        let result = self
            .executor
            .execute(&action, &Invocation::new(["api", "rate_limit"]));
        if !result.succeeded {
            debug!(stderr = %result.stderr.trim(), "rate limit query failed");
            return None;
        }

        self.record_rate_limit(&result.stdout);
        self.monitor.quota()
    }

    fn record_rate_limit(&mut self, body: &str) {
        match RateQuota::from_json(body) {
            Ok(quota) => {
                debug!(remaining = quota.remaining, limit = quota.limit, "rate limit recorded");
                self.monitor
                    .record_quota(quota, self.context.rate_limit_warn_threshold);
                if self.monitor.should_warn() {
                    warn!(
                        remaining = ?self.monitor.remaining(),
                        threshold = self.context.rate_limit_warn_threshold,
                        "GitHub rate limit running low"
                    );
                }
            }
            Err(e) => debug!(err = %e, "unparsable rate limit response"),
        }
    }

    /// Checked-out branch, for actions whose target defaults to it.
    pub fn current_branch(&self) -> GwResult<String> {
        self.executor.current_branch().map_err(|result| {
            ErrorTranslator::into_error(&result).unwrap_or_else(|| GwError::ExecutionFailed {
                command: result.command.clone(),
                exit_code: result.exit_code,
                stderr: "could not determine the current branch (detached HEAD?)".to_string(),
            })
        })
    }

    fn confirmation_prompt(&self, action: &Action, tier: Tier, invocation: &Invocation) -> String {
        format!(
            "{} operation: run `{} {}`?",
            tier,
            self.executor.program_for(action.domain()),
            invocation.args.join(" ")
        )
    }

    fn audit<F>(&self, record: F)
    where
        F: FnOnce(&AuditLogger, &Path) -> std::io::Result<()>,
    {
        if let Some(logger) = &self.audit {
            if let Err(e) = record(logger, self.executor.working_dir()) {
                warn!(err = %e, "failed to write audit log");
            }
        }
    }
}

fn is_rate_limit_query(action: &Action) -> bool {
    matches!(action.operation(), Operation::Github(GithubOp::RateLimit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::ToolPrograms;
    use crate::security::{DenyReason, GitOp, ProtectedResourceSet};
    use std::io;
    use tempfile::TempDir;

    struct Counting {
        answer: bool,
        asked: usize,
    }

    impl Prompter for Counting {
        fn confirm(&mut self, _prompt: &str) -> io::Result<bool> {
            self.asked += 1;
            Ok(self.answer)
        }
    }

    fn pipeline(dir: &Path, interactive: bool, answer: bool) -> Pipeline<Counting> {
        let executor = ToolExecutor::new(dir).with_programs(ToolPrograms {
            git: "gw-test-no-such-git".to_string(),
            gh: "gw-test-no-such-gh".to_string(),
        });
        Pipeline::new(
            SafetyGate::new(Registry::new(), ProtectedResourceSet::default()),
            executor,
            ExecutionContext::new(interactive, 100),
            Counting { answer, asked: 0 },
        )
    }

    fn request(action: Action, intent: Intent, args: &[&str]) -> Request {
        Request {
            action,
            intent,
            invocation: Invocation::new(args.iter().copied()),
        }
    }

    #[test]
    fn test_denied_before_execution() {
        let temp = TempDir::new().unwrap();
        let mut pipeline = pipeline(temp.path(), true, true);

        // The tool does not exist: reaching the executor would surface
        // ToolUnavailable instead of the denial
        let err = pipeline
            .run(request(Action::git(GitOp::Commit), Intent::read_only(), &["commit"]))
            .unwrap_err();

        assert!(matches!(
            err,
            GwError::PolicyDenied {
                reason: DenyReason::WriteFlagRequired
            }
        ));
    }

    #[test]
    fn test_declined_confirmation_never_executes() {
        let temp = TempDir::new().unwrap();
        let mut pipeline = pipeline(temp.path(), true, false);

        let err = pipeline
            .run(request(Action::git(GitOp::Rebase), Intent::new(true, true), &["rebase", "main"]))
            .unwrap_err();

        assert!(matches!(
            err,
            GwError::PolicyDenied {
                reason: DenyReason::UserDeclined
            }
        ));
        assert_eq!(pipeline.prompter().asked, 1);
    }

    #[test]
    fn test_allowed_action_reaches_executor() {
        let temp = TempDir::new().unwrap();
        let mut pipeline = pipeline(temp.path(), false, false);

        let err = pipeline
            .run(request(Action::git(GitOp::Rebase), Intent::new(true, true), &["rebase", "main"]))
            .unwrap_err();

        // Allowed without prompting; fails only because the binary is missing
        assert!(matches!(err, GwError::ToolUnavailable { .. }));
        assert_eq!(pipeline.prompter().asked, 0);
    }

    #[test]
    fn test_rate_limit_refresh_with_missing_gh_is_silent() {
        let temp = TempDir::new().unwrap();
        let mut pipeline = pipeline(temp.path(), false, false);

        assert!(pipeline.refresh_rate_limit().is_none());
        assert!(!pipeline.monitor().should_warn());
    }

    #[test]
    fn test_audit_records_denial() {
        let temp = TempDir::new().unwrap();
        let log_path = temp.path().join("history.log");
        let mut pipeline =
            pipeline(temp.path(), false, false).with_audit(AuditLogger::with_path(&log_path).unwrap());

        let action = Action::git(GitOp::ForcePush).with_target("main");
        let _ = pipeline.run(request(action, Intent::new(true, true), &["push", "--force-with-lease"]));

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("deny:protected resource"));
        assert!(!content.contains("[exit:"));
    }
}
